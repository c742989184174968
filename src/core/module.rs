//! Module descriptor handling
//!
//! A module descriptor (`*.toml` listed by a package) declares the module
//! identity, the library classes it consumes and produces, the PCDs it uses
//! and the packages it depends on.

use serde::{Deserialize, Serialize};
use uguid::Guid;

use crate::core::ids::{parse_guid, ModuleId, PackageKey};
use crate::core::types::{PcdType, Usage};
use crate::error::{ModuleError, TokenError};

/// Raw module descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModuleDescriptor {
    /// Module identity
    pub module: ModuleHeader,

    /// Library class usages
    #[serde(default)]
    pub library_classes: Vec<LibraryClassUsage>,

    /// PCD usages
    #[serde(default)]
    pub pcds: Vec<ModulePcd>,

    /// Packages this module depends on
    #[serde(default)]
    pub dependencies: Vec<PackageDependency>,
}

/// Module identity
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModuleHeader {
    pub name: String,
    pub guid: String,
    pub version: String,
    #[serde(default)]
    pub module_type: Option<String>,
}

/// One library class entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryClassUsage {
    pub name: String,
    pub usage: String,
}

/// One PCD entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModulePcd {
    pub c_name: String,
    pub token_space_guid: String,
    pub item_type: String,
    #[serde(default = "default_pcd_usage")]
    pub usage: String,
}

fn default_pcd_usage() -> String {
    Usage::AlwaysConsumed.to_string()
}

/// Dependency on a package; without a version any loaded version matches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageDependency {
    pub guid: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl ModuleDescriptor {
    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Validated PCD usage of a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcdUsage {
    pub c_name: String,
    pub token_space_guid: Guid,
    pub item_type: PcdType,
    pub usage: Usage,
}

/// Validated package dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRef {
    pub guid: Guid,
    pub version: Option<String>,
}

impl DependencyRef {
    /// Whether `package` satisfies this dependency
    pub fn matches(&self, package: &PackageKey) -> bool {
        self.guid == package.guid
            && self
                .version
                .as_ref()
                .map_or(true, |version| *version == package.version)
    }
}

/// Validated module description
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    pub id: ModuleId,
    /// Library classes with their usage, in declaration order
    pub library_classes: Vec<(String, Usage)>,
    pub pcds: Vec<PcdUsage>,
    pub dependencies: Vec<DependencyRef>,
}

impl ModuleInfo {
    /// Validate a raw descriptor
    ///
    /// Unknown usage or item type strings are rejected here so nothing
    /// `Unknown` reaches the registry or the resolver.
    pub fn from_descriptor(desc: &ModuleDescriptor) -> Result<Self, ModuleError> {
        let name = desc.module.name.clone();
        let id_err = |source| ModuleError::Id {
            module: name.clone(),
            source,
        };

        let id = ModuleId {
            name: name.clone(),
            guid: parse_guid(&desc.module.guid).map_err(id_err)?,
            version: desc.module.version.clone(),
            module_type: desc.module.module_type.clone(),
        };

        let mut library_classes = Vec::with_capacity(desc.library_classes.len());
        for class in &desc.library_classes {
            let usage = Usage::from_name(&class.usage);
            if !usage.is_valid() {
                return Err(ModuleError::UnknownClassUsage {
                    module: name.clone(),
                    class: class.name.clone(),
                    value: class.usage.clone(),
                });
            }
            library_classes.push((class.name.clone(), usage));
        }

        let mut pcds = Vec::with_capacity(desc.pcds.len());
        for pcd in &desc.pcds {
            pcds.push(Self::validate_pcd(&name, pcd)?);
        }

        let dependencies = desc
            .dependencies
            .iter()
            .map(|dep| {
                Ok(DependencyRef {
                    guid: parse_guid(&dep.guid).map_err(id_err)?,
                    version: dep.version.clone(),
                })
            })
            .collect::<Result<Vec<_>, ModuleError>>()?;

        Ok(Self {
            id,
            library_classes,
            pcds,
            dependencies,
        })
    }

    fn validate_pcd(module: &str, pcd: &ModulePcd) -> Result<PcdUsage, ModuleError> {
        let pcd_err = |source| ModuleError::Pcd {
            module: module.to_string(),
            source,
        };

        let item_type = PcdType::from_name(&pcd.item_type);
        if !item_type.is_valid() {
            return Err(pcd_err(TokenError::UnknownPcdType {
                c_name: pcd.c_name.clone(),
                value: pcd.item_type.clone(),
            }));
        }

        let usage = Usage::from_name(&pcd.usage);
        if !usage.is_valid() {
            return Err(pcd_err(TokenError::UnknownUsage {
                c_name: pcd.c_name.clone(),
                module: module.to_string(),
                value: pcd.usage.clone(),
            }));
        }

        let token_space_guid = parse_guid(&pcd.token_space_guid).map_err(|source| ModuleError::Id {
            module: module.to_string(),
            source,
        })?;

        Ok(PcdUsage {
            c_name: pcd.c_name.clone(),
            token_space_guid,
            item_type,
            usage,
        })
    }

    /// Classes declared with exactly `usage`, in declaration order
    pub fn classes_with_usage(&self, usage: Usage) -> impl Iterator<Item = &str> + '_ {
        self.library_classes
            .iter()
            .filter(move |(_, u)| *u == usage)
            .map(|(class, _)| class.as_str())
    }

    /// Classes this module always consumes
    pub fn consumed_classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes_with_usage(Usage::AlwaysConsumed)
    }

    /// Classes this module always produces
    pub fn produced_classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes_with_usage(Usage::AlwaysProduced)
    }

    /// Whether this module always produces `class`
    pub fn produces(&self, class: &str) -> bool {
        self.produced_classes().any(|c| c == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uguid::guid;

    const BASE_LIB: &str = r#"
[module]
name = "BaseLib"
guid = "27d67720-ea68-48ae-93da-a3a074c90e30"
version = "1.0"
module_type = "BASE"

[[library_classes]]
name = "BaseLib"
usage = "ALWAYS_PRODUCED"

[[library_classes]]
name = "DebugLib"
usage = "ALWAYS_CONSUMED"

[[library_classes]]
name = "TimerLib"
usage = "SOMETIMES_CONSUMED"

[[pcds]]
c_name = "PcdMaximumLinkedListLength"
token_space_guid = "914aebe7-4635-459b-aa1c-11e219b03a10"
item_type = "FIXED_AT_BUILD"

[[dependencies]]
guid = "5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec"
"#;

    #[test]
    fn test_module_info_from_descriptor() {
        let desc = ModuleDescriptor::from_toml(BASE_LIB).unwrap();
        let info = ModuleInfo::from_descriptor(&desc).unwrap();

        assert_eq!(info.id.name, "BaseLib");
        assert_eq!(info.id.guid, guid!("27d67720-ea68-48ae-93da-a3a074c90e30"));
        assert_eq!(info.id.module_type.as_deref(), Some("BASE"));
        assert_eq!(info.produced_classes().collect::<Vec<_>>(), ["BaseLib"]);
        assert_eq!(info.consumed_classes().collect::<Vec<_>>(), ["DebugLib"]);
        assert!(info.produces("BaseLib"));
        assert!(!info.produces("DebugLib"));
    }

    #[test]
    fn test_pcd_usage_defaults_to_always_consumed() {
        let desc = ModuleDescriptor::from_toml(BASE_LIB).unwrap();
        let info = ModuleInfo::from_descriptor(&desc).unwrap();

        assert_eq!(info.pcds.len(), 1);
        assert_eq!(info.pcds[0].usage, Usage::AlwaysConsumed);
        assert_eq!(info.pcds[0].item_type, PcdType::FixedAtBuild);
    }

    #[test]
    fn test_unknown_class_usage_is_rejected() {
        let mut desc = ModuleDescriptor::from_toml(BASE_LIB).unwrap();
        desc.library_classes[0].usage = "MAYBE".to_string();

        let err = ModuleInfo::from_descriptor(&desc).unwrap_err();
        assert!(matches!(err, ModuleError::UnknownClassUsage { ref value, .. } if value == "MAYBE"));
    }

    #[test]
    fn test_unknown_item_type_is_rejected() {
        let mut desc = ModuleDescriptor::from_toml(BASE_LIB).unwrap();
        desc.pcds[0].item_type = "STATIC".to_string();

        let err = ModuleInfo::from_descriptor(&desc).unwrap_err();
        assert!(matches!(
            err,
            ModuleError::Pcd {
                source: TokenError::UnknownPcdType { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_bad_guid_is_rejected() {
        let mut desc = ModuleDescriptor::from_toml(BASE_LIB).unwrap();
        desc.module.guid = "xyz".to_string();

        assert!(matches!(
            ModuleInfo::from_descriptor(&desc),
            Err(ModuleError::Id { .. })
        ));
    }

    #[test]
    fn test_dependency_without_version_matches_any() {
        let dep = DependencyRef {
            guid: guid!("5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec"),
            version: None,
        };
        let key = PackageKey {
            guid: dep.guid,
            version: "0.3".to_string(),
        };
        assert!(dep.matches(&key));

        let pinned = DependencyRef {
            version: Some("1.0".to_string()),
            ..dep
        };
        assert!(!pinned.matches(&key));
    }
}
