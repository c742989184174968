//! Platform descriptor handling
//!
//! A platform lists the modules it builds, the library instances bound to
//! each, per-module PCD build definitions and platform-wide dynamic PCD
//! settings (token numbers, SKU values, HII and VPD storage).

use serde::{Deserialize, Serialize};
use uguid::Guid;

use crate::core::ids::{guid_text, parse_guid, ModuleKey, NULL_GUID};
use crate::core::resolver::ResolutionSession;
use crate::core::token::{HiiBinding, SkuInstance};
use crate::core::types::{DatumType, PcdType};
use crate::core::workspace::Workspace;
use crate::error::{IdError, PlatformError, TokenError};

/// Raw platform descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlatformDescriptor {
    pub platform: PlatformHeader,

    #[serde(default)]
    pub modules: Vec<ModuleSaDescriptor>,

    #[serde(default)]
    pub dynamic_pcds: Vec<DynamicPcdDescriptor>,
}

/// Platform identity
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlatformHeader {
    pub name: String,
    pub guid: String,
    pub version: String,
}

/// One module built by the platform
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModuleSaDescriptor {
    pub module_guid: String,
    pub module_version: String,
    pub package_guid: String,
    pub package_version: String,

    /// Bound library instances as four-part module keys
    #[serde(default)]
    pub library_instances: Vec<String>,

    #[serde(default)]
    pub pcds: Vec<PcdBuildDescriptor>,
}

/// PCD build definition of one module
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PcdBuildDescriptor {
    pub c_name: String,
    pub token_space_guid: String,
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Platform-wide setting of a dynamic PCD
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DynamicPcdDescriptor {
    pub c_name: String,
    pub token_space_guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_token_space_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sku: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpd_offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skus: Vec<SkuDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hii: Option<HiiDescriptor>,
}

/// Value of a dynamic PCD for one SKU
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkuDescriptor {
    pub id: u32,
    pub value: String,
}

/// HII variable storage of a dynamic PCD
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HiiDescriptor {
    pub variable_name: String,
    pub variable_guid: String,
    #[serde(default)]
    pub variable_offset: u64,
}

impl PlatformDescriptor {
    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// PCD build definition of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PcdBuildDefinition {
    pub c_name: String,
    #[serde(serialize_with = "serialize_guid")]
    pub token_space_guid: Guid,
    pub item_type: PcdType,
    pub datum_type: DatumType,
    pub token: Option<u32>,
    pub value: Option<String>,
}

impl PcdBuildDefinition {
    /// Whether this row describes the given token
    pub fn is_for(&self, c_name: &str, token_space_guid: &Guid) -> bool {
        self.c_name == c_name && self.token_space_guid == *token_space_guid
    }
}

fn serialize_guid<S: serde::Serializer>(guid: &Guid, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&guid_text(guid))
}

/// Validated module entry of a platform
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformModule {
    pub key: ModuleKey,
    pub library_instances: Vec<ModuleKey>,
    pub pcds: Vec<PcdBuildDefinition>,
}

impl PlatformModule {
    /// Build definition for a token, if the platform sets one
    pub fn pcd(&self, c_name: &str, token_space_guid: &Guid) -> Option<&PcdBuildDefinition> {
        self.pcds
            .iter()
            .find(|pcd| pcd.is_for(c_name, token_space_guid))
    }
}

/// Validated dynamic PCD setting
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicPcdSetting {
    pub c_name: String,
    pub token_space_guid: Guid,
    pub assigned_token_space_guid: Guid,
    pub token_number: Option<u32>,
    pub datum: Option<String>,
    pub sku_id: Option<u32>,
    pub max_sku_count: Option<u32>,
    pub sku_data: Vec<SkuInstance>,
    pub hii: Option<HiiBinding>,
    pub vpd_offset: Option<u64>,
}

/// Validated platform
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub name: String,
    pub guid: Guid,
    pub version: String,
    pub modules: Vec<PlatformModule>,
    pub dynamic_pcds: Vec<DynamicPcdSetting>,
}

impl Platform {
    /// Validate a raw descriptor
    pub fn from_descriptor(desc: &PlatformDescriptor) -> Result<Self, PlatformError> {
        let name = desc.platform.name.clone();
        let id_err = |source: IdError| PlatformError::Id {
            platform: name.clone(),
            source,
        };
        let pcd_err = |source: TokenError| PlatformError::Pcd {
            platform: name.clone(),
            source,
        };

        let mut modules = Vec::with_capacity(desc.modules.len());
        for sa in &desc.modules {
            let key = ModuleKey {
                module_guid: parse_guid(&sa.module_guid).map_err(id_err)?,
                module_version: sa.module_version.clone(),
                package_guid: parse_guid(&sa.package_guid).map_err(id_err)?,
                package_version: sa.package_version.clone(),
            };

            let library_instances = sa
                .library_instances
                .iter()
                .map(|text| text.parse::<ModuleKey>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(id_err)?;

            let mut pcds = Vec::with_capacity(sa.pcds.len());
            for pcd in &sa.pcds {
                let item_type = PcdType::from_name(&pcd.item_type);
                if !item_type.is_valid() {
                    return Err(pcd_err(TokenError::UnknownPcdType {
                        c_name: pcd.c_name.clone(),
                        value: pcd.item_type.clone(),
                    }));
                }
                let datum_type = DatumType::from_optional(pcd.datum_type.as_deref());
                if pcd.datum_type.is_some() && !datum_type.is_valid() {
                    return Err(pcd_err(TokenError::UnknownDatumType {
                        c_name: pcd.c_name.clone(),
                        value: pcd.datum_type.clone().unwrap_or_default(),
                    }));
                }
                pcds.push(PcdBuildDefinition {
                    c_name: pcd.c_name.clone(),
                    token_space_guid: parse_guid(&pcd.token_space_guid).map_err(id_err)?,
                    item_type,
                    datum_type,
                    token: pcd.token,
                    value: pcd.value.clone(),
                });
            }

            modules.push(PlatformModule {
                key,
                library_instances,
                pcds,
            });
        }

        let mut dynamic_pcds = Vec::with_capacity(desc.dynamic_pcds.len());
        for pcd in &desc.dynamic_pcds {
            let hii = match &pcd.hii {
                Some(hii) => Some(HiiBinding {
                    variable_name: hii.variable_name.clone(),
                    variable_guid: parse_guid(&hii.variable_guid).map_err(id_err)?,
                    variable_offset: hii.variable_offset,
                }),
                None => None,
            };
            let assigned_token_space_guid = match &pcd.assigned_token_space_guid {
                Some(text) => parse_guid(text).map_err(id_err)?,
                None => NULL_GUID,
            };

            dynamic_pcds.push(DynamicPcdSetting {
                c_name: pcd.c_name.clone(),
                token_space_guid: parse_guid(&pcd.token_space_guid).map_err(id_err)?,
                assigned_token_space_guid,
                token_number: pcd.token,
                datum: pcd.datum.clone(),
                sku_id: pcd.sku_id,
                max_sku_count: pcd.max_sku,
                sku_data: pcd
                    .skus
                    .iter()
                    .map(|sku| SkuInstance {
                        id: sku.id,
                        value: sku.value.clone(),
                    })
                    .collect(),
                hii,
                vpd_offset: pcd.vpd_offset,
            });
        }

        let guid = parse_guid(&desc.platform.guid).map_err(id_err)?;
        Ok(Self {
            name,
            guid,
            version: desc.platform.version.clone(),
            modules,
            dynamic_pcds,
        })
    }

    /// Check that every referenced module is loaded in the workspace
    pub fn verify(&self, workspace: &Workspace) -> Result<(), PlatformError> {
        let referenced = self
            .modules
            .iter()
            .flat_map(|m| std::iter::once(&m.key).chain(m.library_instances.iter()));
        for key in referenced {
            if workspace.module(key).is_none() {
                return Err(PlatformError::UnknownModule {
                    platform: self.name.clone(),
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Module entry by key
    pub fn module(&self, key: &ModuleKey) -> Option<&PlatformModule> {
        self.modules.iter().find(|m| m.key == *key)
    }

    /// Write a session's bindings and PCD rows back into its module entry
    ///
    /// Values and token numbers already set by the platform are kept for rows
    /// that survive.
    pub fn apply_session(&mut self, session: &ResolutionSession<'_>) -> Result<(), PlatformError> {
        let key = session.module();
        let platform = self.name.clone();
        let entry = self
            .modules
            .iter_mut()
            .find(|m| m.key == *key)
            .ok_or_else(|| PlatformError::ModuleNotInPlatform {
                platform,
                key: key.to_string(),
            })?;

        let rows = session
            .pcd_build_definitions()
            .into_iter()
            .map(|mut row| {
                if let Some(existing) = entry.pcd(&row.c_name, &row.token_space_guid) {
                    row.item_type = existing.item_type;
                    row.token = existing.token.or(row.token);
                    row.value = existing.value.clone().or(row.value);
                }
                row
            })
            .collect();

        entry.library_instances = session.library_instances();
        entry.pcds = rows;
        Ok(())
    }

    /// Convert back to the raw descriptor
    pub fn to_descriptor(&self) -> PlatformDescriptor {
        PlatformDescriptor {
            platform: PlatformHeader {
                name: self.name.clone(),
                guid: guid_text(&self.guid),
                version: self.version.clone(),
            },
            modules: self
                .modules
                .iter()
                .map(|m| ModuleSaDescriptor {
                    module_guid: guid_text(&m.key.module_guid),
                    module_version: m.key.module_version.clone(),
                    package_guid: guid_text(&m.key.package_guid),
                    package_version: m.key.package_version.clone(),
                    library_instances: m.library_instances.iter().map(ToString::to_string).collect(),
                    pcds: m
                        .pcds
                        .iter()
                        .map(|pcd| PcdBuildDescriptor {
                            c_name: pcd.c_name.clone(),
                            token_space_guid: guid_text(&pcd.token_space_guid),
                            item_type: pcd.item_type.to_string(),
                            datum_type: pcd
                                .datum_type
                                .is_valid()
                                .then(|| pcd.datum_type.to_string()),
                            token: pcd.token,
                            value: pcd.value.clone(),
                        })
                        .collect(),
                })
                .collect(),
            dynamic_pcds: self
                .dynamic_pcds
                .iter()
                .map(|pcd| DynamicPcdDescriptor {
                    c_name: pcd.c_name.clone(),
                    token_space_guid: guid_text(&pcd.token_space_guid),
                    assigned_token_space_guid: (pcd.assigned_token_space_guid != NULL_GUID)
                        .then(|| guid_text(&pcd.assigned_token_space_guid)),
                    token: pcd.token_number,
                    datum: pcd.datum.clone(),
                    sku_id: pcd.sku_id,
                    max_sku: pcd.max_sku_count,
                    skus: pcd
                        .sku_data
                        .iter()
                        .map(|sku| SkuDescriptor {
                            id: sku.id,
                            value: sku.value.clone(),
                        })
                        .collect(),
                    vpd_offset: pcd.vpd_offset,
                    hii: pcd.hii.as_ref().map(|hii| HiiDescriptor {
                        variable_name: hii.variable_name.clone(),
                        variable_guid: guid_text(&hii.variable_guid),
                        variable_offset: hii.variable_offset,
                    }),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLATFORM: &str = r#"
[platform]
name = "Nt32"
guid = "eb216561-961f-47ee-9ef9-ca426ef547c2"
version = "0.3"

[[modules]]
module_guid = "11111111-2222-3333-4444-555555555555"
module_version = "1.0"
package_guid = "68169ab0-d41b-4009-9060-292c253ac43d"
package_version = "1.0"
library_instances = [
    "27d67720-ea68-48ae-93da-a3a074c90e30 1.0 5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec 1.0",
]

[[modules.pcds]]
c_name = "PcdMaximumLinkedListLength"
token_space_guid = "914aebe7-4635-459b-aa1c-11e219b03a10"
item_type = "FIXED_AT_BUILD"
value = "500"

[[dynamic_pcds]]
c_name = "PcdPlatformBootTimeOut"
token_space_guid = "914aebe7-4635-459b-aa1c-11e219b03a10"
token = 7
sku_id = 0
max_sku = 2

[[dynamic_pcds.skus]]
id = 0
value = "10"

[[dynamic_pcds.skus]]
id = 1
value = "3"

[dynamic_pcds.hii]
variable_name = "Timeout"
variable_guid = "8be4df61-93ca-11d2-aa0d-00e098032b8c"
"#;

    #[test]
    fn test_platform_from_descriptor() {
        let desc = PlatformDescriptor::from_toml(PLATFORM).unwrap();
        let platform = Platform::from_descriptor(&desc).unwrap();

        assert_eq!(platform.name, "Nt32");
        assert_eq!(platform.modules.len(), 1);

        let module = &platform.modules[0];
        assert_eq!(module.library_instances.len(), 1);
        assert_eq!(module.pcds[0].item_type, PcdType::FixedAtBuild);
        assert_eq!(module.pcds[0].datum_type, DatumType::Unknown);
        assert_eq!(module.pcds[0].value.as_deref(), Some("500"));

        let dynamic = &platform.dynamic_pcds[0];
        assert_eq!(dynamic.token_number, Some(7));
        assert_eq!(dynamic.assigned_token_space_guid, NULL_GUID);
        assert_eq!(dynamic.sku_data.len(), 2);
        assert_eq!(dynamic.hii.as_ref().map(|h| h.variable_offset), Some(0));
    }

    #[test]
    fn test_bad_library_instance_key() {
        let mut desc = PlatformDescriptor::from_toml(PLATFORM).unwrap();
        desc.modules[0].library_instances = vec!["only two".into()];

        assert!(matches!(
            Platform::from_descriptor(&desc),
            Err(PlatformError::Id {
                source: IdError::InvalidModuleKey { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_bad_item_type() {
        let mut desc = PlatformDescriptor::from_toml(PLATFORM).unwrap();
        desc.modules[0].pcds[0].item_type = "BOGUS".into();

        assert!(matches!(
            Platform::from_descriptor(&desc),
            Err(PlatformError::Pcd {
                source: TokenError::UnknownPcdType { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_descriptor_survives_conversion() {
        let desc = PlatformDescriptor::from_toml(PLATFORM).unwrap();
        let platform = Platform::from_descriptor(&desc).unwrap();
        let text = platform.to_descriptor().to_toml().unwrap();
        let reparsed = Platform::from_descriptor(&PlatformDescriptor::from_toml(&text).unwrap()).unwrap();

        assert_eq!(reparsed, platform);
    }

    #[test]
    fn test_verify_reports_unknown_modules() {
        let desc = PlatformDescriptor::from_toml(PLATFORM).unwrap();
        let platform = Platform::from_descriptor(&desc).unwrap();

        assert!(matches!(
            platform.verify(&Workspace::new()),
            Err(PlatformError::UnknownModule { .. })
        ));
    }
}
