//! Workspace: every loaded package and module
//!
//! The workspace is filled by the loader before any resolution starts and is
//! read-only afterwards. Sessions and the token registry borrow it.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::ids::{guid_text, ModuleKey, PackageKey};
use crate::core::module::ModuleInfo;
use crate::core::package_table::{DeclaredPcd, PackageDeclarationTable};
use crate::core::types::Usage;
use crate::error::{PackageError, ResolverError};

/// Loaded packages and modules
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    packages: BTreeMap<PackageKey, PackageDeclarationTable>,
    modules: BTreeMap<ModuleKey, ModuleInfo>,
}

impl Workspace {
    /// Create an empty workspace
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package together with its parsed modules
    ///
    /// Nothing is added when the package is already loaded, so a failure
    /// leaves earlier packages untouched.
    pub fn add_package(
        &mut self,
        table: PackageDeclarationTable,
        modules: Vec<ModuleInfo>,
    ) -> Result<(), PackageError> {
        let key = table.id().key();
        if self.packages.contains_key(&key) {
            return Err(PackageError::DuplicatePackage {
                package: table.id().name.clone(),
                guid: guid_text(&key.guid),
                version: key.version,
            });
        }

        debug!(
            "Adding package {} with {} module(s)",
            table.id(),
            modules.len()
        );
        for module in modules {
            self.modules
                .insert(ModuleKey::new(&module.id, table.id()), module);
        }
        self.packages.insert(key, table);
        Ok(())
    }

    /// All packages, ordered by GUID then version
    pub fn packages(&self) -> impl Iterator<Item = &PackageDeclarationTable> + '_ {
        self.packages.values()
    }

    /// Package by key
    pub fn package(&self, key: &PackageKey) -> Option<&PackageDeclarationTable> {
        self.packages.get(key)
    }

    /// Package by name, case-insensitive
    pub fn package_by_name(&self, name: &str) -> Option<&PackageDeclarationTable> {
        self.packages
            .values()
            .find(|table| table.id().name.eq_ignore_ascii_case(name))
    }

    /// All modules in candidate order
    pub fn modules(&self) -> impl Iterator<Item = (&ModuleKey, &ModuleInfo)> + '_ {
        self.modules.iter()
    }

    /// Keys of the modules contained in a package
    pub fn modules_in<'a>(&'a self, package: &'a PackageKey) -> impl Iterator<Item = &'a ModuleKey> + 'a {
        self.modules
            .keys()
            .filter(move |key| key.package() == *package)
    }

    /// Module by key
    pub fn module(&self, key: &ModuleKey) -> Option<&ModuleInfo> {
        self.modules.get(key)
    }

    /// Module by its textual four-part key
    pub fn module_id(&self, key: &str) -> Result<(ModuleKey, &ModuleInfo), ResolverError> {
        let parsed: ModuleKey = key.parse().map_err(|_| ResolverError::UnknownModule {
            key: key.to_string(),
        })?;
        let info = self
            .modules
            .get(&parsed)
            .ok_or_else(|| ResolverError::UnknownModule {
                key: key.to_string(),
            })?;
        Ok((parsed, info))
    }

    /// Find a module by four-part key or by name (case-insensitive)
    ///
    /// When several modules share a name the first in candidate order wins.
    pub fn find_module(&self, query: &str) -> Option<ModuleKey> {
        if let Ok((key, _)) = self.module_id(query) {
            return Some(key);
        }
        self.modules
            .iter()
            .find(|(_, info)| info.id.name.eq_ignore_ascii_case(query.trim()))
            .map(|(key, _)| key.clone())
    }

    /// Display name of a module, falling back to its key
    pub fn module_name(&self, key: &ModuleKey) -> String {
        self.modules
            .get(key)
            .map_or_else(|| key.to_string(), |info| info.id.name.clone())
    }

    /// Library classes of a module with the given usage
    pub fn library_classes(&self, key: &ModuleKey, usage: Usage) -> Vec<String> {
        self.modules
            .get(key)
            .map(|info| info.classes_with_usage(usage).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Packages a module may draw library instances from
    ///
    /// The module's own package comes first, then every loaded package that
    /// matches a declared dependency.
    pub fn dependency_packages(&self, key: &ModuleKey) -> Vec<PackageKey> {
        let own = key.package();
        let mut result = Vec::new();
        if self.packages.contains_key(&own) {
            result.push(own);
        }

        if let Some(info) = self.modules.get(key) {
            for dep in &info.dependencies {
                for package in self.packages.keys() {
                    if dep.matches(package) && !result.contains(package) {
                        result.push(package.clone());
                    }
                }
            }
        }
        result
    }

    /// Find the declaration of a PCD
    ///
    /// Packages in `preferred` are searched first, then all others.
    pub fn find_pcd_declaration(
        &self,
        c_name: &str,
        token_space_guid: &uguid::Guid,
        preferred: &[PackageKey],
    ) -> Option<(&PackageDeclarationTable, &DeclaredPcd)> {
        preferred
            .iter()
            .filter_map(|key| self.packages.get(key))
            .chain(self.packages.values())
            .find_map(|table| {
                table
                    .pcd(c_name, token_space_guid)
                    .map(|pcd| (table, pcd))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::{ModuleId, PackageId};
    use crate::core::module::DependencyRef;
    use crate::core::package::{PackageDescriptor, PackageHeader};
    use std::path::{Path, PathBuf};
    use uguid::{guid, Guid};

    const PKG: Guid = guid!("5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec");
    const OTHER_PKG: Guid = guid!("68169ab0-d41b-4009-9060-292c253ac43d");

    fn table(name: &str, guid: Guid) -> PackageDeclarationTable {
        let desc = PackageDescriptor {
            package: PackageHeader {
                name: name.into(),
                guid: guid.to_string(),
                version: "1.0".into(),
                description: None,
            },
            ..Default::default()
        };
        PackageDeclarationTable::from_descriptor(Path::new(name), &desc).unwrap()
    }

    fn module(name: &str, guid: Guid, deps: Vec<DependencyRef>) -> ModuleInfo {
        ModuleInfo {
            id: ModuleId {
                name: name.into(),
                guid,
                version: "1.0".into(),
                module_type: None,
            },
            library_classes: vec![("BaseLib".into(), Usage::AlwaysProduced)],
            pcds: Vec::new(),
            dependencies: deps,
        }
    }

    fn workspace() -> Workspace {
        let mut ws = Workspace::new();
        let mut pkg = table("MdePkg", PKG);
        let base = module("BaseLib", guid!("27d67720-ea68-48ae-93da-a3a074c90e30"), vec![]);
        pkg.add_module(base.id.clone(), PathBuf::from("BaseLib.toml"))
            .unwrap();
        ws.add_package(pkg, vec![base]).unwrap();

        let mut other = table("IntelFrameworkPkg", OTHER_PKG);
        let driver = module(
            "Driver",
            guid!("11111111-2222-3333-4444-555555555555"),
            vec![DependencyRef {
                guid: PKG,
                version: None,
            }],
        );
        other
            .add_module(driver.id.clone(), PathBuf::from("Driver.toml"))
            .unwrap();
        ws.add_package(other, vec![driver]).unwrap();
        ws
    }

    #[test]
    fn test_duplicate_package_is_rejected_atomically() {
        let mut ws = workspace();
        let err = ws.add_package(table("MdePkg", PKG), vec![]).unwrap_err();

        assert!(matches!(err, PackageError::DuplicatePackage { .. }));
        assert_eq!(ws.packages().count(), 2);
        assert_eq!(ws.modules().count(), 2);
    }

    #[test]
    fn test_find_module_by_name_and_key() {
        let ws = workspace();
        let key = ws.find_module("baselib").unwrap();
        assert_eq!(ws.module_name(&key), "BaseLib");
        assert_eq!(ws.find_module(&key.to_string()), Some(key.clone()));

        let (parsed, info) = ws.module_id(&key.to_string()).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(info.id.name, "BaseLib");
        assert!(ws.find_module("NoSuchModule").is_none());
    }

    #[test]
    fn test_module_id_rejects_unknown_key() {
        let ws = workspace();
        let err = ws
            .module_id("00000000-0000-0000-0000-000000000001 1.0 5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec 1.0")
            .unwrap_err();
        assert!(matches!(err, ResolverError::UnknownModule { .. }));
        assert!(ws.module_id("garbage").is_err());
    }

    #[test]
    fn test_dependency_packages_include_own_package_first() {
        let ws = workspace();
        let driver = ws.find_module("Driver").unwrap();
        let deps = ws.dependency_packages(&driver);

        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].guid, OTHER_PKG);
        assert_eq!(deps[1].guid, PKG);
    }

    #[test]
    fn test_modules_in_package() {
        let ws = workspace();
        let key = PackageKey {
            guid: PKG,
            version: "1.0".into(),
        };
        let names: Vec<_> = ws.modules_in(&key).map(|k| ws.module_name(k)).collect();
        assert_eq!(names, ["BaseLib"]);
        assert!(ws.package(&key).is_some());
        assert!(ws.package_by_name("mdepkg").is_some());
    }

    #[test]
    fn test_library_classes_of_unknown_module_is_empty() {
        let ws = workspace();
        let key = ModuleKey::new(
            &ModuleId {
                name: "Ghost".into(),
                guid: Guid::ZERO,
                version: "1.0".into(),
                module_type: None,
            },
            &PackageId {
                name: "MdePkg".into(),
                guid: PKG,
                version: "1.0".into(),
            },
        );
        assert!(ws.library_classes(&key, Usage::AlwaysProduced).is_empty());
    }
}
