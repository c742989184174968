//! Package declaration table
//!
//! Read-only view of one package: GUID/PPI/protocol declarations, library
//! class headers, PCD declarations and the modules the package contains.
//! Built once from a [`PackageDescriptor`] and never mutated by the resolver.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use uguid::Guid;

use crate::core::ids::{guid_text, parse_guid, ModuleId, PackageId, NULL_GUID};
use crate::core::package::{GuidDeclaration, PackageDescriptor, PcdDeclaration};
use crate::core::token::Token;
use crate::core::types::{DatumType, PcdType};
use crate::error::PackageError;

/// A named GUID value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredGuid {
    pub c_name: String,
    pub guid: Guid,
}

/// Validated PCD declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredPcd {
    pub c_name: String,
    pub token_space_guid: Guid,
    pub token_number: Option<u32>,
    pub datum_type: DatumType,
    pub default_value: Option<String>,
    pub datum_size: Option<u32>,
    /// Allowed item types, empty when any is allowed
    pub supported_types: Vec<PcdType>,
}

impl DeclaredPcd {
    /// Whether a platform may use this PCD as `item_type`
    pub fn supports(&self, item_type: PcdType) -> bool {
        self.supported_types.is_empty() || self.supported_types.contains(&item_type)
    }
}

/// A module contained in the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub id: ModuleId,
    /// Descriptor location
    pub path: PathBuf,
}

/// Declaration table of one package
#[derive(Debug, Clone)]
pub struct PackageDeclarationTable {
    id: PackageId,
    dir: PathBuf,
    guids: BTreeMap<String, DeclaredGuid>,
    ppis: BTreeMap<String, DeclaredGuid>,
    protocols: BTreeMap<String, DeclaredGuid>,
    library_classes: BTreeMap<String, Vec<String>>,
    package_headers: BTreeMap<String, String>,
    /// PCD declarations by token primary key
    pcds: BTreeMap<String, DeclaredPcd>,
    /// Modules by `(guid, version)`
    modules: BTreeMap<(String, String), ModuleEntry>,
}

/// Whether `name` is a valid C identifier
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl PackageDeclarationTable {
    /// Build a table for the package rooted at `dir`
    ///
    /// Modules are added separately with [`Self::add_module`] once their
    /// descriptors are parsed.
    pub fn from_descriptor(dir: &Path, desc: &PackageDescriptor) -> Result<Self, PackageError> {
        let name = desc.package.name.clone();
        let guid = parse_guid(&desc.package.guid).map_err(|source| PackageError::Id {
            package: name.clone(),
            source,
        })?;

        let mut table = Self {
            id: PackageId {
                name,
                guid,
                version: desc.package.version.clone(),
            },
            dir: dir.to_path_buf(),
            guids: BTreeMap::new(),
            ppis: BTreeMap::new(),
            protocols: BTreeMap::new(),
            library_classes: desc
                .library_classes
                .iter()
                .map(|(class, decl)| (class.clone(), decl.headers.clone()))
                .collect(),
            package_headers: desc.package_headers.clone(),
            pcds: BTreeMap::new(),
            modules: BTreeMap::new(),
        };

        table.guids = table.declare_guids(&desc.guids)?;
        table.ppis = table.declare_guids(&desc.ppis)?;
        table.protocols = table.declare_guids(&desc.protocols)?;

        for decl in &desc.pcds {
            let pcd = table.declare_pcd(decl)?;
            let key = Token::primary_key(&pcd.c_name, &pcd.token_space_guid, &NULL_GUID);
            if table.pcds.contains_key(&key) {
                return Err(PackageError::DuplicatePcd {
                    package: table.id.name.clone(),
                    c_name: pcd.c_name,
                });
            }
            table.pcds.insert(key, pcd);
        }

        Ok(table)
    }

    fn invalid(&self, name: &str, reason: impl Into<String>) -> PackageError {
        PackageError::InvalidDeclaration {
            package: self.id.name.clone(),
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    fn declare_guids(
        &self,
        decls: &BTreeMap<String, GuidDeclaration>,
    ) -> Result<BTreeMap<String, DeclaredGuid>, PackageError> {
        decls
            .iter()
            .map(|(name, decl)| {
                let guid = parse_guid(&decl.guid)
                    .map_err(|_| self.invalid(name, format!("bad GUID '{}'", decl.guid)))?;
                Ok((
                    name.clone(),
                    DeclaredGuid {
                        c_name: decl.c_name.clone(),
                        guid,
                    },
                ))
            })
            .collect()
    }

    fn declare_pcd(&self, decl: &PcdDeclaration) -> Result<DeclaredPcd, PackageError> {
        if !is_c_identifier(&decl.c_name) {
            return Err(self.invalid(&decl.c_name, "not a valid C identifier"));
        }

        let token_space_guid = parse_guid(&decl.token_space_guid).map_err(|_| {
            self.invalid(
                &decl.c_name,
                format!("bad token space GUID '{}'", decl.token_space_guid),
            )
        })?;

        let datum_type = DatumType::from_name(&decl.datum_type);
        if !datum_type.is_valid() {
            return Err(self.invalid(
                &decl.c_name,
                format!("unknown datum type '{}'", decl.datum_type),
            ));
        }

        let mut supported_types = Vec::with_capacity(decl.supported_types.len());
        for name in &decl.supported_types {
            let item_type = PcdType::from_name(name);
            if !item_type.is_valid() {
                return Err(self.invalid(&decl.c_name, format!("unknown item type '{name}'")));
            }
            supported_types.push(item_type);
        }

        Ok(DeclaredPcd {
            c_name: decl.c_name.clone(),
            token_space_guid,
            token_number: decl.token,
            datum_type,
            default_value: decl.default_value.clone(),
            datum_size: decl.datum_size.or_else(|| datum_type.fixed_size()),
            supported_types,
        })
    }

    /// Register a module contained in this package
    ///
    /// Two modules with the same GUID and version are a fatal error.
    pub fn add_module(&mut self, id: ModuleId, path: PathBuf) -> Result<(), PackageError> {
        let key = (guid_text(&id.guid), id.version.clone());
        if let Some(existing) = self.modules.get(&key) {
            return Err(PackageError::DuplicateModule {
                package: self.id.name.clone(),
                first: existing.path.clone(),
                second: path,
            });
        }
        self.modules.insert(key, ModuleEntry { id, path });
        Ok(())
    }

    /// Package identity
    pub fn id(&self) -> &PackageId {
        &self.id
    }

    /// Package directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// GUID declaration by name
    pub fn guid(&self, name: &str) -> Option<&DeclaredGuid> {
        self.guids.get(name)
    }

    /// PPI declaration by name
    pub fn ppi(&self, name: &str) -> Option<&DeclaredGuid> {
        self.ppis.get(name)
    }

    /// Protocol declaration by name
    pub fn protocol(&self, name: &str) -> Option<&DeclaredGuid> {
        self.protocols.get(name)
    }

    /// Find any GUID, PPI or protocol declaration by its C name
    pub fn guid_by_c_name(&self, c_name: &str) -> Option<&DeclaredGuid> {
        self.guids
            .values()
            .chain(self.ppis.values())
            .chain(self.protocols.values())
            .find(|decl| decl.c_name == c_name)
    }

    /// Header paths of a library class, joined to the package directory
    pub fn library_class_headers(&self, class: &str) -> Option<Vec<PathBuf>> {
        self.library_classes
            .get(class)
            .map(|headers| headers.iter().map(|h| self.dir.join(h)).collect())
    }

    /// Library classes declared by this package
    pub fn library_classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.library_classes.keys().map(String::as_str)
    }

    /// Package header for a module type, joined to the package directory
    pub fn package_header(&self, module_type: &str) -> Option<PathBuf> {
        self.package_headers
            .get(module_type)
            .map(|header| self.dir.join(header))
    }

    /// Contained modules, ordered by GUID then version
    pub fn modules(&self) -> impl Iterator<Item = &ModuleId> + '_ {
        self.modules.values().map(|entry| &entry.id)
    }

    /// Number of contained modules
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Descriptor location of a contained module
    pub fn module_file(&self, guid: &Guid, version: &str) -> Option<&Path> {
        self.modules
            .get(&(guid_text(guid), version.to_string()))
            .map(|entry| entry.path.as_path())
    }

    /// PCD declaration by C name and token space
    pub fn pcd(&self, c_name: &str, token_space_guid: &Guid) -> Option<&DeclaredPcd> {
        self.pcds
            .get(&Token::primary_key(c_name, token_space_guid, &NULL_GUID))
    }

    /// All PCD declarations, ordered by primary key
    pub fn pcds(&self) -> impl Iterator<Item = &DeclaredPcd> + '_ {
        self.pcds.values()
    }
}
