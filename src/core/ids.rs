//! Package and module identities
//!
//! A module is identified platform-wide by a four-part key: its own GUID and
//! version plus the GUID and version of the package that contains it. The
//! textual form is the space-separated `"<modGuid> <modVer> <pkgGuid> <pkgVer>"`
//! used by platform descriptors.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use uguid::Guid;

use crate::config::defaults::NULL_GUID_LITERAL;
use crate::error::IdError;

/// The well-known null GUID
pub const NULL_GUID: Guid = Guid::ZERO;

/// Parse a GUID as written in descriptors
///
/// The schema shorthand `"0"` denotes the null GUID.
pub fn parse_guid(value: &str) -> Result<Guid, IdError> {
    let value = value.trim();
    if value == NULL_GUID_LITERAL {
        return Ok(NULL_GUID);
    }
    Guid::try_parse(value).map_err(|_| IdError::InvalidGuid {
        value: value.to_string(),
    })
}

/// Canonical lower-case text of a GUID
pub fn guid_text(guid: &Guid) -> String {
    guid.to_string().to_ascii_lowercase()
}

/// Package identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    /// Display name
    pub name: String,
    /// Package GUID
    pub guid: Guid,
    /// Package version
    pub version: String,
}

impl PackageId {
    /// `(guid, version)` pair used to look packages up
    pub fn key(&self) -> PackageKey {
        PackageKey {
            guid: self.guid,
            version: self.version.clone(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} {}]", self.name, guid_text(&self.guid), self.version)
    }
}

/// Package lookup key, ordered by GUID text then version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageKey {
    pub guid: Guid,
    pub version: String,
}

impl Ord for PackageKey {
    fn cmp(&self, other: &Self) -> Ordering {
        guid_text(&self.guid)
            .cmp(&guid_text(&other.guid))
            .then_with(|| self.version.cmp(&other.version))
    }
}

impl PartialOrd for PackageKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", guid_text(&self.guid), self.version)
    }
}

/// Module identity as declared in its own descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId {
    /// Base name
    pub name: String,
    /// Module GUID
    pub guid: Guid,
    /// Module version
    pub version: String,
    /// Module type, e.g. `BASE` or `DXE_DRIVER`
    pub module_type: Option<String>,
}

/// Platform-wide module key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleKey {
    pub module_guid: Guid,
    pub module_version: String,
    pub package_guid: Guid,
    pub package_version: String,
}

impl ModuleKey {
    /// Key of `module` inside `package`
    pub fn new(module: &ModuleId, package: &PackageId) -> Self {
        Self {
            module_guid: module.guid,
            module_version: module.version.clone(),
            package_guid: package.guid,
            package_version: package.version.clone(),
        }
    }

    /// Key of the containing package
    pub fn package(&self) -> PackageKey {
        PackageKey {
            guid: self.package_guid,
            version: self.package_version.clone(),
        }
    }
}

/// Candidate order: package GUID, package version, module GUID, module version
impl Ord for ModuleKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.package()
            .cmp(&other.package())
            .then_with(|| guid_text(&self.module_guid).cmp(&guid_text(&other.module_guid)))
            .then_with(|| self.module_version.cmp(&other.module_version))
    }
}

impl PartialOrd for ModuleKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            guid_text(&self.module_guid),
            self.module_version,
            guid_text(&self.package_guid),
            self.package_version
        )
    }
}

impl FromStr for ModuleKey {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let [module_guid, module_version, package_guid, package_version] = parts[..] else {
            return Err(IdError::InvalidModuleKey { key: s.to_string() });
        };
        Ok(Self {
            module_guid: parse_guid(module_guid)?,
            module_version: module_version.to_string(),
            package_guid: parse_guid(package_guid)?,
            package_version: package_version.to_string(),
        })
    }
}

impl Serialize for ModuleKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
