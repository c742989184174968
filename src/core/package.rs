//! Package descriptor handling
//!
//! Parses `package.toml`, the package-level surface area: identity, the
//! module descriptors the package contains, GUID/PPI/protocol declarations,
//! library class headers and PCD declarations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete package descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageDescriptor {
    /// Package identity
    pub package: PackageHeader,

    /// Module descriptor paths, relative to the package directory
    #[serde(default)]
    pub modules: Vec<String>,

    /// GUID declarations by name
    #[serde(default)]
    pub guids: BTreeMap<String, GuidDeclaration>,

    /// PPI declarations by name
    #[serde(default)]
    pub ppis: BTreeMap<String, GuidDeclaration>,

    /// Protocol declarations by name
    #[serde(default)]
    pub protocols: BTreeMap<String, GuidDeclaration>,

    /// Library class declarations by class name
    #[serde(default)]
    pub library_classes: BTreeMap<String, LibraryClassDeclaration>,

    /// Package header per module type
    #[serde(default)]
    pub package_headers: BTreeMap<String, String>,

    /// PCD declarations
    #[serde(default)]
    pub pcds: Vec<PcdDeclaration>,
}

/// Package identity
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageHeader {
    /// Package name
    pub name: String,

    /// Package GUID
    pub guid: String,

    /// Package version
    pub version: String,

    /// Package description
    #[serde(default)]
    pub description: Option<String>,
}

/// A named GUID value (GUID, PPI or protocol)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuidDeclaration {
    /// C name emitted into generated code
    pub c_name: String,

    /// GUID value
    pub guid: String,
}

/// Library class declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LibraryClassDeclaration {
    /// Header files, relative to the package directory
    #[serde(default)]
    pub headers: Vec<String>,
}

/// PCD declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PcdDeclaration {
    /// C name of the token
    pub c_name: String,

    /// Token space GUID
    pub token_space_guid: String,

    /// Token number within the token space
    #[serde(default)]
    pub token: Option<u32>,

    /// Datum type (UINT8, UINT16, UINT32, UINT64, BOOLEAN, VOID*)
    pub datum_type: String,

    /// Default value
    #[serde(default)]
    pub default_value: Option<String>,

    /// Maximum size for VOID* tokens
    #[serde(default)]
    pub datum_size: Option<u32>,

    /// Item types a platform may choose (empty = any)
    #[serde(default)]
    pub supported_types: Vec<String>,
}

impl PackageDescriptor {
    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
