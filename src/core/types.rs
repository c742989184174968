//! PCD type model
//!
//! Item types, datum types and usages, with the string tables the code
//! generator relies on. Every mapper is total: an unmapped or absent string
//! yields the `Unknown` variant instead of failing, and callers validate with
//! `is_valid` before persisting anything.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// How a PCD is materialized in the build
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum PcdType {
    #[strum(to_string = "FEATURE_FLAG")]
    #[serde(rename = "FEATURE_FLAG")]
    FeatureFlag,
    #[strum(to_string = "FIXED_AT_BUILD")]
    #[serde(rename = "FIXED_AT_BUILD")]
    FixedAtBuild,
    #[strum(to_string = "PATCHABLE_IN_MODULE")]
    #[serde(rename = "PATCHABLE_IN_MODULE")]
    PatchableInModule,
    #[strum(to_string = "DYNAMIC")]
    #[serde(rename = "DYNAMIC")]
    Dynamic,
    #[strum(to_string = "DYNAMIC_EX")]
    #[serde(rename = "DYNAMIC_EX")]
    DynamicEx,
    #[default]
    #[strum(to_string = "UNKNOWN")]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl PcdType {
    /// Every item type a descriptor may legally carry
    pub const VALID: [PcdType; 5] = [
        PcdType::FeatureFlag,
        PcdType::FixedAtBuild,
        PcdType::PatchableInModule,
        PcdType::Dynamic,
        PcdType::DynamicEx,
    ];

    /// Map a string to an item type, `Unknown` when unmapped
    pub fn from_name(name: &str) -> Self {
        name.trim().parse().unwrap_or(Self::Unknown)
    }

    /// Map an optional string to an item type, `Unknown` when absent
    pub fn from_optional(name: Option<&str>) -> Self {
        name.map_or(Self::Unknown, Self::from_name)
    }

    /// Canonical string for this item type
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Whether this is one of the named item types
    pub fn is_valid(self) -> bool {
        Self::VALID.contains(&self)
    }

    /// Whether the value lives in the platform PCD database
    pub fn is_dynamic(self) -> bool {
        matches!(self, Self::Dynamic | Self::DynamicEx)
    }
}

/// The C data type of a PCD value
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum DatumType {
    #[strum(to_string = "UINT8")]
    #[serde(rename = "UINT8")]
    Uint8,
    #[strum(to_string = "UINT16")]
    #[serde(rename = "UINT16")]
    Uint16,
    #[strum(to_string = "UINT32")]
    #[serde(rename = "UINT32")]
    Uint32,
    #[strum(to_string = "UINT64")]
    #[serde(rename = "UINT64")]
    Uint64,
    #[strum(to_string = "BOOLEAN")]
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[strum(to_string = "VOID*", serialize = "POINTER")]
    #[serde(rename = "VOID*")]
    Pointer,
    #[default]
    #[strum(to_string = "UNKNOWN")]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl DatumType {
    /// Every datum type a descriptor may legally carry
    pub const VALID: [DatumType; 6] = [
        DatumType::Uint8,
        DatumType::Uint16,
        DatumType::Uint32,
        DatumType::Uint64,
        DatumType::Boolean,
        DatumType::Pointer,
    ];

    /// Map a string to a datum type, `Unknown` when unmapped
    ///
    /// Both `VOID*` and `POINTER` map to [`DatumType::Pointer`].
    pub fn from_name(name: &str) -> Self {
        name.trim().parse().unwrap_or(Self::Unknown)
    }

    /// Map an optional string to a datum type, `Unknown` when absent
    pub fn from_optional(name: Option<&str>) -> Self {
        name.map_or(Self::Unknown, Self::from_name)
    }

    /// Canonical string for this datum type (`VOID*` for pointers)
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Whether this is one of the named datum types
    pub fn is_valid(self) -> bool {
        Self::VALID.contains(&self)
    }

    /// C type used in generated definitions
    pub fn c_type(self) -> Option<&'static str> {
        self.is_valid().then(|| self.as_str())
    }

    /// Suffix of the generated `_PCD_*` macros
    pub fn autogen_define_suffix(self) -> Option<&'static str> {
        match self {
            Self::Uint8 => Some("8"),
            Self::Uint16 => Some("16"),
            Self::Uint32 => Some("32"),
            Self::Uint64 => Some("64"),
            Self::Boolean => Some("BOOL"),
            Self::Pointer => Some("PTR"),
            Self::Unknown => None,
        }
    }

    /// Suffix of the `PcdGet*`/`PcdSet*` library accessors
    pub fn autogen_library_suffix(self) -> Option<&'static str> {
        match self {
            Self::Uint8 => Some("8"),
            Self::Uint16 => Some("16"),
            Self::Uint32 => Some("32"),
            Self::Uint64 => Some("64"),
            Self::Boolean => Some("Bool"),
            Self::Pointer => Some("Ptr"),
            Self::Unknown => None,
        }
    }

    /// Size in bytes of fixed-width types
    pub fn fixed_size(self) -> Option<u32> {
        match self {
            Self::Uint8 | Self::Boolean => Some(1),
            Self::Uint16 => Some(2),
            Self::Uint32 => Some(4),
            Self::Uint64 => Some(8),
            Self::Pointer | Self::Unknown => None,
        }
    }
}

/// How a module uses a PCD or a library class
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Usage {
    #[strum(to_string = "ALWAYS_PRODUCED")]
    #[serde(rename = "ALWAYS_PRODUCED")]
    AlwaysProduced,
    #[strum(to_string = "ALWAYS_CONSUMED")]
    #[serde(rename = "ALWAYS_CONSUMED")]
    AlwaysConsumed,
    #[strum(to_string = "SOMETIMES_PRODUCED")]
    #[serde(rename = "SOMETIMES_PRODUCED")]
    SometimesProduced,
    #[strum(to_string = "SOMETIMES_CONSUMED")]
    #[serde(rename = "SOMETIMES_CONSUMED")]
    SometimesConsumed,
    #[default]
    #[strum(to_string = "UNKNOWN")]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Usage {
    /// Every usage a descriptor may legally carry
    pub const VALID: [Usage; 4] = [
        Usage::AlwaysProduced,
        Usage::AlwaysConsumed,
        Usage::SometimesProduced,
        Usage::SometimesConsumed,
    ];

    /// Map a string to a usage, `Unknown` when unmapped
    pub fn from_name(name: &str) -> Self {
        name.trim().parse().unwrap_or(Self::Unknown)
    }

    /// Map an optional string to a usage, `Unknown` when absent
    pub fn from_optional(name: Option<&str>) -> Self {
        name.map_or(Self::Unknown, Self::from_name)
    }

    /// Canonical string for this usage
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Whether this is one of the named usages
    pub fn is_valid(self) -> bool {
        Self::VALID.contains(&self)
    }

    /// Produced always or sometimes
    pub fn is_produced(self) -> bool {
        matches!(self, Self::AlwaysProduced | Self::SometimesProduced)
    }

    /// Consumed always or sometimes
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::AlwaysConsumed | Self::SometimesConsumed)
    }
}
