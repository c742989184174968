//! Error types for fwpcd
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Identity parsing errors (GUIDs and module keys)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdError {
    /// GUID string is malformed
    #[error("Invalid GUID '{value}'")]
    InvalidGuid { value: String },

    /// Module key does not have the four expected parts
    #[error("Invalid module key '{key}': expected '<module-guid> <module-version> <package-guid> <package-version>'")]
    InvalidModuleKey { key: String },
}

/// PCD token errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    /// C name is not a valid C identifier
    #[error("Invalid PCD C name '{c_name}'")]
    InvalidCName { c_name: String },

    /// Token is used but no package declares it
    #[error("PCD '{c_name}' in token space {token_space} is not declared by any package")]
    Undeclared { c_name: String, token_space: String },

    /// Item type is not a known PCD type
    #[error("PCD '{c_name}' has unknown item type '{value}'")]
    UnknownPcdType { c_name: String, value: String },

    /// Datum type is not a known datum type
    #[error("PCD '{c_name}' has unknown datum type '{value}'")]
    UnknownDatumType { c_name: String, value: String },

    /// Usage is not a known usage
    #[error("PCD '{c_name}' in module '{module}' has unknown usage '{value}'")]
    UnknownUsage {
        c_name: String,
        module: String,
        value: String,
    },

    /// Item type is not supported by the declaring package
    #[error("PCD '{c_name}' does not support item type {item_type} (supported: {})", supported.join(", "))]
    UnsupportedItemType {
        c_name: String,
        item_type: String,
        supported: Vec<String>,
    },

    /// Two modules use the same token with different item types
    #[error("PCD '{c_name}' is used as {existing} elsewhere but as {requested} by module '{module}'")]
    ItemTypeConflict {
        c_name: String,
        existing: String,
        requested: String,
        module: String,
    },

    /// A token space reassignment would give two tokens the same primary key
    #[error("PCD '{c_name}' cannot take primary key '{key}': another token already has it")]
    DuplicateKey { c_name: String, key: String },
}

/// Package-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PackageError {
    /// Two modules with the same identity in one package
    #[error("Found two modules with the same GUID and version in package '{package}': '{first}' and '{second}'")]
    DuplicateModule {
        package: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// The same PCD is declared twice in one package
    #[error("PCD '{c_name}' is declared twice in package '{package}'")]
    DuplicatePcd { package: String, c_name: String },

    /// A package with the same identity is already loaded
    #[error("Package '{package}' ({guid} {version}) is already loaded")]
    DuplicatePackage {
        package: String,
        guid: String,
        version: String,
    },

    /// A declaration in the package is malformed
    #[error("Invalid declaration '{name}' in package '{package}': {reason}")]
    InvalidDeclaration {
        package: String,
        name: String,
        reason: String,
    },

    /// Identity error
    #[error("Package '{package}': {source}")]
    Id { package: String, source: IdError },
}

/// Module descriptor errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModuleError {
    /// Library class usage is not a known usage
    #[error("Module '{module}' uses library class '{class}' with unknown usage '{value}'")]
    UnknownClassUsage {
        module: String,
        class: String,
        value: String,
    },

    /// PCD entry is invalid
    #[error("Module '{module}': {source}")]
    Pcd { module: String, source: TokenError },

    /// Identity error
    #[error("Module '{module}': {source}")]
    Id { module: String, source: IdError },
}

/// Library class resolution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolverError {
    /// Module key does not name a loaded module
    #[error("Module '{key}' is not part of any loaded package")]
    UnknownModule { key: String },

    /// Instance is not a current candidate for the class
    #[error("'{instance}' is not an applicable instance for library class '{class}'")]
    NotACandidate { instance: String, class: String },

    /// Instance is already bound in this session
    #[error("Library instance '{instance}' is already bound")]
    AlreadyBound { instance: String },

    /// Instance is not bound in this session
    #[error("Library instance '{instance}' is not bound")]
    NotBound { instance: String },

    /// A PCD used by an instance is not declared anywhere
    #[error("Library instance '{instance}': {source}")]
    Pcd { instance: String, source: TokenError },

    /// Circular dependency detected
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },
}

/// Platform descriptor errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    /// Module is not listed in the platform
    #[error("Module '{key}' is not part of platform '{platform}'")]
    ModuleNotInPlatform { platform: String, key: String },

    /// Module is not part of any loaded package
    #[error("Platform '{platform}' references unknown module '{key}'")]
    UnknownModule { platform: String, key: String },

    /// A PCD setting is invalid
    #[error("Platform '{platform}': {source}")]
    Pcd { platform: String, source: TokenError },

    /// Identity error
    #[error("Platform '{platform}': {source}")]
    Id { platform: String, source: IdError },
}

/// Descriptor loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    /// Manifest not found
    #[error("Manifest not found at '{path}'. Create an fwpcd.toml in the project root.")]
    ManifestNotFound { path: PathBuf },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// File is not valid TOML for its descriptor type
    #[error("Failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Package content is invalid
    #[error("Package '{path}': {source}")]
    Package { path: PathBuf, source: PackageError },

    /// Module content is invalid
    #[error("Module '{path}': {source}")]
    Module { path: PathBuf, source: ModuleError },

    /// Platform content is invalid
    #[error("Platform '{path}': {source}")]
    Platform { path: PathBuf, source: PlatformError },
}

/// Top-level fwpcd error type
#[derive(Error, Debug)]
pub enum FwpcdError {
    /// Identity error
    #[error("{0}")]
    Id(#[from] IdError),

    /// Token error
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Package error
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Module error
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    /// Resolver error
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// Platform error
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Load error
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}
