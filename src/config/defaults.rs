//! Default configuration values

/// Project manifest file name
pub const MANIFEST_FILE: &str = "fwpcd.toml";

/// Package descriptor file name
pub const PACKAGE_FILE: &str = "package.toml";

/// Default platform descriptor file name
pub const DEFAULT_PLATFORM_FILE: &str = "platform.toml";

/// Global configuration file name (inside the config directory)
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Application name used in directory paths
pub const APP_NAME: &str = "fwpcd";

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "FWPCD_CONFIG_DIR";

/// Schema shorthand for the null GUID
pub const NULL_GUID_LITERAL: &str = "0";

/// Maximum directory depth searched when discovering packages
pub const PACKAGE_DISCOVERY_DEPTH: usize = 4;

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
