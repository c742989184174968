//! Platform-specific directory management
//!
//! Provides the user config directory following platform conventions
//! (XDG on Linux, Library on macOS). `FWPCD_CONFIG_DIR` overrides it.

use std::env;
use std::path::PathBuf;

use crate::config::defaults::{APP_NAME, ENV_CONFIG_DIR, GLOBAL_CONFIG_FILE};

/// Platform-specific directory provider for fwpcd
#[derive(Debug, Clone)]
pub struct FwpcdDirs {
    config_dir: PathBuf,
}

impl FwpcdDirs {
    /// Create a new `FwpcdDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Use an explicit config directory
    #[must_use]
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/fwpcd` or `~/.config/fwpcd`
    /// - macOS: `~/Library/Application Support/fwpcd`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(GLOBAL_CONFIG_FILE)
    }

    /// Resolve config directory from environment or platform default
    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        Self::platform_config_dir()
    }

    /// Get platform-specific config directory
    fn platform_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for FwpcdDirs {
    fn default() -> Self {
        Self::new()
    }
}
