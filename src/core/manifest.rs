//! Manifest (fwpcd.toml) parsing
//!
//! The manifest names the workspace, the package directories to load and the
//! platform descriptor. String values support environment variable
//! substitution using `${VAR}` syntax.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::defaults::DEFAULT_PLATFORM_FILE;

/// The project manifest (fwpcd.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Workspace configuration
    pub workspace: WorkspaceConfig,
}

/// Workspace-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceConfig {
    /// Workspace name
    pub name: String,

    /// Package directories, relative to the manifest; empty means discover
    #[serde(default)]
    pub packages: Vec<String>,

    /// Platform descriptor, relative to the manifest
    #[serde(default = "default_platform")]
    pub platform: String,
}

fn default_platform() -> String {
    DEFAULT_PLATFORM_FILE.to_string()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            packages: Vec::new(),
            platform: default_platform(),
        }
    }
}

/// Substitute environment variables in a string using `${VAR}` syntax.
///
/// Unset variables are replaced with an empty string.
///
/// # Examples
/// ```
/// use fwpcd::core::manifest::substitute_env_vars;
///
/// std::env::set_var("FWPCD_DOC_VAR", "hello");
/// let result = substitute_env_vars("prefix_${FWPCD_DOC_VAR}_suffix").unwrap();
/// assert_eq!(result, "prefix_hello_suffix");
/// std::env::remove_var("FWPCD_DOC_VAR");
/// ```
pub fn substitute_env_vars(input: &str) -> Result<String, String> {
    let re =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| format!("Invalid regex: {e}"))?;

    let output = re.replace_all(input, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    });
    Ok(output.into_owned())
}

/// Recursively substitute environment variables in a TOML value
fn substitute_in_value(value: &mut toml::Value) -> Result<(), String> {
    match value {
        toml::Value::String(s) => {
            *s = substitute_env_vars(s)?;
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_in_value(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_in_value(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

impl Manifest {
    /// Load manifest from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load manifest from TOML string, substituting `${VAR}` in every string
    pub fn from_toml_with_env(content: &str) -> Result<Self, String> {
        let mut value: toml::Value =
            toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {e}"))?;
        substitute_in_value(&mut value)?;
        value
            .try_into()
            .map_err(|e: toml::de::Error| e.to_string())
    }

    /// Serialize manifest to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
