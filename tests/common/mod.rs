//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Package GUID of the sample package
pub const PKG_GUID: &str = "5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec";

/// Token space GUID of the sample PCDs
pub const TOKEN_SPACE: &str = "914aebe7-4635-459b-aa1c-11e219b03a10";

pub const HELLO_GUID: &str = "6987936e-ed34-44db-ae97-1fa5e4ed2116";
pub const BASE_LIB_GUID: &str = "27d67720-ea68-48ae-93da-a3a074c90e30";
pub const DEBUG_LIB_NULL_GUID: &str = "9ba1d976-0624-41a3-8650-28165e8d9ae8";
pub const DEBUG_LIB_SERIAL_GUID: &str = "bb1adb7a-4a6f-4b0e-8c0d-4d1b9b22c4a5";

/// Four-part key of a sample module
pub fn module_key(module_guid: &str) -> String {
    format!("{module_guid} 1.0 {PKG_GUID} 1.0")
}

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project holding the sample workspace and platform
    pub fn sample() -> Self {
        let project = Self::new();
        project.create_file("fwpcd.toml", SAMPLE_MANIFEST);
        project.create_file("MdePkg/package.toml", SAMPLE_PACKAGE);
        project.create_file("MdePkg/HelloDxe/HelloDxe.toml", HELLO_DXE);
        project.create_file("MdePkg/BaseLib/BaseLib.toml", BASE_LIB);
        project.create_file("MdePkg/DebugLibNull/DebugLibNull.toml", DEBUG_LIB_NULL);
        project.create_file("MdePkg/DebugLibSerial/DebugLibSerial.toml", DEBUG_LIB_SERIAL);
        project.create_file("platform.toml", &sample_platform(true));
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Directory used as the fwpcd config directory
    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join(".config")
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Run fwpcd in the project directory with an isolated config directory
pub fn run_fwpcd(project: &TestProject, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fwpcd"));
    cmd.current_dir(project.path());
    cmd.env("FWPCD_CONFIG_DIR", project.config_dir());
    cmd.env_remove("FWPCD_PROJECT_DIR");
    cmd.env_remove("RUST_LOG");
    for arg in args {
        cmd.arg(arg);
    }
    cmd.output().expect("Failed to execute fwpcd")
}

/// Sample project manifest
pub const SAMPLE_MANIFEST: &str = r#"
[workspace]
name = "Sample"
packages = ["MdePkg"]
platform = "platform.toml"
"#;

/// Sample package declaring three PCDs and four modules
pub const SAMPLE_PACKAGE: &str = r#"
modules = [
    "HelloDxe/HelloDxe.toml",
    "BaseLib/BaseLib.toml",
    "DebugLibNull/DebugLibNull.toml",
    "DebugLibSerial/DebugLibSerial.toml",
]

[package]
name = "MdePkg"
guid = "5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec"
version = "1.0"

[library_classes.BaseLib]
headers = ["Include/Library/BaseLib.h"]

[library_classes.DebugLib]
headers = ["Include/Library/DebugLib.h"]

[[pcds]]
c_name = "PcdHelloCount"
token_space_guid = "914aebe7-4635-459b-aa1c-11e219b03a10"
token = 1
datum_type = "UINT32"
default_value = "3"
supported_types = ["FIXED_AT_BUILD", "PATCHABLE_IN_MODULE"]

[[pcds]]
c_name = "PcdDebugPrintErrorLevel"
token_space_guid = "914aebe7-4635-459b-aa1c-11e219b03a10"
token = 2
datum_type = "UINT32"
default_value = "0x80000000"
supported_types = ["FIXED_AT_BUILD", "PATCHABLE_IN_MODULE"]

[[pcds]]
c_name = "PcdBootTimeout"
token_space_guid = "914aebe7-4635-459b-aa1c-11e219b03a10"
token = 3
datum_type = "UINT16"
default_value = "10"
supported_types = ["DYNAMIC", "DYNAMIC_EX"]
"#;

/// Driver consuming BaseLib and DebugLib
pub const HELLO_DXE: &str = r#"
[module]
name = "HelloDxe"
guid = "6987936e-ed34-44db-ae97-1fa5e4ed2116"
version = "1.0"
module_type = "DXE_DRIVER"

[[library_classes]]
name = "DebugLib"
usage = "ALWAYS_CONSUMED"

[[library_classes]]
name = "BaseLib"
usage = "ALWAYS_CONSUMED"

[[pcds]]
c_name = "PcdHelloCount"
token_space_guid = "914aebe7-4635-459b-aa1c-11e219b03a10"
item_type = "FIXED_AT_BUILD"

[[pcds]]
c_name = "PcdBootTimeout"
token_space_guid = "914aebe7-4635-459b-aa1c-11e219b03a10"
item_type = "DYNAMIC"
usage = "SOMETIMES_CONSUMED"
"#;

pub const BASE_LIB: &str = r#"
[module]
name = "BaseLib"
guid = "27d67720-ea68-48ae-93da-a3a074c90e30"
version = "1.0"
module_type = "BASE"

[[library_classes]]
name = "BaseLib"
usage = "ALWAYS_PRODUCED"
"#;

pub const DEBUG_LIB_NULL: &str = r#"
[module]
name = "DebugLibNull"
guid = "9ba1d976-0624-41a3-8650-28165e8d9ae8"
version = "1.0"
module_type = "BASE"

[[library_classes]]
name = "DebugLib"
usage = "ALWAYS_PRODUCED"
"#;

/// DebugLib instance that itself needs BaseLib
pub const DEBUG_LIB_SERIAL: &str = r#"
[module]
name = "DebugLibSerial"
guid = "bb1adb7a-4a6f-4b0e-8c0d-4d1b9b22c4a5"
version = "1.0"
module_type = "BASE"

[[library_classes]]
name = "DebugLib"
usage = "ALWAYS_PRODUCED"

[[library_classes]]
name = "BaseLib"
usage = "ALWAYS_CONSUMED"

[[pcds]]
c_name = "PcdDebugPrintErrorLevel"
token_space_guid = "914aebe7-4635-459b-aa1c-11e219b03a10"
item_type = "FIXED_AT_BUILD"
"#;

/// Sample platform building HelloDxe, with or without saved instances
pub fn sample_platform(with_instances: bool) -> String {
    let instances = if with_instances {
        format!(
            "library_instances = [\"{}\", \"{}\"]\n",
            module_key(BASE_LIB_GUID),
            module_key(DEBUG_LIB_SERIAL_GUID)
        )
    } else {
        String::new()
    };

    format!(
        r#"
[platform]
name = "SamplePlatform"
guid = "2f1b1f6c-7a3d-4c8e-9b0e-5d6c7e8f9a01"
version = "1.0"

[[modules]]
module_guid = "{HELLO_GUID}"
module_version = "1.0"
package_guid = "{PKG_GUID}"
package_version = "1.0"
{instances}
[[dynamic_pcds]]
c_name = "PcdBootTimeout"
token_space_guid = "{TOKEN_SPACE}"
datum = "5"

[[dynamic_pcds.skus]]
id = 0
value = "5"

[[dynamic_pcds.skus]]
id = 1
value = "7"
"#
    )
}
