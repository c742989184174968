//! Filesystem operations
//!
//! Handles file reads and writes for descriptors.

use std::path::Path;

use crate::error::LoadError;

/// Write content to a file, creating parent directories
pub fn write_file(path: &Path, content: &str) -> Result<(), LoadError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LoadError::WriteFile {
            path: parent.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    std::fs::write(path, content).map_err(|e| LoadError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
