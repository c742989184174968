//! Descriptor loading
//!
//! Reads the manifest, package, module and platform descriptors from disk and
//! builds the in-memory [`Workspace`] and [`Platform`]. A package that fails
//! to load is reported and skipped; packages loaded before it stay intact.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::defaults::{MANIFEST_FILE, PACKAGE_DISCOVERY_DEPTH, PACKAGE_FILE};
use crate::core::manifest::Manifest;
use crate::core::module::{ModuleDescriptor, ModuleInfo};
use crate::core::package::PackageDescriptor;
use crate::core::package_table::PackageDeclarationTable;
use crate::core::platform::{Platform, PlatformDescriptor};
use crate::core::workspace::Workspace;
use crate::error::{LoadError, PackageError};
use crate::infra::filesystem::{read_file, write_file};

/// Workspace plus the packages that failed to load
#[derive(Debug, Default)]
pub struct LoadReport {
    pub workspace: Workspace,
    pub failures: Vec<LoadError>,
}

/// A project opened from its manifest
#[derive(Debug)]
pub struct Project {
    /// Directory containing the manifest
    pub root: PathBuf,
    pub manifest: Manifest,
    pub report: LoadReport,
    /// Platform descriptor location
    pub platform_path: PathBuf,
}

impl Project {
    /// Load the project's platform descriptor
    pub fn platform(&self) -> Result<Platform, LoadError> {
        load_platform(&self.platform_path)
    }
}

/// Load the manifest in `root`
pub fn load_manifest(root: &Path) -> Result<Manifest, LoadError> {
    let path = root.join(MANIFEST_FILE);
    if !path.exists() {
        return Err(LoadError::ManifestNotFound { path });
    }
    let content = read_file(&path)?;
    Manifest::from_toml_with_env(&content).map_err(|error| LoadError::Parse { path, error })
}

/// Open the project rooted at `root`
///
/// Loads the manifest and every package it lists, or every package found
/// below `root` when it lists none.
pub fn open_project(root: &Path) -> Result<Project, LoadError> {
    let manifest = load_manifest(root)?;

    let package_dirs: Vec<PathBuf> = if manifest.workspace.packages.is_empty() {
        discover_packages(root)
    } else {
        manifest
            .workspace
            .packages
            .iter()
            .map(|dir| root.join(dir))
            .collect()
    };

    let report = load_workspace(&package_dirs);
    let platform_path = root.join(&manifest.workspace.platform);
    info!(
        "Opened workspace '{}' with {} package(s)",
        manifest.workspace.name,
        report.workspace.packages().count()
    );

    Ok(Project {
        root: root.to_path_buf(),
        manifest,
        report,
        platform_path,
    })
}

/// Find package directories below `root`, sorted by path
pub fn discover_packages(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .max_depth(PACKAGE_DISCOVERY_DEPTH)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == PACKAGE_FILE)
        .filter_map(|e| e.path().parent().map(Path::to_path_buf))
        .collect();
    dirs.sort();
    debug!("Discovered {} package(s) below {}", dirs.len(), root.display());
    dirs
}

/// Load every package directory into one workspace
pub fn load_workspace(package_dirs: &[PathBuf]) -> LoadReport {
    let mut report = LoadReport::default();

    for dir in package_dirs {
        let loaded = load_package(dir).and_then(|(table, modules)| {
            report
                .workspace
                .add_package(table, modules)
                .map_err(|source| LoadError::Package {
                    path: dir.join(PACKAGE_FILE),
                    source,
                })
        });
        if let Err(e) = loaded {
            warn!("Skipping package: {}", e);
            report.failures.push(e);
        }
    }
    report
}

/// Load one package and its modules
pub fn load_package(dir: &Path) -> Result<(PackageDeclarationTable, Vec<ModuleInfo>), LoadError> {
    let path = dir.join(PACKAGE_FILE);
    let content = read_file(&path)?;
    let desc = PackageDescriptor::from_toml(&content).map_err(|e| LoadError::Parse {
        path: path.clone(),
        error: e.to_string(),
    })?;

    let package_err = |source: PackageError| LoadError::Package {
        path: path.clone(),
        source,
    };
    let mut table = PackageDeclarationTable::from_descriptor(dir, &desc).map_err(package_err)?;

    let mut modules = Vec::with_capacity(desc.modules.len());
    for relative in &desc.modules {
        let module_path = dir.join(relative);
        let info = load_module(&module_path)?;
        table
            .add_module(info.id.clone(), module_path)
            .map_err(package_err)?;
        modules.push(info);
    }

    info!(
        "Loaded package {} with {} module(s)",
        table.id(),
        modules.len()
    );
    Ok((table, modules))
}

/// Load one module descriptor
pub fn load_module(path: &Path) -> Result<ModuleInfo, LoadError> {
    let content = read_file(path)?;
    let desc = ModuleDescriptor::from_toml(&content).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    ModuleInfo::from_descriptor(&desc).map_err(|source| LoadError::Module {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a platform descriptor
pub fn load_platform(path: &Path) -> Result<Platform, LoadError> {
    let content = read_file(path)?;
    let desc = PlatformDescriptor::from_toml(&content).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    Platform::from_descriptor(&desc).map_err(|source| LoadError::Platform {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a platform descriptor
pub fn save_platform(path: &Path, platform: &Platform) -> Result<(), LoadError> {
    let content = platform
        .to_descriptor()
        .to_toml()
        .map_err(|e| LoadError::WriteFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    write_file(path, &content)?;
    info!("Saved platform '{}' to {}", platform.name, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PACKAGE: &str = r#"
modules = ["BaseLib/BaseLib.toml"]

[package]
name = "MdePkg"
guid = "5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec"
version = "1.0"
"#;

    const MODULE: &str = r#"
[module]
name = "BaseLib"
guid = "27d67720-ea68-48ae-93da-a3a074c90e30"
version = "1.0"

[[library_classes]]
name = "BaseLib"
usage = "ALWAYS_PRODUCED"
"#;

    fn write_package(root: &Path, name: &str, package: &str, module: &str) -> PathBuf {
        let dir = root.join(name);
        write_file(&dir.join(PACKAGE_FILE), package).unwrap();
        write_file(&dir.join("BaseLib").join("BaseLib.toml"), module).unwrap();
        dir
    }

    #[test]
    fn test_load_package_with_module() {
        let temp = TempDir::new().unwrap();
        let dir = write_package(temp.path(), "MdePkg", PACKAGE, MODULE);

        let (table, modules) = load_package(&dir).unwrap();
        assert_eq!(table.id().name, "MdePkg");
        assert_eq!(table.module_count(), 1);
        assert_eq!(modules[0].id.name, "BaseLib");
        assert_eq!(
            table.module_file(&modules[0].id.guid, "1.0"),
            Some(dir.join("BaseLib").join("BaseLib.toml").as_path())
        );
    }

    #[test]
    fn test_duplicate_module_fails_package() {
        let temp = TempDir::new().unwrap();
        let package = PACKAGE.replace(
            r#"modules = ["BaseLib/BaseLib.toml"]"#,
            r#"modules = ["BaseLib/BaseLib.toml", "BaseLib/Copy.toml"]"#,
        );
        let dir = write_package(temp.path(), "MdePkg", &package, MODULE);
        write_file(&dir.join("BaseLib").join("Copy.toml"), MODULE).unwrap();

        let err = load_package(&dir).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Package {
                source: PackageError::DuplicateModule { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_broken_package_does_not_disturb_others() {
        let temp = TempDir::new().unwrap();
        let good = write_package(temp.path(), "MdePkg", PACKAGE, MODULE);
        let bad = temp.path().join("Broken");
        write_file(&bad.join(PACKAGE_FILE), "[package\nname=").unwrap();

        let report = load_workspace(&[good, bad]);
        assert_eq!(report.workspace.packages().count(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0], LoadError::Parse { .. }));
        assert!(report.workspace.find_module("BaseLib").is_some());
    }

    #[test]
    fn test_discover_packages() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "B", PACKAGE, MODULE);
        write_package(temp.path(), "A", PACKAGE, MODULE);

        let dirs = discover_packages(temp.path());
        assert_eq!(dirs, [temp.path().join("A"), temp.path().join("B")]);
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            load_manifest(temp.path()),
            Err(LoadError::ManifestNotFound { .. })
        ));
    }
}
