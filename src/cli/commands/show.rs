//! Show command implementation
//!
//! Implements `fwpcd show` to dump one package declaration table.

use std::path::Path;

use anyhow::{anyhow, Result};
use serde_json::json;

use crate::cli::commands::load_project;
use crate::cli::output::{self, OutputConfig};
use crate::core::ids::{guid_text, parse_guid};
use crate::core::package_table::PackageDeclarationTable;
use crate::core::workspace::Workspace;

fn find_package<'a>(workspace: &'a Workspace, query: &str) -> Option<&'a PackageDeclarationTable> {
    if let Some(table) = workspace.package_by_name(query) {
        return Some(table);
    }
    let guid = parse_guid(query).ok()?;
    workspace.packages().find(|table| table.id().guid == guid)
}

/// Execute the show command
pub fn execute(project_dir: &Path, package: &str) -> Result<()> {
    let project = load_project(project_dir)?;
    let table = find_package(&project.report.workspace, package)
        .ok_or_else(|| anyhow!("Unknown package '{package}'"))?;

    if OutputConfig::global().json {
        return output::json(&to_json(table));
    }

    let id = table.id();
    output::line(format!("Package {} {}", id.name, id.version));
    output::line(format!("  guid: {}", guid_text(&id.guid)));
    output::line(format!("  dir:  {}", table.dir().display()));

    output::line(format!("\nModules ({}):", table.module_count()));
    for module in table.modules() {
        output::line(format!(
            "  • {} {} {}",
            module.name,
            module.version,
            module.module_type.as_deref().unwrap_or("-")
        ));
    }

    let classes: Vec<&str> = table.library_classes().collect();
    if !classes.is_empty() {
        output::line("\nLibrary classes:");
        for class in classes {
            let headers = table.library_class_headers(class).unwrap_or_default();
            let headers: Vec<String> = headers.iter().map(|h| h.display().to_string()).collect();
            output::line(format!("  • {class}  {}", headers.join(" ")));
        }
    }

    let pcds: Vec<_> = table.pcds().collect();
    if !pcds.is_empty() {
        output::line("\nPCDs:");
        for pcd in pcds {
            let types: Vec<String> = pcd.supported_types.iter().map(ToString::to_string).collect();
            output::line(format!(
                "  • {}.{}  {}  [{}]",
                guid_text(&pcd.token_space_guid),
                pcd.c_name,
                pcd.datum_type,
                types.join(", ")
            ));
        }
    }
    Ok(())
}

fn to_json(table: &PackageDeclarationTable) -> serde_json::Value {
    let id = table.id();
    let modules: Vec<_> = table
        .modules()
        .map(|m| {
            json!({
                "name": m.name,
                "guid": guid_text(&m.guid),
                "version": m.version,
                "module_type": m.module_type,
                "path": table.module_file(&m.guid, &m.version),
            })
        })
        .collect();
    let library_classes: serde_json::Map<String, serde_json::Value> = table
        .library_classes()
        .map(|class| {
            let headers = table.library_class_headers(class).unwrap_or_default();
            (class.to_string(), json!(headers))
        })
        .collect();
    let pcds: Vec<_> = table
        .pcds()
        .map(|p| {
            json!({
                "c_name": p.c_name,
                "token_space_guid": guid_text(&p.token_space_guid),
                "token": p.token_number,
                "datum_type": p.datum_type,
                "default_value": p.default_value,
                "datum_size": p.datum_size,
                "supported_types": p.supported_types,
            })
        })
        .collect();

    json!({
        "name": id.name,
        "guid": guid_text(&id.guid),
        "version": id.version,
        "dir": table.dir(),
        "modules": modules,
        "library_classes": library_classes,
        "pcds": pcds,
    })
}
