//! Resolve command implementation
//!
//! Implements `fwpcd resolve` to bind library instances to the library
//! classes of one platform module.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::cli::commands::load_project;
use crate::cli::output::{self, status, OutputConfig};
use crate::core::ids::{guid_text, ModuleKey};
use crate::core::resolver::ResolutionSession;
use crate::core::workspace::Workspace;
use crate::infra::loader::save_platform;

/// Options for the resolve command
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Module name or four-part key
    pub module: String,
    /// `INSTANCE=CLASS` pairs, applied in order
    pub bind: Vec<String>,
    /// Instances to unbind after all binds
    pub unbind: Vec<String>,
    /// Skip replaying the platform's saved instances
    pub fresh: bool,
    /// Write the result back into the platform descriptor
    pub save: bool,
}

/// Split an `INSTANCE=CLASS` argument
pub fn parse_binding(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((instance, class)) if !instance.trim().is_empty() && !class.trim().is_empty() => {
            Ok((instance.trim(), class.trim()))
        }
        _ => bail!("Invalid binding '{arg}'. Expected INSTANCE=CLASS"),
    }
}

fn lookup(workspace: &Workspace, query: &str) -> Result<ModuleKey> {
    workspace
        .find_module(query)
        .ok_or_else(|| anyhow!("Unknown module '{query}'"))
}

/// Execute the resolve command
pub fn execute(project_dir: &Path, options: &ResolveOptions) -> Result<()> {
    let project = load_project(project_dir)?;
    let workspace = &project.report.workspace;
    let mut platform = project.platform().context("Failed to load platform")?;

    let module = lookup(workspace, &options.module)?;
    let mut session = ResolutionSession::open(workspace, &module)
        .with_context(|| format!("Failed to open session for '{}'", options.module))?;

    match platform.module(&module) {
        Some(entry) if !options.fresh => {
            session
                .restore(&entry.library_instances)
                .context("Failed to replay saved library instances")?;
        }
        Some(_) => {}
        None => {
            if options.save {
                bail!(
                    "Module '{}' is not part of platform '{}'",
                    options.module,
                    platform.name
                );
            }
            output::info(format!(
                "{} is not part of platform '{}'",
                options.module, platform.name
            ));
        }
    }

    for arg in &options.bind {
        let (instance, class) = parse_binding(arg)?;
        let key = lookup(workspace, instance)?;
        session
            .bind(&key, class)
            .with_context(|| format!("Failed to bind '{instance}' to '{class}'"))?;
    }

    for instance in &options.unbind {
        let key = lookup(workspace, instance)?;
        session
            .unbind(&key)
            .with_context(|| format!("Failed to unbind '{instance}'"))?;
    }

    if options.save {
        platform
            .apply_session(&session)
            .context("Failed to update platform")?;
        save_platform(&project.platform_path, &platform).context("Failed to save platform")?;
    }

    if OutputConfig::global().json {
        return output::json(&session.snapshot());
    }

    print_session(workspace, &session);
    if options.save {
        output::success(format!("Saved {}", project.platform_path.display()));
    }
    Ok(())
}

fn print_session(workspace: &Workspace, session: &ResolutionSession<'_>) {
    let module = session.module();
    output::line(format!(
        "Module {} ({module})",
        workspace.module_name(module)
    ));

    output::line("\nLibrary instances:");
    let instances = session.library_instances();
    if instances.is_empty() {
        output::line("  (none)");
    }
    for key in &instances {
        output::line(format!("  • {} ({key})", workspace.module_name(key)));
    }

    let outstanding = session.class_instance_map();
    if !outstanding.is_empty() {
        output::line("\nUnresolved library classes:");
        for (class, candidates) in outstanding {
            if candidates.is_empty() {
                output::line(format!("  {} {class}: no candidates", status::ERROR));
                continue;
            }
            let names: Vec<String> = candidates
                .iter()
                .map(|key| workspace.module_name(key))
                .collect();
            output::line(format!("  {} {class}: {}", status::WARNING, names.join(", ")));
        }
    }

    let pcds = session.pcd_build_definitions();
    if !pcds.is_empty() {
        output::line("\nPCD build definitions:");
        for pcd in &pcds {
            output::line(format!(
                "  • {}.{}  {}  {}",
                guid_text(&pcd.token_space_guid),
                pcd.c_name,
                pcd.item_type,
                pcd.datum_type
            ));
        }
    }

    for diagnostic in session.diagnostics() {
        output::warning(diagnostic.to_string());
    }

    if session.is_complete() {
        output::success("All library classes are resolved");
    }
}
