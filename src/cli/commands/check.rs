//! Check command implementation
//!
//! Implements `fwpcd check` to validate every platform module's library
//! instances and the platform token registry without building.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::commands::load_project;
use crate::cli::output::{self, status, OutputConfig};
use crate::core::check;

/// Execute the check command
pub fn execute(project_dir: &Path, strict: bool) -> Result<()> {
    let project = load_project(project_dir)?;
    let platform = project.platform().context("Failed to load platform")?;

    tracing::info!("Checking platform: {}", platform.name);
    let result = check::check(&project.report.workspace, &platform, strict);

    if OutputConfig::global().json {
        output::json(&result)?;
    } else {
        output::line(format!("Checking platform '{}'...\n", result.platform));

        for module in &result.modules {
            let mark = if module.outstanding.is_empty() {
                status::SUCCESS
            } else {
                status::WARNING
            };
            output::line(format!(
                "{mark} {} ({} library instance(s))",
                module.name,
                module.library_instances.len()
            ));
            for (class, candidates) in &module.outstanding {
                output::line(format!(
                    "    - {class}: {} candidate(s)",
                    candidates.len()
                ));
            }
        }
        output::line(format!("\n{} PCD token(s) collected", result.token_count));

        if !result.warnings.is_empty() {
            output::line("\nWarnings:");
            for warning in &result.warnings {
                output::line(format!("  {} {warning}", status::WARNING));
            }
        }

        if !result.errors.is_empty() {
            output::line("\nErrors:");
            for error in &result.errors {
                output::line(format!("  {} {error}", status::ERROR));
            }
        }
    }

    if !result.is_valid() {
        bail!("Check failed with {} error(s)", result.errors.len());
    }

    output::success("Platform is consistent");
    Ok(())
}
