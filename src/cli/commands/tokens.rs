//! Tokens command implementation
//!
//! Implements `fwpcd tokens` to list the platform's PCD token registry.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::commands::load_project;
use crate::cli::output::{self, OutputConfig};
use crate::core::ids::guid_text;
use crate::core::registry::TokenRegistry;
use crate::core::token::Token;

/// Execute the tokens command
pub fn execute(project_dir: &Path, module: Option<&str>) -> Result<()> {
    let project = load_project(project_dir)?;
    let workspace = &project.report.workspace;
    let platform = project.platform().context("Failed to load platform")?;

    let registry =
        TokenRegistry::collect(workspace, &platform).context("Failed to collect PCD tokens")?;

    let module_name = match module {
        Some(query) => match workspace.find_module(query) {
            Some(key) => Some(workspace.module_name(&key)),
            None => bail!("Unknown module '{query}'"),
        },
        None => None,
    };

    let tokens: Vec<&Token> = match &module_name {
        Some(name) => registry.tokens_for_module(name).collect(),
        None => registry.iter().collect(),
    };
    tracing::info!("Listing {} of {} token(s)", tokens.len(), registry.len());

    if OutputConfig::global().json {
        return output::json(&tokens);
    }

    if tokens.is_empty() {
        output::line("No PCD tokens.");
        return Ok(());
    }

    for token in tokens {
        let mut line = format!(
            "{}  {}  {}",
            token.key(),
            token.pcd_type,
            token.datum_type
        );
        if let Some(datum) = token.datum.as_ref().or(token.default_value.as_ref()) {
            line.push_str(&format!("  = {datum}"));
        }
        if let Some(name) = &module_name {
            line.push_str(&format!("  [{}]", token.usage_for_module(name)));
        }
        output::line(line);

        if token.has_assigned_token_space() {
            output::line(format!(
                "    assigned {} #{}",
                guid_text(&token.assigned_token_space_guid),
                token.assigned_token_number
            ));
        }
        if let Some(hii) = &token.hii {
            output::line(format!(
                "    hii {} {} +{}",
                hii.variable_name,
                guid_text(&hii.variable_guid),
                hii.variable_offset
            ));
        }
        if let Some(offset) = token.vpd_offset {
            output::line(format!("    vpd +{offset}"));
        }
    }

    output::success(format!("{} token(s)", registry.len()));
    Ok(())
}
