//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod check;
pub mod resolve;
pub mod show;
pub mod tokens;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::cli::output;
use crate::core::global_config::GlobalConfig;
use crate::infra::loader::{open_project, Project};

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the platform's PCD tokens
    Tokens {
        /// Only show tokens used by this module (name or four-part key)
        #[arg(short, long)]
        module: Option<String>,
    },

    /// Resolve the library classes of a platform module
    Resolve {
        /// Module name or four-part key
        module: String,

        /// Bind a library instance to a class (INSTANCE=CLASS)
        #[arg(short, long, value_name = "INSTANCE=CLASS")]
        bind: Vec<String>,

        /// Unbind a library instance
        #[arg(short, long, value_name = "INSTANCE")]
        unbind: Vec<String>,

        /// Ignore the instances saved in the platform descriptor
        #[arg(long)]
        fresh: bool,

        /// Write the resulting instances back into the platform descriptor
        #[arg(long)]
        save: bool,
    },

    /// Check every platform module's library instances and tokens
    Check {
        /// Treat unbound library classes as errors
        #[arg(long)]
        strict: bool,
    },

    /// Show a package declaration table
    Show {
        /// Package name or GUID
        package: String,
    },
}

impl Commands {
    /// Execute the command
    pub fn run(self, project_dir: &Path, global: &GlobalConfig) -> Result<()> {
        match self {
            Self::Tokens { module } => tokens::execute(project_dir, module.as_deref()),
            Self::Resolve {
                module,
                bind,
                unbind,
                fresh,
                save,
            } => {
                let options = resolve::ResolveOptions {
                    module,
                    bind,
                    unbind,
                    fresh,
                    save,
                };
                resolve::execute(project_dir, &options)
            }
            Self::Check { strict } => check::execute(project_dir, strict || global.strict()),
            Self::Show { package } => show::execute(project_dir, &package),
        }
    }
}

/// Open the project in `project_dir`, warning about packages that failed to load
pub(crate) fn load_project(project_dir: &Path) -> Result<Project> {
    let project = open_project(project_dir).with_context(|| {
        format!(
            "Failed to open project in {}. Is there an fwpcd.toml?",
            project_dir.display()
        )
    })?;

    for failure in &project.report.failures {
        output::warning(format!("Skipped package: {failure}"));
    }
    Ok(project)
}
