//! fwpcd - PCD token registry and library class resolver
//!
//! Entry point for the fwpcd command-line application.

use anyhow::Result;
use clap::Parser;

use fwpcd::cli::output::{display_error, OutputConfig};
use fwpcd::cli::Cli;
use fwpcd::core::global_config::GlobalConfig;
use fwpcd::infra::dirs::FwpcdDirs;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let global = match GlobalConfig::load(&FwpcdDirs::new()) {
        Ok(config) => config,
        Err(e) => {
            display_error(&anyhow::Error::new(e));
            std::process::exit(1);
        }
    };

    // Apply output configuration globally
    let output_config = OutputConfig::new(
        cli.quiet || global.quiet(),
        cli.json || global.json(),
        cli.verbose,
    );
    output_config.apply_global();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(output_config.log_level().into()),
        )
        .init();

    // Run the command and handle errors
    match cli.run(&global) {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
