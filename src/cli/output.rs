//! Output formatting
//!
//! Status messages, JSON output and error display. Output preferences are
//! applied once at startup and read by every command.

use std::sync::OnceLock;

use serde::Serialize;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Output preferences for the current invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub quiet: bool,
    pub json: bool,
    pub verbose: u8,
}

static OUTPUT: OnceLock<OutputConfig> = OnceLock::new();

impl OutputConfig {
    /// Create an output configuration from command-line flags
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this configuration the process-wide one
    ///
    /// Only the first call has an effect.
    pub fn apply_global(self) {
        let _ = OUTPUT.set(self);
    }

    /// The process-wide configuration, defaults when none was applied
    pub fn global() -> Self {
        OUTPUT.get().copied().unwrap_or_default()
    }

    /// Log level implied by the flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

/// Print a line unless quiet or JSON output is active
pub fn line(message: impl AsRef<str>) {
    let config = OutputConfig::global();
    if !config.quiet && !config.json {
        println!("{}", message.as_ref());
    }
}

/// Print a success message
pub fn success(message: impl AsRef<str>) {
    line(format!("{} {}", status::SUCCESS, message.as_ref()));
}

/// Print an informational message
pub fn info(message: impl AsRef<str>) {
    line(format!("{} {}", status::INFO, message.as_ref()));
}

/// Print a warning to stderr unless quiet
pub fn warning(message: impl AsRef<str>) {
    if !OutputConfig::global().quiet {
        eprintln!("{} {}", status::WARNING, message.as_ref());
    }
}

/// Print a value as pretty JSON
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}
