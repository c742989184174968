//! fwpcd - PCD token registry and library class resolver
//!
//! This library models the configuration tokens (PCDs) of a firmware
//! platform build and the interactive resolution of library classes to
//! library instances.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Token registry, package tables and resolver (no I/O operations)
//! - [`infra`] - Infrastructure layer (descriptor loading, directories)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
