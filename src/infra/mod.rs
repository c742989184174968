//! Infrastructure layer
//!
//! Handles all I/O operations: descriptor files and user directories.
//! This module is the only place where side effects occur.

pub mod dirs;
pub mod filesystem;
pub mod loader;
