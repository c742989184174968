//! Configuration and constants
//!
//! - [`defaults`] - Default values and well-known names

pub mod defaults;
