//! Core business logic module
//!
//! This module contains the data model and algorithms of fwpcd.
//! Descriptor files are read by [`crate::infra`].
//!
//! # Submodules
//!
//! - [`types`] - Item type, datum type and usage enums with their mappers
//! - [`ids`] - GUID parsing, package and module identities
//! - [`token`] - PCD tokens and usage instances
//! - [`registry`] - Platform token registry
//! - [`manifest`] - Manifest (fwpcd.toml) parsing
//! - [`package`] - Package descriptor format
//! - [`module`] - Module descriptor format and validation
//! - [`platform`] - Platform descriptor format and write-back
//! - [`package_table`] - Package declaration table
//! - [`workspace`] - Loaded packages and modules
//! - [`resolver`] - Library class resolution sessions
//! - [`check`] - Platform validation
//! - [`global_config`] - Global configuration management

pub mod check;
pub mod global_config;
pub mod ids;
pub mod manifest;
pub mod module;
pub mod package;
pub mod package_table;
pub mod platform;
pub mod registry;
pub mod resolver;
pub mod token;
pub mod types;
pub mod workspace;
