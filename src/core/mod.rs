//! core
//!
//! Repository state, configuration and the patch helpers commands build on.
//!
//! # Modules
//!
//! - [`types`] - Small shared types: DiffMode, ProcessOutput
//! - [`state`] - The plain in-memory repository state
//! - [`model`] - The state plus git-backed operations
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Path routing inside the repository
//! - [`patch`] - Applying a selection of the displayed diff
//!
//! # Design Principles
//!
//! - State changes go through named setters on the model
//! - Subprocess failures are data, not errors

pub mod config;
pub mod model;
pub mod patch;
pub mod paths;
pub mod state;
pub mod types;
