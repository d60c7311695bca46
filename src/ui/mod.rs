//! ui
//!
//! Terminal interaction for the `stagehand` binary.
//!
//! # Modules
//!
//! - [`prompts`] - A [`Prompter`](crate::engine::Prompter) that talks to a terminal
//! - [`output`] - Output formatting and the log pane observer
//!
//! # Design
//!
//! The library never prints. Everything a user sees from the binary goes
//! through this module, so quiet and non-interactive modes are handled in
//! one place.

pub mod output;
pub mod prompts;
