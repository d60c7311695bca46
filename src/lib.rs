//! Stagehand - the command, undo and dispatch core of a desktop git client
//!
//! Every user action (stage a file, commit, amend, run a configured tool)
//! is a named command. A trigger dispatches an event name with positional
//! arguments; the registered constructor builds the command, the command
//! runs against an explicit [`engine::Context`], and undoable commands leave
//! a typed record on the undo stack. Subprocess results are broadcast on a
//! notification bus for a log pane to show.
//!
//! # Architecture
//!
//! - [`engine`] - Dispatch table, command protocol, undo stack, bus, prompts
//! - [`commands`] - The command catalog and its registration
//! - [`core`] - Repository state model, configuration, diff-selection patches
//! - [`git`] - Single interface for all Git operations, plus an in-memory mock
//! - [`ui`] - Terminal prompter and log pane
//! - [`cli`] - The `stagehand` binary's argument parsing and subcommands
//!
//! # Example
//!
//! ```
//! use stagehand::engine::{signals, Args, Context, ScriptedPrompter};
//! use stagehand::git::mock::MockVcs;
//!
//! let ctx = Context::in_memory(MockVcs::new(), ScriptedPrompter::new());
//! stagehand::commands::register(&ctx.factory);
//!
//! ctx.model.set_diff_text("old");
//! ctx.dispatch(signals::SET_DIFF_TEXT, &Args::new().push("new")).unwrap();
//! assert_eq!(ctx.model.diff_text(), "new");
//!
//! ctx.undo().unwrap();
//! assert_eq!(ctx.model.diff_text(), "old");
//! ```

pub mod cli;
pub mod commands;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
