//! engine::command
//!
//! The command protocol.
//!
//! # Architecture
//!
//! Every user-triggered operation is a [`Command`]. The factory constructs
//! it against the [`Context`], calls [`Command::execute`] once and, when the
//! command is undoable, pushes the [`Reversal`] it describes onto the undo
//! stack. Undo pops that record and reverts it; the command object itself
//! is dropped after execution.
//!
//! State-only commands hold a [`StateChange`]: the four diff-affecting
//! fields captured at construction (`old`) and the intended post-state
//! (`new`, starting equal to `old`). Executing writes `new`; reverting
//! writes `old`.
//!
//! # Failure Policy
//!
//! A subprocess exiting nonzero is data. Each command declares whether its
//! post-success bookkeeping should still run after a failure
//! ([`FailurePolicy::Continue`]) or be skipped ([`FailurePolicy::Abort`]).
//!
//! # Example
//!
//! ```ignore
//! struct ClearDiff {
//!     change: StateChange,
//! }
//!
//! impl Command for ClearDiff {
//!     fn name(&self) -> &'static str {
//!         "ClearDiff"
//!     }
//!
//!     fn is_undoable(&self) -> bool {
//!         true
//!     }
//!
//!     fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
//!         self.change.new.diff_text.clear();
//!         self.change.apply(&ctx.model);
//!         Ok(Outcome::Done)
//!     }
//!
//!     fn reversal(&self) -> Option<Reversal> {
//!         Some(Reversal::new(self.name()).with_snapshot(self.change.old.clone()))
//!     }
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

use super::context::Context;
use super::launch::LaunchError;
use crate::core::config::{ConfigError, ConfigScope, ConfigSource};
use crate::core::model::Model;
use crate::core::state::DiffSnapshot;
use crate::git::GitError;

/// Errors from constructing, executing or undoing a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A command did not override a required operation.
    #[error("{command} does not implement {operation}")]
    Unimplemented {
        /// Command name
        command: &'static str,
        /// `execute` or `undo`
        operation: &'static str,
    },

    /// Bad user input; shown as a blocking error prompt.
    #[error("{title}: {message}")]
    Usage {
        /// Prompt title
        title: String,
        /// Prompt body
        message: String,
    },

    /// A dispatch argument had the wrong shape.
    #[error("{command}: argument {index}: {message}")]
    BadArgument {
        /// Command name
        command: &'static str,
        /// Position of the argument
        index: usize,
        /// What was wrong
        message: String,
    },

    /// No constructor is registered for the event.
    #[error("no command registered for '{event}'")]
    UnknownEvent {
        /// The event name
        event: String,
    },

    /// Git could not be run.
    #[error(transparent)]
    Git(#[from] GitError),

    /// An external program could not be started.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// Configuration could not be read or written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A scratch file for git could not be written.
    #[error("failed to write temporary file: {0}")]
    TempFile(#[from] std::io::Error),
}

impl CommandError {
    /// Build a usage error.
    pub fn usage(title: impl Into<String>, message: impl Into<String>) -> Self {
        CommandError::Usage {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// What happened when a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran.
    Done,
    /// The user declined, a guard refused, or there was nothing to do.
    Aborted,
    /// A tool ran and exited with this status.
    Exited(i32),
}

/// Whether post-success bookkeeping runs after a failed subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Skip the bookkeeping when the subprocess fails.
    Abort,
    /// Log the failure and carry on.
    Continue,
}

impl FailurePolicy {
    /// Whether bookkeeping may run after a subprocess exited with `status`.
    pub fn permits(self, status: i32) -> bool {
        match self {
            FailurePolicy::Abort => status == 0,
            FailurePolicy::Continue => true,
        }
    }
}

/// Old and new values of the four diff-affecting fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub old: DiffSnapshot,
    pub new: DiffSnapshot,
}

impl StateChange {
    /// Capture the model's current fields as both old and new.
    pub fn capture(model: &Model) -> Self {
        let old = model.snapshot();
        Self {
            new: old.clone(),
            old,
        }
    }

    /// Write `new` into the model.
    pub fn apply(&self, model: &Model) {
        model.apply_snapshot(&self.new);
    }

    /// Write `old` into the model.
    pub fn revert(&self, model: &Model) {
        model.apply_snapshot(&self.old);
    }
}

/// Amend-mode bookkeeping kept on the undo stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmendMark {
    /// The command entered amend mode.
    pub entering: bool,
    /// Commit message that was live before the command ran.
    pub message_before: String,
}

/// A config value to restore on undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRestore {
    pub scope: ConfigScope,
    pub key: String,
    pub value: String,
}

/// Undo-stack entry: what an undoable command needs to put back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reversal {
    /// Name of the command that produced the entry.
    pub command: &'static str,
    /// Diff-affecting fields to restore.
    pub snapshot: Option<DiffSnapshot>,
    /// Commit message to restore.
    pub commit_message: Option<String>,
    /// Working directory for messages and templates to restore.
    pub directory: Option<PathBuf>,
    /// Config value to restore.
    pub config: Option<ConfigRestore>,
    /// Present for amend-mode transitions.
    pub amend: Option<AmendMark>,
    /// Reverting does nothing.
    pub skip: bool,
    /// Rescan the file status after reverting.
    pub rescan: bool,
}

impl Reversal {
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            ..Self::default()
        }
    }

    pub fn with_snapshot(mut self, snapshot: DiffSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_config(mut self, scope: ConfigScope, key: &str, value: String) -> Self {
        self.config = Some(ConfigRestore {
            scope,
            key: key.to_string(),
            value,
        });
        self
    }

    pub fn with_amend(mut self, mark: AmendMark) -> Self {
        self.amend = Some(mark);
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn rescanning(mut self) -> Self {
        self.rescan = true;
        self
    }

    /// Put the recorded values back.
    pub fn revert(&self, ctx: &Context) -> Result<(), CommandError> {
        if self.skip {
            tracing::debug!(command = self.command, "undo skipped");
            return Ok(());
        }
        if let Some(message) = &self.commit_message {
            ctx.model.set_commit_message(message.clone());
        }
        if let Some(directory) = &self.directory {
            ctx.model.set_directory(directory.clone());
        }
        if let Some(snapshot) = &self.snapshot {
            ctx.model.apply_snapshot(snapshot);
        }
        if let Some(restore) = &self.config {
            ctx.config
                .borrow_mut()
                .set(restore.scope, &restore.key, &restore.value)?;
        }
        if self.rescan {
            ctx.rescan_files();
        }
        Ok(())
    }
}

/// A user-triggered operation.
pub trait Command {
    /// Name of the concrete command.
    fn name(&self) -> &'static str;

    fn is_undoable(&self) -> bool {
        false
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Continue
    }

    /// Perform the operation.
    fn execute(&mut self, _ctx: &Context) -> Result<Outcome, CommandError> {
        Err(CommandError::Unimplemented {
            command: self.name(),
            operation: "execute",
        })
    }

    /// What undo has to restore. Only consulted for undoable commands.
    fn reversal(&self) -> Option<Reversal> {
        None
    }

    /// Reverse the operation.
    fn undo(&mut self, ctx: &Context) -> Result<(), CommandError> {
        match self.reversal() {
            Some(reversal) => reversal.revert(ctx),
            None => Err(CommandError::Unimplemented {
                command: self.name(),
                operation: "undo",
            }),
        }
    }
}
