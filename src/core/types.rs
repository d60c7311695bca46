//! core::types
//!
//! Small shared domain types.
//!
//! # Types
//!
//! - [`DiffMode`] - How the displayed diff text was produced
//! - [`ProcessOutput`] - Exit status and combined output of a subprocess
//!
//! # Examples
//!
//! ```
//! use stagehand::core::types::{DiffMode, ProcessOutput};
//!
//! assert_eq!(DiffMode::default(), DiffMode::None);
//! assert_eq!(DiffMode::Index.as_str(), "index");
//!
//! let out = ProcessOutput::new(1, "fatal: bad revision");
//! assert!(!out.success());
//! ```

use std::fmt;

/// The ref used as the diff base outside of amend mode.
pub const HEAD: &str = "HEAD";

/// The ref used as the diff base while amending.
pub const HEAD_PARENT: &str = "HEAD^";

/// Which kind of diff is currently displayed.
///
/// The mode and the model's `head` are kept consistent with the way the
/// diff text was computed: `Index` means the text was produced against the
/// index with `head` as the base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DiffMode {
    /// Nothing special is displayed.
    #[default]
    None,
    /// Amending the previous commit.
    Amend,
    /// Worktree changes against the index.
    Worktree,
    /// Staged changes against `head`.
    Index,
    /// Untracked file content or summary.
    Untracked,
}

impl DiffMode {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffMode::None => "none",
            DiffMode::Amend => "amend",
            DiffMode::Worktree => "worktree",
            DiffMode::Index => "index",
            DiffMode::Untracked => "untracked",
        }
    }
}

impl fmt::Display for DiffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running a subprocess: exit status plus combined stdout/stderr.
///
/// A nonzero status is data, not an error. Callers log it and decide what
/// to do through their failure policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit status (`-1` when the process was killed by a signal).
    pub status: i32,
    /// Combined output text.
    pub output: String,
}

impl ProcessOutput {
    /// Create a new output record.
    pub fn new(status: i32, output: impl Into<String>) -> Self {
        Self {
            status,
            output: output.into(),
        }
    }

    /// Successful, empty output.
    pub fn ok() -> Self {
        Self::new(0, "")
    }

    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Captured result of a tool run: status, stdout and stderr kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandCapture {
    /// Exit status.
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandCapture {
    /// Create a new capture.
    pub fn new(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}
