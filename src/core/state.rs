//! core::state
//!
//! The in-memory repository state shown by the client.
//!
//! # Overview
//!
//! [`RepoState`] is a plain snapshot of everything the views display: the
//! current diff text, the file under inspection, the diff mode and base ref,
//! the commit message being edited, and the path lists from the last status
//! scan. It owns no git logic; [`crate::core::model::Model`] wraps it and
//! performs the git-backed operations.
//!
//! # Invariants
//!
//! - `mode` and `head` describe how `diff_text` was produced
//! - The path lists are replaced wholesale on every rescan

use std::path::PathBuf;

use super::types::{DiffMode, HEAD};

/// Path lists produced by a status scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLists {
    /// Paths with staged changes.
    pub staged: Vec<String>,
    /// Tracked paths with unstaged changes.
    pub modified: Vec<String>,
    /// Untracked, non-ignored paths.
    pub untracked: Vec<String>,
    /// Paths with unresolved conflicts.
    pub unmerged: Vec<String>,
}

/// Mutable repository-facing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoState {
    /// Currently displayed diff or file text.
    pub diff_text: String,
    /// Repo-relative file under inspection.
    pub filename: Option<String>,
    /// How `diff_text` should be interpreted.
    pub mode: DiffMode,
    /// Ref used as the diff base.
    pub head: String,
    /// Commit message being edited.
    pub commit_message: String,
    /// Directory used for loading messages and templates.
    pub directory: PathBuf,
    /// Name of the checked-out branch (empty when detached or unknown).
    pub current_branch: String,
    /// Results of the last status scan.
    pub status: StatusLists,
}

impl Default for RepoState {
    fn default() -> Self {
        Self {
            diff_text: String::new(),
            filename: None,
            mode: DiffMode::None,
            head: HEAD.to_string(),
            commit_message: String::new(),
            directory: PathBuf::new(),
            current_branch: String::new(),
            status: StatusLists::default(),
        }
    }
}

impl RepoState {
    /// Create a state rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Capture the four diff-affecting fields.
    pub fn snapshot(&self) -> DiffSnapshot {
        DiffSnapshot {
            diff_text: self.diff_text.clone(),
            filename: self.filename.clone(),
            mode: self.mode,
            head: self.head.clone(),
        }
    }
}

/// The four fields that together describe the displayed diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSnapshot {
    /// Diff text.
    pub diff_text: String,
    /// File under inspection.
    pub filename: Option<String>,
    /// Diff mode.
    pub mode: DiffMode,
    /// Base ref.
    pub head: String,
}

impl DiffSnapshot {
    /// Snapshot for the clean "no special mode" state.
    pub fn reset(filename: Option<String>) -> Self {
        Self {
            diff_text: String::new(),
            filename,
            mode: DiffMode::None,
            head: HEAD.to_string(),
        }
    }
}
