//! core::model
//!
//! The repository-state model shared by every command.
//!
//! # Architecture
//!
//! [`Model`] owns the [`RepoState`] behind a `RefCell` and a handle to the
//! [`Vcs`] collaborator. State is only changed through the named setters
//! below; git-backed operations (staging, rescans, branch deletion) live
//! here too so commands stay small.
//!
//! # Invariants
//!
//! - No `RefCell` borrow is held across a call into git
//! - Mutating operations rescan the file status before returning
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use stagehand::core::model::Model;
//! use stagehand::git::mock::MockVcs;
//!
//! let model = Model::new(Rc::new(MockVcs::new()));
//! model.set_diff_text("hello");
//! assert_eq!(model.diff_text(), "hello");
//! ```

use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::paths::RepoPaths;
use super::state::{DiffSnapshot, RepoState, StatusLists};
use super::types::{DiffMode, ProcessOutput, HEAD};
use crate::git::{GitError, Vcs};

/// Repository state plus the git collaborator.
pub struct Model {
    state: RefCell<RepoState>,
    vcs: Rc<dyn Vcs>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("state", &self.state.borrow())
            .finish()
    }
}

impl Model {
    /// Create a model rooted at the VCS working directory.
    pub fn new(vcs: Rc<dyn Vcs>) -> Self {
        let state = RepoState::new(vcs.work_dir());
        Self {
            state: RefCell::new(state),
            vcs,
        }
    }

    /// The VCS collaborator.
    pub fn vcs(&self) -> &dyn Vcs {
        self.vcs.as_ref()
    }

    /// Repository path helper.
    pub fn paths(&self) -> RepoPaths {
        RepoPaths::from_vcs(self.vcs.as_ref())
    }

    /// Borrow the whole state. Do not hold across calls into commands.
    pub fn state(&self) -> Ref<'_, RepoState> {
        self.state.borrow()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn diff_text(&self) -> String {
        self.state.borrow().diff_text.clone()
    }

    pub fn filename(&self) -> Option<String> {
        self.state.borrow().filename.clone()
    }

    pub fn mode(&self) -> DiffMode {
        self.state.borrow().mode
    }

    pub fn head(&self) -> String {
        self.state.borrow().head.clone()
    }

    pub fn commit_message(&self) -> String {
        self.state.borrow().commit_message.clone()
    }

    pub fn directory(&self) -> PathBuf {
        self.state.borrow().directory.clone()
    }

    pub fn current_branch(&self) -> String {
        self.state.borrow().current_branch.clone()
    }

    pub fn status(&self) -> StatusLists {
        self.state.borrow().status.clone()
    }

    // =========================================================================
    // Setters
    // =========================================================================

    pub fn set_diff_text(&self, text: impl Into<String>) {
        self.state.borrow_mut().diff_text = text.into();
    }

    pub fn set_filename(&self, filename: Option<String>) {
        self.state.borrow_mut().filename = filename;
    }

    pub fn set_mode(&self, mode: DiffMode) {
        self.state.borrow_mut().mode = mode;
    }

    pub fn set_head(&self, head: impl Into<String>) {
        self.state.borrow_mut().head = head.into();
    }

    pub fn set_commit_message(&self, message: impl Into<String>) {
        self.state.borrow_mut().commit_message = message.into();
    }

    pub fn set_directory(&self, directory: impl Into<PathBuf>) {
        self.state.borrow_mut().directory = directory.into();
    }

    /// Capture the diff-affecting fields.
    pub fn snapshot(&self) -> DiffSnapshot {
        self.state.borrow().snapshot()
    }

    /// Write all four diff-affecting fields at once.
    pub fn apply_snapshot(&self, snapshot: &DiffSnapshot) {
        let mut state = self.state.borrow_mut();
        state.diff_text = snapshot.diff_text.clone();
        state.filename = snapshot.filename.clone();
        state.mode = snapshot.mode;
        state.head = snapshot.head.clone();
    }

    // =========================================================================
    // Git-backed operations
    // =========================================================================

    /// Full rescan: status lists and current branch.
    pub fn update_status(&self) -> Result<(), GitError> {
        let lists = self.vcs.status()?;
        let branch = self.vcs.current_branch()?;
        let mut state = self.state.borrow_mut();
        state.status = lists;
        state.current_branch = branch;
        Ok(())
    }

    /// Rescan only the file status lists.
    pub fn update_file_status(&self) -> Result<(), GitError> {
        let lists = self.vcs.status()?;
        self.state.borrow_mut().status = lists;
        Ok(())
    }

    /// Stage paths, then rescan.
    pub fn stage_paths(&self, paths: &[String]) -> Result<ProcessOutput, GitError> {
        let out = self.vcs.add(paths)?;
        self.update_file_status()?;
        Ok(out)
    }

    /// Unstage paths, then rescan.
    pub fn unstage_paths(&self, paths: &[String]) -> Result<ProcessOutput, GitError> {
        if paths.is_empty() {
            return Ok(ProcessOutput::ok());
        }
        let out = self.vcs.reset(paths)?;
        self.update_file_status()?;
        Ok(out)
    }

    /// Unstage everything, then rescan.
    pub fn unstage_all(&self) -> Result<ProcessOutput, GitError> {
        let out = self.vcs.reset(&[])?;
        self.update_file_status()?;
        Ok(out)
    }

    /// Stop tracking paths (keeping them on disk), then rescan.
    pub fn untrack_paths(&self, paths: &[String]) -> Result<ProcessOutput, GitError> {
        let out = self.vcs.remove_cached(paths)?;
        self.update_file_status()?;
        Ok(out)
    }

    /// Cherry-pick revisions onto the current branch.
    pub fn cherry_pick_list(&self, revs: &[String]) -> Result<ProcessOutput, GitError> {
        self.vcs.cherry_pick(revs)
    }

    /// Force-delete a local branch.
    pub fn delete_branch(&self, name: &str) -> Result<ProcessOutput, GitError> {
        self.vcs.delete_branch(name)
    }

    /// Message of `rev` (default `HEAD`); empty when it cannot be read.
    pub fn previous_commit_message(&self, rev: Option<&str>) -> String {
        let rev = rev.unwrap_or(HEAD);
        match self.vcs.commit_message(rev) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(rev, %err, "no previous commit message");
                String::new()
            }
        }
    }

    /// Whether a merge is in progress.
    pub fn merge_in_progress(&self) -> bool {
        self.paths().merge_head().exists()
    }

    /// Resolve a repo-relative path against the working directory.
    pub fn worktree_path(&self, relative: &str) -> PathBuf {
        let relative = Path::new(relative);
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.vcs.work_dir().join(relative)
        }
    }
}
