//! git::mock
//!
//! Mock VCS implementation for deterministic testing.
//!
//! # Design
//!
//! [`MockVcs`] implements [`Vcs`] in memory. It records every call so tests
//! can assert on exactly what the command core asked git to do, and it
//! returns scripted [`ProcessOutput`]s per operation kind (success with empty
//! output when nothing was scripted).
//!
//! Clones share state, so a test can keep a handle after moving a clone into
//! a [`crate::core::model::Model`].
//!
//! # Example
//!
//! ```
//! use stagehand::git::mock::{MockVcs, OpKind, VcsOperation};
//! use stagehand::git::Vcs;
//! use stagehand::core::types::ProcessOutput;
//!
//! let vcs = MockVcs::new().with_result(OpKind::DeleteBranch, ProcessOutput::new(1, "error: nope"));
//! let out = vcs.delete_branch("topic").unwrap();
//! assert_eq!(out.status, 1);
//! assert_eq!(
//!     vcs.operations(),
//!     vec![VcsOperation::DeleteBranch { name: "topic".into() }]
//! );
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::interface::{DiffRequest, GitError, TagRequest, Vcs};
use crate::core::state::StatusLists;
use crate::core::types::ProcessOutput;

/// Mock VCS for testing.
///
/// Single-threaded; shares state across clones through `Rc<RefCell<...>>`.
#[derive(Debug, Clone)]
pub struct MockVcs {
    inner: Rc<RefCell<MockVcsInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockVcsInner {
    git_dir: PathBuf,
    work_dir: PathBuf,
    status: StatusLists,
    current_branch: String,
    diff_text: String,
    stat_text: String,
    messages: HashMap<String, String>,
    revisions: HashMap<String, String>,
    results: HashMap<OpKind, VecDeque<ProcessOutput>>,
    fail_on: Option<OpKind>,
    operations: Vec<VcsOperation>,
}

/// Operation kinds that can be scripted or made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Diff,
    Commit,
    Checkout,
    ApplyMailbox,
    ApplyPatch,
    Tag,
    DeleteBranch,
    RevParse,
    CherryPick,
    Clone,
    Add,
    Reset,
    RemoveCached,
    RefreshIndex,
    Status,
    CurrentBranch,
    CommitMessage,
    FormatPatch,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsOperation {
    Diff(DiffRequest),
    Commit {
        /// Content of the message file at the time of the call.
        message: String,
        amend: bool,
    },
    Checkout {
        argv: Vec<String>,
    },
    ApplyMailbox {
        patch: PathBuf,
    },
    ApplyPatch {
        patch: String,
        cached: bool,
        reverse: bool,
    },
    Tag {
        request: TagRequest,
        /// Content of the message file, if one was passed.
        message: Option<String>,
    },
    DeleteBranch {
        name: String,
    },
    RevParse {
        rev: String,
    },
    CherryPick {
        revs: Vec<String>,
    },
    Clone {
        url: String,
        destination: PathBuf,
    },
    Add {
        paths: Vec<String>,
    },
    Reset {
        paths: Vec<String>,
    },
    RemoveCached {
        paths: Vec<String>,
    },
    RefreshIndex,
    Status,
    CurrentBranch,
    CommitMessage {
        rev: String,
    },
    FormatPatch {
        rev: String,
        start_number: usize,
        output_dir: PathBuf,
    },
}

impl Default for MockVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVcs {
    /// Create a mock with empty status and scripted successes.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(MockVcsInner {
                git_dir: PathBuf::from(".git"),
                work_dir: PathBuf::from("."),
                status: StatusLists::default(),
                current_branch: "main".to_string(),
                diff_text: String::new(),
                stat_text: String::new(),
                messages: HashMap::new(),
                revisions: HashMap::new(),
                results: HashMap::new(),
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Use `dir` as the working directory and `dir/.git` as the git directory.
    pub fn with_work_dir(self, dir: impl Into<PathBuf>) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            let dir = dir.into();
            inner.git_dir = dir.join(".git");
            inner.work_dir = dir;
        }
        self
    }

    /// Status lists returned by `status()`.
    pub fn with_status(self, status: StatusLists) -> Self {
        self.inner.borrow_mut().status = status;
        self
    }

    /// Text returned for patch diffs.
    pub fn with_diff(self, text: impl Into<String>) -> Self {
        self.inner.borrow_mut().diff_text = text.into();
        self
    }

    /// Text returned for `--stat` diffs.
    pub fn with_stat(self, text: impl Into<String>) -> Self {
        self.inner.borrow_mut().stat_text = text.into();
        self
    }

    /// Message returned by `commit_message(rev)`.
    pub fn with_commit_message(self, rev: &str, message: impl Into<String>) -> Self {
        self.inner
            .borrow_mut()
            .messages
            .insert(rev.to_string(), message.into());
        self
    }

    /// Object id returned by `rev_parse(rev)`.
    pub fn with_revision(self, rev: &str, oid: impl Into<String>) -> Self {
        self.inner
            .borrow_mut()
            .revisions
            .insert(rev.to_string(), oid.into());
        self
    }

    /// Queue an output for the next call of `kind`.
    pub fn with_result(self, kind: OpKind, output: ProcessOutput) -> Self {
        self.push_result(kind, output);
        self
    }

    /// Queue an output for the next call of `kind`.
    pub fn push_result(&self, kind: OpKind, output: ProcessOutput) {
        self.inner
            .borrow_mut()
            .results
            .entry(kind)
            .or_default()
            .push_back(output);
    }

    /// Make every call of `kind` fail with a spawn error.
    pub fn fail_on(self, kind: OpKind) -> Self {
        self.inner.borrow_mut().fail_on = Some(kind);
        self
    }

    /// Replace the status lists.
    pub fn set_status(&self, status: StatusLists) {
        self.inner.borrow_mut().status = status;
    }

    /// All recorded operations, oldest first.
    pub fn operations(&self) -> Vec<VcsOperation> {
        self.inner.borrow().operations.clone()
    }

    /// Recorded operations excluding read-only scans and diffs.
    pub fn mutations(&self) -> Vec<VcsOperation> {
        self.operations()
            .into_iter()
            .filter(|op| {
                !matches!(
                    op,
                    VcsOperation::Status
                        | VcsOperation::CurrentBranch
                        | VcsOperation::Diff(_)
                        | VcsOperation::RevParse { .. }
                        | VcsOperation::CommitMessage { .. }
                        | VcsOperation::RefreshIndex
                )
            })
            .collect()
    }

    /// Forget recorded operations.
    pub fn clear_operations(&self) {
        self.inner.borrow_mut().operations.clear();
    }

    fn record(&self, kind: OpKind, op: VcsOperation) -> Result<(), GitError> {
        let mut inner = self.inner.borrow_mut();
        inner.operations.push(op);
        if inner.fail_on == Some(kind) {
            return Err(GitError::Spawn {
                command: format!("{:?}", kind),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock failure"),
            });
        }
        Ok(())
    }

    fn next_result(&self, kind: OpKind) -> ProcessOutput {
        self.inner
            .borrow_mut()
            .results
            .get_mut(&kind)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(ProcessOutput::ok)
    }

    fn respond(&self, kind: OpKind, op: VcsOperation) -> Result<ProcessOutput, GitError> {
        self.record(kind, op)?;
        Ok(self.next_result(kind))
    }
}

impl Vcs for MockVcs {
    fn git_dir(&self) -> PathBuf {
        self.inner.borrow().git_dir.clone()
    }

    fn work_dir(&self) -> PathBuf {
        self.inner.borrow().work_dir.clone()
    }

    fn diff(&self, request: &DiffRequest) -> Result<String, GitError> {
        self.record(OpKind::Diff, VcsOperation::Diff(request.clone()))?;
        let inner = self.inner.borrow();
        if request.stat {
            Ok(inner.stat_text.clone())
        } else {
            Ok(inner.diff_text.clone())
        }
    }

    fn commit(&self, message_file: &Path, amend: bool) -> Result<ProcessOutput, GitError> {
        let message = std::fs::read_to_string(message_file).unwrap_or_default();
        self.respond(OpKind::Commit, VcsOperation::Commit { message, amend })
    }

    fn checkout(&self, argv: &[String]) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::Checkout,
            VcsOperation::Checkout {
                argv: argv.to_vec(),
            },
        )
    }

    fn apply_mailbox(&self, patch: &Path) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::ApplyMailbox,
            VcsOperation::ApplyMailbox {
                patch: patch.to_path_buf(),
            },
        )
    }

    fn apply_patch(
        &self,
        patch: &str,
        cached: bool,
        reverse: bool,
    ) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::ApplyPatch,
            VcsOperation::ApplyPatch {
                patch: patch.to_string(),
                cached,
                reverse,
            },
        )
    }

    fn tag(&self, request: &TagRequest) -> Result<ProcessOutput, GitError> {
        let message = request
            .message_file
            .as_ref()
            .and_then(|path| std::fs::read_to_string(path).ok());
        self.respond(
            OpKind::Tag,
            VcsOperation::Tag {
                request: request.clone(),
                message,
            },
        )
    }

    fn delete_branch(&self, name: &str) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::DeleteBranch,
            VcsOperation::DeleteBranch {
                name: name.to_string(),
            },
        )
    }

    fn rev_parse(&self, rev: &str) -> Result<String, GitError> {
        self.record(
            OpKind::RevParse,
            VcsOperation::RevParse {
                rev: rev.to_string(),
            },
        )?;
        Ok(self
            .inner
            .borrow()
            .revisions
            .get(rev)
            .cloned()
            .unwrap_or_else(|| "0".repeat(40)))
    }

    fn cherry_pick(&self, revs: &[String]) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::CherryPick,
            VcsOperation::CherryPick {
                revs: revs.to_vec(),
            },
        )
    }

    fn clone_repo(&self, url: &str, destination: &Path) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::Clone,
            VcsOperation::Clone {
                url: url.to_string(),
                destination: destination.to_path_buf(),
            },
        )
    }

    fn add(&self, paths: &[String]) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::Add,
            VcsOperation::Add {
                paths: paths.to_vec(),
            },
        )
    }

    fn reset(&self, paths: &[String]) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::Reset,
            VcsOperation::Reset {
                paths: paths.to_vec(),
            },
        )
    }

    fn remove_cached(&self, paths: &[String]) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::RemoveCached,
            VcsOperation::RemoveCached {
                paths: paths.to_vec(),
            },
        )
    }

    fn refresh_index(&self) -> Result<(), GitError> {
        self.record(OpKind::RefreshIndex, VcsOperation::RefreshIndex)
    }

    fn status(&self) -> Result<StatusLists, GitError> {
        self.record(OpKind::Status, VcsOperation::Status)?;
        Ok(self.inner.borrow().status.clone())
    }

    fn current_branch(&self) -> Result<String, GitError> {
        self.record(OpKind::CurrentBranch, VcsOperation::CurrentBranch)?;
        Ok(self.inner.borrow().current_branch.clone())
    }

    fn commit_message(&self, rev: &str) -> Result<String, GitError> {
        self.record(
            OpKind::CommitMessage,
            VcsOperation::CommitMessage {
                rev: rev.to_string(),
            },
        )?;
        Ok(self
            .inner
            .borrow()
            .messages
            .get(rev)
            .cloned()
            .unwrap_or_default())
    }

    fn format_patch(
        &self,
        rev: &str,
        start_number: usize,
        output_dir: &Path,
    ) -> Result<ProcessOutput, GitError> {
        self.respond(
            OpKind::FormatPatch,
            VcsOperation::FormatPatch {
                rev: rev.to_string(),
                start_number,
                output_dir: output_dir.to_path_buf(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_results_are_consumed_in_order() {
        let vcs = MockVcs::new()
            .with_result(OpKind::ApplyMailbox, ProcessOutput::new(1, "conflict"))
            .with_result(OpKind::ApplyMailbox, ProcessOutput::new(0, "applied"));

        let first = vcs.apply_mailbox(Path::new("a.patch")).unwrap();
        let second = vcs.apply_mailbox(Path::new("b.patch")).unwrap();
        let third = vcs.apply_mailbox(Path::new("c.patch")).unwrap();

        assert_eq!(first.status, 1);
        assert_eq!(second.output, "applied");
        assert_eq!(third, ProcessOutput::ok());
    }

    #[test]
    fn revisions_and_status_are_scripted() {
        let vcs = MockVcs::new().with_revision("HEAD", "abc123");
        assert_eq!(vcs.rev_parse("HEAD").unwrap(), "abc123");
        assert_eq!(vcs.rev_parse("other").unwrap(), "0".repeat(40));

        vcs.set_status(StatusLists {
            untracked: vec!["new.rs".into()],
            ..StatusLists::default()
        });
        assert_eq!(vcs.status().unwrap().untracked, vec!["new.rs"]);

        vcs.clear_operations();
        assert!(vcs.operations().is_empty());
    }

    #[test]
    fn clones_share_recorded_operations() {
        let vcs = MockVcs::new();
        let handle = vcs.clone();
        vcs.add(&["x.py".to_string()]).unwrap();
        assert_eq!(
            handle.operations(),
            vec![VcsOperation::Add {
                paths: vec!["x.py".into()]
            }]
        );
    }

    #[test]
    fn fail_on_returns_spawn_error() {
        let vcs = MockVcs::new().fail_on(OpKind::Status);
        assert!(matches!(vcs.status(), Err(GitError::Spawn { .. })));
    }

    #[test]
    fn stat_and_patch_diffs_are_separate() {
        let vcs = MockVcs::new().with_diff("patch").with_stat("stat");
        let stat = DiffRequest {
            stat: true,
            ..DiffRequest::default()
        };
        assert_eq!(vcs.diff(&stat).unwrap(), "stat");
        assert_eq!(vcs.diff(&DiffRequest::default()).unwrap(), "patch");
    }
}
