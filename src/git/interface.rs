//! git::interface
//!
//! The VCS collaborator used by commands and the model.
//!
//! # Architecture
//!
//! [`Vcs`] is the narrow surface the command core needs from git. The
//! production implementation, [`Git`], reads repository data (status, refs,
//! commit messages, config) through `git2` and runs every mutation through
//! the `git` binary so hooks, signing and the user's git configuration apply
//! exactly as they do on the command line.
//!
//! # Error Handling
//!
//! A git subprocess that exits nonzero is **not** an error: the status and
//! combined output come back as a [`ProcessOutput`] for the caller to log.
//! [`GitError`] is reserved for failures to reach git at all:
//! - [`GitError::NotARepo`]: no repository at the given path
//! - [`GitError::BareRepo`]: the repository has no working directory
//! - [`GitError::Spawn`]: the `git` binary could not be started
//! - [`GitError::Internal`]: a `git2` read failed
//!
//! # Example
//!
//! ```ignore
//! use stagehand::git::{Git, Vcs};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let lists = git.status()?;
//! println!("{} staged", lists.staged.len());
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::core::state::StatusLists;
use crate::core::types::ProcessOutput;

/// Errors reaching git.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The git binary could not be run.
    #[error("failed to run git {command}: {source}")]
    Spawn {
        /// The git subcommand
        command: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Parameters for a `git diff` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffRequest {
    /// Base ref (`HEAD`, `HEAD^`, an explicit revision or range).
    pub reference: Option<String>,
    /// Compare the index instead of the worktree.
    pub cached: bool,
    /// Only print a diffstat.
    pub stat: bool,
    /// Print a diffstat followed by the patch.
    pub patch_with_stat: bool,
    /// Context lines (`--unified`).
    pub context_lines: Option<u32>,
    /// Enable rename detection (`-M`).
    pub find_renames: bool,
    /// Limit to these paths.
    pub paths: Vec<String>,
}

impl DiffRequest {
    /// Build the argument vector for this request.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["diff".to_string(), "--no-color".to_string()];
        if let Some(lines) = self.context_lines {
            args.push(format!("--unified={}", lines));
        }
        if self.find_renames {
            args.push("-M".to_string());
        }
        if self.cached {
            args.push("--cached".to_string());
        }
        if self.stat {
            args.push("--stat".to_string());
        }
        if self.patch_with_stat {
            args.push("--patch-with-stat".to_string());
        }
        if let Some(reference) = &self.reference {
            args.push(reference.clone());
        }
        if !self.paths.is_empty() {
            args.push("--".to_string());
            args.extend(self.paths.iter().cloned());
        }
        args
    }
}

/// Parameters for `git tag`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRequest {
    /// Tag name.
    pub name: String,
    /// Revision to tag.
    pub revision: String,
    /// GPG-sign the tag (`-s`).
    pub sign: bool,
    /// Create an annotated tag (`-a`).
    pub annotate: bool,
    /// Read the tag message from this file (`-F`).
    pub message_file: Option<PathBuf>,
}

impl TagRequest {
    /// Build the argument vector for this request.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["tag".to_string()];
        if self.sign {
            args.push("-s".to_string());
        }
        if self.annotate {
            args.push("-a".to_string());
        }
        if let Some(file) = &self.message_file {
            args.push("-F".to_string());
            args.push(file.to_string_lossy().into_owned());
        }
        args.push(self.name.clone());
        args.push(self.revision.clone());
        args
    }
}

/// The git operations the command core relies on.
///
/// Mutating operations return a [`ProcessOutput`]; only failures to reach
/// git at all are errors.
pub trait Vcs {
    /// Path to the `.git` directory.
    fn git_dir(&self) -> PathBuf;

    /// Path to the working directory.
    fn work_dir(&self) -> PathBuf;

    /// Compute diff text.
    fn diff(&self, request: &DiffRequest) -> Result<String, GitError>;

    /// Commit using a message file.
    fn commit(&self, message_file: &Path, amend: bool) -> Result<ProcessOutput, GitError>;

    /// `git checkout` with the given arguments.
    fn checkout(&self, argv: &[String]) -> Result<ProcessOutput, GitError>;

    /// Apply a mailbox patch as a new commit (`git am`).
    fn apply_mailbox(&self, patch: &Path) -> Result<ProcessOutput, GitError>;

    /// Apply patch text to the index or worktree (`git apply`).
    fn apply_patch(&self, patch: &str, cached: bool, reverse: bool)
        -> Result<ProcessOutput, GitError>;

    /// Create a tag.
    fn tag(&self, request: &TagRequest) -> Result<ProcessOutput, GitError>;

    /// Force-delete a local branch.
    fn delete_branch(&self, name: &str) -> Result<ProcessOutput, GitError>;

    /// Resolve a revision to a full object id.
    fn rev_parse(&self, rev: &str) -> Result<String, GitError>;

    /// Cherry-pick revisions onto the current branch.
    fn cherry_pick(&self, revs: &[String]) -> Result<ProcessOutput, GitError>;

    /// Clone `url` into `destination`.
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<ProcessOutput, GitError>;

    /// Stage paths.
    fn add(&self, paths: &[String]) -> Result<ProcessOutput, GitError>;

    /// Unstage paths; an empty slice resets the whole index.
    fn reset(&self, paths: &[String]) -> Result<ProcessOutput, GitError>;

    /// Remove paths from the index, keeping them on disk.
    fn remove_cached(&self, paths: &[String]) -> Result<ProcessOutput, GitError>;

    /// Refresh cached stat information in the index.
    fn refresh_index(&self) -> Result<(), GitError>;

    /// Scan the repository status.
    fn status(&self) -> Result<StatusLists, GitError>;

    /// Name of the checked-out branch, empty when detached.
    fn current_branch(&self) -> Result<String, GitError>;

    /// Full message of the commit `rev` resolves to.
    fn commit_message(&self, rev: &str) -> Result<String, GitError>;

    /// Export a single revision as a patch file.
    fn format_patch(
        &self,
        rev: &str,
        start_number: usize,
        output_dir: &Path,
    ) -> Result<ProcessOutput, GitError>;
}

/// Paths of an opened repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to .git directory
    pub git_dir: PathBuf,
    /// Path to working directory
    pub work_dir: PathBuf,
}

/// Production [`Vcs`] backed by `git2` and the `git` binary.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
    /// Working directory, used as the cwd of every subprocess
    work_dir: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        let work_dir = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(Self { repo, work_dir })
    }

    /// Repository paths.
    pub fn info(&self) -> RepoInfo {
        RepoInfo {
            git_dir: self.repo.path().to_path_buf(),
            work_dir: self.work_dir.clone(),
        }
    }

    /// All git config entries visible from this repository, in file order.
    pub fn config_entries(&self) -> Result<Vec<(String, String)>, GitError> {
        let config = self.repo.config()?;
        let mut entries = config.entries(None)?;
        let mut out = Vec::new();
        while let Some(entry) = entries.next() {
            let entry = entry?;
            if let (Some(name), Some(value)) = (entry.name(), entry.value()) {
                out.push((name.to_string(), value.to_string()));
            }
        }
        Ok(out)
    }

    fn head_is_unborn(&self) -> bool {
        matches!(
            self.repo.head(),
            Err(ref e) if e.code() == git2::ErrorCode::UnbornBranch
        )
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.work_dir);
        cmd
    }

    /// Run git and return status plus combined stdout/stderr.
    fn run(&self, args: &[String]) -> Result<ProcessOutput, GitError> {
        tracing::debug!(?args, "running git");
        let output = self
            .command()
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GitError::Spawn {
                command: args.first().cloned().unwrap_or_default(),
                source,
            })?;
        Ok(combine(&output))
    }

    /// Run git feeding `input` on stdin.
    fn run_with_input(&self, args: &[String], input: &str) -> Result<ProcessOutput, GitError> {
        tracing::debug!(?args, bytes = input.len(), "running git with stdin");
        let spawn_err = |source| GitError::Spawn {
            command: args.first().cloned().unwrap_or_default(),
            source,
        };
        let mut child = self
            .command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).map_err(spawn_err)?;
        }
        let output = child.wait_with_output().map_err(spawn_err)?;
        Ok(combine(&output))
    }
}

/// Merge stdout and stderr into a single [`ProcessOutput`].
fn combine(output: &std::process::Output) -> ProcessOutput {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }
    let status = output.status.code().unwrap_or(-1);
    ProcessOutput::new(status, text.trim_end().to_string())
}

fn with_paths(mut args: Vec<String>, paths: &[String]) -> Vec<String> {
    args.push("--".to_string());
    args.extend(paths.iter().cloned());
    args
}

fn strs(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

impl Vcs for Git {
    fn git_dir(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }

    fn work_dir(&self) -> PathBuf {
        self.work_dir.clone()
    }

    fn diff(&self, request: &DiffRequest) -> Result<String, GitError> {
        let args = request.to_args();
        tracing::debug!(?args, "running git diff");
        let output = self
            .command()
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GitError::Spawn {
                command: "diff".to_string(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn commit(&self, message_file: &Path, amend: bool) -> Result<ProcessOutput, GitError> {
        let mut args = strs(&["commit", "-F"]);
        args.push(message_file.to_string_lossy().into_owned());
        if amend {
            args.push("--amend".to_string());
        }
        self.run(&args)
    }

    fn checkout(&self, argv: &[String]) -> Result<ProcessOutput, GitError> {
        let mut args = strs(&["checkout"]);
        args.extend(argv.iter().cloned());
        self.run(&args)
    }

    fn apply_mailbox(&self, patch: &Path) -> Result<ProcessOutput, GitError> {
        let mut args = strs(&["am"]);
        args.push(patch.to_string_lossy().into_owned());
        self.run(&args)
    }

    fn apply_patch(
        &self,
        patch: &str,
        cached: bool,
        reverse: bool,
    ) -> Result<ProcessOutput, GitError> {
        let mut args = strs(&["apply"]);
        if cached {
            args.push("--cached".to_string());
        }
        if reverse {
            args.push("--reverse".to_string());
        }
        args.push("-".to_string());
        self.run_with_input(&args, patch)
    }

    fn tag(&self, request: &TagRequest) -> Result<ProcessOutput, GitError> {
        self.run(&request.to_args())
    }

    fn delete_branch(&self, name: &str) -> Result<ProcessOutput, GitError> {
        self.run(&strs(&["branch", "-D", name]))
    }

    fn rev_parse(&self, rev: &str) -> Result<String, GitError> {
        let object = self.repo.revparse_single(rev)?;
        Ok(object.id().to_string())
    }

    fn cherry_pick(&self, revs: &[String]) -> Result<ProcessOutput, GitError> {
        let mut args = strs(&["cherry-pick"]);
        args.extend(revs.iter().cloned());
        self.run(&args)
    }

    fn clone_repo(&self, url: &str, destination: &Path) -> Result<ProcessOutput, GitError> {
        let mut args = strs(&["clone", url]);
        args.push(destination.to_string_lossy().into_owned());
        self.run(&args)
    }

    fn add(&self, paths: &[String]) -> Result<ProcessOutput, GitError> {
        if paths.is_empty() {
            return Ok(ProcessOutput::ok());
        }
        self.run(&with_paths(strs(&["add"]), paths))
    }

    fn reset(&self, paths: &[String]) -> Result<ProcessOutput, GitError> {
        if self.head_is_unborn() {
            // Nothing to reset to; drop the entries from the index instead.
            let targets = if paths.is_empty() {
                vec![".".to_string()]
            } else {
                paths.to_vec()
            };
            return self.run(&with_paths(strs(&["rm", "--cached", "-r", "-q"]), &targets));
        }
        if paths.is_empty() {
            return self.run(&strs(&["reset", "-q"]));
        }
        self.run(&with_paths(strs(&["reset", "-q"]), paths))
    }

    fn remove_cached(&self, paths: &[String]) -> Result<ProcessOutput, GitError> {
        if paths.is_empty() {
            return Ok(ProcessOutput::ok());
        }
        self.run(&with_paths(strs(&["rm", "--cached"]), paths))
    }

    fn refresh_index(&self) -> Result<(), GitError> {
        // Exit status 1 only means some entries need updating.
        self.run(&strs(&["update-index", "-q", "--refresh"]))?;
        Ok(())
    }

    fn status(&self) -> Result<StatusLists, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let staged_mask = git2::Status::INDEX_NEW
            | git2::Status::INDEX_MODIFIED
            | git2::Status::INDEX_DELETED
            | git2::Status::INDEX_RENAMED
            | git2::Status::INDEX_TYPECHANGE;
        let modified_mask = git2::Status::WT_MODIFIED
            | git2::Status::WT_DELETED
            | git2::Status::WT_TYPECHANGE
            | git2::Status::WT_RENAMED;

        let mut lists = StatusLists::default();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            let status = entry.status();
            if status.is_conflicted() {
                lists.unmerged.push(path.to_string());
                continue;
            }
            if status.intersects(staged_mask) {
                lists.staged.push(path.to_string());
            }
            if status.intersects(modified_mask) {
                lists.modified.push(path.to_string());
            }
            if status.contains(git2::Status::WT_NEW) {
                lists.untracked.push(path.to_string());
            }
        }

        lists.staged.sort();
        lists.modified.sort();
        lists.untracked.sort();
        lists.unmerged.sort();
        Ok(lists)
    }

    fn current_branch(&self) -> Result<String, GitError> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().unwrap_or_default().to_string()),
            Ok(_) => Ok(String::new()),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .and_then(|t| t.strip_prefix("refs/heads/"))
                    .unwrap_or_default()
                    .to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn commit_message(&self, rev: &str) -> Result<String, GitError> {
        let commit = self.repo.revparse_single(rev)?.peel_to_commit()?;
        Ok(commit.message().unwrap_or_default().to_string())
    }

    fn format_patch(
        &self,
        rev: &str,
        start_number: usize,
        output_dir: &Path,
    ) -> Result<ProcessOutput, GitError> {
        let mut args = strs(&["format-patch", "-1", rev]);
        args.push(format!("--start-number={}", start_number));
        args.push("-o".to_string());
        args.push(output_dir.to_string_lossy().into_owned());
        self.run(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_args_for_staged_file() {
        let request = DiffRequest {
            reference: Some("HEAD^".into()),
            cached: true,
            context_lines: Some(5),
            find_renames: true,
            paths: vec!["src/lib.rs".into()],
            ..DiffRequest::default()
        };
        assert_eq!(
            request.to_args(),
            vec![
                "diff",
                "--no-color",
                "--unified=5",
                "-M",
                "--cached",
                "HEAD^",
                "--",
                "src/lib.rs"
            ]
        );
    }

    #[test]
    fn diff_args_for_stat_without_paths() {
        let request = DiffRequest {
            reference: Some("HEAD^!".into()),
            stat: true,
            ..DiffRequest::default()
        };
        assert_eq!(request.to_args(), vec!["diff", "--no-color", "--stat", "HEAD^!"]);
    }

    #[test]
    fn tag_args_signed_with_message() {
        let request = TagRequest {
            name: "v1.0".into(),
            revision: "HEAD".into(),
            sign: true,
            annotate: false,
            message_file: Some(PathBuf::from("/tmp/msg")),
        };
        assert_eq!(
            request.to_args(),
            vec!["tag", "-s", "-F", "/tmp/msg", "v1.0", "HEAD"]
        );
    }

    #[test]
    fn tag_args_lightweight() {
        let request = TagRequest {
            name: "v1.0".into(),
            revision: "main".into(),
            ..TagRequest::default()
        };
        assert_eq!(request.to_args(), vec!["tag", "v1.0", "main"]);
    }

    #[test]
    fn open_outside_repo_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Git::open(dir.path()).unwrap_err();
        assert!(matches!(err, GitError::NotARepo { .. }));
    }
}
