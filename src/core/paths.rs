//! core::paths
//!
//! Centralized path routing for files the commands touch.
//!
//! # Architecture
//!
//! Commands never join paths onto the git or working directory themselves;
//! they ask [`RepoPaths`]. This keeps the locations of merge markers, the
//! ignore file and exported patches in one place.
//!
//! # Example
//!
//! ```
//! use stagehand::core::paths::RepoPaths;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(PathBuf::from("/repo/.git"), PathBuf::from("/repo"));
//!
//! assert_eq!(paths.merge_head(), PathBuf::from("/repo/.git/MERGE_HEAD"));
//! assert_eq!(paths.gitignore(), PathBuf::from("/repo/.gitignore"));
//! ```

use std::path::{Path, PathBuf};

use crate::git::Vcs;

/// Locations derived from a repository's git and working directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    git_dir: PathBuf,
    work_dir: PathBuf,
}

impl RepoPaths {
    /// Create from explicit directories.
    pub fn new(git_dir: PathBuf, work_dir: PathBuf) -> Self {
        Self { git_dir, work_dir }
    }

    /// Create from a VCS handle.
    pub fn from_vcs(vcs: &dyn Vcs) -> Self {
        Self::new(vcs.git_dir(), vcs.work_dir())
    }

    /// The git directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The working directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Marker present while a merge is in progress.
    pub fn merge_head(&self) -> PathBuf {
        self.git_dir.join("MERGE_HEAD")
    }

    /// The top-level ignore file.
    pub fn gitignore(&self) -> PathBuf {
        self.work_dir.join(".gitignore")
    }

    /// Directory that `FormatPatch` exports into.
    pub fn patches_dir(&self) -> PathBuf {
        self.work_dir.join("patches")
    }

    /// Resolve a repo-relative path against the working directory.
    pub fn worktree_file(&self, relative: &str) -> PathBuf {
        self.work_dir.join(relative)
    }
}
