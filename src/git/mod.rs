//! git
//!
//! The VCS collaborator.
//!
//! # Architecture
//!
//! This module is the only place that talks to git. Commands and the model
//! go through the [`Vcs`] trait; no other module imports `git2` or spawns
//! the `git` binary.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Status scans and commit/config reads (via `git2`)
//! - Mutations: commit, checkout, am, apply, tag, branch deletion,
//!   cherry-pick, clone, add/reset/rm (via the `git` binary)
//!
//! # Invariants
//!
//! - A nonzero exit from git is returned as data, never as an error
//! - Every subprocess runs with the working directory as its cwd

mod interface;
pub mod mock;

pub use interface::{DiffRequest, Git, GitError, RepoInfo, TagRequest, Vcs};
