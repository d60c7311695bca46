//! commands
//!
//! The command catalog.
//!
//! # Architecture
//!
//! Each submodule holds a family of related commands. Every command has a
//! typed `new` constructor for direct use and a `build` function matching
//! [`Constructor`] for the dispatch table; [`register`] maps every event
//! name in [`signals`] to its `build` function.
//!
//! # Modules
//!
//! - [`amend`] - Entering and leaving amend mode
//! - [`diff`] - Displayed-diff commands
//! - [`stage`] - Staging, unstaging, untracking
//! - [`commit`] - Commit, sign-off, commit messages, tags
//! - [`apply`] - Diff-selection apply and mailbox patches
//! - [`branch`] - Checkout, cherry-pick, branch deletion, patch export
//! - [`external`] - Editors, diff/merge tools, history browsers, clones
//! - [`files`] - `.gitignore` additions and file deletion
//! - [`status`] - Rescans
//! - [`tool`] - User-configured tools
//! - [`config`] - Config changes with undo

pub mod amend;
pub mod apply;
pub mod branch;
pub mod commit;
pub mod config;
pub mod diff;
pub mod external;
pub mod files;
pub mod stage;
pub mod status;
pub mod tool;

use crate::engine::signals;
use crate::engine::{Constructor, Factory};

/// Every built-in event and its constructor.
pub const CATALOG: &[(&str, Constructor)] = &[
    (signals::AMEND_MODE, amend::AmendMode::build),
    (signals::APPLY_DIFF_SELECTION, apply::ApplyDiffSelection::build),
    (signals::APPLY_PATCHES, apply::ApplyPatches::build),
    (signals::CHECKOUT, branch::Checkout::build),
    (signals::CHECKOUT_BRANCH, branch::Checkout::build_branch),
    (signals::CHERRY_PICK, branch::CherryPick::build),
    (signals::CLONE, external::CloneRepo::build),
    (signals::COMMIT, commit::Commit::build),
    (signals::DELETE, files::Delete::build),
    (signals::DELETE_BRANCH, branch::DeleteBranch::build),
    (signals::DIFF, diff::Diff::build),
    (signals::DIFF_STAGED, diff::Diff::build_staged),
    (signals::DIFFSTAT, diff::Diffstat::build),
    (signals::DIFFTOOL, external::Difftool::build),
    (signals::EDIT, external::Edit::build),
    (signals::FORMAT_PATCH, branch::FormatPatch::build),
    (signals::IGNORE, files::Ignore::build),
    (signals::LOAD_COMMIT_MESSAGE, commit::LoadCommitMessage::build),
    (signals::LOAD_COMMIT_TEMPLATE, commit::LoadCommitMessage::build_template),
    (signals::LOAD_PREVIOUS_MESSAGE, commit::LoadPreviousMessage::build),
    (signals::MERGETOOL, external::Mergetool::build),
    (signals::MODIFIED_SUMMARY, diff::Diffstat::build),
    (signals::OPEN_DEFAULT_APP, external::OpenDefaultApp::build),
    (signals::OPEN_REPO, external::OpenRepo::build),
    (signals::RESCAN, status::Rescan::build),
    (signals::RESCAN_AND_REFRESH, status::Rescan::build_refresh),
    (signals::RESET_MODE, diff::ResetMode::build),
    (signals::RUN_CONFIG_ACTION, tool::RunConfigAction::build),
    (signals::SET_CONFIG, config::SetConfig::build),
    (signals::SET_DIFF_TEXT, diff::SetDiffText::build),
    (signals::SHOW_UNTRACKED, diff::ShowUntracked::build),
    (signals::SIGNOFF, commit::SignOff::build),
    (signals::STAGE, stage::Stage::build),
    (signals::STAGE_MODIFIED, stage::Stage::build_modified),
    (signals::STAGE_UNMERGED, stage::Stage::build_unmerged),
    (signals::STAGE_UNTRACKED, stage::Stage::build_untracked),
    (signals::STAGED_SUMMARY, diff::DiffStagedSummary::build),
    (signals::TAG, commit::Tag::build),
    (signals::UNSTAGE, stage::Unstage::build),
    (signals::UNSTAGE_ALL, stage::Unstage::build_all),
    (signals::UNSTAGE_SELECTED, stage::Unstage::build_selected),
    (signals::UNTRACK, stage::Untrack::build),
    (signals::UNTRACKED_SUMMARY, diff::UntrackedSummary::build),
    (signals::UPDATE_FILE_STATUS, status::UpdateFileStatus::build),
    (signals::VISUALIZE_ALL, external::Visualize::build_all),
    (signals::VISUALIZE_CURRENT, external::Visualize::build_current),
    (signals::VISUALIZE_PATHS, external::Visualize::build_paths),
    (signals::VISUALIZE_REVISION, external::Visualize::build_revision),
];

/// Fill the dispatch table with the built-in catalog.
pub fn register(factory: &Factory) {
    for (event, constructor) in CATALOG {
        factory.register(event, *constructor);
    }
    tracing::info!(events = CATALOG.len(), "registered built-in commands");
}
