//! engine::signals
//!
//! Event names accepted by the dispatch table.

pub const AMEND_MODE: &str = "amend_mode";
pub const APPLY_DIFF_SELECTION: &str = "apply_diff_selection";
pub const APPLY_PATCHES: &str = "apply_patches";
pub const CHECKOUT: &str = "checkout";
pub const CHECKOUT_BRANCH: &str = "checkout_branch";
pub const CHERRY_PICK: &str = "cherry_pick";
pub const CLONE: &str = "clone";
pub const COMMIT: &str = "commit";
pub const DELETE: &str = "delete";
pub const DELETE_BRANCH: &str = "delete_branch";
pub const DIFF: &str = "diff";
pub const DIFF_STAGED: &str = "diff_staged";
pub const DIFFSTAT: &str = "diffstat";
pub const DIFFTOOL: &str = "difftool";
pub const EDIT: &str = "edit";
pub const FORMAT_PATCH: &str = "format_patch";
pub const IGNORE: &str = "ignore";
pub const LOAD_COMMIT_MESSAGE: &str = "load_commit_message";
pub const LOAD_COMMIT_TEMPLATE: &str = "load_commit_template";
pub const LOAD_PREVIOUS_MESSAGE: &str = "load_previous_message";
pub const MERGETOOL: &str = "mergetool";
pub const MODIFIED_SUMMARY: &str = "modified_summary";
pub const OPEN_DEFAULT_APP: &str = "open_default_app";
pub const OPEN_REPO: &str = "open_repo";
pub const RESCAN: &str = "rescan";
pub const RESCAN_AND_REFRESH: &str = "rescan_and_refresh";
pub const RESET_MODE: &str = "reset_mode";
pub const RUN_CONFIG_ACTION: &str = "run_config_action";
pub const SET_CONFIG: &str = "set_config";
pub const SET_DIFF_TEXT: &str = "set_diff_text";
pub const SHOW_UNTRACKED: &str = "show_untracked";
pub const SIGNOFF: &str = "signoff";
pub const STAGE: &str = "stage";
pub const STAGE_MODIFIED: &str = "stage_modified";
pub const STAGE_UNMERGED: &str = "stage_unmerged";
pub const STAGE_UNTRACKED: &str = "stage_untracked";
pub const STAGED_SUMMARY: &str = "staged_summary";
pub const TAG: &str = "tag";
pub const UNSTAGE: &str = "unstage";
pub const UNSTAGE_ALL: &str = "unstage_all";
pub const UNSTAGE_SELECTED: &str = "unstage_selected";
pub const UNTRACK: &str = "untrack";
pub const UNTRACKED_SUMMARY: &str = "untracked_summary";
pub const UPDATE_FILE_STATUS: &str = "update_file_status";
pub const VISUALIZE_ALL: &str = "visualize_all";
pub const VISUALIZE_CURRENT: &str = "visualize_current";
pub const VISUALIZE_PATHS: &str = "visualize_paths";
pub const VISUALIZE_REVISION: &str = "visualize_revision";
