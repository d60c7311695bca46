//! Property-based tests for undo and tool-variable expansion.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use stagehand::commands;
use stagehand::core::types::DiffMode;
use stagehand::engine::tool::{expand_vars, ToolEnv};
use stagehand::engine::{signals, Args, Context, ScriptedPrompter};
use stagehand::git::mock::MockVcs;

fn diff_mode() -> impl Strategy<Value = DiffMode> {
    prop_oneof![
        Just(DiffMode::None),
        Just(DiffMode::Worktree),
        Just(DiffMode::Index),
        Just(DiffMode::Amend),
        Just(DiffMode::Untracked),
    ]
}

/// Undoable events and their arguments.
fn undoable_event() -> impl Strategy<Value = (&'static str, Args)> {
    prop_oneof![
        "\\PC{0,40}".prop_map(|text| (signals::SET_DIFF_TEXT, Args::new().push(text))),
        Just((signals::SIGNOFF, Args::new())),
        Just((signals::LOAD_PREVIOUS_MESSAGE, Args::new().push("HEAD"))),
        any::<bool>().prop_map(|entering| (signals::AMEND_MODE, Args::new().push(entering))),
    ]
}

proptest! {
    #[test]
    fn undo_restores_state(
        diff in "\\PC{0,60}",
        filename in proptest::option::of("[a-z]{1,8}\\.rs"),
        mode in diff_mode(),
        message in "\\PC{0,40}",
        previous in "\\PC{0,40}",
        (event, args) in undoable_event(),
    ) {
        let vcs = MockVcs::new().with_commit_message("HEAD", &previous);
        let ctx = Context::in_memory(vcs, ScriptedPrompter::new());
        commands::register(&ctx.factory);
        ctx.model.set_diff_text(diff);
        ctx.model.set_filename(filename);
        ctx.model.set_mode(mode);
        ctx.model.set_commit_message(message.clone());
        let before = ctx.model.snapshot();

        ctx.dispatch(event, &args).unwrap();
        prop_assert!(ctx.undo().unwrap());

        prop_assert_eq!(ctx.model.snapshot(), before);
        prop_assert_eq!(ctx.model.commit_message(), message);
    }

    #[test]
    fn undo_unwinds_a_sequence(
        events in proptest::collection::vec(undoable_event(), 1..6),
        message in "\\PC{0,40}",
    ) {
        let vcs = MockVcs::new().with_commit_message("HEAD", "Previous\n");
        let ctx = Context::in_memory(vcs, ScriptedPrompter::new());
        commands::register(&ctx.factory);
        ctx.model.set_commit_message(message.clone());
        let before = ctx.model.snapshot();

        for (event, args) in &events {
            ctx.dispatch(event, args).unwrap();
        }
        prop_assert_eq!(ctx.factory.history_len(), events.len());
        while ctx.undo().unwrap() {}

        prop_assert_eq!(ctx.model.snapshot(), before);
        prop_assert_eq!(ctx.model.commit_message(), message);
    }

    #[test]
    fn expansion_without_dollar_is_identity(text in "[^$]{0,80}") {
        let mut env = ToolEnv::new();
        env.set("FILENAME", "x");
        prop_assert_eq!(expand_vars(&text, &env), text);
    }

    #[test]
    fn tool_vars_expand(name in "[a-z]{1,10}\\.txt") {
        let mut env = ToolEnv::new();
        env.set("FILENAME", name.clone());
        prop_assert_eq!(expand_vars("cat $FILENAME", &env), format!("cat {}", name));
        prop_assert_eq!(expand_vars("cat ${FILENAME}!", &env), format!("cat {}!", name));
    }
}
