//! commands::amend
//!
//! Entering and leaving amend mode.
//!
//! # Message Recovery
//!
//! Entering amend mode replaces the commit message with the message of
//! `HEAD`. Leaving it should give back whatever the user was writing before,
//! so every transition records the message that was live before it
//! ([`AmendMark::message_before`]) on the undo stack. Leaving searches the
//! stack from the newest record for the latest entering transition and
//! restores its message.
//!
//! Entering while already in amend mode inherits `message_before` from the
//! previous entering record, so entering twice recovers the same message as
//! entering once. Transitions refused by the merge guard are skipped by the
//! search.

use crate::core::types::{DiffMode, HEAD, HEAD_PARENT};
use crate::engine::{
    AmendMark, Args, Command, CommandError, Context, Event, Outcome, Reversal, StateChange,
};

/// Switch amend mode on or off.
#[derive(Debug)]
pub struct AmendMode {
    entering: bool,
    change: StateChange,
    old_message: String,
    new_message: String,
    message_before: String,
    skip: bool,
}

/// Most recent amend transition that was not refused.
fn latest_amend_mark(ctx: &Context) -> Option<AmendMark> {
    ctx.factory
        .history()
        .into_iter()
        .rev()
        .filter(|reversal| !reversal.skip)
        .find_map(|reversal| reversal.amend)
}

/// Most recent entering transition that was not refused.
fn latest_entering_mark(ctx: &Context) -> Option<AmendMark> {
    ctx.factory
        .history()
        .into_iter()
        .rev()
        .filter(|reversal| !reversal.skip)
        .filter_map(|reversal| reversal.amend)
        .find(|mark| mark.entering)
}

impl AmendMode {
    pub fn new(ctx: &Context, entering: bool) -> Self {
        let mut change = StateChange::capture(&ctx.model);
        let old_message = ctx.model.commit_message();
        let mut message_before = old_message.clone();

        let new_message = if entering {
            change.new.mode = DiffMode::Amend;
            change.new.head = HEAD_PARENT.to_string();
            if let Some(mark) = latest_amend_mark(ctx).filter(|mark| mark.entering) {
                message_before = mark.message_before;
            }
            ctx.model.previous_commit_message(None)
        } else {
            change.new.mode = DiffMode::None;
            change.new.head = HEAD.to_string();
            change.new.diff_text.clear();
            latest_entering_mark(ctx)
                .map(|mark| mark.message_before)
                .unwrap_or_else(|| old_message.clone())
        };

        Self {
            entering,
            change,
            old_message,
            new_message,
            message_before,
            skip: false,
        }
    }

    pub fn build(ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let entering = args.flag("AmendMode", 0)?;
        Ok(Box::new(Self::new(ctx, entering)))
    }
}

impl Command for AmendMode {
    fn name(&self) -> &'static str {
        "AmendMode"
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        if self.entering && ctx.model.merge_in_progress() {
            self.skip = true;
            ctx.bus.broadcast(&Event::Amend { entering: false });
            ctx.prompter().information(
                "Oops! Unmerged",
                "You are in the middle of a merge.\nYou cannot amend while merging.",
            );
            return Ok(Outcome::Aborted);
        }

        self.skip = false;
        ctx.bus.broadcast(&Event::Amend {
            entering: self.entering,
        });
        ctx.model.set_commit_message(self.new_message.clone());
        self.change.apply(&ctx.model);
        ctx.rescan_files();
        Ok(Outcome::Done)
    }

    fn reversal(&self) -> Option<Reversal> {
        let reversal = Reversal::new(self.name())
            .with_snapshot(self.change.old.clone())
            .with_commit_message(self.old_message.clone())
            .with_amend(AmendMark {
                entering: self.entering,
                message_before: self.message_before.clone(),
            })
            .rescanning();
        Some(if self.skip {
            reversal.skipped()
        } else {
            reversal
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::context;
    use crate::engine::prompt::PromptRecord;
    use crate::engine::{signals, ScriptedPrompter};
    use crate::git::mock::MockVcs;

    fn amend_ctx(vcs: &MockVcs, prompter: &ScriptedPrompter) -> Context {
        let ctx = context(vcs, prompter);
        crate::commands::register(&ctx.factory);
        ctx
    }

    fn set_amend(ctx: &Context, entering: bool) -> Outcome {
        ctx.dispatch(signals::AMEND_MODE, &Args::new().push(entering))
            .unwrap()
    }

    #[test]
    fn entering_loads_head_message() {
        let vcs = MockVcs::new().with_commit_message("HEAD", "Last commit\n");
        let ctx = amend_ctx(&vcs, &ScriptedPrompter::new());
        let events = ctx.bus.recorder();
        ctx.model.set_commit_message("draft");

        assert_eq!(set_amend(&ctx, true), Outcome::Done);

        assert_eq!(ctx.model.mode(), DiffMode::Amend);
        assert_eq!(ctx.model.head(), "HEAD^");
        assert_eq!(ctx.model.commit_message(), "Last commit\n");
        assert_eq!(events.borrow()[0], Event::Amend { entering: true });
    }

    #[test]
    fn leaving_recovers_the_draft() {
        let vcs = MockVcs::new().with_commit_message("HEAD", "Last commit\n");
        let ctx = amend_ctx(&vcs, &ScriptedPrompter::new());
        ctx.model.set_commit_message("draft");

        set_amend(&ctx, true);
        ctx.model.set_diff_text("something");
        set_amend(&ctx, false);

        assert_eq!(ctx.model.commit_message(), "draft");
        assert_eq!(ctx.model.mode(), DiffMode::None);
        assert_eq!(ctx.model.head(), "HEAD");
        assert_eq!(ctx.model.diff_text(), "");
    }

    #[test]
    fn entering_twice_recovers_like_entering_once() {
        let vcs = MockVcs::new().with_commit_message("HEAD", "Last commit\n");
        let ctx = amend_ctx(&vcs, &ScriptedPrompter::new());
        ctx.model.set_commit_message("draft");

        set_amend(&ctx, true);
        set_amend(&ctx, true);
        set_amend(&ctx, false);

        assert_eq!(ctx.model.commit_message(), "draft");
    }

    #[test]
    fn leaving_without_history_keeps_live_message() {
        let ctx = amend_ctx(&MockVcs::new(), &ScriptedPrompter::new());
        ctx.model.set_commit_message("live");
        set_amend(&ctx, false);
        assert_eq!(ctx.model.commit_message(), "live");
    }

    #[test]
    fn undo_restores_message_and_snapshot() {
        let vcs = MockVcs::new().with_commit_message("HEAD", "Last commit\n");
        let ctx = amend_ctx(&vcs, &ScriptedPrompter::new());
        ctx.model.set_commit_message("draft");
        ctx.model.set_diff_text("diff");
        let before = ctx.model.snapshot();

        set_amend(&ctx, true);
        assert!(ctx.undo().unwrap());

        assert_eq!(ctx.model.snapshot(), before);
        assert_eq!(ctx.model.commit_message(), "draft");
    }

    #[test]
    fn merge_guard_refuses_and_undo_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/MERGE_HEAD"), "abc\n").unwrap();
        let vcs = MockVcs::new()
            .with_work_dir(dir.path())
            .with_commit_message("HEAD", "Last commit\n");
        let prompter = ScriptedPrompter::new();
        let ctx = amend_ctx(&vcs, &prompter);
        let events = ctx.bus.recorder();
        ctx.model.set_commit_message("draft");
        ctx.model.set_diff_text("diff");
        let before = ctx.model.snapshot();

        assert_eq!(set_amend(&ctx, true), Outcome::Aborted);

        assert_eq!(ctx.model.snapshot(), before);
        assert_eq!(events.borrow()[0], Event::Amend { entering: false });
        assert!(matches!(
            &prompter.shown()[0],
            PromptRecord::Information { title, .. } if title == "Oops! Unmerged"
        ));

        ctx.model.set_commit_message("edited later");
        assert!(ctx.undo().unwrap());
        assert_eq!(ctx.model.commit_message(), "edited later");
        assert_eq!(ctx.model.snapshot(), before);
    }

    #[test]
    fn refused_entry_is_ignored_when_leaving() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let vcs = MockVcs::new()
            .with_work_dir(dir.path())
            .with_commit_message("HEAD", "Last commit\n");
        let ctx = amend_ctx(&vcs, &ScriptedPrompter::new());
        ctx.model.set_commit_message("first draft");
        set_amend(&ctx, true);

        let merge_head = dir.path().join(".git/MERGE_HEAD");
        std::fs::write(&merge_head, "abc\n").unwrap();
        set_amend(&ctx, true);
        std::fs::remove_file(&merge_head).unwrap();

        set_amend(&ctx, false);
        assert_eq!(ctx.model.commit_message(), "first draft");
    }
}
