//! commands::apply
//!
//! Applying part of the displayed diff, and applying mailbox patches.

use std::path::{Path, PathBuf};

use super::diff::Diff;
use crate::core::patch::SelectionRequest;
use crate::core::types::HEAD;
use crate::engine::{Args, Command, CommandError, Context, Outcome};
use crate::git::DiffRequest;

/// Stage, unstage or revert the selected lines (or the hunk under the
/// cursor) of the displayed diff.
///
/// Apply failures are logged; the diff is always refreshed and the file
/// status rescanned afterwards.
#[derive(Debug)]
pub struct ApplyDiffSelection {
    staged: bool,
    selected: bool,
    offset: usize,
    selection: String,
    apply_to_worktree: bool,
}

impl ApplyDiffSelection {
    pub fn new(
        staged: bool,
        selected: bool,
        offset: usize,
        selection: impl Into<String>,
        apply_to_worktree: bool,
    ) -> Self {
        Self {
            staged,
            selected,
            offset,
            selection: selection.into(),
            apply_to_worktree,
        }
    }

    /// `(staged, selected, offset, selection, apply_to_worktree)`.
    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        const NAME: &str = "ApplyDiffSelection";
        let offset = args.int(NAME, 2)?.unwrap_or(0);
        let offset = usize::try_from(offset).map_err(|_| CommandError::BadArgument {
            command: NAME,
            index: 2,
            message: "offset must not be negative".to_string(),
        })?;
        Ok(Box::new(Self::new(
            args.flag(NAME, 0)?,
            args.flag(NAME, 1)?,
            offset,
            args.opt_text(NAME, 3)?.unwrap_or_default(),
            args.flag(NAME, 4)?,
        )))
    }

    fn request(&self, ctx: &Context) -> SelectionRequest {
        SelectionRequest {
            filename: ctx.model.filename(),
            diff_text: ctx.model.diff_text(),
            selected: if self.selected {
                self.selection.clone()
            } else {
                String::new()
            },
            offset: self.offset,
            staged: self.staged,
            apply_to_worktree: self.apply_to_worktree,
        }
    }
}

impl Command for ApplyDiffSelection {
    fn name(&self) -> &'static str {
        "ApplyDiffSelection"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let request = self.request(ctx);
        match ctx.applier().apply_selection(&ctx.model, &request) {
            Ok(out) => ctx.log(out.status, out.output),
            Err(err) => ctx.log(1, err.to_string()),
        }

        let paths: Vec<String> = request.filename.into_iter().collect();
        match Diff::new(ctx, &paths, self.staged) {
            Ok(mut refresh) => {
                refresh.execute(ctx)?;
            }
            Err(err) => tracing::warn!(%err, "diff refresh failed"),
        }
        ctx.rescan_files();
        Ok(Outcome::Done)
    }
}

/// Apply mailbox patches as commits, in sorted order.
#[derive(Debug)]
pub struct ApplyPatches {
    patches: Vec<PathBuf>,
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ApplyPatches {
    pub fn new(patches: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let mut patches: Vec<PathBuf> = patches.into_iter().map(Into::into).collect();
        patches.sort();
        Self { patches }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("ApplyPatches", 0)?)))
    }

    /// Patches in the order they will be applied.
    pub fn patches(&self) -> &[PathBuf] {
        &self.patches
    }
}

impl Command for ApplyPatches {
    fn name(&self) -> &'static str {
        "ApplyPatches"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let vcs = ctx.model.vcs();
        let total = self.patches.len();
        let orig_head = vcs.rev_parse(HEAD).unwrap_or_else(|err| {
            tracing::warn!(%err, "could not resolve HEAD before applying patches");
            HEAD.to_string()
        });

        let mut text = String::new();
        for (idx, patch) in self.patches.iter().enumerate() {
            let out = vcs.apply_mailbox(patch)?;
            ctx.log(out.status, out.output);

            if total > 1 {
                let stat = vcs.diff(&DiffRequest {
                    reference: Some("HEAD^!".to_string()),
                    stat: true,
                    ..DiffRequest::default()
                })?;
                text.push_str(&format!("Patch {}/{} - ", idx + 1, total));
                text.push_str(&format!("{}:\n{}\n\n", basename(patch), stat));
            }
        }

        text.push_str("Summary:\n");
        text.push_str(&vcs.diff(&DiffRequest {
            reference: Some(orig_head),
            stat: true,
            ..DiffRequest::default()
        })?);
        ctx.model.set_diff_text(text);
        ctx.rescan_files();

        let names: Vec<String> = self.patches.iter().map(|p| basename(p)).collect();
        ctx.prompter().information(
            "Patch(es) Applied",
            &format!("{} patch(es) applied:\n\n{}", total, names.join("\n")),
        );
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context, logs};
    use crate::core::model::Model;
    use crate::core::patch::{PatchError, SelectionApplier};
    use crate::core::types::{DiffMode, ProcessOutput};
    use crate::engine::prompt::PromptRecord;
    use crate::engine::{Event, ScriptedPrompter};
    use crate::git::mock::{MockVcs, OpKind, VcsOperation};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FakeApplier {
        requests: Rc<RefCell<Vec<SelectionRequest>>>,
        fail: bool,
        rejected: bool,
    }

    impl SelectionApplier for FakeApplier {
        fn apply_selection(
            &self,
            _model: &Model,
            request: &SelectionRequest,
        ) -> Result<ProcessOutput, PatchError> {
            self.requests.borrow_mut().push(request.clone());
            if self.fail {
                Err(PatchError::NothingSelected)
            } else if self.rejected {
                Ok(ProcessOutput::new(1, "error: patch failed: lib.rs:3"))
            } else {
                Ok(ProcessOutput::new(0, "applied"))
            }
        }
    }

    #[test]
    fn selection_request_is_scoped_to_current_file() {
        let vcs = MockVcs::new().with_diff("fresh diff");
        let applier = FakeApplier::default();
        let ctx = context(&vcs, &ScriptedPrompter::new()).with_applier(applier.clone());
        let events = ctx.bus.recorder();
        ctx.model.set_filename(Some("lib.rs".into()));
        ctx.model.set_diff_text("shown diff");

        ApplyDiffSelection::new(false, true, 12, "+new line", false)
            .execute(&ctx)
            .unwrap();

        let requests = applier.requests.borrow();
        assert_eq!(requests[0].filename.as_deref(), Some("lib.rs"));
        assert_eq!(requests[0].diff_text, "shown diff");
        assert_eq!(requests[0].selected, "+new line");
        assert_eq!(requests[0].offset, 12);
        assert_eq!(logs(&events), vec!["applied"]);
        assert_eq!(ctx.model.diff_text(), "fresh diff");
        assert_eq!(ctx.model.mode(), DiffMode::Worktree);
        assert!(vcs.operations().contains(&VcsOperation::Status));
    }

    #[test]
    fn unselected_text_is_not_sent() {
        let applier = FakeApplier::default();
        let ctx = context(&MockVcs::new(), &ScriptedPrompter::new()).with_applier(applier.clone());
        ctx.model.set_filename(Some("lib.rs".into()));

        ApplyDiffSelection::new(true, false, 0, "ignored", false)
            .execute(&ctx)
            .unwrap();

        assert_eq!(applier.requests.borrow()[0].selected, "");
        assert_eq!(ctx.model.mode(), DiffMode::Index);
    }

    #[test]
    fn apply_failure_still_refreshes_and_rescans() {
        let vcs = MockVcs::new();
        let applier = FakeApplier {
            fail: true,
            ..FakeApplier::default()
        };
        let ctx = context(&vcs, &ScriptedPrompter::new()).with_applier(applier);
        let events = ctx.bus.recorder();
        ctx.model.set_filename(Some("lib.rs".into()));

        ApplyDiffSelection::new(false, false, 0, "", false)
            .execute(&ctx)
            .unwrap();

        assert_eq!(logs(&events), vec![PatchError::NothingSelected.to_string()]);
        assert!(vcs.operations().contains(&VcsOperation::Status));
    }

    #[test]
    fn rejected_hunk_logs_status_and_still_refreshes() {
        let vcs = MockVcs::new().with_diff("fresh diff");
        let applier = FakeApplier {
            rejected: true,
            ..FakeApplier::default()
        };
        let ctx = context(&vcs, &ScriptedPrompter::new()).with_applier(applier);
        let events = ctx.bus.recorder();
        ctx.model.set_filename(Some("lib.rs".into()));
        ctx.model.set_diff_text("shown diff");

        ApplyDiffSelection::new(false, true, 0, "+x", false)
            .execute(&ctx)
            .unwrap();

        assert!(matches!(
            events.borrow().first(),
            Some(Event::LogCmd { status: 1, text }) if text == "error: patch failed: lib.rs:3"
        ));
        assert_eq!(ctx.model.diff_text(), "fresh diff");
        assert!(vcs.operations().contains(&VcsOperation::Status));
    }

    #[test]
    fn patches_apply_in_sorted_order() {
        let cmd = ApplyPatches::new(["/tmp/0002.patch", "/tmp/0001.patch"]);
        assert_eq!(
            cmd.patches(),
            &[PathBuf::from("/tmp/0001.patch"), PathBuf::from("/tmp/0002.patch")]
        );
    }

    #[test]
    fn failing_patch_does_not_halt_the_batch() {
        let vcs = MockVcs::new()
            .with_stat(" a | 1 +")
            .with_result(OpKind::ApplyMailbox, ProcessOutput::new(1, "conflict"))
            .with_result(OpKind::ApplyMailbox, ProcessOutput::new(0, "Applying: two"));
        let prompter = ScriptedPrompter::new();
        let ctx = context(&vcs, &prompter);
        let events = ctx.bus.recorder();

        ApplyPatches::new(["/p/0002.patch", "/p/0001.patch"])
            .execute(&ctx)
            .unwrap();

        let applied: Vec<PathBuf> = vcs
            .mutations()
            .into_iter()
            .filter_map(|op| match op {
                VcsOperation::ApplyMailbox { patch } => Some(patch),
                _ => None,
            })
            .collect();
        assert_eq!(
            applied,
            vec![PathBuf::from("/p/0001.patch"), PathBuf::from("/p/0002.patch")]
        );
        assert_eq!(logs(&events), vec!["conflict", "Applying: two"]);

        let text = ctx.model.diff_text();
        assert!(text.starts_with("Patch 1/2 - 0001.patch:\n a | 1 +\n\n"));
        assert!(text.contains("Patch 2/2 - 0002.patch:"));
        assert!(text.ends_with("Summary:\n a | 1 +"));

        assert_eq!(
            prompter.shown(),
            vec![PromptRecord::Information {
                title: "Patch(es) Applied".into(),
                message: "2 patch(es) applied:\n\n0001.patch\n0002.patch".into(),
            }]
        );
    }

    #[test]
    fn single_patch_only_shows_summary() {
        let vcs = MockVcs::new().with_stat("stat");
        let ctx = context(&vcs, &ScriptedPrompter::new());

        ApplyPatches::new(["one.patch"]).execute(&ctx).unwrap();

        assert_eq!(ctx.model.diff_text(), "Summary:\nstat");
    }
}
