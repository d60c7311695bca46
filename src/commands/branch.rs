//! commands::branch
//!
//! Checkout, cherry-pick, branch deletion and patch export.

use crate::core::types::ProcessOutput;
use crate::engine::{Args, Command, CommandError, Context, Outcome};

/// `git checkout` with caller-supplied arguments.
#[derive(Debug)]
pub struct Checkout {
    argv: Vec<String>,
    branch: bool,
}

impl Checkout {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            branch: false,
        }
    }

    /// Switch to `branch`; a full rescan follows so the branch name updates.
    pub fn branch(branch: impl Into<String>) -> Self {
        Self {
            argv: vec![branch.into()],
            branch: true,
        }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("Checkout", 0)?)))
    }

    pub fn build_branch(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::branch(args.text("CheckoutBranch", 0)?)))
    }
}

impl Command for Checkout {
    fn name(&self) -> &'static str {
        if self.branch {
            "CheckoutBranch"
        } else {
            "Checkout"
        }
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let out = ctx.model.vcs().checkout(&self.argv)?;
        ctx.log(out.status, out.output);
        ctx.model.set_diff_text("");
        if self.branch {
            ctx.rescan();
        } else {
            ctx.rescan_files();
        }
        Ok(Outcome::Done)
    }
}

/// Cherry-pick revisions onto the current branch.
#[derive(Debug)]
pub struct CherryPick {
    revs: Vec<String>,
}

impl CherryPick {
    pub fn new(revs: Vec<String>) -> Self {
        Self { revs }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("CherryPick", 0)?)))
    }
}

impl Command for CherryPick {
    fn name(&self) -> &'static str {
        "CherryPick"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let out = ctx.model.cherry_pick_list(&self.revs)?;
        ctx.log(out.status, out.output);
        ctx.rescan_files();
        Ok(Outcome::Done)
    }
}

/// Force-delete a local branch.
#[derive(Debug)]
pub struct DeleteBranch {
    branch: String,
}

impl DeleteBranch {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
        }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.text("DeleteBranch", 0)?)))
    }
}

impl Command for DeleteBranch {
    fn name(&self) -> &'static str {
        "DeleteBranch"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let out = ctx.model.delete_branch(&self.branch)?;
        let text = match out.output.strip_prefix("error:") {
            Some(rest) => format!("Error:{}", rest),
            None => format!("Info: {}", out.output),
        };
        ctx.log(out.status, text);
        Ok(Outcome::Done)
    }
}

/// Export revisions as numbered patch files under `patches/`.
///
/// Each exported revision is numbered by its position in the full series
/// `revs`; revisions outside the series continue after it.
#[derive(Debug)]
pub struct FormatPatch {
    to_export: Vec<String>,
    revs: Vec<String>,
}

impl FormatPatch {
    pub fn new(to_export: Vec<String>, revs: Vec<String>) -> Self {
        Self { to_export, revs }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(
            args.list("FormatPatch", 0)?,
            args.list("FormatPatch", 1)?,
        )))
    }

    fn start_number(&self, rev: &str, extra: &mut usize) -> usize {
        match self.revs.iter().position(|candidate| candidate == rev) {
            Some(idx) => idx + 1,
            None => {
                *extra += 1;
                self.revs.len() + *extra
            }
        }
    }
}

impl Command for FormatPatch {
    fn name(&self) -> &'static str {
        "FormatPatch"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let output_dir = ctx.model.paths().patches_dir();
        let mut extra = 0;
        let mut combined = ProcessOutput::ok();
        let mut outputs = Vec::new();

        for rev in &self.to_export {
            let number = self.start_number(rev, &mut extra);
            let out = ctx.model.vcs().format_patch(rev, number, &output_dir)?;
            if combined.status == 0 {
                combined.status = out.status;
            }
            if !out.output.is_empty() {
                outputs.push(out.output);
            }
        }

        combined.output = outputs.join("\n");
        ctx.log(combined.status, combined.output);
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context, logs};
    use crate::engine::ScriptedPrompter;
    use crate::git::mock::{MockVcs, OpKind, VcsOperation};
    use std::path::PathBuf;

    #[test]
    fn checkout_logs_clears_diff_and_rescans_files() {
        let vcs = MockVcs::new().with_result(OpKind::Checkout, ProcessOutput::new(0, "Updated 1 path"));
        let ctx = context(&vcs, &ScriptedPrompter::new());
        let events = ctx.bus.recorder();
        ctx.model.set_diff_text("stale");

        Checkout::new(vec!["HEAD".into(), "--".into(), "a.txt".into()])
            .execute(&ctx)
            .unwrap();

        assert_eq!(logs(&events), vec!["Updated 1 path"]);
        assert_eq!(ctx.model.diff_text(), "");
        let ops = vcs.operations();
        assert!(ops.contains(&VcsOperation::Status));
        assert!(!ops.contains(&VcsOperation::CurrentBranch));
    }

    #[test]
    fn checkout_branch_runs_full_rescan() {
        let vcs = MockVcs::new();
        let ctx = context(&vcs, &ScriptedPrompter::new());

        let mut cmd = Checkout::branch("topic");
        assert_eq!(cmd.name(), "CheckoutBranch");
        cmd.execute(&ctx).unwrap();

        assert!(vcs.operations().contains(&VcsOperation::Checkout {
            argv: vec!["topic".into()]
        }));
        assert!(vcs.operations().contains(&VcsOperation::CurrentBranch));
    }

    #[test]
    fn failed_checkout_still_rescans() {
        let vcs = MockVcs::new().with_result(
            OpKind::Checkout,
            ProcessOutput::new(1, "error: pathspec 'x' did not match"),
        );
        let ctx = context(&vcs, &ScriptedPrompter::new());
        let events = ctx.bus.recorder();

        Checkout::new(vec!["x".into()]).execute(&ctx).unwrap();

        assert_eq!(events.borrow().len(), 1);
        assert!(vcs.operations().contains(&VcsOperation::Status));
    }

    #[test]
    fn cherry_pick_logs_and_rescans() {
        let vcs = MockVcs::new();
        let ctx = context(&vcs, &ScriptedPrompter::new());

        CherryPick::new(vec!["abc".into(), "def".into()])
            .execute(&ctx)
            .unwrap();

        assert_eq!(
            vcs.mutations(),
            vec![VcsOperation::CherryPick {
                revs: vec!["abc".into(), "def".into()]
            }]
        );
        assert!(vcs.operations().contains(&VcsOperation::Status));
    }

    #[test]
    fn delete_branch_error_and_info_prefixes() {
        let vcs = MockVcs::new()
            .with_result(
                OpKind::DeleteBranch,
                ProcessOutput::new(1, "error: branch 'nope' not found."),
            )
            .with_result(
                OpKind::DeleteBranch,
                ProcessOutput::new(0, "Deleted branch topic (was abc)."),
            );
        let ctx = context(&vcs, &ScriptedPrompter::new());
        let events = ctx.bus.recorder();

        DeleteBranch::new("nope").execute(&ctx).unwrap();
        DeleteBranch::new("topic").execute(&ctx).unwrap();

        assert_eq!(
            logs(&events),
            vec![
                "Error: branch 'nope' not found.",
                "Info: Deleted branch topic (was abc).",
            ]
        );
    }

    #[test]
    fn format_patch_numbers_by_series_position() {
        let vcs = MockVcs::new()
            .with_work_dir("/repo")
            .with_result(OpKind::FormatPatch, ProcessOutput::new(0, "patches/0002-b.patch"))
            .with_result(OpKind::FormatPatch, ProcessOutput::new(0, "patches/0004-x.patch"));
        let ctx = context(&vcs, &ScriptedPrompter::new());
        let events = ctx.bus.recorder();

        FormatPatch::new(
            vec!["b".into(), "x".into()],
            vec!["a".into(), "b".into(), "c".into()],
        )
        .execute(&ctx)
        .unwrap();

        assert_eq!(
            vcs.mutations(),
            vec![
                VcsOperation::FormatPatch {
                    rev: "b".into(),
                    start_number: 2,
                    output_dir: PathBuf::from("/repo/patches"),
                },
                VcsOperation::FormatPatch {
                    rev: "x".into(),
                    start_number: 4,
                    output_dir: PathBuf::from("/repo/patches"),
                },
            ]
        );
        assert_eq!(
            logs(&events),
            vec!["patches/0002-b.patch\npatches/0004-x.patch"]
        );
    }
}
