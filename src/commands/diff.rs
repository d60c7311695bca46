//! commands::diff
//!
//! Commands that change what the diff viewer shows.
//!
//! Diff text is computed when the command is constructed, so executing one
//! of these only writes its [`StateChange`] into the model.

use crate::core::types::DiffMode;
use crate::engine::{Args, Command, CommandError, Context, Outcome, Reversal, StateChange};
use crate::git::DiffRequest;

/// A diff request with the displayed-diff defaults: `-M` and the configured
/// number of context lines.
pub(crate) fn display_request(ctx: &Context) -> DiffRequest {
    DiffRequest {
        context_lines: Some(ctx.diff_context()),
        find_renames: true,
        ..DiffRequest::default()
    }
}

/// Show the diff for the first of `paths`, worktree against index or, when
/// cached, index against `head`.
#[derive(Debug)]
pub struct Diff {
    change: StateChange,
    cached: bool,
}

impl Diff {
    pub fn new(ctx: &Context, paths: &[String], cached: bool) -> Result<Self, CommandError> {
        let mut change = StateChange::capture(&ctx.model);
        if let Some(first) = paths.first() {
            let request = DiffRequest {
                reference: cached.then(|| ctx.model.head()),
                cached,
                paths: vec![first.clone()],
                ..display_request(ctx)
            };
            change.new.diff_text = ctx.model.vcs().diff(&request)?;
            change.new.filename = Some(first.clone());
            change.new.mode = if cached {
                DiffMode::Index
            } else {
                DiffMode::Worktree
            };
        }
        Ok(Self { change, cached })
    }

    pub fn build(ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let paths = args.list("Diff", 0)?;
        let cached = args.flag("Diff", 1)?;
        Ok(Box::new(Self::new(ctx, &paths, cached)?))
    }

    pub fn build_staged(ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let paths = args.list("DiffStaged", 0)?;
        Ok(Box::new(Self::new(ctx, &paths, true)?))
    }
}

impl Command for Diff {
    fn name(&self) -> &'static str {
        if self.cached {
            "DiffStaged"
        } else {
            "Diff"
        }
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        self.change.apply(&ctx.model);
        Ok(Outcome::Done)
    }
}

/// Diffstat of the worktree against `head`.
#[derive(Debug)]
pub struct Diffstat {
    change: StateChange,
}

impl Diffstat {
    pub fn new(ctx: &Context) -> Result<Self, CommandError> {
        let mut change = StateChange::capture(&ctx.model);
        let request = DiffRequest {
            reference: Some(ctx.model.head()),
            stat: true,
            ..display_request(ctx)
        };
        change.new.diff_text = ctx.model.vcs().diff(&request)?;
        change.new.mode = DiffMode::Worktree;
        Ok(Self { change })
    }

    pub fn build(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(ctx)?))
    }
}

impl Command for Diffstat {
    fn name(&self) -> &'static str {
        "Diffstat"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        self.change.apply(&ctx.model);
        Ok(Outcome::Done)
    }
}

/// Staged changes against `head` as a stat followed by the patch.
#[derive(Debug)]
pub struct DiffStagedSummary {
    change: StateChange,
}

impl DiffStagedSummary {
    pub fn new(ctx: &Context) -> Result<Self, CommandError> {
        let mut change = StateChange::capture(&ctx.model);
        let request = DiffRequest {
            reference: Some(ctx.model.head()),
            cached: true,
            patch_with_stat: true,
            ..display_request(ctx)
        };
        change.new.diff_text = ctx.model.vcs().diff(&request)?;
        change.new.mode = DiffMode::Index;
        Ok(Self { change })
    }

    pub fn build(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(ctx)?))
    }
}

impl Command for DiffStagedSummary {
    fn name(&self) -> &'static str {
        "DiffStagedSummary"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        self.change.apply(&ctx.model);
        Ok(Outcome::Done)
    }
}

/// Raw content of an untracked file.
#[derive(Debug)]
pub struct ShowUntracked {
    change: StateChange,
}

impl ShowUntracked {
    pub fn new(ctx: &Context, paths: &[String]) -> Self {
        let mut change = StateChange::capture(&ctx.model);
        match paths.first() {
            Some(first) => {
                change.new.diff_text = std::fs::read_to_string(ctx.model.worktree_path(first))
                    .unwrap_or_else(|err| {
                        tracing::debug!(path = %first, %err, "untracked file unreadable");
                        String::new()
                    });
                change.new.filename = Some(first.clone());
            }
            None => {
                change.new.diff_text = String::new();
                change.new.filename = None;
            }
        }
        change.new.mode = DiffMode::Untracked;
        Self { change }
    }

    pub fn build(ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let paths = args.list("ShowUntracked", 0)?;
        Ok(Box::new(Self::new(ctx, &paths)))
    }
}

impl Command for ShowUntracked {
    fn name(&self) -> &'static str {
        "ShowUntracked"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        self.change.apply(&ctx.model);
        Ok(Outcome::Done)
    }
}

/// Summary of untracked files with suggested `.gitignore` rules.
#[derive(Debug)]
pub struct UntrackedSummary {
    change: StateChange,
}

impl UntrackedSummary {
    pub fn new(ctx: &Context) -> Self {
        let mut change = StateChange::capture(&ctx.model);
        change.new.diff_text = untracked_summary(&ctx.model.status().untracked);
        change.new.mode = DiffMode::Untracked;
        Self { change }
    }

    pub fn build(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(ctx)))
    }
}

impl Command for UntrackedSummary {
    fn name(&self) -> &'static str {
        "UntrackedSummary"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        self.change.apply(&ctx.model);
        Ok(Outcome::Done)
    }
}

fn untracked_summary(untracked: &[String]) -> String {
    let suffix = if untracked.len() == 1 { "" } else { "s" };
    let mut text = format!("# {} untracked file{}\n", untracked.len(), suffix);
    if !untracked.is_empty() {
        text.push_str(&format!("# possible .gitignore rule{}:\n", suffix));
        for path in untracked {
            text.push('/');
            text.push_str(path);
            text.push('\n');
        }
    }
    text
}

/// Replace the diff text.
#[derive(Debug)]
pub struct SetDiffText {
    change: StateChange,
}

impl SetDiffText {
    pub fn new(ctx: &Context, text: impl Into<String>) -> Self {
        let mut change = StateChange::capture(&ctx.model);
        change.new.diff_text = text.into();
        Self { change }
    }

    pub fn build(ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let text = args.opt_text("SetDiffText", 0)?.unwrap_or_default();
        Ok(Box::new(Self::new(ctx, text)))
    }
}

impl Command for SetDiffText {
    fn name(&self) -> &'static str {
        "SetDiffText"
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        self.change.apply(&ctx.model);
        Ok(Outcome::Done)
    }

    fn reversal(&self) -> Option<Reversal> {
        Some(Reversal::new(self.name()).with_snapshot(self.change.old.clone()))
    }
}

/// Back to the plain state: no mode, `HEAD`, empty diff.
#[derive(Debug)]
pub struct ResetMode {
    change: StateChange,
}

impl ResetMode {
    pub fn new(ctx: &Context) -> Self {
        let mut change = StateChange::capture(&ctx.model);
        change.new.mode = DiffMode::None;
        change.new.head = crate::core::types::HEAD.to_string();
        change.new.diff_text.clear();
        Self { change }
    }

    pub fn build(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(ctx)))
    }
}

impl Command for ResetMode {
    fn name(&self) -> &'static str {
        "ResetMode"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        self.change.apply(&ctx.model);
        ctx.rescan_files();
        Ok(Outcome::Done)
    }
}
