//! commands::external
//!
//! Commands that start other programs: editors, diff and merge tools,
//! history browsers, the desktop's default application, and new sessions.
//!
//! Programs are started through the context's [`Launcher`] and never waited
//! for. Commands with nothing to act on return [`Outcome::Aborted`] without
//! launching anything.
//!
//! [`Launcher`]: crate::engine::launch::Launcher

use std::path::PathBuf;

use crate::core::types::HEAD;
use crate::engine::launch::{editor_argv, split_command};
use crate::engine::{Args, Command, CommandError, Context, FailurePolicy, Outcome};

const DEFAULT_EDITOR: &str = "vi";
const DEFAULT_HISTORY_BROWSER: &str = "gitk";

/// `gui.editor`, else `$VISUAL`, else `$EDITOR`, else `vi`.
fn editor(ctx: &Context) -> String {
    ctx.config_get("gui.editor")
        .or_else(|| std::env::var("VISUAL").ok())
        .or_else(|| std::env::var("EDITOR").ok())
        .filter(|editor| !editor.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

fn history_browser(ctx: &Context) -> Result<Vec<String>, CommandError> {
    let browser = ctx.config_or("gui.historybrowser", DEFAULT_HISTORY_BROWSER);
    Ok(split_command(&browser)?)
}

/// `git difftool` on paths, against the index when `staged`.
#[derive(Debug)]
pub struct Difftool {
    staged: bool,
    paths: Vec<String>,
}

impl Difftool {
    pub fn new(staged: bool, paths: Vec<String>) -> Self {
        Self { staged, paths }
    }

    /// `(staged, paths)`.
    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(
            args.flag("Difftool", 0)?,
            args.list("Difftool", 1)?,
        )))
    }
}

impl Command for Difftool {
    fn name(&self) -> &'static str {
        "Difftool"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        if self.paths.is_empty() {
            return Ok(Outcome::Aborted);
        }
        let mut argv: Vec<String> = ["git", "difftool", "--no-prompt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        if self.staged {
            argv.push("--cached".to_string());
        }
        let head = ctx.model.head();
        if head != HEAD {
            argv.push(head);
        }
        argv.push("--".to_string());
        argv.extend(self.paths.iter().cloned());
        ctx.launcher().spawn(&argv)?;
        Ok(Outcome::Done)
    }
}

/// `git mergetool` on paths.
#[derive(Debug)]
pub struct Mergetool {
    paths: Vec<String>,
}

impl Mergetool {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("Mergetool", 0)?)))
    }
}

impl Command for Mergetool {
    fn name(&self) -> &'static str {
        "Mergetool"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        if self.paths.is_empty() {
            return Ok(Outcome::Aborted);
        }
        let mut argv: Vec<String> = ["git", "mergetool", "--no-prompt", "--"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        argv.extend(self.paths.iter().cloned());
        ctx.launcher().spawn(&argv)?;
        Ok(Outcome::Done)
    }
}

/// Open files in the configured editor, optionally at a line.
#[derive(Debug)]
pub struct Edit {
    paths: Vec<String>,
    line: Option<u32>,
}

impl Edit {
    pub fn new(paths: Vec<String>, line: Option<u32>) -> Self {
        Self { paths, line }
    }

    /// `(paths, line)`.
    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let line = args
            .int("Edit", 1)?
            .and_then(|line| u32::try_from(line).ok());
        Ok(Box::new(Self::new(args.list("Edit", 0)?, line)))
    }
}

impl Command for Edit {
    fn name(&self) -> &'static str {
        "Edit"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let Some(first) = self.paths.first() else {
            return Ok(Outcome::Aborted);
        };
        if !ctx.model.worktree_path(first).exists() {
            tracing::debug!(path = %first, "not editing missing file");
            return Ok(Outcome::Aborted);
        }
        let argv = editor_argv(&editor(ctx), &self.paths, self.line)?;
        ctx.launcher().spawn(&argv)?;
        Ok(Outcome::Done)
    }
}

/// Open files with the desktop's default application.
#[derive(Debug)]
pub struct OpenDefaultApp {
    paths: Vec<String>,
}

impl OpenDefaultApp {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("OpenDefaultApp", 0)?)))
    }
}

impl Command for OpenDefaultApp {
    fn name(&self) -> &'static str {
        "OpenDefaultApp"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        if self.paths.is_empty() {
            return Ok(Outcome::Aborted);
        }
        let paths: Vec<PathBuf> = self
            .paths
            .iter()
            .map(|path| ctx.model.worktree_path(path))
            .collect();
        ctx.launcher().open_default(&paths)?;
        Ok(Outcome::Done)
    }
}

/// Start a new session on another repository.
#[derive(Debug)]
pub struct OpenRepo {
    dir: PathBuf,
}

impl OpenRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.text("OpenRepo", 0)?)))
    }
}

impl Command for OpenRepo {
    fn name(&self) -> &'static str {
        "OpenRepo"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        ctx.model.set_directory(self.dir.clone());
        ctx.launcher().spawn_instance(&self.dir)?;
        Ok(Outcome::Done)
    }
}

/// Clone a repository, then optionally start a session in it.
#[derive(Debug)]
pub struct CloneRepo {
    url: String,
    destination: PathBuf,
    spawn: bool,
}

impl CloneRepo {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>, spawn: bool) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            spawn,
        }
    }

    /// `(url, destination, spawn)`; `spawn` defaults to true.
    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let spawn = match args.get(2) {
            None | Some(crate::engine::Arg::Nil) => true,
            Some(_) => args.flag("Clone", 2)?,
        };
        Ok(Box::new(Self::new(
            args.text("Clone", 0)?,
            args.text("Clone", 1)?,
            spawn,
        )))
    }
}

impl Command for CloneRepo {
    fn name(&self) -> &'static str {
        "Clone"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Abort
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let out = ctx.model.vcs().clone_repo(&self.url, &self.destination)?;
        let permitted = self.failure_policy().permits(out.status);
        ctx.log(out.status, out.output);
        if self.spawn && permitted {
            ctx.launcher().spawn_instance(&self.destination)?;
        }
        Ok(Outcome::Done)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    All,
    Current,
    Paths(Vec<String>),
    Revision {
        revision: String,
        paths: Vec<String>,
    },
}

/// Open the history browser.
#[derive(Debug)]
pub struct Visualize {
    target: Target,
}

impl Visualize {
    pub fn all() -> Self {
        Self {
            target: Target::All,
        }
    }

    pub fn current() -> Self {
        Self {
            target: Target::Current,
        }
    }

    pub fn paths(paths: Vec<String>) -> Self {
        Self {
            target: Target::Paths(paths),
        }
    }

    pub fn revision(revision: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            target: Target::Revision {
                revision: revision.into(),
                paths,
            },
        }
    }

    pub fn build_all(_ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::all()))
    }

    pub fn build_current(_ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::current()))
    }

    pub fn build_paths(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::paths(args.list("VisualizePaths", 0)?)))
    }

    /// `(revision, paths)`.
    pub fn build_revision(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::revision(
            args.opt_text("VisualizeRevision", 0)?.unwrap_or_default(),
            args.list("VisualizeRevision", 1)?,
        )))
    }
}

impl Command for Visualize {
    fn name(&self) -> &'static str {
        match self.target {
            Target::All => "VisualizeAll",
            Target::Current => "VisualizeCurrent",
            Target::Paths(_) => "VisualizePaths",
            Target::Revision { .. } => "VisualizeRevision",
        }
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let mut argv = history_browser(ctx)?;
        match &self.target {
            Target::All => argv.push("--all".to_string()),
            Target::Current => {
                let branch = ctx.model.current_branch();
                argv.push(if branch.is_empty() {
                    HEAD.to_string()
                } else {
                    branch
                });
            }
            Target::Paths(paths) => argv.extend(paths.iter().cloned()),
            Target::Revision { revision, paths } => {
                if !revision.is_empty() {
                    argv.push(revision.clone());
                }
                if !paths.is_empty() {
                    argv.push("--".to_string());
                    argv.extend(paths.iter().cloned());
                }
            }
        }
        ctx.launcher().spawn(&argv)?;
        Ok(Outcome::Done)
    }
}
