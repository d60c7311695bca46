//! commands::stage
//!
//! Staging, unstaging and untracking paths.
//!
//! Each command announces what it is about to do on the bus, then lets the
//! model mutate the index and rescan.

use crate::engine::{Args, Command, CommandError, Context, Outcome};

/// Add paths to the index.
#[derive(Debug)]
pub struct Stage {
    name: &'static str,
    paths: Vec<String>,
}

impl Stage {
    pub fn new(paths: Vec<String>) -> Self {
        Self {
            name: "Stage",
            paths,
        }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("Stage", 0)?)))
    }

    /// Stage every modified path known at construction.
    pub fn build_modified(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self {
            name: "StageModified",
            paths: ctx.model.status().modified,
        }))
    }

    /// Stage every unmerged path known at construction.
    pub fn build_unmerged(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self {
            name: "StageUnmerged",
            paths: ctx.model.status().unmerged,
        }))
    }

    /// Stage every untracked path known at construction.
    pub fn build_untracked(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self {
            name: "StageUntracked",
            paths: ctx.model.status().untracked,
        }))
    }
}

impl Command for Stage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        ctx.log(0, format!("Staging: {}", self.paths.join(", ")));
        ctx.model.stage_paths(&self.paths)?;
        Ok(Outcome::Done)
    }
}

/// Remove paths (or everything) from the index.
#[derive(Debug)]
pub struct Unstage {
    name: &'static str,
    paths: Option<Vec<String>>,
}

impl Unstage {
    pub fn new(paths: Vec<String>) -> Self {
        Self {
            name: "Unstage",
            paths: Some(paths),
        }
    }

    /// Unstage everything.
    pub fn all() -> Self {
        Self {
            name: "UnstageAll",
            paths: None,
        }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("Unstage", 0)?)))
    }

    pub fn build_all(_ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::all()))
    }

    /// Unstage the staged paths in the current selection.
    pub fn build_selected(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self {
            name: "UnstageSelected",
            paths: Some(ctx.selection().staged()),
        }))
    }
}

impl Command for Unstage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        match &self.paths {
            Some(paths) => {
                ctx.log(0, format!("Unstaging: {}", paths.join(", ")));
                ctx.model.unstage_paths(paths)?;
            }
            None => {
                ctx.model.unstage_all()?;
            }
        }
        Ok(Outcome::Done)
    }
}

/// Stop tracking paths, keeping the files.
#[derive(Debug)]
pub struct Untrack {
    paths: Vec<String>,
}

impl Untrack {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("Untrack", 0)?)))
    }
}

impl Command for Untrack {
    fn name(&self) -> &'static str {
        "Untrack"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        ctx.log(0, format!("Untracking: {}", self.paths.join(", ")));
        let out = ctx.model.untrack_paths(&self.paths)?;
        ctx.log(out.status, out.output);
        Ok(Outcome::Done)
    }
}
