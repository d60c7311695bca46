//! commands::files
//!
//! Worktree file changes: `.gitignore` additions and deletion.
//! Filesystem failures are reported with a prompt, never returned.

use std::fs;

use crate::engine::{Args, Command, CommandError, Context, Outcome};

/// Prepend paths to `.gitignore`.
#[derive(Debug)]
pub struct Ignore {
    paths: Vec<String>,
}

impl Ignore {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("Ignore", 0)?)))
    }
}

impl Command for Ignore {
    fn name(&self) -> &'static str {
        "Ignore"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let additions: String = self.paths.iter().map(|path| format!("{}\n", path)).collect();
        if additions.is_empty() {
            return Ok(Outcome::Aborted);
        }

        let gitignore = ctx.model.paths().gitignore();
        let current = fs::read_to_string(&gitignore).unwrap_or_default();
        if let Err(err) = fs::write(&gitignore, format!("{}{}", additions, current)) {
            tracing::warn!(path = %gitignore.display(), %err, "cannot write .gitignore");
            ctx.prompter()
                .information("Error", &format!("Updating \"{}\" failed.", gitignore.display()));
            return Ok(Outcome::Aborted);
        }

        ctx.log(0, format!("Added to .gitignore:\n{}", additions));
        ctx.rescan_files();
        Ok(Outcome::Done)
    }
}

/// Delete files from the worktree.
#[derive(Debug)]
pub struct Delete {
    paths: Vec<String>,
}

impl Delete {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.list("Delete", 0)?)))
    }
}

impl Command for Delete {
    fn name(&self) -> &'static str {
        "Delete"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let mut removed = false;
        for path in self.paths.iter().filter(|path| !path.is_empty()) {
            match fs::remove_file(ctx.model.worktree_path(path)) {
                Ok(()) => removed = true,
                Err(err) => {
                    tracing::debug!(path = %path, %err, "delete failed");
                    ctx.prompter()
                        .information("Error", &format!("Deleting \"{}\" failed.", path));
                }
            }
        }
        if removed {
            ctx.rescan_files();
        }
        Ok(Outcome::Done)
    }
}
