//! commands::status
//!
//! Explicit rescans. Unlike bookkeeping rescans, a failure here is the
//! command's result and is returned to the caller.

use crate::engine::{Args, Command, CommandError, Context, Outcome};

/// Full status rescan, optionally refreshing the index first.
#[derive(Debug, Default)]
pub struct Rescan {
    refresh_index: bool,
}

impl Rescan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the index stat information before rescanning.
    pub fn refreshing() -> Self {
        Self {
            refresh_index: true,
        }
    }

    pub fn build(_ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new()))
    }

    pub fn build_refresh(_ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::refreshing()))
    }
}

impl Command for Rescan {
    fn name(&self) -> &'static str {
        if self.refresh_index {
            "RescanAndRefresh"
        } else {
            "Rescan"
        }
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        if self.refresh_index {
            ctx.model.vcs().refresh_index()?;
        }
        ctx.model.update_status()?;
        Ok(Outcome::Done)
    }
}

/// Rescan the file status lists only.
#[derive(Debug, Default)]
pub struct UpdateFileStatus;

impl UpdateFileStatus {
    pub fn build(_ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self))
    }
}

impl Command for UpdateFileStatus {
    fn name(&self) -> &'static str {
        "UpdateFileStatus"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        ctx.model.update_file_status()?;
        Ok(Outcome::Done)
    }
}
