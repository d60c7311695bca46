//! commands::commit
//!
//! Committing, commit-message editing, and tags.
//!
//! # Message Files
//!
//! Git reads commit and tag messages from a file. The message is written to
//! a [`tempfile::NamedTempFile`], which removes itself when dropped, so the
//! file is gone after the call whatever git reported.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::diff::ResetMode;
use crate::engine::{
    Args, Command, CommandError, Context, FailurePolicy, Outcome, Reversal,
};
use crate::git::TagRequest;

fn message_file(prefix: &str, message: &str) -> Result<NamedTempFile, CommandError> {
    let mut file = tempfile::Builder::new().prefix(prefix).tempfile()?;
    file.write_all(message.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Commit the index.
#[derive(Debug)]
pub struct Commit {
    amend: bool,
    message: String,
}

impl Commit {
    pub fn new(amend: bool, message: impl Into<String>) -> Self {
        Self {
            amend,
            message: message.into(),
        }
    }

    /// `(amend, message)`; without a message the model's message is used.
    pub fn build(ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let amend = args.flag("Commit", 0)?;
        let message = match args.opt_text("Commit", 1)? {
            Some(message) => message,
            None => ctx.model.commit_message(),
        };
        Ok(Box::new(Self::new(amend, message)))
    }
}

impl Command for Commit {
    fn name(&self) -> &'static str {
        "Commit"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Abort
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let file = message_file("stagehand-commitmsg-", &self.message)?;
        let out = ctx.model.vcs().commit(file.path(), self.amend)?;
        drop(file);

        if self.failure_policy().permits(out.status) {
            ResetMode::new(ctx).execute(ctx)?;
            ctx.model.set_commit_message("");
            ctx.log(out.status, format!("Commit: {}", out.output));
        } else {
            ctx.log(out.status, format!("Commit failed: {}", out.output));
        }
        Ok(Outcome::Done)
    }
}

/// Append a `Signed-off-by` trailer to the commit message.
#[derive(Debug)]
pub struct SignOff {
    old_message: String,
}

impl SignOff {
    pub fn new(ctx: &Context) -> Self {
        Self {
            old_message: ctx.model.commit_message(),
        }
    }

    pub fn build(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(ctx)))
    }

    fn trailer(ctx: &Context) -> String {
        let user = whoami::username();
        let name = ctx.config_get("user.name").unwrap_or_else(|| user.clone());
        let email = ctx.config_get("user.email").unwrap_or_else(|| {
            let host = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());
            format!("{}@{}", user, host)
        });
        format!("\nSigned-off-by: {} <{}>", name, email)
    }
}

impl Command for SignOff {
    fn name(&self) -> &'static str {
        "SignOff"
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let trailer = Self::trailer(ctx);
        let message = ctx.model.commit_message();
        if !message.contains(&trailer) {
            ctx.model.set_commit_message(format!("{}\n{}", message, trailer));
        }
        Ok(Outcome::Done)
    }

    fn reversal(&self) -> Option<Reversal> {
        Some(Reversal::new(self.name()).with_commit_message(self.old_message.clone()))
    }
}

/// Load the commit message from a file.
#[derive(Debug)]
pub struct LoadCommitMessage {
    name: &'static str,
    path: Option<PathBuf>,
    old_message: String,
    old_directory: PathBuf,
}

impl LoadCommitMessage {
    pub fn new(ctx: &Context, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let path = if path.as_os_str().is_empty() {
            None
        } else {
            Some(resolve(ctx, path))
        };
        Self::with_path(ctx, "LoadCommitMessage", path)
    }

    /// Load the file named by `commit.template`.
    pub fn template(ctx: &Context) -> Self {
        let path = ctx
            .config_get("commit.template")
            .map(|raw| resolve(ctx, &expand_home(&raw)));
        Self::with_path(ctx, "LoadCommitTemplate", path)
    }

    fn with_path(ctx: &Context, name: &'static str, path: Option<PathBuf>) -> Self {
        Self {
            name,
            path,
            old_message: ctx.model.commit_message(),
            old_directory: ctx.model.directory(),
        }
    }

    pub fn build(ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let path = args.opt_text("LoadCommitMessage", 0)?.unwrap_or_default();
        Ok(Box::new(Self::new(ctx, path)))
    }

    pub fn build_template(ctx: &Context, _args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::template(ctx)))
    }
}

fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

fn resolve(ctx: &Context, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        ctx.model.vcs().work_dir().join(path)
    }
}

impl Command for LoadCommitMessage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let Some(path) = &self.path else {
            if self.name == "LoadCommitTemplate" {
                return Err(CommandError::usage(
                    "Error: unconfigured commit template",
                    "A commit template has not been configured.\n\
                     Use \"git config\" to define \"commit.template\"\n\
                     so that it points to a commit template.",
                ));
            }
            return Err(CommandError::usage(
                "Error: cannot find commit template",
                ": No such file or directory.",
            ));
        };

        let missing = || {
            CommandError::usage(
                "Error: cannot find commit template",
                format!("{}: No such file or directory.", path.display()),
            )
        };
        if !path.is_file() {
            return Err(missing());
        }
        let message = std::fs::read_to_string(path).map_err(|_| missing())?;

        if let Some(parent) = path.parent() {
            ctx.model.set_directory(parent);
        }
        ctx.model.set_commit_message(message);
        Ok(Outcome::Done)
    }

    fn reversal(&self) -> Option<Reversal> {
        Some(
            Reversal::new(self.name)
                .with_commit_message(self.old_message.clone())
                .with_directory(self.old_directory.clone()),
        )
    }
}

/// Load the message of an earlier commit.
#[derive(Debug)]
pub struct LoadPreviousMessage {
    old_message: String,
    new_message: String,
}

impl LoadPreviousMessage {
    pub fn new(ctx: &Context, rev: &str) -> Self {
        Self {
            old_message: ctx.model.commit_message(),
            new_message: ctx.model.previous_commit_message(Some(rev)),
        }
    }

    pub fn build(ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let rev = args.text("LoadPreviousMessage", 0)?;
        Ok(Box::new(Self::new(ctx, &rev)))
    }
}

impl Command for LoadPreviousMessage {
    fn name(&self) -> &'static str {
        "LoadPreviousMessage"
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        ctx.model.set_commit_message(self.new_message.clone());
        Ok(Outcome::Done)
    }

    fn reversal(&self) -> Option<Reversal> {
        Some(Reversal::new(self.name()).with_commit_message(self.old_message.clone()))
    }
}

/// Create a tag, annotated when a message is given.
#[derive(Debug)]
pub struct Tag {
    name: String,
    revision: String,
    sign: bool,
    message: String,
}

impl Tag {
    pub fn new(
        name: impl Into<String>,
        revision: impl Into<String>,
        sign: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
            sign,
            message: message.into(),
        }
    }

    /// `(name, revision, sign, message)`.
    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(
            args.text("Tag", 0)?,
            args.text("Tag", 1)?,
            args.flag("Tag", 2)?,
            args.opt_text("Tag", 3)?.unwrap_or_default(),
        )))
    }
}

impl Command for Tag {
    fn name(&self) -> &'static str {
        "Tag"
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Abort
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let mut log = format!("Tagging: \"{}\" as \"{}\"", self.revision, self.name);
        let file = if self.message.is_empty() {
            None
        } else {
            Some(message_file("stagehand-tag-message-", &self.message)?)
        };
        if self.sign {
            log.push_str(", GPG-signed");
        }

        let request = TagRequest {
            name: self.name.clone(),
            revision: self.revision.clone(),
            sign: self.sign,
            annotate: !self.sign && file.is_some(),
            message_file: file.as_ref().map(|f| f.path().to_path_buf()),
        };
        let out = ctx.model.vcs().tag(&request)?;
        drop(file);

        if !out.output.is_empty() {
            log.push_str("\nOutput:\n");
            log.push_str(&out.output);
        }
        ctx.log(out.status, log);
        if self.failure_policy().permits(out.status) {
            ctx.rescan();
        }
        Ok(Outcome::Done)
    }
}
