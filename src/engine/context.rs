//! engine::context
//!
//! Everything a command can reach, bundled and passed explicitly.
//!
//! # Architecture
//!
//! A [`Context`] owns the model, the notification bus, the factory (table,
//! undo stack and prompt hook), configuration, and the collaborators that
//! live outside the core: the selection, the program launcher and the diff
//! selection applier. There are no process-wide singletons; every command
//! constructor and every `execute` receives `&Context`.
//!
//! # Invariants
//!
//! - Single-threaded: the context is neither `Send` nor `Sync`
//! - Rescans requested as bookkeeping never fail the command; errors are
//!   logged with `tracing::warn!`

use std::cell::RefCell;
use std::rc::Rc;

use super::bus::Notifier;
use super::command::{CommandError, Outcome};
use super::factory::{Args, Factory};
use super::launch::{Launcher, RecordingLauncher, SystemLauncher};
use super::prompt::Prompter;
use super::selection::{Selection, StaticSelection};
use super::tool::ToolEnv;
use crate::core::config::{Config, ConfigSource};
use crate::core::model::Model;
use crate::core::patch::{HunkApplier, SelectionApplier};
use crate::git::Vcs;

/// Default `diff.context`.
pub const DEFAULT_DIFF_CONTEXT: u32 = 3;

/// The explicit command context.
pub struct Context {
    /// Repository state and git operations.
    pub model: Model,
    /// Notification bus.
    pub bus: Notifier,
    /// Dispatch table, undo stack and prompts.
    pub factory: Factory,
    /// Configuration.
    pub config: RefCell<Box<dyn ConfigSource>>,
    /// Environment of the last tool run.
    pub tool_env: RefCell<ToolEnv>,
    selection: Box<dyn Selection>,
    launcher: Box<dyn Launcher>,
    applier: Box<dyn SelectionApplier>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("model", &self.model)
            .field("factory", &self.factory)
            .finish()
    }
}

impl Context {
    /// Create a context with production collaborators.
    pub fn new(
        vcs: Rc<dyn Vcs>,
        config: Box<dyn ConfigSource>,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        let launcher = SystemLauncher::new(vcs.work_dir());
        Self {
            model: Model::new(vcs),
            bus: Notifier::new(),
            factory: Factory::new(prompter),
            config: RefCell::new(config),
            tool_env: RefCell::new(ToolEnv::new()),
            selection: Box::new(StaticSelection::new()),
            launcher: Box::new(launcher),
            applier: Box::new(HunkApplier),
        }
    }

    /// Create a context with in-memory config and a recording launcher.
    pub fn in_memory(vcs: impl Vcs + 'static, prompter: impl Prompter + 'static) -> Self {
        Self::new(Rc::new(vcs), Box::new(Config::default()), Box::new(prompter))
            .with_launcher(RecordingLauncher::new())
    }

    pub fn with_selection(mut self, selection: impl Selection + 'static) -> Self {
        self.selection = Box::new(selection);
        self
    }

    pub fn with_launcher(mut self, launcher: impl Launcher + 'static) -> Self {
        self.launcher = Box::new(launcher);
        self
    }

    pub fn with_applier(mut self, applier: impl SelectionApplier + 'static) -> Self {
        self.applier = Box::new(applier);
        self
    }

    pub fn with_config(self, config: impl ConfigSource + 'static) -> Self {
        *self.config.borrow_mut() = Box::new(config);
        self
    }

    pub fn selection(&self) -> &dyn Selection {
        self.selection.as_ref()
    }

    pub fn launcher(&self) -> &dyn Launcher {
        self.launcher.as_ref()
    }

    pub fn applier(&self) -> &dyn SelectionApplier {
        self.applier.as_ref()
    }

    pub fn prompter(&self) -> &dyn Prompter {
        self.factory.prompter()
    }

    /// Effective config value.
    pub fn config_get(&self, key: &str) -> Option<String> {
        self.config.borrow().get(key)
    }

    /// Effective config value or `default`.
    pub fn config_or(&self, key: &str, default: &str) -> String {
        self.config.borrow().get_or(key, default)
    }

    /// Context lines for displayed diffs.
    pub fn diff_context(&self) -> u32 {
        self.config_get("diff.context")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_DIFF_CONTEXT)
    }

    /// Broadcast a `LogCmd` event.
    pub fn log(&self, status: i32, text: impl Into<String>) {
        self.bus.log(status, text);
    }

    /// Trigger `event` through the factory.
    ///
    /// Exited children of earlier launches are reaped first.
    pub fn dispatch(&self, event: &str, args: &Args) -> Result<Outcome, CommandError> {
        self.launcher.reap();
        self.factory.dispatch(self, event, args)
    }

    /// Revert the most recent undoable command.
    ///
    /// Returns `false` when the stack is empty.
    pub fn undo(&self) -> Result<bool, CommandError> {
        let Some(reversal) = self.factory.pop_history() else {
            return Ok(false);
        };
        tracing::debug!(command = reversal.command, "undo");
        reversal.revert(self)?;
        Ok(true)
    }

    /// Full status rescan; failures are logged.
    pub fn rescan(&self) {
        if let Err(err) = self.model.update_status() {
            tracing::warn!(%err, "status rescan failed");
        }
    }

    /// File-status rescan; failures are logged.
    pub fn rescan_files(&self) {
        if let Err(err) = self.model.update_file_status() {
            tracing::warn!(%err, "file status rescan failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigScope;
    use crate::engine::command::{Command, Reversal};
    use crate::engine::prompt::ScriptedPrompter;
    use crate::git::mock::MockVcs;

    struct Note {
        text: String,
    }

    impl Command for Note {
        fn name(&self) -> &'static str {
            "Note"
        }

        fn is_undoable(&self) -> bool {
            true
        }

        fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
            ctx.model.set_commit_message(self.text.clone());
            Ok(Outcome::Done)
        }

        fn reversal(&self) -> Option<Reversal> {
            Some(Reversal::new(self.name()).with_commit_message(""))
        }
    }

    fn note(_: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Note {
            text: args.text("Note", 0)?,
        }))
    }

    fn refuse(_: &Context, _: &Args) -> Result<Box<dyn Command>, CommandError> {
        Err(CommandError::usage("Nope", "refused"))
    }

    #[test]
    fn dispatch_and_undo() {
        let ctx = Context::in_memory(MockVcs::new(), ScriptedPrompter::new());
        ctx.factory.register("note", note);

        let outcome = ctx.dispatch("note", &Args::new().push("hello")).unwrap();
        assert_eq!(outcome, Outcome::Done);
        assert_eq!(ctx.model.commit_message(), "hello");
        assert_eq!(ctx.factory.history_len(), 1);

        assert!(ctx.undo().unwrap());
        assert_eq!(ctx.model.commit_message(), "");
        assert!(!ctx.undo().unwrap());
    }

    #[test]
    fn unknown_event_is_an_error() {
        let ctx = Context::in_memory(MockVcs::new(), ScriptedPrompter::new());
        assert!(matches!(
            ctx.dispatch("nope", &Args::new()),
            Err(CommandError::UnknownEvent { .. })
        ));
    }

    #[test]
    fn usage_error_becomes_critical_prompt() {
        let prompter = ScriptedPrompter::new();
        let ctx = Context::in_memory(MockVcs::new(), prompter.clone());
        ctx.factory.register("refuse", refuse);

        assert_eq!(ctx.dispatch("refuse", &Args::new()).unwrap(), Outcome::Aborted);
        assert_eq!(prompter.titles(), vec!["Nope"]);
        assert_eq!(ctx.factory.history_len(), 0);
    }

    #[test]
    fn re_registration_overwrites() {
        let ctx = Context::in_memory(MockVcs::new(), ScriptedPrompter::new());
        ctx.factory.register("x", refuse);
        ctx.factory.register("x", note);
        assert_eq!(ctx.factory.events(), vec!["x"]);
        ctx.dispatch("x", &Args::new().push("ran")).unwrap();
        assert_eq!(ctx.model.commit_message(), "ran");
    }

    #[test]
    fn diff_context_defaults_and_reads_config() {
        let ctx = Context::in_memory(MockVcs::new(), ScriptedPrompter::new());
        assert_eq!(ctx.diff_context(), 3);
        ctx.config
            .borrow_mut()
            .set(ConfigScope::Global, "diff.context", "9")
            .unwrap();
        assert_eq!(ctx.diff_context(), 9);
    }
}
