//! engine::factory
//!
//! The dispatch table: event names to command constructors, plus the undo
//! stack and the prompt hook.
//!
//! # Architecture
//!
//! Registration is explicit: `commands::register` fills the table once at
//! startup, and callers may register more constructors later. Dispatching
//! an event constructs a fresh command against the context, executes it,
//! and pushes its [`Reversal`] when the command is undoable.
//!
//! # Invariants
//!
//! - Each event name maps to exactly one constructor; re-registering
//!   overwrites silently
//! - The undo stack grows and shrinks only at its tail
//! - No borrow of the table or the stack is held while a command runs
//!
//! # Usage Errors
//!
//! A [`CommandError::Usage`] from construction or execution is shown with
//! [`Prompter::critical`] and turned into [`Outcome::Aborted`]; every other
//! error is returned to the caller.

use std::cell::RefCell;
use std::collections::HashMap;

use super::command::{Command, CommandError, Outcome, Reversal};
use super::context::Context;
use super::prompt::Prompter;

/// One positional dispatch argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Nil,
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Int(value)
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Arg::Int(i64::from(value))
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Text(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Text(value)
    }
}

impl From<Vec<String>> for Arg {
    fn from(value: Vec<String>) -> Self {
        Arg::List(value)
    }
}

impl<const N: usize> From<[&str; N]> for Arg {
    fn from(value: [&str; N]) -> Self {
        Arg::List(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Arg::Nil)
    }
}

/// Positional arguments of a dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(Vec<Arg>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn push(mut self, arg: impl Into<Arg>) -> Self {
        self.0.push(arg.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.0.get(index)
    }

    fn bad(command: &'static str, index: usize, expected: &str) -> CommandError {
        CommandError::BadArgument {
            command,
            index,
            message: format!("expected {}", expected),
        }
    }

    /// Required text argument.
    pub fn text(&self, command: &'static str, index: usize) -> Result<String, CommandError> {
        self.opt_text(command, index)?
            .ok_or_else(|| Self::bad(command, index, "text"))
    }

    /// Optional text argument; missing or nil gives `None`.
    pub fn opt_text(
        &self,
        command: &'static str,
        index: usize,
    ) -> Result<Option<String>, CommandError> {
        match self.get(index) {
            None | Some(Arg::Nil) => Ok(None),
            Some(Arg::Text(text)) => Ok(Some(text.clone())),
            Some(_) => Err(Self::bad(command, index, "text")),
        }
    }

    /// Path list; missing or nil gives an empty list, a single text one item.
    pub fn list(&self, command: &'static str, index: usize) -> Result<Vec<String>, CommandError> {
        match self.get(index) {
            None | Some(Arg::Nil) => Ok(Vec::new()),
            Some(Arg::List(items)) => Ok(items.clone()),
            Some(Arg::Text(text)) => Ok(vec![text.clone()]),
            Some(_) => Err(Self::bad(command, index, "a list")),
        }
    }

    /// Boolean flag; missing or nil gives `false`.
    pub fn flag(&self, command: &'static str, index: usize) -> Result<bool, CommandError> {
        match self.get(index) {
            None | Some(Arg::Nil) => Ok(false),
            Some(Arg::Bool(value)) => Ok(*value),
            Some(_) => Err(Self::bad(command, index, "a boolean")),
        }
    }

    /// Optional integer; text is parsed.
    pub fn int(&self, command: &'static str, index: usize) -> Result<Option<i64>, CommandError> {
        match self.get(index) {
            None | Some(Arg::Nil) => Ok(None),
            Some(Arg::Int(value)) => Ok(Some(*value)),
            Some(Arg::Text(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Self::bad(command, index, "an integer")),
            Some(_) => Err(Self::bad(command, index, "an integer")),
        }
    }
}

/// Builds a command for a dispatch.
pub type Constructor = fn(&Context, &Args) -> Result<Box<dyn Command>, CommandError>;

/// The dispatch table, undo stack and prompt hook.
pub struct Factory {
    registry: RefCell<HashMap<&'static str, Constructor>>,
    history: RefCell<Vec<Reversal>>,
    prompter: Box<dyn Prompter>,
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("events", &self.events())
            .field("history", &self.history.borrow().len())
            .finish()
    }
}

impl Factory {
    pub fn new(prompter: Box<dyn Prompter>) -> Self {
        Self {
            registry: RefCell::new(HashMap::new()),
            history: RefCell::new(Vec::new()),
            prompter,
        }
    }

    /// Map `event` to `constructor`, replacing any previous mapping.
    pub fn register(&self, event: &'static str, constructor: Constructor) {
        self.registry.borrow_mut().insert(event, constructor);
    }

    pub fn is_registered(&self, event: &str) -> bool {
        self.registry.borrow().contains_key(event)
    }

    /// Registered event names, sorted.
    pub fn events(&self) -> Vec<&'static str> {
        let mut events: Vec<&'static str> = self.registry.borrow().keys().copied().collect();
        events.sort_unstable();
        events
    }

    /// The prompt hook.
    pub fn prompter(&self) -> &dyn Prompter {
        self.prompter.as_ref()
    }

    /// Snapshot of the undo stack, oldest first.
    pub fn history(&self) -> Vec<Reversal> {
        self.history.borrow().clone()
    }

    pub fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    pub fn push_history(&self, reversal: Reversal) {
        self.history.borrow_mut().push(reversal);
    }

    pub fn pop_history(&self) -> Option<Reversal> {
        self.history.borrow_mut().pop()
    }

    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }

    /// Construct and run the command registered for `event`.
    pub fn dispatch(
        &self,
        ctx: &Context,
        event: &str,
        args: &Args,
    ) -> Result<Outcome, CommandError> {
        let constructor = self
            .registry
            .borrow()
            .get(event)
            .copied()
            .ok_or_else(|| CommandError::UnknownEvent {
                event: event.to_string(),
            })?;

        tracing::debug!(event, args = args.len(), "dispatch");
        let command = match constructor(ctx, args) {
            Ok(command) => command,
            Err(err) => return self.handle_error(err),
        };
        self.run(ctx, command)
    }

    /// Execute an already constructed command, recording it for undo.
    pub fn run(&self, ctx: &Context, mut command: Box<dyn Command>) -> Result<Outcome, CommandError> {
        let outcome = match command.execute(ctx) {
            Ok(outcome) => outcome,
            Err(err) => return self.handle_error(err),
        };
        if command.is_undoable() {
            if let Some(reversal) = command.reversal() {
                tracing::debug!(command = command.name(), "pushed undo entry");
                self.push_history(reversal);
            }
        }
        Ok(outcome)
    }

    fn handle_error(&self, err: CommandError) -> Result<Outcome, CommandError> {
        match err {
            CommandError::Usage { title, message } => {
                self.prompter.critical(&title, &message);
                Ok(Outcome::Aborted)
            }
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_accessors() {
        let args = Args::new()
            .push(true)
            .push("HEAD")
            .push(["a.txt", "b.txt"])
            .push(None::<String>)
            .push(7u32);

        assert!(args.flag("T", 0).unwrap());
        assert_eq!(args.text("T", 1).unwrap(), "HEAD");
        assert_eq!(args.list("T", 2).unwrap(), vec!["a.txt", "b.txt"]);
        assert_eq!(args.opt_text("T", 3).unwrap(), None);
        assert_eq!(args.int("T", 4).unwrap(), Some(7));
        assert!(!args.flag("T", 9).unwrap());
        assert!(args.list("T", 9).unwrap().is_empty());
    }

    #[test]
    fn args_type_mismatch() {
        let args = Args::new().push(true);
        assert!(matches!(
            args.text("Tag", 0),
            Err(CommandError::BadArgument {
                command: "Tag",
                index: 0,
                ..
            })
        ));
        assert!(args.text("Tag", 1).is_err());
    }

    #[test]
    fn single_text_is_a_one_item_list() {
        let args = Args::new().push("only.txt");
        assert_eq!(args.list("Stage", 0).unwrap(), vec!["only.txt"]);
    }

    #[test]
    fn history_is_a_stack() {
        let factory = Factory::new(Box::new(crate::engine::ScriptedPrompter::new()));
        factory.push_history(Reversal::new("First"));
        factory.push_history(Reversal::new("Second"));
        assert_eq!(factory.history_len(), 2);
        assert_eq!(factory.pop_history().map(|r| r.command), Some("Second"));

        factory.clear_history();
        assert!(factory.pop_history().is_none());
    }

    #[test]
    fn int_parses_text() {
        let args = Args::new().push("42").push("x");
        assert_eq!(args.int("Edit", 0).unwrap(), Some(42));
        assert!(args.int("Edit", 1).is_err());
    }
}
