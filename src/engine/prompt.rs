//! engine::prompt
//!
//! The synchronous request/response hook commands use to ask the user.
//!
//! # Architecture
//!
//! Commands never talk to a UI directly. They call the [`Prompter`] owned by
//! the factory, which blocks until the user answers. The terminal front end
//! implements it in `ui::prompts`; tests use [`ScriptedPrompter`], which
//! returns queued answers and records every prompt it was shown.
//!
//! Cancellation is expressed only through the return value: `false` from
//! [`Prompter::question`], `None` from [`Prompter::tool_arguments`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::config::ToolOptions;
use crate::core::types::CommandCapture;
use crate::engine::tool::ToolEnv;

/// Values collected by the tool-arguments dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolArguments {
    /// Revision expression (`$REVISION`).
    pub revision: String,
    /// Free-form arguments (`$ARGS`).
    pub args: String,
}

impl ToolArguments {
    pub fn new(revision: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
            args: args.into(),
        }
    }
}

/// Blocking user interaction.
pub trait Prompter {
    /// Show an informational message.
    fn information(&self, title: &str, message: &str);

    /// Ask a yes/no question.
    fn question(&self, title: &str, message: &str) -> bool;

    /// Show an error message.
    fn critical(&self, title: &str, message: &str);

    /// Ask for a tool's revision and/or arguments; `None` cancels.
    fn tool_arguments(&self, tool: &str, options: &ToolOptions) -> Option<ToolArguments>;

    /// Run `argv` in a visible console and return what it printed.
    fn run_command(&self, title: &str, argv: &[String], env: &ToolEnv) -> CommandCapture;
}

/// A prompt shown through [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRecord {
    Information { title: String, message: String },
    Question { title: String, message: String },
    Critical { title: String, message: String },
    ToolArguments { tool: String },
    RunCommand {
        title: String,
        argv: Vec<String>,
        env: ToolEnv,
    },
}

#[derive(Debug, Default)]
struct ScriptedInner {
    answers: VecDeque<bool>,
    default_answer: bool,
    arguments: VecDeque<Option<ToolArguments>>,
    captures: VecDeque<CommandCapture>,
    shown: Vec<PromptRecord>,
}

/// Prompter returning scripted answers, for tests.
///
/// Clones share state. Unscripted questions answer `false`, unscripted
/// argument dialogs cancel, unscripted consoles report success.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    inner: Rc<RefCell<ScriptedInner>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next question.
    pub fn answer(self, yes: bool) -> Self {
        self.inner.borrow_mut().answers.push_back(yes);
        self
    }

    /// Answer used once the queue is empty.
    pub fn default_answer(self, yes: bool) -> Self {
        self.inner.borrow_mut().default_answer = yes;
        self
    }

    /// Queue a result for the next tool-arguments dialog.
    pub fn tool_arguments_reply(self, reply: Option<ToolArguments>) -> Self {
        self.inner.borrow_mut().arguments.push_back(reply);
        self
    }

    /// Queue a result for the next console run.
    pub fn console_reply(self, capture: CommandCapture) -> Self {
        self.inner.borrow_mut().captures.push_back(capture);
        self
    }

    /// Every prompt shown so far.
    pub fn shown(&self) -> Vec<PromptRecord> {
        self.inner.borrow().shown.clone()
    }

    /// Titles of every prompt shown so far.
    pub fn titles(&self) -> Vec<String> {
        self.shown()
            .into_iter()
            .map(|record| match record {
                PromptRecord::Information { title, .. }
                | PromptRecord::Question { title, .. }
                | PromptRecord::Critical { title, .. }
                | PromptRecord::RunCommand { title, .. } => title,
                PromptRecord::ToolArguments { tool } => tool,
            })
            .collect()
    }

    fn record(&self, record: PromptRecord) {
        self.inner.borrow_mut().shown.push(record);
    }
}

impl Prompter for ScriptedPrompter {
    fn information(&self, title: &str, message: &str) {
        self.record(PromptRecord::Information {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn question(&self, title: &str, message: &str) -> bool {
        self.record(PromptRecord::Question {
            title: title.to_string(),
            message: message.to_string(),
        });
        let mut inner = self.inner.borrow_mut();
        let fallback = inner.default_answer;
        inner.answers.pop_front().unwrap_or(fallback)
    }

    fn critical(&self, title: &str, message: &str) {
        self.record(PromptRecord::Critical {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn tool_arguments(&self, tool: &str, _options: &ToolOptions) -> Option<ToolArguments> {
        self.record(PromptRecord::ToolArguments {
            tool: tool.to_string(),
        });
        self.inner.borrow_mut().arguments.pop_front().flatten()
    }

    fn run_command(&self, title: &str, argv: &[String], env: &ToolEnv) -> CommandCapture {
        self.record(PromptRecord::RunCommand {
            title: title.to_string(),
            argv: argv.to_vec(),
            env: env.clone(),
        });
        self.inner
            .borrow_mut()
            .captures
            .pop_front()
            .unwrap_or_default()
    }
}
