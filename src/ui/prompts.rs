//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode a
//! question is answered with `--yes` (or declined without it), and dialogs
//! that need typed input are cancelled.

use std::cell::RefCell;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::core::config::ToolOptions;
use crate::core::types::CommandCapture;
use crate::engine::tool::ToolEnv;
use crate::engine::{Prompter, ToolArguments};

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(err: io::Error) -> Self {
        PromptError::IoError(err.to_string())
    }
}

/// A [`Prompter`] that reads answers from a line-oriented input.
pub struct TerminalPrompter {
    interactive: bool,
    assume_yes: bool,
    cwd: Option<PathBuf>,
    input: RefCell<Box<dyn BufRead>>,
    output: RefCell<Box<dyn Write>>,
}

impl std::fmt::Debug for TerminalPrompter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalPrompter")
            .field("interactive", &self.interactive)
            .field("assume_yes", &self.assume_yes)
            .field("cwd", &self.cwd)
            .finish()
    }
}

impl TerminalPrompter {
    /// Prompt on stdin/stderr.
    pub fn new(interactive: bool, assume_yes: bool) -> Self {
        Self::with_io(
            interactive,
            assume_yes,
            BufReader::new(io::stdin()),
            io::stderr(),
        )
    }

    /// Prompt on arbitrary streams.
    pub fn with_io(
        interactive: bool,
        assume_yes: bool,
        input: impl BufRead + 'static,
        output: impl Write + 'static,
    ) -> Self {
        Self {
            interactive,
            assume_yes,
            cwd: None,
            input: RefCell::new(Box::new(input)),
            output: RefCell::new(Box::new(output)),
        }
    }

    /// Run console commands in `dir`.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn say(&self, text: &str) {
        let mut out = self.output.borrow_mut();
        // A closed terminal leaves nothing to report to.
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }

    /// Prompt for confirmation (yes/no).
    ///
    /// An empty answer takes `default`.
    pub fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive);
        }
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.input(&format!("{} {}", message, hint))?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n."),
            }
        }
    }

    /// Prompt for one line of text.
    ///
    /// End of input is [`PromptError::Cancelled`].
    pub fn input(&self, message: &str) -> Result<String, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive);
        }
        {
            let mut out = self.output.borrow_mut();
            write!(out, "{} ", message)?;
            out.flush()?;
        }
        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn information(&self, title: &str, message: &str) {
        self.say(&format!("{}: {}", title, message));
    }

    fn question(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match self.confirm(&format!("{}: {}", title, message), false) {
            Ok(answer) => answer,
            Err(err) => {
                tracing::debug!(%err, title, "question declined");
                false
            }
        }
    }

    fn critical(&self, title: &str, message: &str) {
        self.say(&format!("error: {}: {}", title, message));
    }

    fn tool_arguments(&self, tool: &str, options: &ToolOptions) -> Option<ToolArguments> {
        let read = || -> Result<ToolArguments, PromptError> {
            self.say(&format!("{}: {}", options.title(), options.prompt_text()));
            let mut answer = ToolArguments::default();
            if options.revprompt {
                answer.revision = self.input("Revision:")?;
            }
            if options.argprompt {
                answer.args = self.input("Arguments:")?;
            }
            Ok(answer)
        };
        match read() {
            Ok(answer) => Some(answer),
            Err(err) => {
                tracing::debug!(%err, tool, "tool arguments cancelled");
                None
            }
        }
    }

    fn run_command(&self, title: &str, argv: &[String], env: &ToolEnv) -> CommandCapture {
        self.say(&format!("$ {}", title));
        let Some((program, args)) = argv.split_first() else {
            return CommandCapture::new(-1, "", "empty command");
        };
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in env.iter() {
            cmd.env(key, value);
        }
        match cmd.output() {
            Ok(output) => {
                let capture = CommandCapture::new(
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr),
                );
                for text in [&capture.stdout, &capture.stderr] {
                    if !text.is_empty() {
                        self.say(text.trim_end());
                    }
                }
                capture
            }
            Err(err) => CommandCapture::new(127, "", err.to_string()),
        }
    }
}
