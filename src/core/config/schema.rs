//! core::config::schema
//!
//! Configuration schema types.
//!
//! # File Format
//!
//! Global and repository files share one schema:
//!
//! ```toml
//! [diff]
//! context = 5
//!
//! [commit]
//! template = "/home/me/.gitmessage"
//!
//! [user]
//! name = "A U Thor"
//! email = "author@example.com"
//!
//! [gui]
//! editor = "vim"
//! history_browser = "gitk"
//!
//! [tools.lint]
//! cmd = "make lint FILE=$FILENAME"
//! needsfile = true
//! confirm = true
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing: tools must name a command and the
//! diff context must be a sane line count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Largest accepted `diff.context`.
pub const MAX_DIFF_CONTEXT: u32 = 10_000;

/// One configuration file (global or repository scope).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Diff settings
    pub diff: Option<DiffSection>,

    /// Commit settings
    pub commit: Option<CommitSection>,

    /// Identity used for sign-offs
    pub user: Option<UserSection>,

    /// External programs
    pub gui: Option<GuiSection>,

    /// User-configured tools, keyed by name
    pub tools: BTreeMap<String, ToolOptions>,
}

/// `[diff]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiffSection {
    /// Context lines for displayed diffs
    pub context: Option<u32>,
}

/// `[commit]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CommitSection {
    /// Path of the commit message template
    pub template: Option<String>,
}

/// `[user]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UserSection {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// `[gui]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GuiSection {
    /// Editor command line
    pub editor: Option<String>,
    /// History browser command line
    pub history_browser: Option<String>,
}

/// Confirmation prompt setting of a tool.
///
/// `prompt = true` asks the default question; a string replaces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PromptSetting {
    Default(bool),
    Text(String),
}

/// Options of a user-configured tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolOptions {
    /// Shell command to run
    pub cmd: String,
    /// Title for prompts and the console; defaults to `cmd`
    pub title: Option<String>,
    /// Confirmation question
    pub prompt: Option<PromptSetting>,
    /// Requires a selected file (exported as `$FILENAME`)
    pub needsfile: bool,
    /// Ask for a revision (exported as `$REVISION`)
    pub revprompt: bool,
    /// Ask for arguments (exported as `$ARGS`)
    pub argprompt: bool,
    /// Ask for confirmation before running
    pub confirm: bool,
    /// Run without showing a console
    pub noconsole: bool,
    /// Skip the status rescan afterwards
    pub norescan: bool,
}

impl ToolOptions {
    /// Title shown in prompts.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.cmd)
    }

    /// Confirmation question, falling back to the default wording.
    pub fn prompt_text(&self) -> String {
        match &self.prompt {
            Some(PromptSetting::Text(text)) => text.clone(),
            _ => format!("Are you sure you want to run {}?", self.cmd),
        }
    }

    /// Build options from `guitool.<name>.*` style key/value pairs.
    ///
    /// Returns `None` when no `cmd` is present.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Option<Self> {
        let mut opts = ToolOptions::default();
        for (key, value) in pairs {
            match key {
                "cmd" => opts.cmd = value.to_string(),
                "title" => opts.title = Some(value.to_string()),
                "prompt" => {
                    opts.prompt = Some(match parse_bool(value) {
                        Some(flag) => PromptSetting::Default(flag),
                        None => PromptSetting::Text(value.to_string()),
                    })
                }
                "needsfile" => opts.needsfile = parse_bool(value).unwrap_or(false),
                "revprompt" => opts.revprompt = parse_bool(value).unwrap_or(false),
                "argprompt" => opts.argprompt = parse_bool(value).unwrap_or(false),
                "confirm" => opts.confirm = parse_bool(value).unwrap_or(false),
                "noconsole" => opts.noconsole = parse_bool(value).unwrap_or(false),
                "norescan" => opts.norescan = parse_bool(value).unwrap_or(false),
                _ => {}
            }
        }
        if opts.cmd.is_empty() {
            None
        } else {
            Some(opts)
        }
    }
}

/// Parse a git-style boolean.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(context) = self.diff.as_ref().and_then(|d| d.context) {
            if context > MAX_DIFF_CONTEXT {
                return Err(ConfigError::InvalidValue(format!(
                    "diff.context must be at most {}, got {}",
                    MAX_DIFF_CONTEXT, context
                )));
            }
        }

        for (name, tool) in &self.tools {
            if tool.cmd.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "tool '{}' has no cmd",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Look up a dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "diff.context" => self
                .diff
                .as_ref()
                .and_then(|d| d.context)
                .map(|c| c.to_string()),
            "commit.template" => self.commit.as_ref().and_then(|c| c.template.clone()),
            "user.name" => self.user.as_ref().and_then(|u| u.name.clone()),
            "user.email" => self.user.as_ref().and_then(|u| u.email.clone()),
            "gui.editor" => self.gui.as_ref().and_then(|g| g.editor.clone()),
            "gui.historybrowser" => self.gui.as_ref().and_then(|g| g.history_browser.clone()),
            _ => None,
        }
    }

    /// Set a dotted key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unknown keys or values that
    /// do not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "diff.context" => {
                let context: u32 = value.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "diff.context must be a number, got '{}'",
                        value
                    ))
                })?;
                self.diff.get_or_insert_with(Default::default).context = Some(context);
            }
            "commit.template" => {
                self.commit.get_or_insert_with(Default::default).template = Some(value.into());
            }
            "user.name" => {
                self.user.get_or_insert_with(Default::default).name = Some(value.into());
            }
            "user.email" => {
                self.user.get_or_insert_with(Default::default).email = Some(value.into());
            }
            "gui.editor" => {
                self.gui.get_or_insert_with(Default::default).editor = Some(value.into());
            }
            "gui.historybrowser" => {
                self.gui.get_or_insert_with(Default::default).history_browser =
                    Some(value.into());
            }
            _ => {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown config key '{}'",
                    key
                )))
            }
        }
        self.validate()
    }
}
