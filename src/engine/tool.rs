//! engine::tool
//!
//! Decision procedure for running a user-configured tool.
//!
//! # Architecture
//!
//! [`plan_tool_run`] is pure apart from the prompts it shows through the
//! injected [`Prompter`]: given the tool's options and the current
//! selection it either aborts or produces a [`ToolRun`] describing exactly
//! what to execute. The `RunConfigAction` command then runs the plan, logs
//! the result and rescans.
//!
//! # Environment
//!
//! `$FILENAME`, `$REVISION` and `$ARGS` are passed to the tool through a
//! [`ToolEnv`] handed to the child process. The process environment of the
//! client is never modified.
//!
//! # Example
//!
//! ```
//! use stagehand::core::config::ToolOptions;
//! use stagehand::engine::prompt::ScriptedPrompter;
//! use stagehand::engine::selection::StaticSelection;
//! use stagehand::engine::tool::{plan_tool_run, ToolPlan};
//!
//! let opts = ToolOptions { cmd: "wc -l $FILENAME".into(), needsfile: true, ..Default::default() };
//! let selection = StaticSelection::new().with_filename("README.md");
//! let plan = plan_tool_run("count", &opts, &selection, &ScriptedPrompter::new());
//! match plan {
//!     ToolPlan::Run(run) => assert_eq!(run.env.get("FILENAME"), Some("README.md")),
//!     ToolPlan::Abort => unreachable!(),
//! }
//! ```

use std::collections::BTreeMap;

use super::prompt::Prompter;
use super::selection::Selection;
use crate::core::config::ToolOptions;

/// Variables a tool run may export.
pub const TOOL_ENV_VARS: [&str; 3] = ["FILENAME", "REVISION", "ARGS"];

/// Environment passed to a tool's child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolEnv {
    vars: BTreeMap<String, String>,
}

impl ToolEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.vars.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Remove the three tool variables.
    pub fn clear_tool_vars(&mut self) {
        for key in TOOL_ENV_VARS {
            self.vars.remove(key);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A fully decided tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRun {
    /// Expanded command, used in prompts and the log.
    pub title: String,
    /// `sh -c <cmd>`
    pub argv: Vec<String>,
    /// Variables for the child.
    pub env: ToolEnv,
    /// Show a console (false for `noconsole`).
    pub console: bool,
    /// Rescan afterwards (false for `norescan`).
    pub rescan: bool,
}

/// Outcome of [`plan_tool_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolPlan {
    /// The user declined, cancelled, or a precondition failed.
    Abort,
    /// Run the tool.
    Run(ToolRun),
}

/// Decide whether and how to run the tool `name`.
pub fn plan_tool_run(
    name: &str,
    opts: &ToolOptions,
    selection: &dyn Selection,
    prompter: &dyn Prompter,
) -> ToolPlan {
    let mut env = ToolEnv::new();

    if opts.needsfile {
        match selection.filename() {
            Some(filename) => env.set("FILENAME", filename),
            None => {
                prompter.information(
                    "Please select a file",
                    &format!("\"{}\" requires a selected file", opts.cmd),
                );
                return ToolPlan::Abort;
            }
        }
    }

    if opts.revprompt || opts.argprompt {
        loop {
            let Some(answer) = prompter.tool_arguments(name, opts) else {
                return ToolPlan::Abort;
            };
            if opts.revprompt && answer.revision.trim().is_empty() {
                prompter.critical(
                    "Invalid Revision",
                    "The revision expression cannot be empty.",
                );
                continue;
            }
            if !answer.revision.is_empty() {
                env.set("REVISION", answer.revision);
            }
            if !answer.args.is_empty() {
                env.set("ARGS", answer.args);
            }
            break;
        }
    } else if opts.confirm {
        let title = expand_vars(opts.title(), &env);
        let prompt = expand_vars(&opts.prompt_text(), &env);
        if !prompter.question(&title, &prompt) {
            return ToolPlan::Abort;
        }
    }

    let title = expand_vars(&opts.cmd, &env);
    tracing::debug!(tool = name, command = %title, "tool run planned");
    ToolPlan::Run(ToolRun {
        title,
        argv: vec!["sh".to_string(), "-c".to_string(), opts.cmd.clone()],
        env,
        console: !opts.noconsole,
        rescan: !opts.norescan,
    })
}

/// Expand `$VAR` and `${VAR}` from `env`, then the process environment.
///
/// Unknown variables are left as written.
pub fn expand_vars(text: &str, env: &ToolEnv) -> String {
    let lookup = |key: &str| -> Option<String> {
        env.get(key)
            .map(str::to_string)
            .or_else(|| std::env::var(key).ok())
    };

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(close) = braced.find('}') {
                let key = &braced[..close];
                match lookup(key) {
                    Some(value) if is_var_name(key) => out.push_str(&value),
                    _ => out.push_str(&rest[pos..pos + close + 3]),
                }
                rest = &braced[close + 1..];
                continue;
            }
        }

        let len = after
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(after.len());
        let key = &after[..len];
        match lookup(key).filter(|_| !key.is_empty()) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('$');
                out.push_str(key);
            }
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}

fn is_var_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::prompt::{PromptRecord, ScriptedPrompter, ToolArguments};
    use crate::engine::selection::StaticSelection;

    fn tool(cmd: &str) -> ToolOptions {
        ToolOptions {
            cmd: cmd.to_string(),
            ..ToolOptions::default()
        }
    }

    #[test]
    fn needsfile_without_selection_aborts() {
        let opts = ToolOptions {
            needsfile: true,
            ..tool("cat $FILENAME")
        };
        let prompter = ScriptedPrompter::new();
        let plan = plan_tool_run("cat", &opts, &StaticSelection::new(), &prompter);

        assert_eq!(plan, ToolPlan::Abort);
        assert_eq!(
            prompter.shown(),
            vec![PromptRecord::Information {
                title: "Please select a file".into(),
                message: "\"cat $FILENAME\" requires a selected file".into()
            }]
        );
    }

    #[test]
    fn empty_revision_reprompts() {
        let opts = ToolOptions {
            revprompt: true,
            ..tool("git show $REVISION")
        };
        let prompter = ScriptedPrompter::new()
            .tool_arguments_reply(Some(ToolArguments::new("", "")))
            .tool_arguments_reply(Some(ToolArguments::new("HEAD~2", "--stat")));

        let ToolPlan::Run(run) = plan_tool_run("show", &opts, &StaticSelection::new(), &prompter)
        else {
            panic!("expected a run");
        };
        assert_eq!(run.env.get("REVISION"), Some("HEAD~2"));
        assert_eq!(run.env.get("ARGS"), Some("--stat"));
        assert_eq!(run.title, "git show HEAD~2");
        assert!(prompter.titles().contains(&"Invalid Revision".to_string()));
    }

    #[test]
    fn cancelled_arguments_abort() {
        let opts = ToolOptions {
            argprompt: true,
            ..tool("make $ARGS")
        };
        let plan = plan_tool_run("make", &opts, &StaticSelection::new(), &ScriptedPrompter::new());
        assert_eq!(plan, ToolPlan::Abort);
    }

    #[test]
    fn confirm_declined_aborts() {
        let opts = ToolOptions {
            confirm: true,
            ..tool("rm -rf build")
        };
        let prompter = ScriptedPrompter::new().answer(false);
        let plan = plan_tool_run("clean", &opts, &StaticSelection::new(), &prompter);
        assert_eq!(plan, ToolPlan::Abort);
        assert_eq!(
            prompter.shown(),
            vec![PromptRecord::Question {
                title: "rm -rf build".into(),
                message: "Are you sure you want to run rm -rf build?".into()
            }]
        );
    }

    #[test]
    fn plain_tool_runs_through_shell() {
        let opts = ToolOptions {
            noconsole: true,
            norescan: true,
            ..tool("make test")
        };
        let ToolPlan::Run(run) =
            plan_tool_run("test", &opts, &StaticSelection::new(), &ScriptedPrompter::new())
        else {
            panic!("expected a run");
        };
        assert_eq!(run.argv, vec!["sh", "-c", "make test"]);
        assert!(!run.console);
        assert!(!run.rescan);
        assert!(run.env.is_empty());
    }

    #[test]
    fn expand_known_and_unknown_vars() {
        let mut env = ToolEnv::new();
        env.set("FILENAME", "a.txt");
        assert_eq!(expand_vars("cat $FILENAME", &env), "cat a.txt");
        assert_eq!(expand_vars("cat ${FILENAME}!", &env), "cat a.txt!");
        assert_eq!(
            expand_vars("$STAGEHAND_SURELY_UNSET_VAR x", &env),
            "$STAGEHAND_SURELY_UNSET_VAR x"
        );
        assert_eq!(
            expand_vars("${STAGEHAND_SURELY_UNSET_VAR}", &env),
            "${STAGEHAND_SURELY_UNSET_VAR}"
        );
        assert_eq!(expand_vars("cost: 5$", &env), "cost: 5$");
    }

    #[test]
    fn clear_tool_vars_keeps_others() {
        let mut env = ToolEnv::new();
        env.set("FILENAME", "a");
        env.set("REVISION", "b");
        env.set("EDITOR", "vi");
        env.clear_tool_vars();
        assert_eq!(env.iter().collect::<Vec<_>>(), vec![("EDITOR", "vi")]);
    }
}
