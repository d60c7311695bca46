//! commands::tool
//!
//! Running a user-configured tool.
//!
//! # Architecture
//!
//! The prompting is done by [`plan_tool_run`], which only talks to the
//! [`Prompter`] and returns a [`ToolPlan`]. This command executes the plan:
//!
//! 1. Look up the tool's options (missing tool is a usage error)
//! 2. Plan; an aborted plan ends here without touching the tool environment
//! 3. Replace `FILENAME`/`REVISION`/`ARGS` in the context's tool environment
//! 4. Log `running: <cmd>`, run silently or in a console, log the capture
//! 5. Rescan unless the tool opted out
//!
//! [`Prompter`]: crate::engine::Prompter

use crate::engine::tool::{plan_tool_run, ToolPlan};
use crate::engine::{Args, Command, CommandError, Context, Outcome};

/// Run the configured tool `name`.
#[derive(Debug)]
pub struct RunConfigAction {
    tool: String,
}

impl RunConfigAction {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn build(_ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        Ok(Box::new(Self::new(args.text("RunConfigAction", 0)?)))
    }
}

impl Command for RunConfigAction {
    fn name(&self) -> &'static str {
        "RunConfigAction"
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let options = ctx.config.borrow().tool_options(&self.tool);
        let Some(options) = options else {
            return Err(CommandError::usage(
                "Unknown tool",
                format!("No tool named \"{}\" is configured.", self.tool),
            ));
        };

        let run = match plan_tool_run(&self.tool, &options, ctx.selection(), ctx.prompter()) {
            ToolPlan::Abort => return Ok(Outcome::Aborted),
            ToolPlan::Run(run) => run,
        };

        let env = {
            let mut env = ctx.tool_env.borrow_mut();
            env.clear_tool_vars();
            for (key, value) in run.env.iter() {
                env.set(key, value);
            }
            env.clone()
        };

        ctx.log(0, format!("running: {}", run.title));
        let capture = if run.console {
            ctx.prompter().run_command(&run.title, &run.argv, &env)
        } else {
            ctx.launcher().run(&run.argv, &env)?
        };
        ctx.log(
            capture.status,
            format!(
                "stdout: {}\nstatus: {}\nstderr: {}",
                capture.stdout.trim_end(),
                capture.status,
                capture.stderr.trim_end()
            ),
        );

        if run.rescan {
            ctx.rescan();
        }
        Ok(Outcome::Exited(capture.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::logs;
    use crate::core::config::schema::ToolOptions;
    use crate::core::config::Config;
    use crate::core::types::CommandCapture;
    use crate::engine::launch::{Launch, RecordingLauncher};
    use crate::engine::prompt::PromptRecord;
    use crate::engine::{ScriptedPrompter, StaticSelection, ToolArguments};
    use crate::git::mock::{MockVcs, VcsOperation};

    fn config_with(name: &str, options: ToolOptions) -> Config {
        let mut config = Config::default();
        config.global.tools.insert(name.to_string(), options);
        config
    }

    fn tool(cmd: &str) -> ToolOptions {
        ToolOptions {
            cmd: cmd.to_string(),
            ..ToolOptions::default()
        }
    }

    #[test]
    fn silent_tool_runs_through_launcher() {
        let vcs = MockVcs::new();
        let launcher = RecordingLauncher::new().with_capture(CommandCapture::new(0, "ok\n", ""));
        let ctx = Context::in_memory(vcs.clone(), ScriptedPrompter::new())
            .with_launcher(launcher.clone())
            .with_config(config_with(
                "lint",
                ToolOptions {
                    noconsole: true,
                    ..tool("make lint")
                },
            ));
        let events = ctx.bus.recorder();

        let outcome = RunConfigAction::new("lint").execute(&ctx).unwrap();

        assert_eq!(outcome, Outcome::Exited(0));
        assert_eq!(
            logs(&events),
            vec!["running: make lint", "stdout: ok\nstatus: 0\nstderr: "]
        );
        assert!(matches!(
            &launcher.launches()[0],
            Launch::Run { argv, .. } if argv == &vec!["sh", "-c", "make lint"]
        ));
        assert!(vcs.operations().contains(&VcsOperation::Status));
    }

    #[test]
    fn console_tool_runs_through_prompter_and_exports_filename() {
        let vcs = MockVcs::new();
        let prompter = ScriptedPrompter::new().console_reply(CommandCapture::new(3, "", "bad\n"));
        let ctx = Context::in_memory(vcs.clone(), prompter.clone())
            .with_selection(StaticSelection::new().with_filename("src/lib.rs"))
            .with_config(config_with(
                "fmt",
                ToolOptions {
                    needsfile: true,
                    norescan: true,
                    ..tool("rustfmt $FILENAME")
                },
            ));

        let outcome = RunConfigAction::new("fmt").execute(&ctx).unwrap();

        assert_eq!(outcome, Outcome::Exited(3));
        assert_eq!(ctx.tool_env.borrow().get("FILENAME"), Some("src/lib.rs"));
        let shown = prompter.shown();
        assert!(matches!(
            &shown[0],
            PromptRecord::RunCommand { title, env, .. }
                if title == "rustfmt src/lib.rs" && env.get("FILENAME") == Some("src/lib.rs")
        ));
        assert!(!vcs.operations().contains(&VcsOperation::Status));
    }

    #[test]
    fn needsfile_without_selection_leaves_env_alone() {
        let launcher = RecordingLauncher::new();
        let prompter = ScriptedPrompter::new();
        let ctx = Context::in_memory(MockVcs::new(), prompter.clone())
            .with_launcher(launcher.clone())
            .with_config(config_with(
                "fmt",
                ToolOptions {
                    needsfile: true,
                    ..tool("rustfmt $FILENAME")
                },
            ));
        ctx.tool_env.borrow_mut().set("REVISION", "from-last-run");

        let outcome = RunConfigAction::new("fmt").execute(&ctx).unwrap();

        assert_eq!(outcome, Outcome::Aborted);
        assert!(launcher.launches().is_empty());
        assert_eq!(prompter.titles(), vec!["Please select a file"]);
        assert_eq!(ctx.tool_env.borrow().get("REVISION"), Some("from-last-run"));
        assert_eq!(ctx.tool_env.borrow().get("FILENAME"), None);
    }

    #[test]
    fn previous_run_vars_are_cleared() {
        let prompter = ScriptedPrompter::new()
            .tool_arguments_reply(Some(ToolArguments::new("v1.0", "")));
        let ctx = Context::in_memory(MockVcs::new(), prompter)
            .with_config(config_with(
                "log",
                ToolOptions {
                    revprompt: true,
                    ..tool("git log $REVISION")
                },
            ));
        {
            let mut env = ctx.tool_env.borrow_mut();
            env.set("ARGS", "stale");
            env.set("EDITOR", "vim");
        }

        RunConfigAction::new("log").execute(&ctx).unwrap();

        let env = ctx.tool_env.borrow();
        assert_eq!(env.get("REVISION"), Some("v1.0"));
        assert_eq!(env.get("ARGS"), None);
        assert_eq!(env.get("EDITOR"), Some("vim"));
    }

    #[test]
    fn unknown_tool_is_a_usage_error() {
        let prompter = ScriptedPrompter::new();
        let ctx = Context::in_memory(MockVcs::new(), prompter.clone());
        crate::commands::register(&ctx.factory);

        let outcome = ctx
            .dispatch(
                crate::engine::signals::RUN_CONFIG_ACTION,
                &Args::new().push("missing"),
            )
            .unwrap();

        assert_eq!(outcome, Outcome::Aborted);
        assert_eq!(prompter.titles(), vec!["Unknown tool"]);
    }
}
