//! commands::config
//!
//! Changing a setting, with undo.

use crate::core::config::{ConfigError, ConfigScope};
use crate::engine::{Args, Command, CommandError, Context, Outcome, Reversal};

/// Set `key` to `value` in one scope.
///
/// Undo writes the previous value back; when the key was unset in that
/// scope there is nothing to restore.
#[derive(Debug)]
pub struct SetConfig {
    scope: ConfigScope,
    key: String,
    value: String,
    previous: Option<String>,
}

impl SetConfig {
    pub fn new(
        ctx: &Context,
        scope: ConfigScope,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let previous = ctx.config.borrow().scoped(scope, &key);
        Self {
            scope,
            key,
            value: value.into(),
            previous,
        }
    }

    /// `(scope, key, value)` with scope `"global"` or `"repo"`.
    pub fn build(ctx: &Context, args: &Args) -> Result<Box<dyn Command>, CommandError> {
        let scope = match args.text("SetConfig", 0)?.as_str() {
            "global" => ConfigScope::Global,
            "repo" => ConfigScope::Repo,
            other => {
                return Err(CommandError::BadArgument {
                    command: "SetConfig",
                    index: 0,
                    message: format!("unknown scope '{}'", other),
                })
            }
        };
        Ok(Box::new(Self::new(
            ctx,
            scope,
            args.text("SetConfig", 1)?,
            args.text("SetConfig", 2)?,
        )))
    }
}

impl Command for SetConfig {
    fn name(&self) -> &'static str {
        "SetConfig"
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &Context) -> Result<Outcome, CommandError> {
        let result = ctx
            .config
            .borrow_mut()
            .set(self.scope, &self.key, &self.value);
        match result {
            Ok(()) => Ok(Outcome::Done),
            Err(ConfigError::InvalidValue(message)) => {
                Err(CommandError::usage("Invalid setting", message))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn reversal(&self) -> Option<Reversal> {
        let reversal = Reversal::new(self.name());
        Some(match &self.previous {
            Some(previous) => reversal.with_config(self.scope, &self.key, previous.clone()),
            None => reversal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::context;
    use crate::engine::{signals, ScriptedPrompter};
    use crate::git::mock::MockVcs;

    #[test]
    fn set_and_undo_restores_previous_value() {
        let ctx = context(&MockVcs::new(), &ScriptedPrompter::new());
        crate::commands::register(&ctx.factory);
        ctx.config
            .borrow_mut()
            .set(ConfigScope::Global, "diff.context", "5")
            .unwrap();

        ctx.dispatch(
            signals::SET_CONFIG,
            &Args::new().push("global").push("diff.context").push("12"),
        )
        .unwrap();
        assert_eq!(ctx.diff_context(), 12);

        ctx.undo().unwrap();
        assert_eq!(ctx.diff_context(), 5);
    }

    #[test]
    fn undo_without_previous_value_is_a_no_op() {
        let ctx = context(&MockVcs::new(), &ScriptedPrompter::new());
        let mut cmd = SetConfig::new(&ctx, ConfigScope::Repo, "gui.editor", "nano");
        cmd.execute(&ctx).unwrap();
        cmd.undo(&ctx).unwrap();
        assert_eq!(ctx.config_get("gui.editor").as_deref(), Some("nano"));
    }

    #[test]
    fn unknown_scope_is_rejected() {
        let ctx = context(&MockVcs::new(), &ScriptedPrompter::new());
        let args = Args::new().push("system").push("gui.editor").push("ed");
        assert!(matches!(
            SetConfig::build(&ctx, &args),
            Err(CommandError::BadArgument { index: 0, .. })
        ));
    }

    #[test]
    fn invalid_value_is_a_usage_error() {
        let prompter = ScriptedPrompter::new();
        let ctx = context(&MockVcs::new(), &prompter);
        crate::commands::register(&ctx.factory);

        let outcome = ctx
            .dispatch(
                signals::SET_CONFIG,
                &Args::new().push("global").push("diff.context").push("lots"),
            )
            .unwrap();

        assert_eq!(outcome, Outcome::Aborted);
        assert_eq!(prompter.titles(), vec!["Invalid setting"]);
        assert_eq!(ctx.factory.history_len(), 0);
    }
}
