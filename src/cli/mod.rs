//! cli
//!
//! Command-line interface for stagehand.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Build a [`Context`] for the repository and register the command catalog
//! - Translate each subcommand into one or more dispatches
//!
//! # Architecture
//!
//! The CLI layer is thin. Every repository change goes through
//! [`Context::dispatch`]; the only thing this layer does itself is print
//! model state (status lists, diff text) after a dispatch has filled it in.

pub mod args;

pub use args::Cli;

use std::cell::Cell;
use std::io::BufRead;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::commands;
use crate::core::config::Config;
use crate::engine::{signals, Arg, Args, Context, Event, Outcome, StaticSelection};
use crate::git::Git;
use crate::ui::output::{self, LogPane, Verbosity};
use crate::ui::prompts::TerminalPrompter;
use args::Command;

/// Run the CLI application and return the process exit code.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<i32> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let ctx = open_context(&cli)?;
    LogPane::new(verbosity).subscribe(&ctx.bus);

    // Remember the last failing status so it can become the exit code.
    let failed = Rc::new(Cell::new(0));
    {
        let failed = Rc::clone(&failed);
        ctx.bus.subscribe(move |event| {
            if let Event::LogCmd { status, .. } = event {
                if *status != 0 {
                    failed.set(*status);
                }
            }
        });
    }

    ctx.rescan();
    let outcome = execute(cli.command, &ctx, verbosity)?;
    Ok(match outcome {
        Outcome::Exited(status) => status,
        Outcome::Aborted => 1,
        Outcome::Done => failed.get(),
    })
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `--debug` selects `debug` and the default is
/// `warn`. Logs go to stderr so they never mix with command output.
fn init_logging(debug: bool) {
    let default = if debug { "stagehand=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Open the repository and build a context around it.
fn open_context(cli: &Cli) -> Result<Context> {
    let cwd = match &cli.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let git = Git::open(&cwd)
        .with_context(|| format!("not a git working tree: {}", cwd.display()))?;
    let info = git.info();

    let entries = git.config_entries().context("cannot read git config")?;
    let config = Config::load(Some(&info.git_dir))
        .context("cannot load configuration")?
        .with_git_entries(entries);

    let prompter = TerminalPrompter::new(cli.interactive(), cli.yes).in_dir(&info.work_dir);
    let mut selection = StaticSelection::new();
    if let Some(file) = &cli.file {
        selection = selection.with_filename(file.clone());
    }

    tracing::debug!(work_dir = %info.work_dir.display(), "repository opened");
    let ctx = Context::new(Rc::new(git), Box::new(config), Box::new(prompter))
        .with_selection(selection);
    commands::register(&ctx.factory);
    Ok(ctx)
}

/// Translate one subcommand into dispatches.
fn execute(command: Command, ctx: &Context, verbosity: Verbosity) -> Result<Outcome> {
    let outcome = match command {
        Command::Status { refresh } => {
            let event = if refresh {
                signals::RESCAN_AND_REFRESH
            } else {
                signals::RESCAN
            };
            let outcome = dispatch(ctx, event, Args::new())?;
            print_status(ctx, verbosity);
            outcome
        }
        Command::Stage {
            paths,
            modified,
            untracked,
            unmerged,
        } => {
            if modified {
                dispatch(ctx, signals::STAGE_MODIFIED, Args::new())?
            } else if untracked {
                dispatch(ctx, signals::STAGE_UNTRACKED, Args::new())?
            } else if unmerged {
                dispatch(ctx, signals::STAGE_UNMERGED, Args::new())?
            } else {
                dispatch(ctx, signals::STAGE, Args::new().push(paths))?
            }
        }
        Command::Unstage { paths, all } => {
            if all {
                dispatch(ctx, signals::UNSTAGE_ALL, Args::new())?
            } else {
                dispatch(ctx, signals::UNSTAGE, Args::new().push(paths))?
            }
        }
        Command::Untrack { paths } => dispatch(ctx, signals::UNTRACK, Args::new().push(paths))?,
        Command::Diff { paths, cached, stat } => {
            let outcome = match (stat, cached) {
                (true, true) => dispatch(ctx, signals::STAGED_SUMMARY, Args::new())?,
                (true, false) => dispatch(ctx, signals::MODIFIED_SUMMARY, Args::new())?,
                (false, cached) => {
                    dispatch(ctx, signals::DIFF, Args::new().push(paths).push(cached))?
                }
            };
            output::print(ctx.model.diff_text().trim_end(), verbosity);
            outcome
        }
        Command::Commit {
            message,
            message_file,
            amend,
            signoff,
        } => return commit(ctx, message, message_file, amend, signoff),
        Command::Tag {
            name,
            revision,
            sign,
            message,
        } => dispatch(
            ctx,
            signals::TAG,
            Args::new().push(name).push(revision).push(sign).push(message),
        )?,
        Command::Checkout { args } => dispatch(ctx, signals::CHECKOUT, Args::new().push(args))?,
        Command::CherryPick { revs } => {
            dispatch(ctx, signals::CHERRY_PICK, Args::new().push(revs))?
        }
        Command::DeleteBranch { name } => {
            dispatch(ctx, signals::DELETE_BRANCH, Args::new().push(name))?
        }
        Command::FormatPatch { revs } => dispatch(
            ctx,
            signals::FORMAT_PATCH,
            Args::new().push(revs.clone()).push(revs),
        )?,
        Command::Apply { patches } => {
            let patches: Vec<String> = patches
                .iter()
                .map(|path| path.to_string_lossy().into_owned())
                .collect();
            dispatch(ctx, signals::APPLY_PATCHES, Args::new().push(patches))?
        }
        Command::Ignore { paths } => dispatch(ctx, signals::IGNORE, Args::new().push(paths))?,
        Command::Rm { paths } => dispatch(ctx, signals::DELETE, Args::new().push(paths))?,
        Command::Tool { name } => {
            dispatch(ctx, signals::RUN_CONFIG_ACTION, Args::new().push(name))?
        }
        Command::Edit { paths, line } => {
            dispatch(ctx, signals::EDIT, Args::new().push(paths).push(line))?
        }
        Command::Difftool { paths, cached } => {
            dispatch(ctx, signals::DIFFTOOL, Args::new().push(cached).push(paths))?
        }
        Command::Mergetool { paths } => {
            dispatch(ctx, signals::MERGETOOL, Args::new().push(paths))?
        }
        Command::Open { paths } => {
            dispatch(ctx, signals::OPEN_DEFAULT_APP, Args::new().push(paths))?
        }
        Command::Visualize {
            all,
            revision,
            paths,
        } => match (all, revision) {
            (true, _) => dispatch(ctx, signals::VISUALIZE_ALL, Args::new())?,
            (false, Some(revision)) => dispatch(
                ctx,
                signals::VISUALIZE_REVISION,
                Args::new().push(revision).push(paths),
            )?,
            (false, None) if !paths.is_empty() => {
                dispatch(ctx, signals::VISUALIZE_PATHS, Args::new().push(paths))?
            }
            (false, None) => dispatch(ctx, signals::VISUALIZE_CURRENT, Args::new())?,
        },
        Command::Clone {
            url,
            destination,
            no_spawn,
        } => dispatch(
            ctx,
            signals::CLONE,
            Args::new().push(url).push(destination).push(!no_spawn),
        )?,
        Command::Config { key, value, global } => {
            let scope = if global { "global" } else { "repo" };
            dispatch(
                ctx,
                signals::SET_CONFIG,
                Args::new().push(scope).push(key).push(value),
            )?
        }
        Command::Run { event, args } => {
            let outcome = dispatch(ctx, &event, parse_args(&args))?;
            print_model(ctx, verbosity);
            outcome
        }
        Command::Session => session(ctx, std::io::stdin().lock(), verbosity)?,
        Command::Events => {
            output::print(output::format_list(&ctx.factory.events(), ""), verbosity);
            Outcome::Done
        }
    };
    Ok(outcome)
}

fn dispatch(ctx: &Context, event: &str, args: Args) -> Result<Outcome> {
    ctx.dispatch(event, &args)
        .with_context(|| format!("{} failed", event))
}

/// `commit`: optional amend entry, message, sign-off, then the commit.
fn commit(
    ctx: &Context,
    message: Option<String>,
    message_file: Option<PathBuf>,
    amend: bool,
    signoff: bool,
) -> Result<Outcome> {
    if amend && dispatch(ctx, signals::AMEND_MODE, Args::new().push(true))? == Outcome::Aborted {
        return Ok(Outcome::Aborted);
    }

    if let Some(path) = message_file {
        let path = path.to_string_lossy().into_owned();
        if dispatch(ctx, signals::LOAD_COMMIT_MESSAGE, Args::new().push(path))?
            == Outcome::Aborted
        {
            return Ok(Outcome::Aborted);
        }
    } else if let Some(message) = message {
        ctx.model.set_commit_message(message);
    } else if !amend && ctx.config_get("commit.template").is_some() {
        dispatch(ctx, signals::LOAD_COMMIT_TEMPLATE, Args::new())?;
    }

    if signoff {
        dispatch(ctx, signals::SIGNOFF, Args::new())?;
    }
    dispatch(ctx, signals::COMMIT, Args::new().push(amend))
}

/// Run events read from `input` until end of input or `quit`.
///
/// Errors are reported and the session continues; the outcome is that of
/// the last event.
fn session(ctx: &Context, input: impl BufRead, verbosity: Verbosity) -> Result<Outcome> {
    let mut last = Outcome::Done;
    for line in input.lines() {
        let line = line.context("cannot read session input")?;
        let Some(words) = shlex::split(&line) else {
            output::error(format!("unbalanced quotes: {}", line));
            continue;
        };
        let Some((event, rest)) = words.split_first() else {
            continue;
        };
        match event.as_str() {
            "quit" | "exit" => break,
            "undo" => match ctx.undo() {
                Ok(true) => {}
                Ok(false) => output::warn("nothing to undo", verbosity),
                Err(err) => output::error(err),
            },
            "show" => print_model(ctx, verbosity),
            _ => match ctx.dispatch(event, &parse_args(rest)) {
                Ok(outcome) => last = outcome,
                Err(err) => output::error(format!("{}: {}", event, err)),
            },
        }
    }
    Ok(last)
}

/// Parse positional words into dispatch arguments.
///
/// `true`/`false` are booleans, `-` is nil, `[a,b]` is a list and a leading
/// `=` escapes the rest as text.
pub fn parse_args(words: &[String]) -> Args {
    words
        .iter()
        .fold(Args::new(), |args, word| args.push(parse_arg(word)))
}

fn parse_arg(word: &str) -> Arg {
    if let Some(text) = word.strip_prefix('=') {
        return Arg::Text(text.to_string());
    }
    match word {
        "true" => Arg::Bool(true),
        "false" => Arg::Bool(false),
        "-" => Arg::Nil,
        _ => match word.strip_prefix('[').and_then(|w| w.strip_suffix(']')) {
            Some(inner) => Arg::List(
                inner
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => Arg::Text(word.to_string()),
        },
    }
}

fn print_status(ctx: &Context, verbosity: Verbosity) {
    let status = ctx.model.status();
    output::print(format!("On branch {}", ctx.model.current_branch()), verbosity);
    for (label, paths) in [
        ("Staged", &status.staged),
        ("Modified", &status.modified),
        ("Unmerged", &status.unmerged),
        ("Untracked", &status.untracked),
    ] {
        if !paths.is_empty() {
            output::print(
                format!("{}:\n{}", label, output::format_list(paths, "  ")),
                verbosity,
            );
        }
    }
}

fn print_model(ctx: &Context, verbosity: Verbosity) {
    let diff = ctx.model.diff_text();
    if !diff.is_empty() {
        output::print(diff.trim_end(), verbosity);
    }
    let message = ctx.model.commit_message();
    if !message.is_empty() {
        output::print(format!("Commit message:\n{}", message.trim_end()), verbosity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScriptedPrompter;
    use crate::git::mock::{MockVcs, VcsOperation};

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_args_recognizes_shapes() {
        let args = parse_args(&words(&["true", "-", "[a, b,]", "=false", "msg"]));
        assert_eq!(
            args,
            Args::new()
                .push(true)
                .push(Arg::Nil)
                .push(vec!["a".to_string(), "b".to_string()])
                .push("false")
                .push("msg")
        );
    }

    #[test]
    fn session_dispatches_and_undoes() {
        let vcs = MockVcs::new();
        let ctx = Context::in_memory(vcs.clone(), ScriptedPrompter::new());
        commands::register(&ctx.factory);
        ctx.model.set_diff_text("before");

        let input = "set_diff_text after\n\nundo\nstage [a.txt]\nquit\nstage [b.txt]\n";
        let outcome = session(&ctx, input.as_bytes(), Verbosity::Quiet).unwrap();

        assert_eq!(outcome, Outcome::Done);
        assert_eq!(ctx.model.diff_text(), "before");
        assert!(vcs
            .mutations()
            .contains(&VcsOperation::Add {
                paths: vec!["a.txt".to_string()]
            }));
        assert!(!vcs
            .mutations()
            .contains(&VcsOperation::Add {
                paths: vec!["b.txt".to_string()]
            }));
    }

    #[test]
    fn session_survives_unknown_events() {
        let ctx = Context::in_memory(MockVcs::new(), ScriptedPrompter::new());
        commands::register(&ctx.factory);
        let outcome = session(&ctx, "no_such_event\nrescan\n".as_bytes(), Verbosity::Quiet);
        assert_eq!(outcome.unwrap(), Outcome::Done);
    }

    #[test]
    fn commit_with_message_and_signoff() {
        let vcs = MockVcs::new();
        let ctx = Context::in_memory(vcs.clone(), ScriptedPrompter::new());
        ctx.config
            .borrow_mut()
            .set(crate::core::config::ConfigScope::Global, "user.name", "A U Thor")
            .unwrap();
        ctx.config
            .borrow_mut()
            .set(crate::core::config::ConfigScope::Global, "user.email", "a@example.com")
            .unwrap();
        commands::register(&ctx.factory);

        let outcome = commit(&ctx, Some("Fix it".into()), None, false, true).unwrap();

        assert_eq!(outcome, Outcome::Done);
        assert!(vcs.mutations().contains(&VcsOperation::Commit {
            message: "Fix it\n\nSigned-off-by: A U Thor <a@example.com>".to_string(),
            amend: false,
        }));
    }
}
