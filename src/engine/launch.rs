//! engine::launch
//!
//! Starting external programs: editors, difftools, history browsers, tools.
//!
//! # Architecture
//!
//! Commands build an argument vector and hand it to a [`Launcher`]. The
//! production [`SystemLauncher`] spawns children in the working directory
//! and keeps their handles until they exit; [`RecordingLauncher`] records
//! what would have been started.
//!
//! # Editors and Line Numbers
//!
//! [`editor_argv`] splits the configured editor with shell rules and, when a
//! line number is requested, formats it the way the editor expects:
//!
//! | editor pattern | arguments |
//! |----------------|-----------|
//! | `*vim*`, `*emacs*` | `+N file` |
//! | `*textpad*` | `file(N,0)` |
//! | `*notepad++*` | `-nN file` |
//!
//! Any other editor gets the plain file list; the line number is dropped.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::rc::Rc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;

use super::tool::ToolEnv;
use crate::core::types::CommandCapture;

/// Errors starting a program.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The command line was empty or could not be split.
    #[error("invalid command line: '{command}'")]
    BadCommand {
        /// The offending command string
        command: String,
    },

    /// The program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The desktop opener failed.
    #[error("failed to open {path}: {source}")]
    Open {
        /// Path that was opened
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Starts external programs on behalf of commands.
pub trait Launcher {
    /// Start `argv` without waiting for it.
    fn spawn(&self, argv: &[String]) -> Result<(), LaunchError>;

    /// Open paths with the desktop's default application.
    fn open_default(&self, paths: &[PathBuf]) -> Result<(), LaunchError>;

    /// Start another instance of this program in `dir`.
    fn spawn_instance(&self, dir: &Path) -> Result<(), LaunchError>;

    /// Run `argv` to completion and capture its output.
    fn run(&self, argv: &[String], env: &ToolEnv) -> Result<CommandCapture, LaunchError>;

    /// Collect spawned children that have exited.
    fn reap(&self) {}
}

/// Launcher that starts real processes.
///
/// Spawned children are kept until [`Launcher::reap`] sees them exit, so
/// a long session does not accumulate zombies.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    cwd: PathBuf,
    children: Rc<RefCell<Vec<Child>>>,
}

impl SystemLauncher {
    /// Launch children in `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            children: Rc::default(),
        }
    }

    /// Number of spawned children not yet reaped.
    pub fn pending(&self) -> usize {
        self.children.borrow().len()
    }

    fn command(&self, argv: &[String]) -> Result<Command, LaunchError> {
        let (program, args) = argv.split_first().ok_or_else(|| LaunchError::BadCommand {
            command: String::new(),
        })?;
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&self.cwd);
        Ok(cmd)
    }
}

fn spawn_error(argv: &[String]) -> impl FnOnce(std::io::Error) -> LaunchError + '_ {
    move |source| LaunchError::Spawn {
        program: argv.first().cloned().unwrap_or_default(),
        source,
    }
}

impl Launcher for SystemLauncher {
    fn spawn(&self, argv: &[String]) -> Result<(), LaunchError> {
        self.reap();
        tracing::debug!(?argv, "spawning");
        let child = self
            .command(argv)?
            .stdin(Stdio::null())
            .spawn()
            .map_err(spawn_error(argv))?;
        self.children.borrow_mut().push(child);
        Ok(())
    }

    fn reap(&self) {
        self.children.borrow_mut().retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!(pid = child.id(), %status, "child exited");
                false
            }
            Ok(None) => true,
            Err(err) => {
                tracing::warn!(pid = child.id(), %err, "cannot poll child");
                false
            }
        });
    }

    fn open_default(&self, paths: &[PathBuf]) -> Result<(), LaunchError> {
        for path in paths {
            let target = if path.is_absolute() {
                path.clone()
            } else {
                self.cwd.join(path)
            };
            tracing::debug!(path = %target.display(), "opening with default application");
            open::that(&target).map_err(|source| LaunchError::Open {
                path: target.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn spawn_instance(&self, dir: &Path) -> Result<(), LaunchError> {
        let exe = std::env::current_exe().map_err(|source| LaunchError::Spawn {
            program: "stagehand".to_string(),
            source,
        })?;
        let argv = vec![
            exe.to_string_lossy().into_owned(),
            "--cwd".to_string(),
            dir.to_string_lossy().into_owned(),
        ];
        self.spawn(&argv)
    }

    fn run(&self, argv: &[String], env: &ToolEnv) -> Result<CommandCapture, LaunchError> {
        tracing::debug!(?argv, "running");
        let mut cmd = self.command(argv)?;
        for (key, value) in env.iter() {
            cmd.env(key, value);
        }
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(spawn_error(argv))?;
        Ok(CommandCapture::new(
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ))
    }
}

/// A launch recorded by [`RecordingLauncher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    Spawn(Vec<String>),
    Open(Vec<PathBuf>),
    Instance(PathBuf),
    Run { argv: Vec<String>, env: ToolEnv },
}

#[derive(Debug, Default)]
struct RecordingInner {
    launches: Vec<Launch>,
    captures: VecDeque<CommandCapture>,
}

/// Launcher that only records, for tests. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    inner: Rc<RefCell<RecordingInner>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the capture returned by the next `run`.
    pub fn with_capture(self, capture: CommandCapture) -> Self {
        self.inner.borrow_mut().captures.push_back(capture);
        self
    }

    /// Everything launched so far.
    pub fn launches(&self) -> Vec<Launch> {
        self.inner.borrow().launches.clone()
    }
}

impl Launcher for RecordingLauncher {
    fn spawn(&self, argv: &[String]) -> Result<(), LaunchError> {
        self.inner
            .borrow_mut()
            .launches
            .push(Launch::Spawn(argv.to_vec()));
        Ok(())
    }

    fn open_default(&self, paths: &[PathBuf]) -> Result<(), LaunchError> {
        self.inner
            .borrow_mut()
            .launches
            .push(Launch::Open(paths.to_vec()));
        Ok(())
    }

    fn spawn_instance(&self, dir: &Path) -> Result<(), LaunchError> {
        self.inner
            .borrow_mut()
            .launches
            .push(Launch::Instance(dir.to_path_buf()));
        Ok(())
    }

    fn run(&self, argv: &[String], env: &ToolEnv) -> Result<CommandCapture, LaunchError> {
        let mut inner = self.inner.borrow_mut();
        inner.launches.push(Launch::Run {
            argv: argv.to_vec(),
            env: env.clone(),
        });
        Ok(inner.captures.pop_front().unwrap_or_default())
    }
}

/// How an editor takes a line number.
#[derive(Debug, Clone, Copy)]
enum LineStyle {
    Plus,
    Parens,
    DashN,
}

const EDITOR_PATTERNS: [(&str, LineStyle); 4] = [
    ("*vim*", LineStyle::Plus),
    ("*emacs*", LineStyle::Plus),
    ("*textpad*", LineStyle::Parens),
    ("*notepad++*", LineStyle::DashN),
];

fn editor_globs() -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for (pattern, _) in EDITOR_PATTERNS {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Split a command line with shell rules.
pub fn split_command(command: &str) -> Result<Vec<String>, LaunchError> {
    match shlex::split(command) {
        Some(words) if !words.is_empty() => Ok(words),
        _ => Err(LaunchError::BadCommand {
            command: command.to_string(),
        }),
    }
}

/// Build the argument vector for opening `filenames` in `editor`.
///
/// With a line number only the first file is opened.
pub fn editor_argv(
    editor: &str,
    filenames: &[String],
    line: Option<u32>,
) -> Result<Vec<String>, LaunchError> {
    let mut argv = split_command(editor)?;

    let (Some(line), Some(first)) = (line, filenames.first()) else {
        argv.extend(filenames.iter().cloned());
        return Ok(argv);
    };

    let style = editor_globs()
        .ok()
        .and_then(|set| set.matches(editor).first().copied())
        .map(|idx| EDITOR_PATTERNS[idx].1);

    match style {
        Some(LineStyle::Plus) => argv.extend([format!("+{}", line), first.clone()]),
        Some(LineStyle::Parens) => argv.push(format!("{}({},0)", first, line)),
        Some(LineStyle::DashN) => argv.extend([format!("-n{}", line), first.clone()]),
        None => argv.extend(filenames.iter().cloned()),
    }
    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn vim_and_emacs_take_plus_line() {
        assert_eq!(
            editor_argv("gvim -f", &files(&["a.rs"]), Some(12)).unwrap(),
            vec!["gvim", "-f", "+12", "a.rs"]
        );
        assert_eq!(
            editor_argv("/usr/bin/emacsclient", &files(&["a.rs", "b.rs"]), Some(3)).unwrap(),
            vec!["/usr/bin/emacsclient", "+3", "a.rs"]
        );
    }

    #[test]
    fn textpad_and_notepad_plus_plus() {
        assert_eq!(
            editor_argv("textpad", &files(&["a.txt"]), Some(7)).unwrap(),
            vec!["textpad", "a.txt(7,0)"]
        );
        assert_eq!(
            editor_argv("notepad++", &files(&["a.txt"]), Some(7)).unwrap(),
            vec!["notepad++", "-n7", "a.txt"]
        );
    }

    #[test]
    fn unknown_editor_drops_line_number() {
        assert_eq!(
            editor_argv("nano", &files(&["a.txt", "b.txt"]), Some(7)).unwrap(),
            vec!["nano", "a.txt", "b.txt"]
        );
    }

    #[test]
    fn quoted_editor_is_split() {
        assert_eq!(
            editor_argv("'/opt/My Editor/bin/ed' --wait", &files(&["x"]), None).unwrap(),
            vec!["/opt/My Editor/bin/ed", "--wait", "x"]
        );
    }

    #[test]
    fn empty_editor_is_rejected() {
        assert!(matches!(
            editor_argv("  ", &files(&["x"]), None),
            Err(LaunchError::BadCommand { .. })
        ));
    }

    #[test]
    fn recording_launcher_records() {
        let launcher = RecordingLauncher::new().with_capture(CommandCapture::new(3, "o", "e"));
        launcher.spawn(&files(&["gitk", "--all"])).unwrap();
        let capture = launcher.run(&files(&["sh", "-c", "true"]), &ToolEnv::new()).unwrap();
        assert_eq!(capture.status, 3);
        assert_eq!(launcher.launches().len(), 2);
        assert_eq!(launcher.launches()[0], Launch::Spawn(files(&["gitk", "--all"])));
    }

    #[test]
    fn system_launcher_captures_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let launcher = SystemLauncher::new(dir.path());
        let mut env = ToolEnv::new();
        env.set("FILENAME", "hello.txt");
        let capture = launcher
            .run(&files(&["sh", "-c", "echo $FILENAME; echo oops >&2; exit 4"]), &env)
            .unwrap();
        assert_eq!(capture.status, 4);
        assert_eq!(capture.stdout.trim(), "hello.txt");
        assert_eq!(capture.stderr.trim(), "oops");
    }

    #[test]
    fn system_launcher_reaps_exited_children() {
        let dir = tempfile::TempDir::new().unwrap();
        let launcher = SystemLauncher::new(dir.path());
        launcher.spawn(&files(&["sh", "-c", "exit 0"])).unwrap();
        assert_eq!(launcher.pending(), 1);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while launcher.pending() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(20));
            launcher.reap();
        }
        assert_eq!(launcher.pending(), 0);
    }

    #[test]
    fn system_launcher_keeps_running_children() {
        let dir = tempfile::TempDir::new().unwrap();
        let launcher = SystemLauncher::new(dir.path());
        launcher.spawn(&files(&["sleep", "5"])).unwrap();
        launcher.reap();
        assert_eq!(launcher.pending(), 1);
        for child in launcher.children.borrow_mut().iter_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
