//! Integration tests against real repositories.
//!
//! These tests use real git repositories created via tempfile and drive
//! the command catalog through the production `Git` implementation.

use std::path::Path;
use std::process::Command;
use std::rc::Rc;

use tempfile::TempDir;

use stagehand::commands;
use stagehand::core::config::Config;
use stagehand::core::types::DiffMode;
use stagehand::engine::{signals, Args, Context, Event, ScriptedPrompter};
use stagehand::git::{Git, GitError, Vcs};

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-q", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);

        std::fs::write(dir.path().join("README.md"), "# Test Repo\n").unwrap();
        run_git(dir.path(), &["add", "README.md"]);
        run_git(dir.path(), &["commit", "-q", "-m", "Initial commit"]);

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, name: &str, content: &str) {
        std::fs::write(self.path().join(name), content).unwrap();
    }

    /// A context over this repository with the catalog registered.
    fn context(&self, prompter: &ScriptedPrompter) -> Context {
        let git = Git::open(self.path()).expect("failed to open test repo");
        let entries = git.config_entries().unwrap();
        let config = Config::default().with_git_entries(entries);
        let ctx = Context::new(Rc::new(git), Box::new(config), Box::new(prompter.clone()));
        commands::register(&ctx.factory);
        ctx.model.update_status().unwrap();
        ctx
    }

    fn last_subject(&self) -> String {
        git_output(self.path(), &["log", "-1", "--format=%s"])
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn open_outside_repository_fails() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Git::open(dir.path()),
        Err(GitError::NotARepo { .. })
    ));
}

#[test]
fn status_lists_untracked_and_modified() {
    let repo = TestRepo::new();
    repo.write("new.txt", "new\n");
    repo.write("README.md", "# Changed\n");

    let ctx = repo.context(&ScriptedPrompter::new());
    let status = ctx.model.status();

    assert_eq!(status.untracked, vec!["new.txt"]);
    assert_eq!(status.modified, vec!["README.md"]);
    assert!(status.staged.is_empty());
    assert_eq!(ctx.model.current_branch(), "main");
}

#[test]
fn stage_commit_round_trip() {
    let repo = TestRepo::new();
    repo.write("feature.txt", "feature\n");
    let ctx = repo.context(&ScriptedPrompter::new());
    let events = ctx.bus.recorder();

    ctx.dispatch(signals::STAGE, &Args::new().push(["feature.txt"]))
        .unwrap();
    assert_eq!(ctx.model.status().staged, vec!["feature.txt"]);

    ctx.model.set_commit_message("Add feature\n");
    ctx.dispatch(signals::COMMIT, &Args::new().push(false))
        .unwrap();

    assert_eq!(repo.last_subject(), "Add feature");
    assert_eq!(ctx.model.commit_message(), "");
    assert!(ctx.model.status().staged.is_empty());
    assert!(events.borrow().iter().any(|event| matches!(
        event,
        Event::LogCmd { status: 0, text } if text.starts_with("Commit: ")
    )));
}

#[test]
fn unstage_returns_path_to_worktree() {
    let repo = TestRepo::new();
    repo.write("README.md", "# Changed\n");
    let ctx = repo.context(&ScriptedPrompter::new());

    ctx.dispatch(signals::STAGE_MODIFIED, &Args::new()).unwrap();
    assert_eq!(ctx.model.status().staged, vec!["README.md"]);

    ctx.dispatch(signals::UNSTAGE_ALL, &Args::new()).unwrap();
    let status = ctx.model.status();
    assert!(status.staged.is_empty());
    assert_eq!(status.modified, vec!["README.md"]);
}

#[test]
fn amend_loads_head_message_and_commits_amended() {
    let repo = TestRepo::new();
    let ctx = repo.context(&ScriptedPrompter::new());
    ctx.model.set_commit_message("draft");

    ctx.dispatch(signals::AMEND_MODE, &Args::new().push(true))
        .unwrap();
    assert_eq!(ctx.model.mode(), DiffMode::Amend);
    assert_eq!(ctx.model.commit_message().trim(), "Initial commit");

    ctx.model.set_commit_message("Initial commit, reworded");
    ctx.dispatch(signals::COMMIT, &Args::new().push(true))
        .unwrap();

    assert_eq!(repo.last_subject(), "Initial commit, reworded");
    assert_eq!(git_output(repo.path(), &["rev-list", "--count", "HEAD"]), "1");
}

#[test]
fn diff_shows_worktree_changes() {
    let repo = TestRepo::new();
    repo.write("README.md", "# Changed\n");
    let ctx = repo.context(&ScriptedPrompter::new());

    ctx.dispatch(signals::DIFF, &Args::new().push(["README.md"]))
        .unwrap();

    let diff = ctx.model.diff_text();
    assert!(diff.contains("-# Test Repo"));
    assert!(diff.contains("+# Changed"));
    assert_eq!(ctx.model.filename().as_deref(), Some("README.md"));
}

#[test]
fn ignore_hides_untracked_file() {
    let repo = TestRepo::new();
    repo.write("build.log", "noise\n");
    let ctx = repo.context(&ScriptedPrompter::new());
    assert_eq!(ctx.model.status().untracked, vec!["build.log"]);

    ctx.dispatch(signals::IGNORE, &Args::new().push(["build.log"]))
        .unwrap();

    let gitignore = std::fs::read_to_string(repo.path().join(".gitignore")).unwrap();
    assert_eq!(gitignore, "build.log\n");
    assert_eq!(ctx.model.status().untracked, vec![".gitignore"]);
}

#[test]
fn tag_and_delete_branch() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["branch", "topic"]);
    let ctx = repo.context(&ScriptedPrompter::new());

    ctx.dispatch(
        signals::TAG,
        &Args::new().push("v1.0").push("HEAD").push(false).push("Release"),
    )
    .unwrap();
    ctx.dispatch(signals::DELETE_BRANCH, &Args::new().push("topic"))
        .unwrap();

    assert_eq!(git_output(repo.path(), &["tag", "--list"]), "v1.0");
    assert_eq!(
        git_output(repo.path(), &["cat-file", "-t", "v1.0"]),
        "tag"
    );
    assert_eq!(git_output(repo.path(), &["branch", "--list", "topic"]), "");
}

#[test]
fn rev_parse_and_commit_message() {
    let repo = TestRepo::new();
    let git = Git::open(repo.path()).unwrap();
    let head = git_output(repo.path(), &["rev-parse", "HEAD"]);
    assert_eq!(git.rev_parse("HEAD").unwrap(), head);
    assert_eq!(git.commit_message("HEAD").unwrap().trim(), "Initial commit");
}
