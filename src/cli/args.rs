//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Only report failures
//! - `--yes` / `-y`: Answer yes to every question
//! - `--file <path>`: The selected file, for tools that need one

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Stagehand - staging, committing and undo for a git working tree
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if stagehand was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only report failures; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    /// Treat this path as the selected file
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Whether prompts may read from stdin.
    ///
    /// Off with `--no-interactive` or `--quiet`, otherwise on when stdin is
    /// a terminal.
    pub fn interactive(&self) -> bool {
        if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rescan and show the working tree status
    Status {
        /// Refresh the index stat information first
        #[arg(long)]
        refresh: bool,
    },

    /// Stage paths, or every path in one status list
    #[command(after_help = "\
EXAMPLES:
    stagehand stage src/lib.rs
    stagehand stage --modified
    stagehand stage --untracked")]
    Stage {
        /// Paths to stage
        paths: Vec<String>,

        /// Stage every modified path
        #[arg(long, conflicts_with_all = ["untracked", "unmerged"])]
        modified: bool,

        /// Stage every untracked path
        #[arg(long, conflicts_with = "unmerged")]
        untracked: bool,

        /// Stage every unmerged path
        #[arg(long)]
        unmerged: bool,
    },

    /// Unstage paths
    Unstage {
        /// Paths to unstage
        paths: Vec<String>,

        /// Unstage everything
        #[arg(long, conflicts_with = "paths")]
        all: bool,
    },

    /// Stop tracking paths without deleting them
    Untrack {
        /// Paths to remove from the index
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show a diff
    Diff {
        /// Restrict the diff to these paths
        paths: Vec<String>,

        /// Diff the index against HEAD
        #[arg(long)]
        cached: bool,

        /// Show a diffstat summary instead
        #[arg(long)]
        stat: bool,
    },

    /// Commit the index
    #[command(
        long_about = "Commit the index.\n\n\
            The message comes from -m, from a file with -F, or from the commit \
            template. With --amend the previous commit's message is loaded first \
            and replaced when -m or -F is given.",
        after_help = "\
EXAMPLES:
    stagehand commit -m \"Fix typo in README\"
    stagehand commit --amend
    stagehand commit -F notes.txt --signoff"
    )]
    Commit {
        /// Commit message
        #[arg(short, long, conflicts_with = "message_file")]
        message: Option<String>,

        /// Read the message from a file
        #[arg(short = 'F', long, value_name = "PATH")]
        message_file: Option<PathBuf>,

        /// Amend the previous commit
        #[arg(long)]
        amend: bool,

        /// Add a Signed-off-by trailer
        #[arg(short, long)]
        signoff: bool,
    },

    /// Create a tag
    Tag {
        /// Tag name
        name: String,

        /// Revision to tag
        #[arg(default_value = "HEAD")]
        revision: String,

        /// Make a GPG-signed tag
        #[arg(short, long)]
        sign: bool,

        /// Tag message; makes an annotated tag
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Run git checkout with the given arguments
    Checkout {
        /// Arguments passed to git checkout
        #[arg(required = true, allow_hyphen_values = true, trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Cherry-pick revisions onto HEAD
    CherryPick {
        /// Revisions to pick, in order
        #[arg(required = true)]
        revs: Vec<String>,
    },

    /// Delete a branch
    DeleteBranch {
        /// Branch name
        name: String,
    },

    /// Export revisions as numbered patches
    FormatPatch {
        /// Revisions to export
        #[arg(required = true)]
        revs: Vec<String>,
    },

    /// Apply mailbox patches
    Apply {
        /// Patch files
        #[arg(required = true)]
        patches: Vec<PathBuf>,
    },

    /// Add paths to .gitignore
    Ignore {
        /// Patterns to ignore
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Delete files from the working tree
    Rm {
        /// Files to delete
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Run a configured tool
    #[command(after_help = "\
Tools are configured under [tools.<name>] in config.toml, or as
guitool.<name>.* in git config. Use --file to supply $FILENAME.")]
    Tool {
        /// Tool name
        name: String,
    },

    /// Open files in the configured editor
    Edit {
        /// Files to edit
        #[arg(required = true)]
        paths: Vec<String>,

        /// Line to jump to
        #[arg(short, long)]
        line: Option<u32>,
    },

    /// Launch git difftool
    Difftool {
        /// Paths to compare
        paths: Vec<String>,

        /// Compare the index against HEAD
        #[arg(long)]
        cached: bool,
    },

    /// Launch git mergetool
    Mergetool {
        /// Paths to resolve
        paths: Vec<String>,
    },

    /// Open files with the default application
    Open {
        /// Files to open
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Launch the history browser
    Visualize {
        /// Show all branches
        #[arg(long, conflicts_with = "revision")]
        all: bool,

        /// Show this revision
        #[arg(long)]
        revision: Option<String>,

        /// Limit to these paths
        paths: Vec<String>,
    },

    /// Clone a repository
    Clone {
        /// Source URL or path
        url: String,

        /// Destination directory
        destination: String,

        /// Do not start a new instance in the clone
        #[arg(long)]
        no_spawn: bool,
    },

    /// Change a setting
    Config {
        /// Setting key, for example diff.context
        key: String,

        /// New value
        value: String,

        /// Write to the global config instead of the repository's
        #[arg(long)]
        global: bool,
    },

    /// Dispatch an event by name
    #[command(
        long_about = "Dispatch an event by name.\n\n\
            Arguments are positional. `true` and `false` are booleans, `-` is an \
            empty argument, `[a,b]` is a list, and a leading `=` keeps the rest \
            as plain text. Everything else is text.",
        after_help = "\
EXAMPLES:
    stagehand run stage [a.txt,b.txt]
    stagehand run commit false \"Initial import\"
    stagehand run tag v1.0 HEAD false =false"
    )]
    Run {
        /// Event name (see `stagehand events`)
        event: String,

        /// Positional arguments
        #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Read events from stdin, one per line, sharing one undo history
    #[command(after_help = "\
Each line is an event with arguments, as for `stagehand run`. The
lines `undo`, `show` and `quit` are handled by the session itself.")]
    Session,

    /// List the registered events
    Events,
}
