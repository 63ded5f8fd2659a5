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
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Twig - a small local version-control system
#[derive(Parser, Debug)]
#[command(name = "twig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if twig was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// `None` when invoked without a command.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a repository in the current directory
    #[command(
        long_about = "Create a repository in the current directory.\n\n\
            Makes the .twig control directory, records the initial commit, and \
            attaches HEAD to the default branch (`master` unless the global config \
            sets `default_branch`)."
    )]
    Init,

    /// Stage a file's current content
    Add {
        /// File in the work directory
        file: String,
    },

    /// Record staged changes as a new commit
    Commit {
        /// Commit message
        message: Option<String>,
    },

    /// Unstage a file, and stop tracking it if HEAD tracks it
    Rm {
        /// File to remove
        file: String,
    },

    /// Show HEAD's history, newest first
    Log,

    /// Show every commit ever made
    #[command(name = "global-log")]
    GlobalLog,

    /// Print ids of commits with exactly this message
    Find {
        /// Commit message to match
        message: String,
    },

    /// Show branches, staged files and work-tree changes
    Status,

    /// Restore a file, or switch branches
    #[command(after_help = "\
EXAMPLES:
    # Restore a file from HEAD
    twig checkout -- notes.txt

    # Restore a file from an earlier commit (abbreviated ids work)
    twig checkout 3fa9c01 -- notes.txt

    # Switch to another branch
    twig checkout feature")]
    Checkout {
        /// Commit id (with `-- <file>`) or branch name
        target: Option<String>,

        /// File to restore, given after `--`
        #[arg(last = true, value_name = "FILE")]
        file: Vec<String>,
    },

    /// Create a branch at HEAD
    Branch {
        /// Branch name
        name: String,
    },

    /// Delete a branch pointer
    #[command(name = "rm-branch")]
    RmBranch {
        /// Branch name
        name: String,
    },

    /// Check out a commit and move the current branch to it
    Reset {
        /// Commit id, full or abbreviated
        commit: String,
    },

    /// Merge a branch into the current branch
    #[command(
        long_about = "Merge a branch into the current branch.\n\n\
            If the given branch is already contained in the current one nothing \
            happens. If the current branch is contained in the given one, the \
            current branch is fast-forwarded. Otherwise a merge commit with two \
            parents is recorded; files changed differently on both sides are \
            written with conflict markers."
    )]
    Merge {
        /// Branch to merge in
        branch: String,
    },
}

impl Cli {
    /// Parse command-line arguments, returning clap's error for the caller to
    /// classify.
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Parser::try_parse()
    }
}
