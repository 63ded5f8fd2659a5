//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT perform repository mutations directly.

mod branch;
mod checkout;
mod history;
mod init;
mod merge;
mod staging;

// Re-export command functions for testing and direct invocation
pub use branch::{branch, rm_branch};
pub use checkout::{checkout, reset};
pub use history::{find, global_log, log, status};
pub use init::init;
pub use merge::merge;
pub use staging::{add, commit, rm};

use crate::cli::args::Command;
use crate::engine::{Context, Repository};
use crate::ui::output::Verbosity;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init => init(ctx),
        Command::Add { file } => add(ctx, &file),
        Command::Commit { message } => commit(ctx, message.as_deref()),
        Command::Rm { file } => rm(ctx, &file),
        Command::Log => log(ctx),
        Command::GlobalLog => global_log(ctx),
        Command::Find { message } => find(ctx, &message),
        Command::Status => status(ctx),
        Command::Checkout { target, file } => checkout(ctx, target.as_deref(), &file),
        Command::Branch { name } => branch(ctx, &name),
        Command::RmBranch { name } => rm_branch(ctx, &name),
        Command::Reset { commit } => reset(ctx, &commit),
        Command::Merge { branch } => merge(ctx, &branch),
    }
}

/// Open the repository the context points at.
fn open(ctx: &Context) -> Result<Repository> {
    let work_dir = ctx.work_dir()?;
    Ok(Repository::open(&work_dir)?)
}

fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}
