//! cli
//!
//! Command-line interface layer for Twig.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Delegate to command handlers
//! - Map failures to messages and exit statuses
//!
//! # Exit Status
//!
//! | Outcome | Output | Status |
//! |---------|--------|--------|
//! | success | results on stdout | 0 |
//! | domain refusal (e.g. "No such branch exists.") | message on stdout | 0 |
//! | usage error | message on stdout | 1 |
//! | fatal (I/O, corruption, lock held) | `error: ...` on stderr | 2 |
//!
//! The CLI layer is thin. It never touches the filesystem itself; all
//! repository state changes flow through [`crate::engine::Repository`].

pub mod args;
pub mod commands;

pub use args::{Cli, Command};

use std::process::ExitCode;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::Config;
use crate::engine::{self, EngineError, ErrorKind};
use crate::ui::output;

/// Exit status for malformed invocations.
pub const EXIT_USAGE: u8 = 1;
/// Exit status for I/O failures and corrupt repositories.
pub const EXIT_FATAL: u8 = 2;

/// Invocation errors detected before reaching the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Please enter a command.")]
    NoCommand,

    #[error("No command with that name exists.")]
    UnknownCommand,

    #[error("Incorrect operands.")]
    IncorrectOperands,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(err) => return parse_failure(err),
    };

    // Only the global scope can turn on debug logging; repo config is not
    // loaded until a command opens the repository.
    let global = Config::load(None);
    let debug = cli.debug || global.as_ref().is_ok_and(Config::debug);
    init_tracing(debug);
    if let Err(err) = &global {
        tracing::warn!(error = %err, "ignoring unreadable global config");
    }

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Some(command) => commands::dispatch(command, &ctx),
        None => Err(UsageError::NoCommand.into()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "twig=debug" } else { "warn" };
    // A subscriber may already be installed when run() is called in-process.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn parse_failure(err: clap::Error) -> ExitCode {
    use clap::error::ErrorKind as ClapKind;

    let usage = match err.kind() {
        ClapKind::DisplayHelp | ClapKind::DisplayVersion => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        ClapKind::InvalidSubcommand => UsageError::UnknownCommand,
        ClapKind::MissingSubcommand
        | ClapKind::DisplayHelpOnMissingArgumentOrSubcommand => UsageError::NoCommand,
        _ => UsageError::IncorrectOperands,
    };
    tracing::debug!(clap = ?err.kind(), "rejected invocation");
    output::emit(&usage);
    ExitCode::from(EXIT_USAGE)
}

/// Print a failed command's message and pick its exit status.
pub fn report(err: &anyhow::Error) -> ExitCode {
    if let Some(usage) = err.downcast_ref::<UsageError>() {
        output::emit(usage);
        return ExitCode::from(EXIT_USAGE);
    }
    if let Some(engine_err) = err.downcast_ref::<EngineError>() {
        let kind = engine_err.kind();
        if kind.is_domain() {
            output::emit(engine_err);
            return ExitCode::SUCCESS;
        }
        if kind == ErrorKind::Usage {
            output::emit(engine_err);
            return ExitCode::from(EXIT_USAGE);
        }
    }
    output::error(format!("{:#}", err));
    ExitCode::from(EXIT_FATAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ops::LockError;

    #[test]
    fn usage_messages() {
        assert_eq!(UsageError::NoCommand.to_string(), "Please enter a command.");
        assert_eq!(
            UsageError::UnknownCommand.to_string(),
            "No command with that name exists."
        );
        assert_eq!(UsageError::IncorrectOperands.to_string(), "Incorrect operands.");
    }

    #[test]
    fn exit_status_by_kind() {
        let cases: Vec<(anyhow::Error, ExitCode)> = vec![
            (UsageError::IncorrectOperands.into(), ExitCode::from(EXIT_USAGE)),
            (EngineError::NoSuchBranch.into(), ExitCode::SUCCESS),
            (EngineError::NotInitialized.into(), ExitCode::SUCCESS),
            (
                EngineError::Lock(LockError::AlreadyLocked).into(),
                ExitCode::from(EXIT_FATAL),
            ),
            (anyhow::anyhow!("disk on fire"), ExitCode::from(EXIT_FATAL)),
        ];
        for (err, expected) in cases {
            assert_eq!(report(&err), expected, "{err}");
        }
    }
}
