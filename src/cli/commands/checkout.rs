//! checkout and reset commands

use super::open;
use crate::cli::UsageError;
use crate::engine::Context;
use anyhow::Result;

/// The three checkout forms:
///
/// - `checkout -- <file>`
/// - `checkout <commit> -- <file>`
/// - `checkout <branch>`
///
/// Anything else is an operand error, reported before the repository is
/// opened.
pub fn checkout(ctx: &Context, target: Option<&str>, file: &[String]) -> Result<()> {
    match (target, file) {
        (None, [file]) => open(ctx)?.checkout_file(file)?,
        (Some(commit), [file]) => open(ctx)?.checkout_file_from(commit, file)?,
        (Some(branch), []) => open(ctx)?.checkout_branch(branch)?,
        _ => return Err(UsageError::IncorrectOperands.into()),
    }
    Ok(())
}

/// Move the current branch to a commit and restore its tree.
pub fn reset(ctx: &Context, commit: &str) -> Result<()> {
    let id = open(ctx)?.reset(commit)?;
    tracing::debug!(%id, "reset");
    Ok(())
}
