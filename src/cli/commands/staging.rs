//! add, commit, and rm commands

use super::open;
use crate::engine::Context;
use anyhow::Result;

/// Stage a file.
pub fn add(ctx: &Context, file: &str) -> Result<()> {
    open(ctx)?.add(file)?;
    Ok(())
}

/// Commit the stage. A missing message is treated like an empty one.
pub fn commit(ctx: &Context, message: Option<&str>) -> Result<()> {
    open(ctx)?.commit(message.unwrap_or(""))?;
    Ok(())
}

/// Unstage or untrack a file.
pub fn rm(ctx: &Context, file: &str) -> Result<()> {
    open(ctx)?.remove(file)?;
    Ok(())
}
