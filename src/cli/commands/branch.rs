//! branch and rm-branch commands

use super::open;
use crate::engine::Context;
use anyhow::Result;

/// Create a branch at HEAD.
pub fn branch(ctx: &Context, name: &str) -> Result<()> {
    open(ctx)?.create_branch(name)?;
    Ok(())
}

/// Delete a branch pointer.
pub fn rm_branch(ctx: &Context, name: &str) -> Result<()> {
    open(ctx)?.delete_branch(name)?;
    Ok(())
}
