//! merge command - Merge a branch into the current branch

use super::{open, verbosity};
use crate::engine::{Context, MergeOutcome};
use crate::ui::output;
use anyhow::Result;

/// Merge `branch` into the current branch and report what happened.
pub fn merge(ctx: &Context, branch: &str) -> Result<()> {
    let outcome = open(ctx)?.merge(branch)?;

    if let MergeOutcome::Merged { conflicts, .. } = &outcome {
        for file in conflicts {
            tracing::debug!(%file, "conflict written");
        }
    }
    if let Some(message) = output::merge_message(&outcome) {
        output::print(message, verbosity(ctx));
    }
    Ok(())
}
