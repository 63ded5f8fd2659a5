//! init command - Create a repository in the working directory

use crate::core::config::Config;
use crate::engine::{Context, EngineError, Repository};
use anyhow::Result;

/// Create a repository, using the global config's `default_branch`.
pub fn init(ctx: &Context) -> Result<()> {
    let work_dir = ctx.work_dir()?;
    let config = Config::load(None).map_err(EngineError::from)?;
    let repo = Repository::init(&work_dir, &config)?;
    tracing::debug!(control_dir = %repo.paths().control_dir().display(), "init complete");
    Ok(())
}
