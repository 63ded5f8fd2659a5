//! log, global-log, find, and status commands
//!
//! All four are read-only and print their results regardless of `--quiet`.

use super::open;
use crate::engine::history::LogEntry;
use crate::engine::Context;
use crate::ui::output;
use anyhow::Result;

/// Show HEAD's first-parent history.
pub fn log(ctx: &Context) -> Result<()> {
    let repo = open(ctx)?;
    print_entries(&repo.log()?, repo.config().utc_dates());
    Ok(())
}

/// Show every stored commit.
pub fn global_log(ctx: &Context) -> Result<()> {
    let repo = open(ctx)?;
    print_entries(&repo.global_log()?, repo.config().utc_dates());
    Ok(())
}

fn print_entries(entries: &[LogEntry], utc: bool) {
    for entry in entries {
        output::emit(output::format_log_entry(entry, utc));
    }
}

/// Print ids of commits whose message matches exactly.
pub fn find(ctx: &Context, message: &str) -> Result<()> {
    let ids = open(ctx)?.find(message)?;
    output::emit(output::format_list(&ids, ""));
    Ok(())
}

/// Show branches, the stage, and work-tree changes.
pub fn status(ctx: &Context) -> Result<()> {
    let report = open(ctx)?.status()?;
    output::emit(output::format_status(&report));
    Ok(())
}
