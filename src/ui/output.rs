//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Renderers build plain strings from engine results. [`print`] respects the
//! quiet flag; [`emit`] is for command results and domain refusals, which are
//! always shown.

use std::fmt::Display;

use crate::engine::history::{LogEntry, StatusReport};
use crate::engine::MergeOutcome;

/// Abbreviated id length used on `Merge:` lines.
pub const MERGE_ID_LEN: usize = 7;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a command's result or a domain refusal such as "No such branch
/// exists." (always shown).
pub fn emit(message: impl Display) {
    println!("{}", message);
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Render one `log`/`global-log` entry, including its trailing newline.
///
/// ```text
/// ===
/// commit <id>
/// Merge: <parent7> <second7>
/// Date: Thu Jan 1 00:00:00 1970 +0000
/// <message>
/// ```
pub fn format_log_entry(entry: &LogEntry, utc: bool) -> String {
    let commit = &entry.commit;
    let mut out = format!("===\ncommit {}\n", entry.id);
    if let (Some(parent), Some(second)) = (commit.parent(), commit.second_parent()) {
        out.push_str(&format!(
            "Merge: {} {}\n",
            parent.short(MERGE_ID_LEN),
            second.short(MERGE_ID_LEN)
        ));
    }
    out.push_str(&format!("Date: {}\n", commit.timestamp().format_log(utc)));
    out.push_str(commit.message());
    out.push('\n');
    out
}

/// Render the five `status` sections. Every section, including the last, is
/// followed by a blank line once printed.
pub fn format_status(report: &StatusReport) -> String {
    let branches = report
        .branches
        .iter()
        .map(|branch| {
            if report.current.as_ref() == Some(branch) {
                format!("*{}", branch)
            } else {
                branch.to_string()
            }
        })
        .collect::<Vec<_>>();
    let unstaged = report
        .unstaged
        .iter()
        .map(|(file, modification)| format!("{} ({})", file, modification))
        .collect::<Vec<_>>();

    let sections = [
        section("Branches", &branches),
        section("Staged Files", &report.staged),
        section("Removed Files", &report.removed),
        section("Modifications Not Staged For Commit", &unstaged),
        section("Untracked Files", &report.untracked),
    ];
    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}

fn section<T: Display>(title: &str, items: &[T]) -> String {
    let mut out = format!("=== {} ===", title);
    if !items.is_empty() {
        out.push('\n');
        out.push_str(&format_list(items, ""));
    }
    out
}

/// The line printed after a merge, if any.
pub fn merge_message(outcome: &MergeOutcome) -> Option<&'static str> {
    match outcome {
        MergeOutcome::AlreadyAncestor => Some("Given branch is an ancestor of the current branch."),
        MergeOutcome::FastForward { .. } => Some("Current branch fast-forwarded."),
        MergeOutcome::Merged { .. } if outcome.has_conflicts() => {
            Some("Encountered a merge conflict.")
        }
        MergeOutcome::Merged { .. } => None,
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}
