//! engine::history
//!
//! Read-only commands: `log`, `global-log`, `find`, `status`.
//!
//! None of these take the repository lock or write anything.

use std::collections::BTreeSet;

use crate::core::commit::Commit;
use crate::core::types::{BranchName, FileName, ObjectId};

use super::repo::Repository;
use super::EngineError;

/// One commit as shown by `log` and `global-log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: ObjectId,
    pub commit: Commit,
}

/// How a tracked file differs from what would be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modification {
    Modified,
    Deleted,
}

impl std::fmt::Display for Modification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Modification::Modified => "modified",
            Modification::Deleted => "deleted",
        })
    }
}

/// Everything `status` reports. Every list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub branches: Vec<BranchName>,
    /// `None` when HEAD is detached.
    pub current: Option<BranchName>,
    pub staged: Vec<FileName>,
    pub removed: Vec<FileName>,
    pub unstaged: Vec<(FileName, Modification)>,
    pub untracked: Vec<FileName>,
}

impl Repository {
    /// HEAD's history along primary parents, newest first.
    pub fn log(&self) -> Result<Vec<LogEntry>, EngineError> {
        let head = self.head_id()?;
        self.graph()
            .walk(&head)
            .map(|step| -> Result<LogEntry, EngineError> {
                let (id, commit) = step?;
                Ok(LogEntry { id, commit })
            })
            .collect()
    }

    /// Every commit ever stored, in ascending id order.
    pub fn global_log(&self) -> Result<Vec<LogEntry>, EngineError> {
        let store = self.store();
        store
            .list_commits()?
            .into_iter()
            .map(|id| -> Result<LogEntry, EngineError> {
                let commit = store.get_commit(&id)?;
                Ok(LogEntry { id, commit })
            })
            .collect()
    }

    /// Ids of every commit whose message is exactly `message`, ascending.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoCommitWithMessage`] if there are none.
    pub fn find(&self, message: &str) -> Result<Vec<ObjectId>, EngineError> {
        let matches: Vec<ObjectId> = self
            .global_log()?
            .into_iter()
            .filter(|entry| entry.commit.message() == message)
            .map(|entry| entry.id)
            .collect();

        if matches.is_empty() {
            return Err(EngineError::NoCommitWithMessage);
        }
        Ok(matches)
    }

    /// Branches, the stage, and how the work tree differs from both.
    pub fn status(&self) -> Result<StatusReport, EngineError> {
        let (_, head) = self.head_commit()?;
        let stage = self.load_stage()?;
        let worktree = self.worktree();
        let work_files = worktree.list()?;

        let mut unstaged = Vec::new();
        let candidates: BTreeSet<&FileName> =
            head.snapshot().keys().chain(stage.added().keys()).collect();
        for file in candidates {
            let expected = match stage.staged_blob(file) {
                Some(blob) => blob,
                None if stage.is_staged_for_removal(file) => continue,
                None => match head.blob(file) {
                    Some(blob) => blob,
                    None => continue,
                },
            };
            match worktree.content_id(file)? {
                None => unstaged.push((file.clone(), Modification::Deleted)),
                Some(actual) if &actual != expected => {
                    unstaged.push((file.clone(), Modification::Modified))
                }
                Some(_) => {}
            }
        }

        let untracked = work_files
            .into_iter()
            .filter(|file| {
                stage.staged_blob(file).is_none()
                    && (!head.tracks(file) || stage.is_staged_for_removal(file))
            })
            .collect();

        Ok(StatusReport {
            branches: self.refs().list_branches()?,
            current: self.current_branch()?,
            staged: stage.added().keys().cloned().collect(),
            removed: stage.removed().iter().cloned().collect(),
            unstaged,
            untracked,
        })
    }
}
