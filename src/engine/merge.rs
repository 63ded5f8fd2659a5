//! engine::merge
//!
//! Three-way merge of a branch into the current branch.
//!
//! # Algorithm
//!
//! With `base = merge_base(head, given)`:
//! - `base == given`: nothing to do
//! - `base == head`: fast-forward the current branch to `given`
//! - otherwise each file in the union of the three snapshots is resolved by
//!   comparing its blob in base (`s`), head (`h`) and given (`g`):
//!   - `s == h != g`: take given's version (or delete it if `g` is absent)
//!   - `s == g` or `h == g`: keep head's version
//!   - all three differ: conflict, write both sides with markers
//!
//!   and the result is recorded as a two-parent merge commit.
//!
//! # Invariants
//!
//! - Every precondition is checked before the first write
//! - Files are processed in sorted order, so results are deterministic
//! - Conflict files are stored as blobs like any other staged content

use std::collections::{BTreeMap, BTreeSet};

use crate::core::commit::{Commit, Snapshot};
use crate::core::refs::Head;
use crate::core::types::{FileName, ObjectId};

use super::repo::Repository;
use super::EngineError;

/// What a merge did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The given branch is already contained in the current one.
    AlreadyAncestor,
    /// The current branch moved to the given branch's tip. No commit was made.
    FastForward { to: ObjectId },
    /// A merge commit was recorded.
    Merged {
        commit: ObjectId,
        /// Files written with conflict markers, sorted.
        conflicts: Vec<FileName>,
    },
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        matches!(self, MergeOutcome::Merged { conflicts, .. } if !conflicts.is_empty())
    }
}

/// How one file is resolved by a non-trivial merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Write and stage given's blob.
    TakeGiven(ObjectId),
    /// Stage removal and delete the file.
    Delete,
    /// Both sides changed differently. Either side may be absent.
    Conflict {
        head: Option<ObjectId>,
        given: Option<ObjectId>,
    },
}

/// Decide every file that needs action. Files absent from the result keep
/// head's version.
pub fn resolve_files(base: &Snapshot, head: &Snapshot, given: &Snapshot) -> BTreeMap<FileName, Resolution> {
    let files: BTreeSet<&FileName> = base.keys().chain(head.keys()).chain(given.keys()).collect();

    let mut plan = BTreeMap::new();
    for file in files {
        let s = base.get(file);
        let h = head.get(file);
        let g = given.get(file);

        let resolution = if s == h && s != g {
            match g {
                Some(blob) => Resolution::TakeGiven(blob.clone()),
                None => Resolution::Delete,
            }
        } else if s != h && s != g && h != g {
            Resolution::Conflict {
                head: h.cloned(),
                given: g.cloned(),
            }
        } else {
            continue;
        };
        plan.insert(file.clone(), resolution);
    }
    plan
}

/// The content written for a conflicted file.
pub fn conflict_content(head: &[u8], given: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(head.len() + given.len() + 32);
    out.extend_from_slice(b"<<<<<<< HEAD\n");
    out.extend_from_slice(head);
    out.extend_from_slice(b"=======\n");
    out.extend_from_slice(given);
    out.extend_from_slice(b">>>>>>>\n");
    out
}

impl Repository {
    /// Merge branch `name` into the current branch.
    ///
    /// # Errors
    ///
    /// Checked in order, before any write:
    /// - [`EngineError::UncommittedChanges`] if the stage is Dirty
    /// - [`EngineError::BranchNotFound`] if the branch does not exist
    /// - [`EngineError::SelfMerge`] if it is the current branch
    /// - [`EngineError::DetachedMerge`] if HEAD is detached
    /// - [`EngineError::UntrackedInTheWay`] if a work-tree file untracked by
    ///   HEAD is tracked by the given branch
    pub fn merge(&self, name: &str) -> Result<MergeOutcome, EngineError> {
        let _lock = self.lock()?;
        let mut stage = self.load_stage()?;
        if !stage.is_clean() {
            return Err(EngineError::UncommittedChanges);
        }

        let given_branch = Self::branch_arg(name, EngineError::BranchNotFound)?;
        let given_id = self.branch_tip(&given_branch, EngineError::BranchNotFound)?;
        let current = match self.head()? {
            Head::Branch(branch) if branch == given_branch => {
                return Err(EngineError::SelfMerge)
            }
            Head::Branch(branch) => branch,
            Head::Detached(_) => return Err(EngineError::DetachedMerge),
        };

        let (head_id, head) = self.head_commit()?;
        let given = self.store().get_commit(&given_id)?;
        let worktree = self.worktree();
        if worktree
            .list()?
            .iter()
            .any(|file| !head.tracks(file) && given.tracks(file))
        {
            return Err(EngineError::UntrackedInTheWay);
        }

        let base_id = self.graph().merge_base(&head_id, &given_id)?;
        tracing::debug!(
            head = %head_id,
            given = %given_id,
            base = ?base_id.as_ref().map(|id| id.short(7).to_string()),
            "merge base"
        );

        if base_id.as_ref() == Some(&given_id) {
            return Ok(MergeOutcome::AlreadyAncestor);
        }
        if base_id.as_ref() == Some(&head_id) {
            self.restore(&head, &given)?;
            self.advance_head(&given_id)?;
            stage.clear();
            self.save_stage(&stage)?;
            self.verify();
            return Ok(MergeOutcome::FastForward { to: given_id });
        }

        // Unrelated histories merge against an empty base.
        let base_snapshot = match &base_id {
            Some(id) => self.store().get_commit(id)?.snapshot().clone(),
            None => Snapshot::new(),
        };

        let mut conflicts = Vec::new();
        for (file, resolution) in resolve_files(&base_snapshot, head.snapshot(), given.snapshot()) {
            match resolution {
                Resolution::TakeGiven(blob) => {
                    worktree.write(&file, &self.store().get_blob(&blob)?)?;
                    stage.stage_addition(file, blob);
                }
                Resolution::Delete => {
                    stage.stage_removal(file.clone());
                    worktree.remove(&file)?;
                }
                Resolution::Conflict { head, given } => {
                    let read = |side: Option<ObjectId>| -> Result<Vec<u8>, EngineError> {
                        match side {
                            Some(blob) => Ok(self.store().get_blob(&blob)?),
                            None => Ok(Vec::new()),
                        }
                    };
                    let content = conflict_content(&read(head)?, &read(given)?);
                    let blob = self.store().put_blob(&content)?;
                    worktree.write(&file, &content)?;
                    tracing::debug!(%file, "merge conflict");
                    stage.stage_addition(file.clone(), blob);
                    conflicts.push(file);
                }
            }
        }

        let message = format!("Merged {} into {}.", given_branch, current);
        let commit = Commit::merge(message, head_id, given_id, stage.apply(head.snapshot()));
        let commit = self.record_commit(&commit, &mut stage)?;

        self.verify();
        Ok(MergeOutcome::Merged { commit, conflicts })
    }
}
