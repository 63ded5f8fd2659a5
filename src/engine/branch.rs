//! engine::branch
//!
//! `branch` and `rm-branch`. Both touch only pointers: no commit, no work-tree
//! file, and no stage entry is ever changed here.

use crate::core::types::{BranchName, ObjectId};

use super::repo::Repository;
use super::EngineError;

impl Repository {
    /// Create a branch at HEAD's commit. HEAD stays where it is.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidName`] if `name` is not a valid branch name
    /// - [`EngineError::BranchExists`] if the branch already exists, or if
    ///   its name nests under or above an existing branch (`topic` and
    ///   `topic/one` cannot both be stored)
    pub fn create_branch(&self, name: &str) -> Result<ObjectId, EngineError> {
        let _lock = self.lock()?;
        let branch = BranchName::new(name)?;
        let existing = self.refs().list_branches()?;
        if let Some(clash) = existing.iter().find(|other| names_clash(other, &branch)) {
            tracing::debug!(branch = %branch, existing = %clash, "branch name taken");
            return Err(EngineError::BranchExists);
        }

        let head = self.head_id()?;
        self.refs().write_branch(&branch, &head)?;

        self.verify();
        Ok(head)
    }

    /// Delete a branch pointer. Its commits stay in the store.
    ///
    /// # Errors
    ///
    /// - [`EngineError::BranchNotFound`] if no such branch exists
    /// - [`EngineError::RemoveCurrentBranch`] if HEAD is attached to it
    pub fn delete_branch(&self, name: &str) -> Result<(), EngineError> {
        let _lock = self.lock()?;
        let branch = Self::branch_arg(name, EngineError::BranchNotFound)?;
        if !self.refs().branch_exists(&branch) {
            return Err(EngineError::BranchNotFound);
        }
        if self.current_branch()?.as_ref() == Some(&branch) {
            return Err(EngineError::RemoveCurrentBranch);
        }

        self.refs().delete_branch(&branch)?;
        self.verify();
        Ok(())
    }
}

/// Whether two branches would share a ref path: equal, or one is a
/// directory prefix of the other.
fn names_clash(a: &BranchName, b: &BranchName) -> bool {
    let (a, b) = (a.as_str(), b.as_str());
    let nests = |outer: &str, inner: &str| {
        inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.starts_with('/'))
    };
    a == b || nests(a, b) || nests(b, a)
}
