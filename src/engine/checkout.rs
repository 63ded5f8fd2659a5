//! engine::checkout
//!
//! Restoring work-tree files from history.
//!
//! # Restore
//!
//! Branch checkout, `reset`, and merge fast-forward all go through
//! [`Repository::restore`]:
//! 1. Abort before any write if an untracked work-tree file would be
//!    overwritten by the target
//! 2. Delete every file tracked by the current commit but not the target
//! 3. Write every file of the target

use crate::core::commit::Commit;
use crate::core::refs::Head;
use crate::core::types::ObjectId;

use super::repo::Repository;
use super::EngineError;

impl Repository {
    /// Replace the work tree's tracked files with `target`'s snapshot.
    ///
    /// Caller holds the lock. Does not touch refs or the stage.
    ///
    /// # Errors
    ///
    /// [`EngineError::UntrackedInTheWay`] if a work-tree file untracked by
    /// `current` is tracked by `target`. Nothing is written in that case.
    pub(crate) fn restore(&self, current: &Commit, target: &Commit) -> Result<(), EngineError> {
        let worktree = self.worktree();

        let blocked = worktree
            .list()?
            .into_iter()
            .find(|file| !current.tracks(file) && target.tracks(file));
        if let Some(file) = blocked {
            tracing::debug!(%file, "untracked file blocks restore");
            return Err(EngineError::UntrackedInTheWay);
        }

        for file in current.snapshot().keys() {
            if !target.tracks(file) {
                worktree.remove(file)?;
            }
        }
        for (file, blob) in target.snapshot() {
            worktree.write(file, &self.store().get_blob(blob)?)?;
        }

        tracing::debug!(files = target.snapshot().len(), "restored work tree");
        Ok(())
    }

    /// `checkout -- <file>`: restore one file from HEAD's commit.
    pub fn checkout_file(&self, name: &str) -> Result<(), EngineError> {
        let _lock = self.lock()?;
        let (_, head) = self.head_commit()?;
        self.restore_file(&head, name)
    }

    /// `checkout <commit> -- <file>`: restore one file from any commit.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NoSuchCommit`] if `commit` does not resolve
    /// - [`EngineError::FileNotInCommit`] if the commit does not track the file
    pub fn checkout_file_from(&self, commit: &str, name: &str) -> Result<(), EngineError> {
        let _lock = self.lock()?;
        let id = self.resolve_commit(commit)?;
        let source = self.store().get_commit(&id)?;
        self.restore_file(&source, name)
    }

    fn restore_file(&self, source: &Commit, name: &str) -> Result<(), EngineError> {
        let file = Self::file_arg(name, EngineError::FileNotInCommit)?;
        let blob = source.blob(&file).ok_or(EngineError::FileNotInCommit)?;
        let content = self.store().get_blob(blob)?;
        self.worktree().write(&file, &content)?;
        tracing::debug!(%file, %blob, "restored file");
        Ok(())
    }

    /// `checkout <branch>`: switch HEAD to a branch, restoring its tree and
    /// clearing the stage.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NoSuchBranch`] if the branch does not exist
    /// - [`EngineError::AlreadyOnBranch`] if it is the current branch
    /// - [`EngineError::UntrackedInTheWay`] if restore would clobber a file
    pub fn checkout_branch(&self, name: &str) -> Result<(), EngineError> {
        let _lock = self.lock()?;
        let branch = Self::branch_arg(name, EngineError::NoSuchBranch)?;
        let tip = self.branch_tip(&branch, EngineError::NoSuchBranch)?;
        if self.current_branch()?.as_ref() == Some(&branch) {
            return Err(EngineError::AlreadyOnBranch);
        }

        let (_, head) = self.head_commit()?;
        let target = self.store().get_commit(&tip)?;
        self.restore(&head, &target)?;

        self.refs().write_head(&Head::Branch(branch))?;
        let mut stage = self.load_stage()?;
        stage.clear();
        self.save_stage(&stage)?;

        self.verify();
        Ok(())
    }

    /// `reset <commit>`: restore a commit's tree and move the current branch
    /// (or detached HEAD) to it.
    pub fn reset(&self, commit: &str) -> Result<ObjectId, EngineError> {
        let _lock = self.lock()?;
        let id = self.resolve_commit(commit)?;

        let (_, head) = self.head_commit()?;
        let target = self.store().get_commit(&id)?;
        self.restore(&head, &target)?;

        self.advance_head(&id)?;
        let mut stage = self.load_stage()?;
        stage.clear();
        self.save_stage(&stage)?;

        self.verify();
        Ok(id)
    }
}
