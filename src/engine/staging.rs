//! engine::staging
//!
//! `add`, `rm`, and `commit`: the operations that drive the stage between
//! Clean and Dirty.

use crate::core::commit::Commit;
use crate::core::object::{self, ObjectKind};
use crate::core::stage::Stage;
use crate::core::types::ObjectId;

use super::repo::Repository;
use super::EngineError;

impl Repository {
    /// Stage the work-tree content of `name`.
    ///
    /// If the content matches HEAD's version the file is dropped from the
    /// pending additions instead, and any pending removal is left as is.
    ///
    /// # Errors
    ///
    /// [`EngineError::FileNotFound`] if the file is not in the work tree.
    pub fn add(&self, name: &str) -> Result<(), EngineError> {
        let _lock = self.lock()?;
        let file = Self::file_arg(name, EngineError::FileNotFound)?;
        let content = self
            .worktree()
            .read(&file)?
            .ok_or(EngineError::FileNotFound)?;

        let (_, head) = self.head_commit()?;
        let mut stage = self.load_stage()?;
        let id = object::id_for(ObjectKind::Blob, &content);

        if head.blob(&file) == Some(&id) {
            if stage.unstage_addition(&file) {
                tracing::debug!(%file, "content matches HEAD, unstaged");
            }
        } else {
            self.store().put_blob(&content)?;
            tracing::debug!(%file, blob = %id, "staged addition");
            stage.stage_addition(file, id);
        }

        self.save_stage(&stage)?;
        self.verify();
        Ok(())
    }

    /// Unstage `name` and, if HEAD tracks it, stage its removal and delete it
    /// from the work tree.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoReasonToRemove`] if the file is neither staged nor
    /// tracked.
    pub fn remove(&self, name: &str) -> Result<(), EngineError> {
        let _lock = self.lock()?;
        let file = Self::file_arg(name, EngineError::NoReasonToRemove)?;

        let (_, head) = self.head_commit()?;
        let mut stage = self.load_stage()?;

        let was_staged = stage.unstage_addition(&file);
        let tracked = head.tracks(&file);
        if !was_staged && !tracked {
            return Err(EngineError::NoReasonToRemove);
        }

        if tracked {
            stage.stage_removal(file.clone());
        }
        self.save_stage(&stage)?;
        if tracked {
            self.worktree().remove(&file)?;
            tracing::debug!(%file, "staged removal");
        }

        self.verify();
        Ok(())
    }

    /// Record the stage as a new commit on top of HEAD.
    ///
    /// # Errors
    ///
    /// - [`EngineError::EmptyMessage`] for an empty message
    /// - [`EngineError::NothingToCommit`] if the stage is Clean
    pub fn commit(&self, message: &str) -> Result<ObjectId, EngineError> {
        if message.is_empty() {
            return Err(EngineError::EmptyMessage);
        }

        let _lock = self.lock()?;
        let mut stage = self.load_stage()?;
        if stage.is_clean() {
            return Err(EngineError::NothingToCommit);
        }

        let (head_id, head) = self.head_commit()?;
        let commit = Commit::new(message, head_id, stage.apply(head.snapshot()));
        let id = self.record_commit(&commit, &mut stage)?;

        self.verify();
        Ok(id)
    }

    /// Store `commit`, move HEAD's pointer to it, and reset the stage.
    ///
    /// Caller holds the lock.
    pub(crate) fn record_commit(
        &self,
        commit: &Commit,
        stage: &mut Stage,
    ) -> Result<ObjectId, EngineError> {
        let id = self.store().put_commit(commit)?;
        self.advance_head(&id)?;
        stage.clear();
        self.save_stage(stage)?;
        tracing::debug!(commit = %id, message = commit.message(), "recorded commit");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::types::FileName;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Repository) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path(), &Config::default()).unwrap();
        (temp, repo)
    }

    fn name(s: &str) -> FileName {
        FileName::new(s).unwrap()
    }

    mod add {
        use super::*;

        #[test]
        fn stages_new_file() {
            let (temp, repo) = setup();
            fs::write(temp.path().join("a.txt"), "hello").unwrap();

            repo.add("a.txt").unwrap();
            let stage = repo.load_stage().unwrap();
            let blob = stage.staged_blob(&name("a.txt")).unwrap();
            assert_eq!(repo.store().get_blob(blob).unwrap(), b"hello");
        }

        #[test]
        fn missing_file() {
            let (_temp, repo) = setup();
            assert!(matches!(repo.add("nope.txt"), Err(EngineError::FileNotFound)));
            assert!(matches!(repo.add("../escape"), Err(EngineError::FileNotFound)));
        }

        #[test]
        fn restaging_head_content_cleans_stage() {
            let (temp, repo) = setup();
            let path = temp.path().join("a.txt");
            fs::write(&path, "v1").unwrap();
            repo.add("a.txt").unwrap();
            repo.commit("v1").unwrap();

            fs::write(&path, "v2").unwrap();
            repo.add("a.txt").unwrap();
            assert!(!repo.load_stage().unwrap().is_clean());

            fs::write(&path, "v1").unwrap();
            repo.add("a.txt").unwrap();
            assert!(repo.load_stage().unwrap().is_clean());
        }

        #[test]
        fn re_adding_after_rm_keeps_removal() {
            let (temp, repo) = setup();
            let path = temp.path().join("a.txt");
            fs::write(&path, "v1").unwrap();
            repo.add("a.txt").unwrap();
            repo.commit("v1").unwrap();

            repo.remove("a.txt").unwrap();
            fs::write(&path, "v1").unwrap();
            repo.add("a.txt").unwrap();

            let stage = repo.load_stage().unwrap();
            assert!(stage.staged_blob(&name("a.txt")).is_none());
            assert!(stage.is_staged_for_removal(&name("a.txt")));
        }
    }

    mod remove {
        use super::*;

        #[test]
        fn unstages_pending_addition_and_keeps_file() {
            let (temp, repo) = setup();
            fs::write(temp.path().join("a.txt"), "x").unwrap();
            repo.add("a.txt").unwrap();

            repo.remove("a.txt").unwrap();
            assert!(repo.load_stage().unwrap().is_clean());
            assert!(temp.path().join("a.txt").exists());
        }

        #[test]
        fn tracked_file_is_staged_and_deleted() {
            let (temp, repo) = setup();
            fs::write(temp.path().join("a.txt"), "x").unwrap();
            repo.add("a.txt").unwrap();
            repo.commit("add a").unwrap();

            repo.remove("a.txt").unwrap();
            assert!(repo
                .load_stage()
                .unwrap()
                .is_staged_for_removal(&name("a.txt")));
            assert!(!temp.path().join("a.txt").exists());
        }

        #[test]
        fn untracked_unstaged_file() {
            let (temp, repo) = setup();
            fs::write(temp.path().join("a.txt"), "x").unwrap();
            assert!(matches!(
                repo.remove("a.txt"),
                Err(EngineError::NoReasonToRemove)
            ));
            assert!(temp.path().join("a.txt").exists());
        }
    }

    mod commit {
        use super::*;

        #[test]
        fn clean_stage_is_rejected() {
            let (_temp, repo) = setup();
            let before = repo.head_id().unwrap();
            assert!(matches!(
                repo.commit("nothing"),
                Err(EngineError::NothingToCommit)
            ));
            assert_eq!(repo.head_id().unwrap(), before);
        }

        #[test]
        fn empty_message_is_rejected() {
            let (temp, repo) = setup();
            fs::write(temp.path().join("a.txt"), "x").unwrap();
            repo.add("a.txt").unwrap();
            assert!(matches!(repo.commit(""), Err(EngineError::EmptyMessage)));
        }

        #[test]
        fn snapshot_is_head_plus_stage() {
            let (temp, repo) = setup();
            fs::write(temp.path().join("keep.txt"), "k").unwrap();
            fs::write(temp.path().join("drop.txt"), "d").unwrap();
            repo.add("keep.txt").unwrap();
            repo.add("drop.txt").unwrap();
            let first = repo.commit("two files").unwrap();

            fs::write(temp.path().join("new.txt"), "n").unwrap();
            repo.add("new.txt").unwrap();
            repo.remove("drop.txt").unwrap();
            let second = repo.commit("swap").unwrap();

            let commit = repo.store().get_commit(&second).unwrap();
            assert_eq!(commit.parent(), Some(&first));
            let files: Vec<_> = commit.snapshot().keys().map(|f| f.as_str()).collect();
            assert_eq!(files, vec!["keep.txt", "new.txt"]);
            assert!(repo.load_stage().unwrap().is_clean());
            assert_eq!(repo.head_id().unwrap(), second);
        }
    }
}
