//! engine::repo
//!
//! The repository context object.
//!
//! A [`Repository`] bundles the path routing and configuration for one work
//! directory. Every operation takes it explicitly; there is no global state.

use std::path::Path;

use crate::core::commit::Commit;
use crate::core::config::Config;
use crate::core::graph::{CommitGraph, GraphError};
use crate::core::ops::RepoLock;
use crate::core::paths::RepoPaths;
use crate::core::refs::{Head, RefStore};
use crate::core::stage::Stage;
use crate::core::store::ObjectStore;
use crate::core::types::{BranchName, FileName, ObjectId};
use crate::core::verify;

use super::worktree::WorkTree;
use super::EngineError;

/// An open Twig repository.
#[derive(Debug, Clone)]
pub struct Repository {
    paths: RepoPaths,
    config: Config,
}

impl Repository {
    /// Create a repository in `work_dir`.
    ///
    /// Stores the root commit, points the initial branch (from
    /// `config.default_branch()`) at it, and attaches HEAD to that branch.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyInitialized`] if `.twig` already exists.
    pub fn init(work_dir: &Path, config: &Config) -> Result<Self, EngineError> {
        let paths = RepoPaths::new(work_dir.to_path_buf());
        if paths.is_initialized() {
            return Err(EngineError::AlreadyInitialized);
        }
        let branch = config.default_branch()?;

        paths
            .ensure_dirs()
            .map_err(EngineError::io(paths.control_dir()))?;
        let repo = Self {
            paths,
            config: config.clone(),
        };

        let _lock = repo.lock()?;
        let root = repo.store().put_commit(&Commit::root())?;
        repo.refs().write_branch(&branch, &root)?;
        repo.refs().write_head(&Head::Branch(branch.clone()))?;
        Stage::default().save(&repo.paths)?;

        tracing::debug!(work_dir = %work_dir.display(), %branch, %root, "initialized repository");
        Ok(repo)
    }

    /// Open the repository rooted at `work_dir`, loading its configuration.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`] if there is no `.twig` directory.
    pub fn open(work_dir: &Path) -> Result<Self, EngineError> {
        let paths = RepoPaths::new(work_dir.to_path_buf());
        if !paths.is_initialized() {
            return Err(EngineError::NotInitialized);
        }
        let config = Config::load(Some(&paths))?;
        Ok(Self { paths, config })
    }

    pub fn paths(&self) -> &RepoPaths {
        &self.paths
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> ObjectStore<'_> {
        ObjectStore::new(&self.paths)
    }

    pub fn refs(&self) -> RefStore<'_> {
        RefStore::new(&self.paths)
    }

    pub fn graph(&self) -> CommitGraph<'_> {
        CommitGraph::new(self.store())
    }

    pub fn worktree(&self) -> WorkTree<'_> {
        WorkTree::new(&self.paths)
    }

    /// Take the exclusive repository lock.
    pub fn lock(&self) -> Result<RepoLock, EngineError> {
        Ok(RepoLock::acquire(&self.paths)?)
    }

    pub fn load_stage(&self) -> Result<Stage, EngineError> {
        Ok(Stage::load(&self.paths)?)
    }

    pub fn save_stage(&self, stage: &Stage) -> Result<(), EngineError> {
        Ok(stage.save(&self.paths)?)
    }

    pub fn head(&self) -> Result<Head, EngineError> {
        Ok(self.refs().read_head()?)
    }

    /// The branch HEAD is attached to, or `None` when detached.
    pub fn current_branch(&self) -> Result<Option<BranchName>, EngineError> {
        Ok(self.head()?.branch().cloned())
    }

    /// The commit HEAD resolves to.
    pub fn head_id(&self) -> Result<ObjectId, EngineError> {
        match self.head()? {
            Head::Branch(branch) => self
                .refs()
                .read_branch(&branch)?
                .ok_or(EngineError::DanglingHead(branch)),
            Head::Detached(id) => Ok(id),
        }
    }

    pub fn head_commit(&self) -> Result<(ObjectId, Commit), EngineError> {
        let id = self.head_id()?;
        let commit = self.store().get_commit(&id)?;
        Ok((id, commit))
    }

    /// Point the current branch, or a detached HEAD, at `id`.
    pub fn advance_head(&self, id: &ObjectId) -> Result<(), EngineError> {
        match self.head()? {
            Head::Branch(branch) => self.refs().write_branch(&branch, id)?,
            Head::Detached(_) => self.refs().write_head(&Head::Detached(id.clone()))?,
        }
        Ok(())
    }

    /// The commit a branch points at.
    ///
    /// # Errors
    ///
    /// `missing` if the branch does not exist.
    pub fn branch_tip(
        &self,
        branch: &BranchName,
        missing: EngineError,
    ) -> Result<ObjectId, EngineError> {
        self.refs().read_branch(branch)?.ok_or(missing)
    }

    /// Resolve a full or abbreviated commit id.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoSuchCommit`] on zero or ambiguous matches.
    pub fn resolve_commit(&self, input: &str) -> Result<ObjectId, EngineError> {
        match self.graph().resolve(input) {
            Ok(id) => Ok(id),
            Err(GraphError::AmbiguousOrNotFound(_)) => Err(EngineError::NoSuchCommit),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a user-supplied branch name, reporting `invalid` if it cannot
    /// name a branch.
    pub(crate) fn branch_arg(name: &str, invalid: EngineError) -> Result<BranchName, EngineError> {
        BranchName::new(name).map_err(|_| invalid)
    }

    /// Parse a user-supplied file name, reporting `invalid` if it cannot name
    /// a tracked file.
    pub(crate) fn file_arg(name: &str, invalid: EngineError) -> Result<FileName, EngineError> {
        FileName::new(name).map_err(|_| invalid)
    }

    /// Run fast verification, logging any problems.
    ///
    /// Called after mutating commands. Failures are diagnostics, not errors:
    /// the command already completed.
    pub fn verify(&self) -> bool {
        let result = verify::fast_verify(&self.paths);
        for problem in &result.errors {
            tracing::warn!(%problem, "repository verification failed");
        }
        result.ok
    }
}
