//! engine
//!
//! Every Twig command as a typed operation on a [`Repository`].
//!
//! # Architecture
//!
//! The engine sits between `core` (storage and algorithms) and `cli`
//! (parsing and presentation):
//!
//! - [`repo`] - The repository context: open/init, HEAD resolution, locking
//! - [`worktree`] - Plain files of the work directory
//! - [`staging`] - `add`, `rm`, `commit`
//! - [`checkout`] - The shared restore routine, `checkout`, `reset`
//! - [`branch`] - `branch`, `rm-branch`
//! - [`history`] - `log`, `global-log`, `find`, `status`
//! - [`merge`] - The three-way merge engine
//!
//! Operations return typed results and never print. The CLI decides how to
//! render them.
//!
//! # Invariants
//!
//! - Mutating operations hold the [`RepoLock`](crate::core::ops::RepoLock)
//!   from before the stage is loaded until after the last pointer update
//! - Preconditions are checked before the first write
//! - Objects are stored before any ref or stage entry names them
//!
//! # Example
//!
//! ```no_run
//! use twig::core::config::Config;
//! use twig::engine::Repository;
//! use std::path::Path;
//!
//! let repo = Repository::init(Path::new("."), &Config::default())?;
//! repo.add("hello.txt")?;
//! repo.commit("say hello")?;
//! # Ok::<(), twig::engine::EngineError>(())
//! ```

pub mod branch;
pub mod checkout;
pub mod history;
pub mod merge;
pub mod repo;
pub mod staging;
pub mod worktree;

pub use history::{LogEntry, StatusReport};
pub use merge::MergeOutcome;
pub use repo::Repository;
pub use worktree::WorkTree;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::graph::GraphError;
use crate::core::ops::LockError;
use crate::core::refs::RefError;
use crate::core::stage::StageError;
use crate::core::store::StoreError;
use crate::core::types::{BranchName, TypeError};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// The work directory commands run against.
    pub fn work_dir(&self) -> Result<PathBuf, EngineError> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(|source| EngineError::Io {
                path: PathBuf::from("."),
                source,
            }),
        }
    }
}

/// Classification of an [`EngineError`], used by the CLI to pick an exit
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed invocation.
    Usage,
    /// No repository where one is required.
    NotInitialized,
    /// A named file, commit, or branch does not exist.
    NotFound,
    /// Something being created already exists.
    AlreadyExists,
    /// The repository is not in a state that allows the operation.
    InvalidState,
    /// An untracked work-tree file would be overwritten.
    UntrackedObstruction,
    /// Storage failure or corruption.
    Fatal,
}

impl ErrorKind {
    /// Whether this is a domain outcome rather than a malfunction.
    pub fn is_domain(&self) -> bool {
        !matches!(self, ErrorKind::Usage | ErrorKind::Fatal)
    }
}

/// Errors from engine operations.
///
/// Domain variants carry the exact message shown to the user.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("A Twig version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("Not in an initialized Twig directory.")]
    NotInitialized,

    #[error("File does not exist.")]
    FileNotFound,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No changes added to the commit.")]
    NothingToCommit,

    #[error("No reason to remove the file.")]
    NoReasonToRemove,

    #[error("Found no commit with that message.")]
    NoCommitWithMessage,

    #[error("No commit with that id exists.")]
    NoSuchCommit,

    #[error("File does not exist in that commit.")]
    FileNotInCommit,

    #[error("No such branch exists.")]
    NoSuchBranch,

    #[error("No need to checkout the current branch.")]
    AlreadyOnBranch,

    #[error("A branch with that name already exists.")]
    BranchExists,

    #[error("Cannot remove the current branch.")]
    RemoveCurrentBranch,

    #[error("A branch with that name does not exist.")]
    BranchNotFound,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Cannot merge a branch with itself.")]
    SelfMerge,

    #[error("Cannot merge while HEAD is detached.")]
    DetachedMerge,

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedInTheWay,

    #[error("{0}")]
    InvalidName(#[from] TypeError),

    #[error("HEAD names missing branch '{0}'")]
    DanglingHead(BranchName),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Refs(#[from] RefError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;
        match self {
            NotInitialized => ErrorKind::NotInitialized,
            FileNotFound | NoReasonToRemove | NoCommitWithMessage | NoSuchCommit
            | FileNotInCommit | NoSuchBranch | BranchNotFound => ErrorKind::NotFound,
            AlreadyInitialized | BranchExists => ErrorKind::AlreadyExists,
            EmptyMessage | NothingToCommit | AlreadyOnBranch | RemoveCurrentBranch
            | UncommittedChanges | SelfMerge | DetachedMerge => ErrorKind::InvalidState,
            UntrackedInTheWay => ErrorKind::UntrackedObstruction,
            InvalidName(_) => ErrorKind::Usage,
            DanglingHead(_) | Lock(_) | Store(_) | Graph(_) | Refs(_) | Stage(_) | Config(_)
            | Io { .. } => ErrorKind::Fatal,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| EngineError::Io { path, source }
    }
}
