//! core::ops::lock
//!
//! Exclusive repository lock for mutating commands.
//!
//! # Architecture
//!
//! Only one Twig process may mutate a repository at a time. Every mutating
//! command takes an OS-level exclusive lock on `<control>/lock` before it
//! loads the stage and holds it until the last pointer update is written.
//! Read-only commands never lock.
//!
//! # Invariants
//!
//! - Acquisition is non-blocking: a held lock fails fast with
//!   [`LockError::AlreadyLocked`]
//! - The lock is released on drop (RAII), including on early return
//! - The lock file itself is never deleted; only the OS lock matters
//!
//! # Example
//!
//! ```no_run
//! use twig::core::ops::lock::RepoLock;
//! use twig::core::paths::RepoPaths;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(PathBuf::from("/work"));
//! let _lock = RepoLock::acquire(&paths)?;
//! // lock released when dropped
//! # Ok::<(), twig::core::ops::lock::LockError>(())
//! ```

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::RepoPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("repository is locked by another twig process")]
    AlreadyLocked,

    /// Failed to create or open the lock file.
    #[error("failed to create lock {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(#[source] std::io::Error),
}

/// An exclusive lock on the repository, released on drop.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
}

impl RepoLock {
    /// Take the repository lock without blocking.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be opened
    /// - [`LockError::AcquireFailed`] for any other OS failure
    pub fn acquire(paths: &RepoPaths) -> Result<Self, LockError> {
        let path = paths.lock_path();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateFailed {
                path: path.clone(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::trace!(path = %path.display(), "acquired repository lock");
                Ok(Self { file })
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) => Err(LockError::AcquireFailed(e)),
        }
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, RepoPaths) {
        let temp = TempDir::new().expect("create temp dir");
        let paths = RepoPaths::new(temp.path().to_path_buf());
        paths.ensure_dirs().expect("create control dir");
        (temp, paths)
    }

    #[test]
    fn acquire_creates_lock_file() {
        let (_temp, paths) = setup();
        let _lock = RepoLock::acquire(&paths).expect("acquire lock");
        assert!(paths.lock_path().is_file());
    }

    #[test]
    fn second_acquire_fails_fast() {
        let (_temp, paths) = setup();
        let _held = RepoLock::acquire(&paths).expect("first acquire");
        assert!(matches!(
            RepoLock::acquire(&paths),
            Err(LockError::AlreadyLocked)
        ));
    }

    #[test]
    fn released_on_drop() {
        let (_temp, paths) = setup();
        {
            let _lock = RepoLock::acquire(&paths).expect("first acquire");
        }
        assert!(RepoLock::acquire(&paths).is_ok());
    }

    #[test]
    fn missing_control_dir_is_create_failure() {
        let temp = TempDir::new().expect("create temp dir");
        let paths = RepoPaths::new(temp.path().to_path_buf());
        assert!(matches!(
            RepoLock::acquire(&paths),
            Err(LockError::CreateFailed { .. })
        ));
    }

    #[test]
    fn already_locked_message() {
        assert_eq!(
            LockError::AlreadyLocked.to_string(),
            "repository is locked by another twig process"
        );
    }
}
