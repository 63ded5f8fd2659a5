//! core::store
//!
//! Content-addressed object store.
//!
//! # Architecture
//!
//! Objects live flat under `<control>/objects/<id>`, one file per object. Each
//! file holds the tagged encoding from [`crate::core::object`], and the id is
//! the SHA-256 of those bytes. Storage is write-once and append-only: nothing
//! in this module overwrites or deletes an object.
//!
//! # Invariants
//!
//! - `put` is idempotent: identical content is stored exactly once
//! - An object is fully written (temp file + rename) before its id is returned,
//!   so anything referencing the id can rely on it existing
//! - Kind is read from the tag, never guessed by trial decoding
//!
//! # Example
//!
//! ```no_run
//! use twig::core::paths::RepoPaths;
//! use twig::core::store::ObjectStore;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(PathBuf::from("."));
//! let store = ObjectStore::new(&paths);
//! let id = store.put_blob(b"hello\n")?;
//! assert_eq!(store.get_blob(&id)?, b"hello\n");
//! # Ok::<(), twig::core::store::StoreError>(())
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use thiserror::Error;

use crate::core::atomic::write_atomic;
use crate::core::commit::Commit;
use crate::core::object::{self, ObjectError, ObjectKind};
use crate::core::paths::RepoPaths;
use crate::core::types::ObjectId;

/// Errors from object storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object with this id.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The object exists but has a different kind.
    #[error("object {id} is a {actual}, expected a {expected}")]
    WrongKind {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// The stored bytes do not decode.
    #[error("object {id} is corrupt: {source}")]
    Corrupt {
        id: ObjectId,
        #[source]
        source: ObjectError,
    },

    /// A commit payload failed to (de)serialize.
    #[error("commit {id} could not be decoded: {source}")]
    BadCommit {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure.
    #[error("object store i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: PathBuf, source: io::Error) -> Self {
        StoreError::Io { path, source }
    }
}

/// An object as read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub payload: Vec<u8>,
}

/// Content-addressed storage for blobs and commits.
///
/// Borrows the repository paths; cheap to construct per operation.
#[derive(Debug, Clone, Copy)]
pub struct ObjectStore<'a> {
    paths: &'a RepoPaths,
}

impl<'a> ObjectStore<'a> {
    pub fn new(paths: &'a RepoPaths) -> Self {
        Self { paths }
    }

    /// Store a payload of the given kind, returning its id.
    ///
    /// Writes only if the object is absent.
    pub fn put(&self, kind: ObjectKind, payload: &[u8]) -> Result<ObjectId, StoreError> {
        let bytes = object::encode(kind, payload);
        let id = ObjectId::of(&bytes);
        let path = self.paths.object_path(&id);

        if path.exists() {
            tracing::trace!(%id, %kind, "object already stored");
            return Ok(id);
        }

        write_atomic(&path, &bytes).map_err(|e| StoreError::io(path, e))?;
        tracing::debug!(%id, %kind, len = payload.len(), "stored object");
        Ok(id)
    }

    /// Store file content.
    pub fn put_blob(&self, content: &[u8]) -> Result<ObjectId, StoreError> {
        self.put(ObjectKind::Blob, content)
    }

    /// Store a commit.
    pub fn put_commit(&self, commit: &Commit) -> Result<ObjectId, StoreError> {
        let payload = commit.to_bytes().map_err(|source| StoreError::BadCommit {
            id: "<new>".into(),
            source,
        })?;
        self.put(ObjectKind::Commit, &payload)
    }

    pub fn exists(&self, id: &ObjectId) -> bool {
        self.paths.object_path(id).is_file()
    }

    /// Read an object.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if absent
    /// - [`StoreError::Corrupt`] if the header does not decode
    pub fn get(&self, id: &ObjectId) -> Result<StoredObject, StoreError> {
        let bytes = self.read_raw(id)?;
        let (kind, payload) = object::decode(&bytes).map_err(|source| StoreError::Corrupt {
            id: id.clone(),
            source,
        })?;
        Ok(StoredObject {
            kind,
            payload: payload.to_vec(),
        })
    }

    /// Read only enough of an object to learn its kind.
    pub fn kind_of(&self, id: &ObjectId) -> Result<ObjectKind, StoreError> {
        let path = self.paths.object_path(id);
        let file = fs::File::open(&path).map_err(|e| self.open_error(id, path.clone(), e))?;

        // Headers are short: "commit " + a length + NUL.
        let mut head = Vec::with_capacity(32);
        file.take(32)
            .read_to_end(&mut head)
            .map_err(|e| StoreError::io(path, e))?;

        let (kind, _, _) = object::decode_header(&head).map_err(|source| StoreError::Corrupt {
            id: id.clone(),
            source,
        })?;
        Ok(kind)
    }

    /// Read a blob's content.
    pub fn get_blob(&self, id: &ObjectId) -> Result<Vec<u8>, StoreError> {
        let object = self.get(id)?;
        Self::expect_kind(id, ObjectKind::Blob, object.kind)?;
        Ok(object.payload)
    }

    /// Read and decode a commit.
    pub fn get_commit(&self, id: &ObjectId) -> Result<Commit, StoreError> {
        let object = self.get(id)?;
        Self::expect_kind(id, ObjectKind::Commit, object.kind)?;
        Commit::from_bytes(&object.payload).map_err(|source| StoreError::BadCommit {
            id: id.to_string(),
            source,
        })
    }

    /// Every stored object id, ascending.
    pub fn list_all(&self) -> Result<Vec<ObjectId>, StoreError> {
        let dir = self.paths.objects_dir();
        let entries = fs::read_dir(&dir).map_err(|e| StoreError::io(dir.clone(), e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir.clone(), e))?;
            // Temp files and anything foreign are skipped by id validation.
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| ObjectId::new(name).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Every stored commit id, ascending.
    pub fn list_commits(&self) -> Result<Vec<ObjectId>, StoreError> {
        let mut commits = Vec::new();
        for id in self.list_all()? {
            if self.kind_of(&id)? == ObjectKind::Commit {
                commits.push(id);
            }
        }
        Ok(commits)
    }

    fn read_raw(&self, id: &ObjectId) -> Result<Vec<u8>, StoreError> {
        let path = self.paths.object_path(id);
        fs::read(&path).map_err(|e| self.open_error(id, path, e))
    }

    fn open_error(&self, id: &ObjectId, path: PathBuf, e: io::Error) -> StoreError {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(id.clone())
        } else {
            StoreError::io(path, e)
        }
    }

    fn expect_kind(
        id: &ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    ) -> Result<(), StoreError> {
        if expected == actual {
            Ok(())
        } else {
            Err(StoreError::WrongKind {
                id: id.clone(),
                expected,
                actual,
            })
        }
    }
}
