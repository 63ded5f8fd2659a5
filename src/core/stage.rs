//! core::stage
//!
//! The staging area (index): pending additions and removals.
//!
//! # Invariants
//!
//! - A file name never appears in both `added` and `removed`
//! - The stage is Clean exactly when both collections are empty
//!
//! The stage is loaded at the start of a mutating command and saved at the
//! end. A missing index file is a Clean stage.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::atomic::write_atomic;
use crate::core::commit::Snapshot;
use crate::core::paths::RepoPaths;
use crate::core::types::{FileName, ObjectId};

/// Errors from loading or saving the stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to read index {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write index {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("index is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("'{0}' is staged for both addition and removal")]
    Conflicting(FileName),
}

/// Pending changes on top of HEAD's snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stage {
    added: BTreeMap<FileName, ObjectId>,
    removed: BTreeSet<FileName>,
}

impl Stage {
    /// Load the stage, treating a missing index as Clean.
    pub fn load(paths: &RepoPaths) -> Result<Self, StageError> {
        let path = paths.index_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(StageError::Read { path, source }),
        };

        let stage: Stage = serde_json::from_slice(&bytes)?;
        stage.check()?;
        Ok(stage)
    }

    /// Persist the stage atomically.
    pub fn save(&self, paths: &RepoPaths) -> Result<(), StageError> {
        let path = paths.index_path();
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(&path, &json).map_err(|source| StageError::Write { path, source })?;
        tracing::debug!(
            added = self.added.len(),
            removed = self.removed.len(),
            "saved index"
        );
        Ok(())
    }

    pub fn added(&self) -> &BTreeMap<FileName, ObjectId> {
        &self.added
    }

    pub fn removed(&self) -> &BTreeSet<FileName> {
        &self.removed
    }

    /// The blob staged for `name`, if any.
    pub fn staged_blob(&self, name: &FileName) -> Option<&ObjectId> {
        self.added.get(name)
    }

    pub fn is_staged_for_removal(&self, name: &FileName) -> bool {
        self.removed.contains(name)
    }

    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Stage `blob` as the new content of `name`.
    pub fn stage_addition(&mut self, name: FileName, blob: ObjectId) {
        self.removed.remove(&name);
        self.added.insert(name, blob);
    }

    /// Drop a pending addition. Returns whether one existed.
    ///
    /// Leaves `removed` untouched.
    pub fn unstage_addition(&mut self, name: &FileName) -> bool {
        self.added.remove(name).is_some()
    }

    /// Stage `name` for deletion, dropping any pending addition.
    pub fn stage_removal(&mut self, name: FileName) {
        self.added.remove(&name);
        self.removed.insert(name);
    }

    /// Reset to Clean.
    pub fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
    }

    /// `base` with additions overlaid and removals dropped.
    pub fn apply(&self, base: &Snapshot) -> Snapshot {
        let mut snapshot = base.clone();
        for (name, blob) in &self.added {
            snapshot.insert(name.clone(), blob.clone());
        }
        for name in &self.removed {
            snapshot.remove(name);
        }
        snapshot
    }

    /// Verify the disjointness invariant.
    pub fn check(&self) -> Result<(), StageError> {
        match self.added.keys().find(|name| self.removed.contains(*name)) {
            Some(name) => Err(StageError::Conflicting(name.clone())),
            None => Ok(()),
        }
    }
}
