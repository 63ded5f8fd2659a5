//! core::verify
//!
//! Fast structural verification of a repository.
//!
//! Run after every mutating command. Checks that:
//! - HEAD parses and names an existing branch or commit
//! - Every branch points at a stored commit
//! - The HEAD commit's snapshot only references stored blobs
//! - The stage loads, is disjoint, and only references stored blobs
//!
//! # Invariants
//!
//! - Never mutates the repository
//! - Deterministic: problems are reported in a stable order

use thiserror::Error;

use crate::core::object::ObjectKind;
use crate::core::paths::RepoPaths;
use crate::core::refs::{Head, RefError, RefStore};
use crate::core::stage::{Stage, StageError};
use crate::core::store::ObjectStore;
use crate::core::types::{BranchName, FileName, ObjectId};

/// A single problem found during verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("cannot read HEAD: {0}")]
    Head(#[source] RefError),

    #[error("cannot list branches: {0}")]
    Branches(#[source] RefError),

    #[error("HEAD is attached to missing branch '{0}'")]
    HeadBranchMissing(BranchName),

    #[error("cannot read branch '{branch}': {source}")]
    Branch {
        branch: BranchName,
        #[source]
        source: RefError,
    },

    #[error("'{name}' points at {id}, which is not a stored commit")]
    DanglingCommit { name: String, id: ObjectId },

    #[error("'{file}' references missing blob {id}")]
    MissingBlob { file: FileName, id: ObjectId },

    #[error("stage is invalid: {0}")]
    Stage(#[source] StageError),
}

/// Result of fast verification.
#[derive(Debug)]
pub struct VerifyResult {
    /// Whether verification passed
    pub ok: bool,
    /// Errors found during verification
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    fn from_errors(errors: Vec<VerifyError>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }
}

/// Perform fast verification of the repository at `paths`.
pub fn fast_verify(paths: &RepoPaths) -> VerifyResult {
    let store = ObjectStore::new(paths);
    let refs = RefStore::new(paths);
    let mut errors = Vec::new();

    let is_commit = |id: &ObjectId| matches!(store.kind_of(id), Ok(ObjectKind::Commit));

    match refs.list_branches() {
        Ok(branches) => {
            for branch in branches {
                match refs.read_branch(&branch) {
                    Ok(Some(id)) if !is_commit(&id) => errors.push(VerifyError::DanglingCommit {
                        name: branch.to_string(),
                        id,
                    }),
                    Ok(_) => {}
                    Err(source) => errors.push(VerifyError::Branch { branch, source }),
                }
            }
        }
        Err(e) => errors.push(VerifyError::Branches(e)),
    }

    let head_commit = match refs.read_head() {
        Ok(Head::Branch(branch)) => match refs.read_branch(&branch) {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                errors.push(VerifyError::HeadBranchMissing(branch));
                None
            }
            // Already reported while walking branches.
            Err(_) => None,
        },
        Ok(Head::Detached(id)) => {
            if !is_commit(&id) {
                errors.push(VerifyError::DanglingCommit {
                    name: "HEAD".into(),
                    id: id.clone(),
                });
            }
            Some(id)
        }
        Err(e) => {
            errors.push(VerifyError::Head(e));
            None
        }
    };

    if let Some(commit) = head_commit.and_then(|id| store.get_commit(&id).ok()) {
        for (file, id) in commit.snapshot() {
            if !store.exists(id) {
                errors.push(VerifyError::MissingBlob {
                    file: file.clone(),
                    id: id.clone(),
                });
            }
        }
    }

    match Stage::load(paths) {
        Ok(stage) => {
            for (file, id) in stage.added() {
                if !store.exists(id) {
                    errors.push(VerifyError::MissingBlob {
                        file: file.clone(),
                        id: id.clone(),
                    });
                }
            }
        }
        Err(e) => errors.push(VerifyError::Stage(e)),
    }

    VerifyResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commit::{Commit, Snapshot};
    use std::fs;
    use tempfile::TempDir;

    fn healthy() -> (TempDir, RepoPaths, ObjectId) {
        let temp = TempDir::new().unwrap();
        let paths = RepoPaths::new(temp.path().to_path_buf());
        paths.ensure_dirs().unwrap();

        let store = ObjectStore::new(&paths);
        let refs = RefStore::new(&paths);
        let root = store.put_commit(&Commit::root()).unwrap();
        let master = BranchName::new("master").unwrap();
        refs.write_branch(&master, &root).unwrap();
        refs.write_head(&Head::Branch(master)).unwrap();
        (temp, paths, root)
    }

    #[test]
    fn fresh_repository_passes() {
        let (_temp, paths, _) = healthy();
        let result = fast_verify(&paths);
        assert!(result.ok, "{:?}", result.errors);
    }

    #[test]
    fn dangling_branch_reported() {
        let (_temp, paths, _) = healthy();
        let refs = RefStore::new(&paths);
        refs.write_branch(&BranchName::new("ghost").unwrap(), &ObjectId::of(b"nope"))
            .unwrap();

        let result = fast_verify(&paths);
        assert!(!result.ok);
        assert!(matches!(
            result.errors.as_slice(),
            [VerifyError::DanglingCommit { name, .. }] if name == "ghost"
        ));
    }

    #[test]
    fn head_on_missing_branch_reported() {
        let (_temp, paths, _) = healthy();
        RefStore::new(&paths)
            .write_head(&Head::Branch(BranchName::new("gone").unwrap()))
            .unwrap();

        let result = fast_verify(&paths);
        assert!(matches!(
            result.errors.as_slice(),
            [VerifyError::HeadBranchMissing(_)]
        ));
    }

    #[test]
    fn missing_snapshot_blob_reported() {
        let (_temp, paths, root) = healthy();
        let store = ObjectStore::new(&paths);
        let mut snapshot = Snapshot::new();
        snapshot.insert(FileName::new("a.txt").unwrap(), ObjectId::of(b"never stored"));
        let commit = store
            .put_commit(&Commit::new("broken", root, snapshot))
            .unwrap();
        RefStore::new(&paths)
            .write_head(&Head::Detached(commit))
            .unwrap();

        let result = fast_verify(&paths);
        assert!(matches!(
            result.errors.as_slice(),
            [VerifyError::MissingBlob { .. }]
        ));
    }

    #[test]
    fn corrupt_stage_reported() {
        let (_temp, paths, _) = healthy();
        fs::write(paths.index_path(), b"{").unwrap();

        let result = fast_verify(&paths);
        assert!(matches!(result.errors.as_slice(), [VerifyError::Stage(_)]));
    }
}
