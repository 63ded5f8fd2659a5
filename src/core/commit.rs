//! core::commit
//!
//! The immutable commit record.
//!
//! A commit holds a message, its parent(s), a creation timestamp and a
//! snapshot: the full mapping from file name to blob id at that point in
//! history. The snapshot is a `BTreeMap`, so the serialized form is canonical
//! regardless of the order entries were inserted.
//!
//! # Example
//!
//! ```
//! use twig::core::commit::{Commit, Snapshot};
//!
//! let root = Commit::root();
//! assert_eq!(root.message(), "initial commit");
//! assert!(root.parent().is_none());
//!
//! let child = Commit::new("add nothing", root.id().unwrap(), Snapshot::new());
//! assert_eq!(child.parent(), Some(&root.id().unwrap()));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::object::{self, ObjectKind};
use crate::core::types::{FileName, ObjectId, Timestamp};

/// File name → blob id for every tracked file.
pub type Snapshot = BTreeMap<FileName, ObjectId>;

/// Message of the root commit created by `init`.
pub const ROOT_MESSAGE: &str = "initial commit";

/// An immutable history node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Commit {
    message: String,
    parent: Option<ObjectId>,
    second_parent: Option<ObjectId>,
    timestamp: Timestamp,
    snapshot: Snapshot,
}

impl Commit {
    /// The root commit: fixed message, no parent, epoch timestamp, empty tree.
    pub fn root() -> Self {
        Self::at(ROOT_MESSAGE, None, None, Snapshot::new(), Timestamp::epoch())
    }

    /// A regular commit stamped with the current time.
    pub fn new(message: impl Into<String>, parent: ObjectId, snapshot: Snapshot) -> Self {
        Self::at(message, Some(parent), None, snapshot, Timestamp::now())
    }

    /// A two-parent merge commit stamped with the current time.
    pub fn merge(
        message: impl Into<String>,
        parent: ObjectId,
        second_parent: ObjectId,
        snapshot: Snapshot,
    ) -> Self {
        Self::at(
            message,
            Some(parent),
            Some(second_parent),
            snapshot,
            Timestamp::now(),
        )
    }

    /// Build a commit with every field given explicitly.
    pub fn at(
        message: impl Into<String>,
        parent: Option<ObjectId>,
        second_parent: Option<ObjectId>,
        snapshot: Snapshot,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            message: message.into(),
            parent,
            second_parent,
            timestamp,
            snapshot,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.second_parent.as_ref()
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Whether this commit has a second parent.
    pub fn is_merge(&self) -> bool {
        self.second_parent.is_some()
    }

    /// Parent ids in traversal order: primary first, then second.
    pub fn parents(&self) -> impl Iterator<Item = &ObjectId> {
        self.parent.iter().chain(self.second_parent.iter())
    }

    /// The blob id tracked for `name`, if any.
    pub fn blob(&self, name: &FileName) -> Option<&ObjectId> {
        self.snapshot.get(name)
    }

    pub fn tracks(&self, name: &FileName) -> bool {
        self.snapshot.contains_key(name)
    }

    /// Canonical serialized payload (compact JSON).
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse a payload produced by [`Commit::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// The id this commit is stored under.
    pub fn id(&self) -> Result<ObjectId, serde_json::Error> {
        Ok(object::id_for(ObjectKind::Commit, &self.to_bytes()?))
    }
}
