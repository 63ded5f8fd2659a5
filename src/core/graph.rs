//! core::graph
//!
//! Commit history graph and ancestor search.
//!
//! # Architecture
//!
//! The history graph is a DAG where:
//! - Nodes are commits in the object store
//! - Edges point from child to parent (primary parent, then second parent)
//! - The root commit has no parents
//!
//! The graph is never materialized. Every traversal loads commits from the
//! store on demand and walks with an explicit `VecDeque` work queue, so deep
//! histories never grow the call stack.
//!
//! # Invariants
//!
//! - Traversal order is deterministic: primary parent before second parent
//! - Prefix resolution never guesses: zero or several matches is an error

use std::collections::{HashSet, VecDeque};

use thiserror::Error;

use crate::core::commit::Commit;
use crate::core::store::{ObjectStore, StoreError};
use crate::core::types::ObjectId;

/// Errors from graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// No commit, or more than one commit, matches the given id or prefix.
    #[error("no unique commit matches '{0}'")]
    AmbiguousOrNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only view of the commit DAG backed by the object store.
#[derive(Debug, Clone, Copy)]
pub struct CommitGraph<'a> {
    store: ObjectStore<'a>,
}

impl<'a> CommitGraph<'a> {
    pub fn new(store: ObjectStore<'a>) -> Self {
        Self { store }
    }

    /// Resolve a full id or an abbreviated prefix to a stored commit.
    ///
    /// Input is case-normalized. A full-length id must name a stored commit;
    /// a shorter one must be a prefix of exactly one stored commit id.
    ///
    /// # Errors
    ///
    /// [`GraphError::AmbiguousOrNotFound`] on zero or multiple matches.
    pub fn resolve(&self, input: &str) -> Result<ObjectId, GraphError> {
        let not_found = || GraphError::AmbiguousOrNotFound(input.to_string());
        let prefix = input.trim().to_ascii_lowercase();

        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(not_found());
        }

        if prefix.len() == ObjectId::HEX_LEN {
            let id = ObjectId::new(prefix).map_err(|_| not_found())?;
            return match self.store.get_commit(&id) {
                Ok(_) => Ok(id),
                Err(StoreError::NotFound(_)) | Err(StoreError::WrongKind { .. }) => {
                    Err(not_found())
                }
                Err(e) => Err(e.into()),
            };
        }

        let mut matches = self
            .store
            .list_commits()?
            .into_iter()
            .filter(|id| id.has_prefix(&prefix));

        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (Some(_), Some(_)) => {
                tracing::debug!(prefix = %prefix, "ambiguous commit prefix");
                Err(not_found())
            }
            _ => Err(not_found()),
        }
    }

    /// Every commit reachable from `start` along either parent edge,
    /// including `start` itself.
    pub fn ancestors(&self, start: &ObjectId) -> Result<HashSet<ObjectId>, GraphError> {
        let mut seen = HashSet::new();
        self.bfs(start, |id| {
            seen.insert(id.clone());
            false
        })?;
        Ok(seen)
    }

    /// The first common ancestor of `a` and `b` met in a breadth-first walk
    /// from `b`.
    ///
    /// Returns `None` if the histories share no commit.
    pub fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> Result<Option<ObjectId>, GraphError> {
        let of_a = self.ancestors(a)?;
        let mut found = None;
        self.bfs(b, |id| {
            if of_a.contains(id) {
                found = Some(id.clone());
                true
            } else {
                false
            }
        })?;
        Ok(found)
    }

    /// Lazy walk along primary parents from `start` to the root.
    ///
    /// Each call returns a fresh iterator.
    pub fn walk(&self, start: &ObjectId) -> History<'a> {
        History {
            store: self.store,
            next: Some(start.clone()),
        }
    }

    /// Breadth-first visit from `start`, parent before second parent.
    ///
    /// `visit` returns `true` to stop early.
    fn bfs<F>(&self, start: &ObjectId, mut visit: F) -> Result<(), GraphError>
    where
        F: FnMut(&ObjectId) -> bool,
    {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start.clone());
        queue.push_back(start.clone());

        while let Some(id) = queue.pop_front() {
            if visit(&id) {
                return Ok(());
            }
            let commit = self.store.get_commit(&id)?;
            for parent in commit.parents() {
                if visited.insert(parent.clone()) {
                    queue.push_back(parent.clone());
                }
            }
        }
        Ok(())
    }
}

/// Iterator over a primary-parent chain, newest first.
#[derive(Debug)]
pub struct History<'a> {
    store: ObjectStore<'a>,
    next: Option<ObjectId>,
}

impl Iterator for History<'_> {
    type Item = Result<(ObjectId, Commit), GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.store.get_commit(&id) {
            Ok(commit) => {
                self.next = commit.parent().cloned();
                Some(Ok((id, commit)))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commit::Snapshot;
    use crate::core::paths::RepoPaths;
    use crate::core::types::Timestamp;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        paths: RepoPaths,
        tick: i64,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let paths = RepoPaths::new(temp.path().to_path_buf());
            paths.ensure_dirs().unwrap();
            Self {
                _temp: temp,
                paths,
                tick: 0,
            }
        }

        fn store(&self) -> ObjectStore<'_> {
            ObjectStore::new(&self.paths)
        }

        fn graph(&self) -> CommitGraph<'_> {
            CommitGraph::new(self.store())
        }

        fn root(&self) -> ObjectId {
            self.store().put_commit(&Commit::root()).unwrap()
        }

        fn commit(&mut self, msg: &str, parent: &ObjectId, second: Option<&ObjectId>) -> ObjectId {
            // Distinct timestamps keep otherwise identical commits apart.
            self.tick += 1;
            let ts = Timestamp::from_datetime(
                chrono::DateTime::from_timestamp(self.tick, 0).unwrap(),
            );
            let commit = Commit::at(
                msg,
                Some(parent.clone()),
                second.cloned(),
                Snapshot::new(),
                ts,
            );
            self.store().put_commit(&commit).unwrap()
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn full_id() {
            let fx = Fixture::new();
            let root = fx.root();
            assert_eq!(fx.graph().resolve(root.as_str()).unwrap(), root);
        }

        #[test]
        fn unique_prefix_case_insensitive() {
            let fx = Fixture::new();
            let root = fx.root();
            let prefix = root.short(8).to_ascii_uppercase();
            assert_eq!(fx.graph().resolve(&prefix).unwrap(), root);
        }

        #[test]
        fn blob_id_is_not_a_commit() {
            let fx = Fixture::new();
            fx.root();
            let blob = fx.store().put_blob(b"data").unwrap();
            assert!(matches!(
                fx.graph().resolve(blob.as_str()),
                Err(GraphError::AmbiguousOrNotFound(_))
            ));
            assert!(matches!(
                fx.graph().resolve(blob.short(10)),
                Err(GraphError::AmbiguousOrNotFound(_))
            ));
        }

        #[test]
        fn non_hex_and_empty_never_match() {
            let fx = Fixture::new();
            fx.root();
            for input in ["", "zz", "master", "   "] {
                assert!(fx.graph().resolve(input).is_err(), "{input:?}");
            }
        }

        #[test]
        fn ambiguous_prefix_is_an_error() {
            let mut fx = Fixture::new();
            let root = fx.root();
            let mut ids = vec![root.clone()];
            for i in 0..40 {
                ids.push(fx.commit(&format!("c{i}"), &root, None));
            }

            // With 41 commits, some pair shares its first hex digit.
            ids.sort();
            let shared = ids
                .windows(2)
                .find(|w| w[0].short(1) == w[1].short(1))
                .map(|w| w[0].short(1).to_string())
                .unwrap();
            assert!(matches!(
                fx.graph().resolve(&shared),
                Err(GraphError::AmbiguousOrNotFound(_))
            ));
        }
    }

    mod traversal {
        use super::*;

        #[test]
        fn ancestors_include_start_and_both_parents() {
            let mut fx = Fixture::new();
            let root = fx.root();
            let a = fx.commit("a", &root, None);
            let b = fx.commit("b", &root, None);
            let m = fx.commit("m", &a, Some(&b));

            let set = fx.graph().ancestors(&m).unwrap();
            assert_eq!(set.len(), 4);
            for id in [&root, &a, &b, &m] {
                assert!(set.contains(id));
            }
        }

        #[test]
        fn merge_base_of_fork() {
            let mut fx = Fixture::new();
            let root = fx.root();
            let split = fx.commit("split", &root, None);
            let left = fx.commit("left", &split, None);
            let right = fx.commit("right", &split, None);

            let graph = fx.graph();
            assert_eq!(graph.merge_base(&left, &right).unwrap(), Some(split.clone()));
            assert_eq!(graph.merge_base(&right, &left).unwrap(), Some(split));
        }

        #[test]
        fn merge_base_with_ancestor_is_ancestor() {
            let mut fx = Fixture::new();
            let root = fx.root();
            let a = fx.commit("a", &root, None);
            let b = fx.commit("b", &a, None);

            let graph = fx.graph();
            assert_eq!(graph.merge_base(&b, &a).unwrap(), Some(a.clone()));
            assert_eq!(graph.merge_base(&a, &b).unwrap(), Some(a));
        }

        #[test]
        fn merge_base_follows_second_parent() {
            let mut fx = Fixture::new();
            let root = fx.root();
            let split = fx.commit("split", &root, None);
            let side = fx.commit("side", &split, None);
            let main = fx.commit("main", &root, None);
            let merged = fx.commit("merged", &main, Some(&side));
            let other = fx.commit("other", &side, None);

            // Reachable from `merged` only through its second parent.
            assert_eq!(fx.graph().merge_base(&merged, &other).unwrap(), Some(side));
        }

        #[test]
        fn disjoint_histories_have_no_base() {
            let mut fx = Fixture::new();
            let a = fx.root();
            let lone = Commit::at("lone", None, None, Snapshot::new(), Timestamp::now());
            let b = fx.store().put_commit(&lone).unwrap();
            let c = fx.commit("c", &b, None);

            assert_eq!(fx.graph().merge_base(&a, &c).unwrap(), None);
        }

        #[test]
        fn walk_follows_primary_parents_and_restarts() {
            let mut fx = Fixture::new();
            let root = fx.root();
            let a = fx.commit("a", &root, None);
            let side = fx.commit("side", &root, None);
            let m = fx.commit("m", &a, Some(&side));

            let graph = fx.graph();
            let ids: Vec<_> = graph.walk(&m).map(|r| r.unwrap().0).collect();
            assert_eq!(ids, vec![m.clone(), a, root]);

            // A fresh walk sees the same sequence.
            assert_eq!(graph.walk(&m).count(), 3);
        }

        #[test]
        fn walk_surfaces_missing_commit() {
            let fx = Fixture::new();
            let missing = ObjectId::of(b"missing");
            let mut walk = fx.graph().walk(&missing);
            assert!(matches!(
                walk.next(),
                Some(Err(GraphError::Store(StoreError::NotFound(_))))
            ));
            assert!(walk.next().is_none());
        }
    }
}
