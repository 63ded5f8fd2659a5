//! core::refs
//!
//! Branch pointers and HEAD.
//!
//! Branches are files under `refs/heads/` holding a commit id followed by a
//! newline. HEAD is either `ref: refs/heads/<branch>` (attached) or a raw
//! commit id (detached). Every write goes through [`write_atomic`], so an
//! interrupted update leaves the previous pointer intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::atomic::write_atomic;
use crate::core::paths::RepoPaths;
use crate::core::types::{BranchName, ObjectId, RefName, TypeError};

/// Errors from reading or writing refs.
#[derive(Debug, Error)]
pub enum RefError {
    #[error("HEAD is missing")]
    MissingHead,

    #[error("HEAD is malformed: {0}")]
    MalformedHead(String),

    #[error("branch '{branch}' does not hold a valid commit id: {source}")]
    MalformedBranch {
        branch: BranchName,
        #[source]
        source: TypeError,
    },

    #[error("ref i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> RefError + '_ {
    move |source| RefError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where HEAD points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Attached to a branch.
    Branch(BranchName),
    /// Detached at a commit.
    Detached(ObjectId),
}

impl Head {
    const REF_PREFIX: &'static str = "ref: ";

    /// Parse the HEAD file's content.
    pub fn parse(content: &str) -> Result<Self, RefError> {
        let content = content.trim();
        if let Some(target) = content.strip_prefix(Self::REF_PREFIX) {
            let branch = RefName::new(target)
                .ok()
                .and_then(|r| r.branch())
                .ok_or_else(|| RefError::MalformedHead(content.to_string()))?;
            return Ok(Head::Branch(branch));
        }
        ObjectId::new(content)
            .map(Head::Detached)
            .map_err(|_| RefError::MalformedHead(content.to_string()))
    }

    /// The branch HEAD is attached to, if any.
    pub fn branch(&self) -> Option<&BranchName> {
        match self {
            Head::Branch(b) => Some(b),
            Head::Detached(_) => None,
        }
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Head::Branch(b) => write!(f, "{}{}", Self::REF_PREFIX, RefName::for_branch(b)),
            Head::Detached(id) => write!(f, "{}", id),
        }
    }
}

/// Reads and writes branch pointers and HEAD.
#[derive(Debug, Clone, Copy)]
pub struct RefStore<'a> {
    paths: &'a RepoPaths,
}

impl<'a> RefStore<'a> {
    pub fn new(paths: &'a RepoPaths) -> Self {
        Self { paths }
    }

    pub fn read_head(&self) -> Result<Head, RefError> {
        let path = self.paths.head_path();
        match fs::read_to_string(&path) {
            Ok(content) => Head::parse(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RefError::MissingHead),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    pub fn write_head(&self, head: &Head) -> Result<(), RefError> {
        let path = self.paths.head_path();
        write_atomic(&path, format!("{}\n", head).as_bytes()).map_err(io_err(&path))?;
        tracing::debug!(head = %head, "moved HEAD");
        Ok(())
    }

    /// The commit a branch points at, or `None` if the branch does not exist.
    pub fn read_branch(&self, branch: &BranchName) -> Result<Option<ObjectId>, RefError> {
        let path = self.paths.branch_path(branch);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            // A directory here means only nested branches exist under this prefix.
            Err(_) if path.is_dir() => return Ok(None),
            Err(e) => return Err(io_err(&path)(e)),
        };
        ObjectId::new(content.trim())
            .map(Some)
            .map_err(|source| RefError::MalformedBranch {
                branch: branch.clone(),
                source,
            })
    }

    pub fn write_branch(&self, branch: &BranchName, id: &ObjectId) -> Result<(), RefError> {
        let path = self.paths.branch_path(branch);
        write_atomic(&path, format!("{}\n", id).as_bytes()).map_err(io_err(&path))?;
        tracing::debug!(branch = %branch, commit = %id, "moved branch");
        Ok(())
    }

    pub fn branch_exists(&self, branch: &BranchName) -> bool {
        self.paths.branch_path(branch).is_file()
    }

    /// Delete a branch pointer. Returns whether it existed.
    ///
    /// Empty directories left behind by nested names are pruned.
    pub fn delete_branch(&self, branch: &BranchName) -> Result<bool, RefError> {
        let path = self.paths.branch_path(branch);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(io_err(&path))?;
        tracing::debug!(branch = %branch, "deleted branch");

        let heads = self.paths.heads_dir();
        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == heads || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
        Ok(true)
    }

    /// Every branch name, ascending.
    pub fn list_branches(&self) -> Result<Vec<BranchName>, RefError> {
        let heads = self.paths.heads_dir();
        let mut names = Vec::new();
        let mut pending = vec![heads.clone()];

        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_err(&dir)(e)),
            };
            for entry in entries {
                let entry = entry.map_err(io_err(&dir))?;
                let path = entry.path();
                if entry.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&heads) else {
                    continue;
                };
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if let Ok(branch) = BranchName::new(name) {
                    names.push(branch);
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, RepoPaths) {
        let temp = TempDir::new().unwrap();
        let paths = RepoPaths::new(temp.path().to_path_buf());
        paths.ensure_dirs().unwrap();
        (temp, paths)
    }

    fn branch(s: &str) -> BranchName {
        BranchName::new(s).unwrap()
    }

    mod head {
        use super::*;

        #[test]
        fn parse_attached() {
            assert_eq!(
                Head::parse("ref: refs/heads/master\n").unwrap(),
                Head::Branch(branch("master"))
            );
        }

        #[test]
        fn parse_detached() {
            let id = ObjectId::of(b"c");
            assert_eq!(Head::parse(id.as_str()).unwrap(), Head::Detached(id));
        }

        #[test]
        fn parse_rejects_garbage() {
            for input in ["", "ref: ", "ref: refs/tags/v1", "master", "abc123"] {
                assert!(Head::parse(input).is_err(), "{input:?}");
            }
        }

        #[test]
        fn display_roundtrips() {
            for head in [
                Head::Branch(branch("topic/one")),
                Head::Detached(ObjectId::of(b"x")),
            ] {
                assert_eq!(Head::parse(&head.to_string()).unwrap(), head);
            }
        }

        #[test]
        fn read_missing_head() {
            let (_temp, paths) = setup();
            assert!(matches!(
                RefStore::new(&paths).read_head(),
                Err(RefError::MissingHead)
            ));
        }

        #[test]
        fn write_then_read() {
            let (_temp, paths) = setup();
            let refs = RefStore::new(&paths);
            refs.write_head(&Head::Branch(branch("master"))).unwrap();
            assert_eq!(refs.read_head().unwrap().branch(), Some(&branch("master")));
        }
    }

    mod branches {
        use super::*;

        #[test]
        fn write_read_delete() {
            let (_temp, paths) = setup();
            let refs = RefStore::new(&paths);
            let id = ObjectId::of(b"c1");

            assert_eq!(refs.read_branch(&branch("master")).unwrap(), None);
            refs.write_branch(&branch("master"), &id).unwrap();
            assert!(refs.branch_exists(&branch("master")));
            assert_eq!(refs.read_branch(&branch("master")).unwrap(), Some(id));

            assert!(refs.delete_branch(&branch("master")).unwrap());
            assert!(!refs.delete_branch(&branch("master")).unwrap());
            assert!(!refs.branch_exists(&branch("master")));
        }

        #[test]
        fn nested_names_listed_and_pruned() {
            let (_temp, paths) = setup();
            let refs = RefStore::new(&paths);
            let id = ObjectId::of(b"c");

            refs.write_branch(&branch("master"), &id).unwrap();
            refs.write_branch(&branch("topic/b"), &id).unwrap();
            refs.write_branch(&branch("topic/a"), &id).unwrap();
            refs.write_branch(&branch("alpha"), &id).unwrap();

            let names: Vec<_> = refs
                .list_branches()
                .unwrap()
                .into_iter()
                .map(String::from)
                .collect();
            assert_eq!(names, vec!["alpha", "master", "topic/a", "topic/b"]);

            // A prefix directory is not a branch.
            assert!(!refs.branch_exists(&branch("topic")));
            assert_eq!(refs.read_branch(&branch("topic")).unwrap(), None);

            refs.delete_branch(&branch("topic/a")).unwrap();
            refs.delete_branch(&branch("topic/b")).unwrap();
            assert!(!paths.heads_dir().join("topic").exists());
        }

        #[test]
        fn listing_skips_temp_files() {
            let (_temp, paths) = setup();
            let refs = RefStore::new(&paths);
            refs.write_branch(&branch("master"), &ObjectId::of(b"c"))
                .unwrap();
            fs::write(paths.heads_dir().join(".master.tmp"), b"junk").unwrap();

            assert_eq!(refs.list_branches().unwrap(), vec![branch("master")]);
        }

        #[test]
        fn malformed_branch_file() {
            let (_temp, paths) = setup();
            fs::write(paths.heads_dir().join("bad"), b"not an id").unwrap();
            assert!(matches!(
                RefStore::new(&paths).read_branch(&branch("bad")),
                Err(RefError::MalformedBranch { .. })
            ));
        }
    }
}
