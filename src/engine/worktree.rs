//! engine::worktree
//!
//! The user's files: plain files directly inside the work directory.
//!
//! Subdirectories, the control directory, symlinks, and names that are not
//! valid [`FileName`]s are invisible to Twig.

use std::collections::BTreeSet;
use std::fs;
use std::io;

use crate::core::atomic::write_atomic;
use crate::core::object::{self, ObjectKind};
use crate::core::paths::RepoPaths;
use crate::core::types::{FileName, ObjectId};

use super::EngineError;

/// Read/write access to the work directory's plain files.
#[derive(Debug, Clone, Copy)]
pub struct WorkTree<'a> {
    paths: &'a RepoPaths,
}

impl<'a> WorkTree<'a> {
    pub fn new(paths: &'a RepoPaths) -> Self {
        Self { paths }
    }

    /// Every plain file in the work directory, sorted.
    pub fn list(&self) -> Result<BTreeSet<FileName>, EngineError> {
        let dir = self.paths.work_dir();
        let entries = fs::read_dir(dir).map_err(EngineError::io(dir))?;

        let mut files = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(EngineError::io(dir))?;
            let is_file = entry
                .file_type()
                .map(|t| t.is_file())
                .map_err(EngineError::io(entry.path()))?;
            if !is_file {
                continue;
            }
            if let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|s| FileName::new(s).ok())
            {
                files.insert(name);
            }
        }
        Ok(files)
    }

    /// A file's content, or `None` if it is absent.
    pub fn read(&self, name: &FileName) -> Result<Option<Vec<u8>>, EngineError> {
        let path = self.paths.work_file(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EngineError::io(path)(e)),
        }
    }

    /// The blob id the file's current content would be stored under.
    ///
    /// Nothing is written to the store.
    pub fn content_id(&self, name: &FileName) -> Result<Option<ObjectId>, EngineError> {
        Ok(self
            .read(name)?
            .map(|bytes| object::id_for(ObjectKind::Blob, &bytes)))
    }

    pub fn write(&self, name: &FileName, content: &[u8]) -> Result<(), EngineError> {
        let path = self.paths.work_file(name);
        write_atomic(&path, content).map_err(EngineError::io(path))
    }

    /// Delete a file. Already-absent files are fine.
    pub fn remove(&self, name: &FileName) -> Result<(), EngineError> {
        let path = self.paths.work_file(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::io(path)(e)),
        }
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

    fn name(s: &str) -> FileName {
        FileName::new(s).unwrap()
    }

    #[test]
    fn lists_only_plain_files() {
        let (temp, paths) = setup();
        fs::write(temp.path().join("b.txt"), "b").unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();
        fs::write(temp.path().join("subdir/nested.txt"), "n").unwrap();

        let files: Vec<_> = WorkTree::new(&paths)
            .list()
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(files, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn read_write_remove() {
        let (_temp, paths) = setup();
        let tree = WorkTree::new(&paths);
        let file = name("notes.txt");

        assert_eq!(tree.read(&file).unwrap(), None);
        tree.write(&file, b"hello\n").unwrap();
        assert_eq!(tree.read(&file).unwrap().as_deref(), Some(&b"hello\n"[..]));

        tree.remove(&file).unwrap();
        tree.remove(&file).unwrap();
        assert_eq!(tree.read(&file).unwrap(), None);
    }

    #[test]
    fn content_id_matches_blob_id() {
        let (_temp, paths) = setup();
        let tree = WorkTree::new(&paths);
        let file = name("x");
        tree.write(&file, b"data").unwrap();

        let stored = crate::core::store::ObjectStore::new(&paths)
            .put_blob(b"data")
            .unwrap();
        assert_eq!(tree.content_id(&file).unwrap(), Some(stored));
    }
}
