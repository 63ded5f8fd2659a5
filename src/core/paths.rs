//! core::paths
//!
//! Centralized path routing for Twig storage locations.
//!
//! **Hard rule:** no code outside this module joins file names onto the
//! control directory. Every on-disk location goes through [`RepoPaths`].
//!
//! # Storage Layout
//!
//! All repository data lives under `<work_dir>/.twig/`:
//! - `objects/` - flat object store, one file per object id
//! - `refs/heads/<branch>` - one file per branch holding a commit id
//! - `HEAD` - `ref: refs/heads/<branch>` or a raw commit id
//! - `index` - the serialized stage
//! - `config.toml` - optional repository configuration
//! - `lock` - exclusive lock file for mutating commands
//!
//! # Example
//!
//! ```
//! use twig::core::paths::RepoPaths;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(PathBuf::from("/work"));
//! assert_eq!(paths.head_path(), PathBuf::from("/work/.twig/HEAD"));
//! ```

use std::path::{Path, PathBuf};

use crate::core::types::{BranchName, FileName, ObjectId};

/// Name of the control directory inside the work directory.
pub const CONTROL_DIR: &str = ".twig";

/// Centralized path routing for one repository.
///
/// # Invariants
///
/// - `control_dir` is always `work_dir/.twig`
/// - Branch and object paths are only built from validated types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    /// The directory whose files are tracked.
    pub work_dir: PathBuf,

    /// The `.twig` directory holding all repository state.
    pub control_dir: PathBuf,
}

impl RepoPaths {
    /// Create paths for a work directory.
    pub fn new(work_dir: PathBuf) -> Self {
        let control_dir = work_dir.join(CONTROL_DIR);
        Self {
            work_dir,
            control_dir,
        }
    }

    /// Whether the control directory exists.
    pub fn is_initialized(&self) -> bool {
        self.control_dir.is_dir()
    }

    // =========================================================================
    // Control directory
    // =========================================================================

    /// `<control>/objects/`
    pub fn objects_dir(&self) -> PathBuf {
        self.control_dir.join("objects")
    }

    /// `<control>/objects/<id>`
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.objects_dir().join(id.as_str())
    }

    /// `<control>/refs/heads/`
    pub fn heads_dir(&self) -> PathBuf {
        self.control_dir.join("refs").join("heads")
    }

    /// `<control>/refs/heads/<branch>`
    ///
    /// Branch names may contain `/`, which maps to nested directories.
    pub fn branch_path(&self, branch: &BranchName) -> PathBuf {
        self.heads_dir().join(branch.as_str())
    }

    /// `<control>/HEAD`
    pub fn head_path(&self) -> PathBuf {
        self.control_dir.join("HEAD")
    }

    /// `<control>/index`
    pub fn index_path(&self) -> PathBuf {
        self.control_dir.join("index")
    }

    /// `<control>/config.toml`
    pub fn repo_config_path(&self) -> PathBuf {
        self.control_dir.join("config.toml")
    }

    /// `<control>/lock`
    pub fn lock_path(&self) -> PathBuf {
        self.control_dir.join("lock")
    }

    // =========================================================================
    // Work directory
    // =========================================================================

    /// `<work_dir>/<name>`
    pub fn work_file(&self, name: &FileName) -> PathBuf {
        self.work_dir.join(name.as_str())
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn control_dir(&self) -> &Path {
        &self.control_dir
    }

    /// Create the control directory skeleton.
    ///
    /// # Errors
    ///
    /// Returns an IO error if directory creation fails.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.objects_dir())?;
        std::fs::create_dir_all(self.heads_dir())?;
        Ok(())
    }
}
