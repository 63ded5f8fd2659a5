//! core::atomic
//!
//! Write-then-rename file replacement.
//!
//! Every record Twig persists (objects, refs, HEAD, index, config) is written
//! through [`write_atomic`], so a reader sees either the old bytes or the new
//! bytes and never a torn file.
//!
//! The temporary file is created in the destination directory under a fresh
//! unique name, so it never clobbers an existing sibling. That matters in the
//! work directory, where any name may belong to the user.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Atomically replace `path` with `contents`.
///
/// Creates parent directories if needed.
///
/// # Errors
///
/// Returns the underlying IO error. On failure the destination is untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = tempfile::Builder::new()
        .prefix(".twig-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
