//! Directory state helpers: ensure a directory exists, is empty, or is gone,
//! plus recursive listing, selective deletion and size accounting.
//!
//! `ensure_exists` and `ensure_deleted` tolerate another actor reaching the same
//! end state concurrently (see `race::tolerate_race`). Nothing else is retried.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::errors::{FsToolsError, Result};

use super::helpers::io_error_with_help;
use super::race::tolerate_race;

/// True if anything (including a dangling symlink) occupies `p`.
pub(crate) fn is_present(p: &Path) -> bool {
    fs::symlink_metadata(p).is_ok()
}

fn walk_error(root: &Path) -> impl FnOnce(walkdir::Error) -> FsToolsError + '_ {
    move |e| {
        let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
        FsToolsError::io("walk directory", path, e.into())
    }
}

/// Create `dir` and any missing ancestors. No-op when it already exists.
pub fn ensure_exists(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    let created = tolerate_race(dir, || fs::create_dir_all(dir), || dir.is_dir())
        .map_err(io_error_with_help("create directory", dir))?;
    if created.is_some() {
        debug!(path = %dir.display(), "created directory");
    }
    Ok(())
}

/// Recursively delete `dir`. Succeeds when it is already absent, or when the
/// delete fails but the directory is gone anyway.
pub fn ensure_deleted(dir: &Path) -> Result<()> {
    if !is_present(dir) {
        return Ok(());
    }
    if remove_tree(dir)?.is_some() {
        debug!(path = %dir.display(), "removed directory");
    }
    Ok(())
}

/// Recursive delete that counts "already gone" as done. `None` means someone
/// else removed it first.
fn remove_tree(dir: &Path) -> Result<Option<()>> {
    tolerate_race(dir, || fs::remove_dir_all(dir), || !is_present(dir))
        .map_err(io_error_with_help("remove directory", dir))
}

/// Leave `dir` existing and empty: delete it if present, then recreate it.
pub fn ensure_empty(dir: &Path) -> Result<()> {
    if is_present(dir) {
        ensure_deleted(dir)?;
    }
    ensure_exists(dir)?;
    clear_if_repopulated(dir)?;
    Ok(())
}

/// Someone may have recreated and refilled `dir` between our delete and create.
/// Returns whether anything had to be cleared.
fn clear_if_repopulated(dir: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(dir).map_err(io_error_with_help("read directory", dir))?;
    if entries.next().is_none() {
        return Ok(false);
    }
    debug!(path = %dir.display(), "directory repopulated during recreate; clearing in place");
    make_empty(dir)?;
    Ok(true)
}

/// Clear `dir` in place: remove every child, keep the directory itself.
pub fn make_empty(dir: &Path) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(io_error_with_help("read directory", dir))?;
    for entry in entries {
        let entry = entry.map_err(io_error_with_help("read directory entry", dir))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(io_error_with_help("stat entry", &path))?;
        if file_type.is_dir() {
            tolerate_race(&path, || fs::remove_dir_all(&path), || !is_present(&path))
                .map_err(io_error_with_help("remove directory", &path))?;
        } else {
            tolerate_race(&path, || fs::remove_file(&path), || !is_present(&path))
                .map_err(io_error_with_help("remove file", &path))?;
        }
        trace!(path = %path.display(), "removed entry");
    }
    Ok(())
}

/// Delete every regular file under `dir` (recursively) accepted by `pred`.
/// Directories are left in place. Returns how many files were removed.
pub fn delete_files<P>(dir: &Path, mut pred: P) -> Result<usize>
where
    P: FnMut(&Path) -> bool,
{
    // Collect first so deletion does not disturb the walk.
    let doomed = files(dir, &mut pred, true)?;
    for path in &doomed {
        fs::remove_file(path).map_err(io_error_with_help("remove file", path))?;
        trace!(path = %path.display(), "deleted file");
    }
    debug!(path = %dir.display(), count = doomed.len(), "deleted matching files");
    Ok(doomed.len())
}

/// Regular files directly under `dir` (or anywhere below it when `recursive`)
/// accepted by `pred`. Order follows the filesystem and is not stable.
pub fn files<P>(dir: &Path, mut pred: P, recursive: bool) -> Result<Vec<PathBuf>>
where
    P: FnMut(&Path) -> bool,
{
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(walk_error(dir))?;
        if entry.file_type().is_file() && pred(entry.path()) {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

/// Total byte length of all regular files in the tree rooted at `dir`.
pub fn tree_size(dir: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(walk_error(dir))?;
        if entry.file_type().is_file() {
            total += entry.metadata().map_err(walk_error(dir))?.len();
        }
    }
    Ok(total)
}
