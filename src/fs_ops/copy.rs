//! Recursive directory reconciliation.
//!
//! Walks the source tree and the target tree in lock-step and copies every file
//! from one to the other, resolving name collisions with a `ConflictPolicy`:
//! - Overwrite: the top-level target is emptied first, then everything is copied.
//! - FailOnConflict: the first collision aborts the whole copy with `Conflict`.
//! - SkipOnConflict: colliding target files are left untouched.
//!
//! There is no rollback; an error mid-walk leaves the target partially filled.
//! Callers needing atomicity should copy into a scratch directory and rename it.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, trace, warn};

use crate::errors::{FsToolsError, Result};

use super::dir::{ensure_empty, ensure_exists, is_present};
use super::helpers::io_error_with_help;
use super::metadata::preserve_metadata;

/// What to do when a destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Empty the target first and replace everything.
    Overwrite,
    /// Abort on the first existing destination file.
    #[default]
    FailOnConflict,
    /// Keep existing destination files, copy the rest.
    SkipOnConflict,
}

impl ConflictPolicy {
    /// Parse common names (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" | "force" => Some(Self::Overwrite),
            "fail" | "fail_on_conflict" | "fail-if-exists" => Some(Self::FailOnConflict),
            "skip" | "skip_on_conflict" | "skip-if-exists" => Some(Self::SkipOnConflict),
            _ => None,
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overwrite => "overwrite",
            Self::FailOnConflict => "fail",
            Self::SkipOnConflict => "skip",
        })
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid conflict policy: '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    pub policy: ConflictPolicy,
    /// Also copy timestamps (and xattrs with the "xattrs" feature) onto each file.
    pub preserve_metadata: bool,
}

impl From<ConflictPolicy> for CopyOptions {
    fn from(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            preserve_metadata: false,
        }
    }
}

#[derive(Debug, Default)]
struct CopyStats {
    copied: u64,
    skipped: u64,
    bytes: u64,
}

/// Copy the tree at `source` into `target` under `policy`; returns `target`.
pub fn copy_tree(source: &Path, target: &Path, policy: ConflictPolicy) -> Result<PathBuf> {
    copy_tree_with(source, target, &CopyOptions::from(policy))
}

/// Copy the tree at `source` into `target` with explicit options; returns `target`.
pub fn copy_tree_with(source: &Path, target: &Path, opts: &CopyOptions) -> Result<PathBuf> {
    let src_meta =
        fs::metadata(source).map_err(io_error_with_help("read source directory", source))?;
    if !src_meta.is_dir() {
        return Err(FsToolsError::io(
            "read source directory",
            source,
            io::Error::new(io::ErrorKind::NotADirectory, "source is not a directory"),
        ));
    }
    check_overlap(source, target, opts.policy)?;

    match opts.policy {
        ConflictPolicy::Overwrite => ensure_empty(target)?,
        ConflictPolicy::FailOnConflict | ConflictPolicy::SkipOnConflict => ensure_exists(target)?,
    }
    debug!(src = %source.display(), dest = %target.display(), policy = %opts.policy, "target prepared");

    let mut stats = CopyStats::default();
    copy_dir(source, target, opts, &mut stats)?;

    info!(
        src = %source.display(),
        dest = %target.display(),
        policy = %opts.policy,
        copied = stats.copied,
        skipped = stats.skipped,
        bytes = stats.bytes,
        "copied directory tree"
    );
    Ok(target.to_path_buf())
}

/// Resolve `p` component by component: every prefix that exists is
/// canonicalized, missing components are appended as-is, `.` is dropped and
/// `..` pops the previous component. A not-yet-created target can then be
/// compared against the source.
fn resolve_lenient(p: &Path) -> PathBuf {
    let abs = std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf());
    let mut resolved = PathBuf::new();
    for comp in abs.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Prefix(_) | Component::RootDir => resolved.push(comp.as_os_str()),
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(real) = dunce::canonicalize(&resolved) {
                    resolved = real;
                }
            }
        }
    }
    resolved
}

fn check_overlap(source: &Path, target: &Path, policy: ConflictPolicy) -> Result<()> {
    let src_real = dunce::canonicalize(source)
        .map_err(io_error_with_help("resolve source directory", source))?;
    let tgt_real = resolve_lenient(target);

    let nested = tgt_real.starts_with(&src_real);
    // Emptying an ancestor of the source would delete the source itself.
    let destroys_source = policy == ConflictPolicy::Overwrite && src_real.starts_with(&tgt_real);
    if nested || destroys_source {
        return Err(FsToolsError::Overlap {
            source_dir: source.to_path_buf(),
            target_dir: target.to_path_buf(),
        });
    }
    Ok(())
}

fn copy_dir(source: &Path, target: &Path, opts: &CopyOptions, stats: &mut CopyStats) -> Result<()> {
    let entries = fs::read_dir(source).map_err(io_error_with_help("read directory", source))?;
    let mut subdirs: Vec<OsString> = Vec::new();

    for entry in entries {
        let entry = entry.map_err(io_error_with_help("read directory entry", source))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(io_error_with_help("stat entry", &path))?;

        if file_type.is_dir() {
            subdirs.push(entry.file_name());
            continue;
        }
        if file_type.is_symlink() {
            let followed = fs::metadata(&path).map_err(io_error_with_help("follow symlink", &path))?;
            if followed.is_dir() {
                warn!(path = %path.display(), "skipping symlinked directory");
                continue;
            }
        } else if !file_type.is_file() {
            debug!(path = %path.display(), "skipping special file");
            continue;
        }

        copy_file(&path, &target.join(entry.file_name()), opts, stats)?;
    }

    for name in subdirs {
        let child_target = target.join(&name);
        ensure_exists(&child_target)?;
        copy_dir(&source.join(&name), &child_target, opts, stats)?;
    }
    Ok(())
}

fn copy_file(src: &Path, dest: &Path, opts: &CopyOptions, stats: &mut CopyStats) -> Result<()> {
    if is_present(dest) {
        match opts.policy {
            ConflictPolicy::FailOnConflict => {
                return Err(FsToolsError::Conflict {
                    path: dest.to_path_buf(),
                });
            }
            ConflictPolicy::SkipOnConflict => {
                trace!(dest = %dest.display(), "destination exists; skipped");
                stats.skipped += 1;
                return Ok(());
            }
            ConflictPolicy::Overwrite => {}
        }
    }

    let bytes = fs::copy(src, dest).map_err(io_error_with_help("copy file", dest))?;
    if opts.preserve_metadata {
        let meta = fs::metadata(src).map_err(io_error_with_help("stat source file", src))?;
        preserve_metadata(src, dest, &meta);
    }
    stats.copied += 1;
    stats.bytes += bytes;
    trace!(src = %src.display(), dest = %dest.display(), bytes, "copied file");
    Ok(())
}
