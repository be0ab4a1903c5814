//! Typed error definitions for fstools.
//! Separates the expected outcomes callers branch on (lock timeout, copy conflict,
//! cancellation) from generic I/O failure.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::fs_ops::helpers::hint_for;

/// Result alias used by every filesystem operation in this crate.
pub type Result<T> = std::result::Result<T, FsToolsError>;

#[derive(Debug, Error)]
pub enum FsToolsError {
    /// The lock file stayed present for the whole timeout window.
    #[error("Timed out after {:.1}s waiting for lock {}: {source}", elapsed.as_secs_f64(), path.display())]
    LockTimeout {
        path: PathBuf,
        elapsed: Duration,
        #[source]
        source: io::Error,
    },

    /// Destination file already exists and the copy runs with `FailOnConflict`.
    #[error("File already exists: {}", path.display())]
    Conflict { path: PathBuf },

    /// Lock acquisition was abandoned because cancellation was requested.
    #[error("Lock acquisition for {} cancelled", path.display())]
    Cancelled { path: PathBuf },

    /// Target tree overlaps the source tree; copying would recurse into itself
    /// or destroy the source.
    #[error("Refusing to copy '{}' into overlapping target '{}'", source_dir.display(), target_dir.display())]
    Overlap {
        source_dir: PathBuf,
        target_dir: PathBuf,
    },

    #[error("{op} '{}': {source}{}", path.display(), hint_suffix(source))]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Background worker went away without reporting a result (it panicked).
    #[error("Background worker exited without a result")]
    WorkerLost,
}

fn hint_suffix(e: &io::Error) -> String {
    match hint_for(e) {
        Some(h) => format!(" ({h})"),
        None => String::new(),
    }
}

impl FsToolsError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Path the error is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::LockTimeout { path, .. }
            | Self::Conflict { path }
            | Self::Cancelled { path }
            | Self::Io { path, .. } => Some(path),
            Self::Overlap { target_dir, .. } => Some(target_dir),
            Self::WorkerLost => None,
        }
    }

    /// Kind of the underlying I/O error, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::LockTimeout { source, .. } | Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
