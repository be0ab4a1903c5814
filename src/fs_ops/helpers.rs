//! I/O helper utilities.
//!
//! Provides small adapters that turn io::Error into FsToolsError with the failed
//! operation, the path, and a platform-aware hint attached.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create directory", dir))?;

use std::io;
use std::path::Path;

use crate::errors::FsToolsError;

/// Short actionable hint for common failure modes, keyed on raw OS code first.
pub(crate) fn hint_for(e: &io::Error) -> Option<&'static str> {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            let hint = match code {
                libc::EACCES | libc::EPERM => {
                    Some("permission denied; check ownership and write permissions")
                }
                libc::EBUSY => Some("resource busy; another process may be using it"),
                libc::ENOENT => Some("path not found; the parent directory must exist"),
                libc::EEXIST => Some("already exists"),
                libc::ENOTEMPTY => Some("directory not empty; it may have been repopulated"),
                libc::ENOSPC => Some("insufficient space on device"),
                libc::EROFS => Some("read-only filesystem"),
                libc::ELOOP => Some("too many symbolic link levels; possible symlink cycle"),
                libc::ENAMETOOLONG => Some("filename or path too long"),
                libc::EMFILE => Some("process file descriptor limit reached"),
                _ => None,
            };
            if hint.is_some() {
                return hint;
            }
        }
        #[cfg(windows)]
        {
            let hint = match code {
                5 => Some("access denied; check permissions"),        // ERROR_ACCESS_DENIED
                32 => Some("sharing violation; file is in use"),      // ERROR_SHARING_VIOLATION
                2 | 3 => Some("path not found; the parent directory must exist"),
                80 | 183 => Some("already exists"),                   // ERROR_FILE_EXISTS / ALREADY_EXISTS
                112 => Some("insufficient disk space"),               // ERROR_DISK_FULL
                19 => Some("write protected / read-only media"),      // ERROR_WRITE_PROTECT
                206 => Some("filename or path too long"),             // ERROR_FILENAME_EXCED_RANGE
                _ => None,
            };
            if hint.is_some() {
                return hint;
            }
        }
    }

    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            Some("permission denied; check ownership and write permissions")
        }
        io::ErrorKind::NotFound => Some("path not found; the parent directory must exist"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        io::ErrorKind::StorageFull => Some("insufficient space on device"),
        _ => None,
    }
}

/// Returns a closure suitable for `.map_err(...)` that wraps io::Error into
/// `FsToolsError::Io` tagged with `op` and `path`.
pub(crate) fn io_error_with_help<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> FsToolsError + 'a {
    move |e: io::Error| FsToolsError::io(op, path, e)
}
