//! Advisory file-creation lock.
//!
//! The lock is the existence of a file created with create-new semantics: the
//! first process to create the path holds it, everybody else sees AlreadyExists
//! and polls until the holder deletes the file or their timeout runs out.
//!
//! Design:
//! - Strict create-new only. A lock file left behind by a crashed holder keeps
//!   blocking acquirers until someone removes it by hand; we never truncate and
//!   take over an existing file, since that would let two processes believe they
//!   hold the lock.
//! - The parent directory must already exist; a missing parent is an I/O error,
//!   not contention, and is returned immediately.
//! - `LockToken` releases on drop; `release()` does the same but reports errors.
//!
//! This module is advisory: it only excludes callers that use it too.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::errors::{FsToolsError, Result};
use crate::platform::create_lock_file;
use crate::shutdown::{CancelToken, should_stop};

use super::helpers::io_error_with_help;

/// Delay between acquisition attempts unless overridden.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

// Granularity at which a sleeping waiter notices cancellation.
const CANCEL_CHECK_SLICE: Duration = Duration::from_millis(50);

/// Tunables for a single acquisition.
#[derive(Debug, Clone)]
pub struct LockOptions {
    pub poll_interval: Duration,
    /// Bytes written into the lock file once it is created (e.g. owner info).
    pub contents: Option<Vec<u8>>,
    pub cancel: Option<CancelToken>,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            contents: None,
            cancel: None,
        }
    }
}

impl LockOptions {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Proof of holding the lock at `path`. Dropping it releases the lock.
#[derive(Debug)]
pub struct LockToken {
    file: Option<File>,
    path: PathBuf,
    released: bool,
}

impl LockToken {
    fn new(file: File, path: &Path) -> Self {
        Self {
            file: Some(file),
            path: path.to_path_buf(),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the handle and delete the lock file, reporting a failed delete.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        drop(self.file.take());
        fs::remove_file(&self.path).map_err(io_error_with_help("release lock", &self.path))?;
        trace!(path = %self.path.display(), "lock released");
        Ok(())
    }
}

impl Drop for LockToken {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        drop(self.file.take());
        match fs::remove_file(&self.path) {
            Ok(()) => trace!(path = %self.path.display(), "lock released on drop"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove lock file on drop"),
        }
    }
}

enum Attempt {
    Acquired(File),
    Contended(io::Error),
}

/// Whether a create failure means "someone else holds it" rather than a real error.
#[cfg(not(windows))]
fn is_contention(e: &io::Error, _path: &Path) -> bool {
    e.kind() == io::ErrorKind::AlreadyExists
}

/// Whether a create failure means "someone else holds it" rather than a real error.
/// A file pending deletion reports access denied / sharing violation on Windows.
#[cfg(windows)]
fn is_contention(e: &io::Error, path: &Path) -> bool {
    e.kind() == io::ErrorKind::AlreadyExists
        || (matches!(e.raw_os_error(), Some(5) | Some(32)) && path.exists())
}

fn attempt(path: &Path, contents: Option<&[u8]>) -> Result<Attempt> {
    let mut file = match create_lock_file(path) {
        Ok(f) => f,
        Err(e) if is_contention(&e, path) => return Ok(Attempt::Contended(e)),
        Err(e) => return Err(FsToolsError::io("create lock file", path, e)),
    };

    if let Some(bytes) = contents {
        let written = file.write_all(bytes).and_then(|_| file.sync_all());
        if let Err(e) = written {
            // Don't leave a half-written lock behind to block everyone else.
            drop(file);
            let _ = fs::remove_file(path);
            return Err(FsToolsError::io("write lock contents", path, e));
        }
    }
    Ok(Attempt::Acquired(file))
}

/// Sleep for `dur`, waking early with `Cancelled` when asked to stop.
fn wait(path: &Path, dur: Duration, cancel: Option<&CancelToken>) -> Result<()> {
    let deadline = Instant::now() + dur;
    loop {
        if should_stop(cancel) {
            debug!(path = %path.display(), "lock wait cancelled");
            return Err(FsToolsError::Cancelled {
                path: path.to_path_buf(),
            });
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        sleep((deadline - now).min(CANCEL_CHECK_SLICE));
    }
}

/// Acquire the lock at `path`, polling once per second for up to `timeout`.
/// A zero timeout tries exactly once.
pub fn acquire(path: &Path, timeout: Duration) -> Result<LockToken> {
    acquire_with(path, timeout, &LockOptions::default())
}

/// Acquire the lock at `path` with explicit options.
///
/// Returns `LockTimeout` (carrying the last creation error) when the file is
/// still present once `timeout` has elapsed, `Cancelled` when stopped through
/// the options' token or the process-wide shutdown flag, and `Io` for any
/// other failure (never retried).
///
/// The shutdown flag is never cleared: once `shutdown::request()` has run, every
/// contended acquisition in the process returns `Cancelled` instead of waiting.
pub fn acquire_with(path: &Path, timeout: Duration, opts: &LockOptions) -> Result<LockToken> {
    let start = Instant::now();
    let poll = opts.poll_interval.max(Duration::from_millis(1));
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let last_err = match attempt(path, opts.contents.as_deref())? {
            Attempt::Acquired(file) => {
                let waited = start.elapsed();
                if attempts == 1 {
                    trace!(path = %path.display(), "lock acquired immediately");
                } else {
                    trace!(path = %path.display(), attempts, waited_ms = waited.as_millis() as u64, "lock acquired after wait");
                }
                return Ok(LockToken::new(file, path));
            }
            Attempt::Contended(e) => e,
        };

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            debug!(path = %path.display(), attempts, waited_ms = elapsed.as_millis() as u64, "lock timed out");
            return Err(FsToolsError::LockTimeout {
                path: path.to_path_buf(),
                elapsed,
                source: last_err,
            });
        }
        if attempts % 10 == 0 {
            debug!(path = %path.display(), attempts, "still waiting for lock");
        }
        wait(path, poll.min(timeout - elapsed), opts.cancel.as_ref())?;
    }
}

/// Single non-blocking attempt. `Ok(None)` means another holder has the lock.
pub fn try_acquire(path: &Path) -> Result<Option<LockToken>> {
    match attempt(path, None)? {
        Attempt::Acquired(file) => Ok(Some(LockToken::new(file, path))),
        Attempt::Contended(_) => {
            trace!(path = %path.display(), "try-lock would block");
            Ok(None)
        }
    }
}
