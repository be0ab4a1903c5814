//! Offload blocking operations onto the rayon worker pool.
//!
//! Every function here runs exactly the same code as its blocking counterpart;
//! the only difference is the calling thread gets a `Pending` handle back
//! immediately instead of waiting. Filesystem work runs on the rayon pool;
//! lock waits get a thread of their own.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::errors::{FsToolsError, Result};
use crate::fs_ops::{self, CopyOptions, LockOptions, LockToken};

/// Result of an operation still running on a worker.
#[derive(Debug)]
pub struct Pending<T> {
    rx: Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// Block until the worker finishes.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().unwrap_or(Err(FsToolsError::WorkerLost))
    }

    /// Non-blocking poll: `None` while the worker is still running.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(res) => Some(res),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(FsToolsError::WorkerLost)),
        }
    }
}

/// Run `f` on the rayon pool. A panic inside `f` surfaces as `WorkerLost`.
pub fn offload<T, F>(f: F) -> Pending<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    rayon::spawn(move || {
        // rayon aborts the process on an uncaught panic in spawn; contain it and
        // let the dropped sender signal the loss instead.
        if let Ok(res) = panic::catch_unwind(AssertUnwindSafe(f)) {
            // Receiver may have been dropped; nobody is interested then.
            let _ = tx.send(res);
        }
    });
    Pending { rx }
}

/// Wait for the lock on a dedicated thread. Lock waits mostly sleep, so they
/// stay off the rayon pool and never hold up the other background operations.
pub fn acquire_in_background(path: PathBuf, timeout: Duration, opts: LockOptions) -> Pending<LockToken> {
    let (tx, rx) = mpsc::sync_channel(1);
    let waiter_tx = tx.clone();
    let waiter_path = path.clone();
    let spawned = thread::Builder::new()
        .name("fstools-lock-wait".into())
        .spawn(move || {
            let _ = waiter_tx.send(fs_ops::acquire_with(&waiter_path, timeout, &opts));
        });
    if let Err(e) = spawned {
        let _ = tx.send(Err(FsToolsError::io("spawn lock waiter", path, e)));
    }
    Pending { rx }
}

pub fn ensure_exists_in_background(dir: PathBuf) -> Pending<()> {
    offload(move || fs_ops::ensure_exists(&dir))
}

pub fn ensure_empty_in_background(dir: PathBuf) -> Pending<()> {
    offload(move || fs_ops::ensure_empty(&dir))
}

pub fn ensure_deleted_in_background(dir: PathBuf) -> Pending<()> {
    offload(move || fs_ops::ensure_deleted(&dir))
}

pub fn copy_tree_in_background(source: PathBuf, target: PathBuf, opts: CopyOptions) -> Pending<PathBuf> {
    offload(move || fs_ops::copy_tree_with(&source, &target, &opts))
}

pub fn tree_size_in_background(dir: PathBuf) -> Pending<u64> {
    offload(move || fs_ops::tree_size(&dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panicking_worker_reports_lost() {
        let pending: Pending<()> = offload(|| panic!("boom"));
        assert!(matches!(pending.wait(), Err(FsToolsError::WorkerLost)));
    }

    #[test]
    fn value_comes_back() {
        let pending = offload(|| Ok(21 * 2));
        assert_eq!(pending.wait().unwrap(), 42);
    }
}
