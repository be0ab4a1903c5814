//! Filesystem operations: advisory locks and directory reconciliation.

mod copy;
mod dir;
pub(crate) mod helpers;
mod lock;
mod metadata;
pub mod race;

pub use copy::{ConflictPolicy, CopyOptions, copy_tree, copy_tree_with};
pub use dir::{delete_files, ensure_deleted, ensure_empty, ensure_exists, files, make_empty, tree_size};
pub use lock::{DEFAULT_POLL_INTERVAL, LockOptions, LockToken, acquire, acquire_with, try_acquire};
