//! Core library for `fstools`.
//!
//! Two independent filesystem primitives:
//! - an advisory cross-process lock whose existence is an exclusively created
//!   file (`acquire`, `try_acquire`, `LockToken`);
//! - policy-driven directory reconciliation (`ensure_exists`, `ensure_empty`,
//!   `ensure_deleted`, `copy_tree`, `tree_size`, ...).
//!
//! Every operation is blocking; `background` runs the same operations on a
//! worker pool. Hosts can load settings with `config::load_config` and install
//! a subscriber with `logging::init_tracing`.

pub mod background;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod logging;
pub mod platform;
pub mod shutdown;

pub use background::Pending;
pub use config::{Config, LogLevel, load_config, load_config_from_xml_path};
pub use errors::{FsToolsError, Result};
pub use fs_ops::{
    ConflictPolicy, CopyOptions, LockOptions, LockToken, acquire, acquire_with, copy_tree,
    copy_tree_with, delete_files, ensure_deleted, ensure_empty, ensure_exists, files, make_empty,
    tree_size, try_acquire,
};
pub use shutdown::CancelToken;
