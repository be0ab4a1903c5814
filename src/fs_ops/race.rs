//! Tolerance for benign filesystem races.
//!
//! Another actor may finish our job between our check and our call (a directory
//! appears while we create it, or disappears while we delete it). When the
//! operation fails but its postcondition already holds, the failure is not real.

use std::io;
use std::path::Path;
use tracing::debug;

/// Run `op`; on error, succeed anyway if `postcondition()` holds, otherwise
/// return the original error.
pub fn tolerate_race<T, F, C>(path: &Path, op: F, postcondition: C) -> io::Result<Option<T>>
where
    F: FnOnce() -> io::Result<T>,
    C: FnOnce() -> bool,
{
    match op() {
        Ok(v) => Ok(Some(v)),
        Err(e) if postcondition() => {
            debug!(path = %path.display(), error = %e, "operation failed but postcondition holds; treating as success");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
