//! Cooperative cancellation.
//!
//! Two sources stop a waiting lock acquisition early:
//! - the process-wide shutdown flag, set by `request()` or by the SIGINT/SIGTERM
//!   handler installed with `install_signal_handler()`;
//! - a per-call `CancelToken` shared between the waiter and whoever wants to stop it.
//!
//! Relaxed atomics are sufficient for one-way "stop" flags.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
///
/// One-way: there is no public reset. After this call every contended lock
/// acquisition in the process returns `Cancelled` immediately; use a per-call
/// `CancelToken` to stop a single wait.
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Test-only: clear the shutdown flag.
#[cfg(test)]
#[inline]
pub fn reset() {
    SHUTDOWN.store(false, Ordering::Relaxed);
}

/// Route SIGINT/SIGTERM (Ctrl-C on Windows) into the shutdown flag.
/// Only one handler may be installed per process.
pub fn install_signal_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        request();
        warn!("received interrupt; cancelling pending lock waits");
    })
}

/// Cloneable cancellation flag for a single operation (or a group of them).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// True if either the given token or the process-wide flag asks us to stop.
pub(crate) fn should_stop(token: Option<&CancelToken>) -> bool {
    is_requested() || token.is_some_and(CancelToken::is_cancelled)
}
