//! Config validation logic.
//! Rejects settings that would make lock polling spin or never happen, and log
//! files reachable only through a symlinked ancestor.

use anyhow::{Result, bail};
use tracing::debug;

use super::paths::path_has_symlink_ancestor;
use super::types::Config;

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.lock_poll_interval.is_zero() {
            bail!("lock_poll_interval must be greater than zero");
        }
        if !self.lock_timeout.is_zero() && self.lock_poll_interval > self.lock_timeout {
            bail!(
                "lock_poll_interval ({} ms) exceeds lock_timeout ({} ms); the lock would be tried only once",
                self.lock_poll_interval.as_millis(),
                self.lock_timeout.as_millis()
            );
        }
        if let Some(log_file) = &self.log_file {
            if log_file.is_dir() {
                bail!("log_file '{}' is a directory", log_file.display());
            }
            if path_has_symlink_ancestor(log_file)? {
                bail!(
                    "log_file '{}' has a symlinked ancestor; refusing to log there",
                    log_file.display()
                );
            }
        }
        debug!(config = ?self, "config validated");
        Ok(())
    }
}
