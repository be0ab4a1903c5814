//! Core configuration types.
//! - Config holds lock/copy/logging settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::{LOCK_POLL_DEFAULT, LOCK_TIMEOUT_DEFAULT};
use crate::fs_ops::{ConflictPolicy, CopyOptions, LockOptions};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// Per-operation detail
    Info,
    /// Per-file and per-attempt tracing
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime settings for hosts that drive fstools from a config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// How long `acquire` waits for a held lock (zero = single attempt)
    pub lock_timeout: Duration,
    /// Delay between lock attempts
    pub lock_poll_interval: Duration,
    /// Policy used by `copy_options()`
    pub conflict_policy: ConflictPolicy,
    /// Copy timestamps (and xattrs when enabled) along with file bytes
    pub preserve_metadata: bool,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_timeout: LOCK_TIMEOUT_DEFAULT,
            lock_poll_interval: LOCK_POLL_DEFAULT,
            conflict_policy: ConflictPolicy::default(),
            preserve_metadata: false,
            log_level: LogLevel::Normal,
            log_file: None,
            json_logs: false,
        }
    }
}

impl Config {
    pub fn lock_options(&self) -> LockOptions {
        LockOptions::default().with_poll_interval(self.lock_poll_interval)
    }

    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions {
            policy: self.conflict_policy,
            preserve_metadata: self.preserve_metadata,
        }
    }
}
