//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{create_template_config, load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FSTOOLS_CONFIG";

/// Defaults shared across submodules.
pub const LOCK_TIMEOUT_DEFAULT: std::time::Duration = std::time::Duration::from_secs(30);
pub const LOCK_POLL_DEFAULT: std::time::Duration = crate::fs_ops::DEFAULT_POLL_INTERVAL;
