//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Writes a commented template on request; never creates files implicitly.
//!
//! Notes:
//! - Unknown XML fields are rejected so typos surface instead of silently
//!   falling back to defaults.
//! - Missing fields keep their `Config::default()` value.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::{LOCK_POLL_DEFAULT, LOCK_TIMEOUT_DEFAULT};
use crate::fs_ops::ConflictPolicy;
use crate::platform::write_new_file_private;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    lock_timeout_seconds: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    lock_poll_millis: Option<u64>,
    conflict_policy: Option<String>,
    preserve_metadata: Option<bool>,
    log_level: Option<String>,
    log_file: Option<String>,
    json_logs: Option<bool>,
}

// Custom deserializer that trims surrounding whitespace for optional u64
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<u64>().map(Some).map_err(serde::de::Error::custom),
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// Map XmlConfig -> Config, validating enumerated values.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(secs) = parsed.lock_timeout_seconds {
        cfg.lock_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = parsed.lock_poll_millis {
        cfg.lock_poll_interval = Duration::from_millis(ms);
    }
    if let Some(s) = non_empty(parsed.conflict_policy.as_deref()) {
        cfg.conflict_policy = s.parse::<ConflictPolicy>().map_err(anyhow::Error::msg)?;
    }
    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = s.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    cfg.log_file = non_empty(parsed.log_file.as_deref()).map(PathBuf::from);
    cfg.preserve_metadata = parsed.preserve_metadata.unwrap_or(false);
    cfg.json_logs = parsed.json_logs.unwrap_or(false);

    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    let cfg = xml_to_config(parsed)
        .with_context(|| format!("invalid value in config xml '{}'", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

/// Load the config from `$FSTOOLS_CONFIG` or the platform default location.
/// An explicitly named file must exist; a missing default file means defaults.
pub fn load_config() -> Result<Config> {
    let explicit = std::env::var_os(super::CONFIG_ENV).is_some_and(|v| !v.is_empty());
    let Some(path) = default_config_path() else {
        debug!("no config location available; using defaults");
        return Ok(Config::default());
    };
    if !path.exists() {
        if explicit {
            bail!("config file named by {} does not exist: {}", super::CONFIG_ENV, path.display());
        }
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    load_config_from_xml_path(&path)
}

/// Write a commented template config at `path`. Refuses to overwrite an
/// existing file or to write through a symlinked ancestor.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
    }

    let content = format!(
        "<!--\n  fstools configuration (XML)\n\n    lock_timeout_seconds -> how long to wait for a held lock (0 = try once)\n    lock_poll_millis     -> delay between lock attempts\n    conflict_policy      -> overwrite | fail | skip\n    preserve_metadata    -> copy timestamps along with file contents (true/false)\n    log_level            -> quiet | normal | info | debug\n    log_file             -> optional path to a log file\n    json_logs            -> emit JSON log lines (true/false)\n-->\n<config>\n  <lock_timeout_seconds>{}</lock_timeout_seconds>\n  <lock_poll_millis>{}</lock_poll_millis>\n  <conflict_policy>{}</conflict_policy>\n  <preserve_metadata>false</preserve_metadata>\n  <log_level>normal</log_level>\n  <log_file></log_file>\n  <json_logs>false</json_logs>\n</config>\n",
        LOCK_TIMEOUT_DEFAULT.as_secs(),
        LOCK_POLL_DEFAULT.as_millis(),
        ConflictPolicy::default(),
    );

    write_new_file_private(path, content.as_bytes())
        .with_context(|| format!("write template config '{}'", path.display()))?;
    info!("Created template config at {}", path.display());
    Ok(())
}
