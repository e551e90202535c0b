//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are the base layer; a user `config.toml` in the config directory only
//! needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [trim]
//! suffix = "-trimmed"          # Appended to the file stem of default outputs
//!
//! [diagnostics]
//! capacity = 100               # Entries kept in memory
//! persist_limit = 50           # Newest entries written to the store
//! level = "info"               # Lowest level captured
//! storage_key = "debug_logs"   # Key the entries are stored under
//! store_path = ".sigtrim/diagnostics.json"
//!
//! [feed]
//! table = "debug_logs"         # Table whose inserts `tail` renders
//! show_details = true          # Print structured details under each line
//!
//! [processing]
//! max_processes = 4            # Max parallel trims (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Output naming for trimmed files.
    pub trim: TrimConfig,
    /// Log capture and persistence.
    pub diagnostics: DiagnosticsConfig,
    /// Realtime log feed rendering.
    pub feed: FeedConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_suffix(&self.trim.suffix)?;
        let d = &self.diagnostics;
        if d.capacity == 0 {
            return Err(ConfigError::Validation(
                "diagnostics.capacity must be at least 1".into(),
            ));
        }
        if d.persist_limit == 0 || d.persist_limit > d.capacity {
            return Err(ConfigError::Validation(format!(
                "diagnostics.persist_limit must be 1-{}",
                d.capacity
            )));
        }
        if d.level.parse::<LevelFilter>().is_err() {
            return Err(ConfigError::Validation(format!(
                "diagnostics.level '{}' is not one of off, error, warn, info, debug, trace",
                d.level
            )));
        }
        if d.storage_key.is_empty() {
            return Err(ConfigError::Validation(
                "diagnostics.storage_key must not be empty".into(),
            ));
        }
        if self.feed.table.is_empty() {
            return Err(ConfigError::Validation(
                "feed.table must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Check an output-name suffix, from `[trim] suffix` or the command line.
///
/// An empty suffix would name the output after its source, and a path
/// separator would move it out of the source's directory.
pub fn validate_suffix(suffix: &str) -> Result<(), ConfigError> {
    if suffix.is_empty() {
        return Err(ConfigError::Validation(
            "trim.suffix must not be empty".into(),
        ));
    }
    if suffix.contains(['/', '\\']) {
        return Err(ConfigError::Validation(
            "trim.suffix must not contain path separators".into(),
        ));
    }
    Ok(())
}

/// Output naming for trimmed files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimConfig {
    /// Appended to the source file stem when no output path is given.
    pub suffix: String,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            suffix: "-trimmed".to_string(),
        }
    }
}

/// Log capture and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Entries kept in memory; older ones are dropped first.
    pub capacity: usize,
    /// Newest entries written to the store on teardown.
    pub persist_limit: usize,
    /// Lowest level captured (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Key the persisted entries live under.
    pub storage_key: String,
    /// Store file, relative to the config directory.
    pub store_path: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            persist_limit: 50,
            level: "info".to_string(),
            storage_key: "debug_logs".to_string(),
            store_path: ".sigtrim/diagnostics.json".to_string(),
        }
    }
}

/// Realtime log feed rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Table whose inserts are rendered.
    pub table: String,
    /// Print structured details under each line.
    pub show_details: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            table: "debug_logs".to_string(),
            show_details: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel trim workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sigtrim configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as config.toml in the directory passed with --config-dir
# (the current directory by default). Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Trimming
# ---------------------------------------------------------------------------
[trim]
# Appended to the file stem when no --output is given:
# signature.png -> signature-trimmed.png
suffix = "-trimmed"

# ---------------------------------------------------------------------------
# Diagnostics
# ---------------------------------------------------------------------------
[diagnostics]
# Number of log entries kept in memory. Older entries are dropped first.
capacity = 100

# Number of newest entries written to the store when the program exits.
# Must not exceed capacity.
persist_limit = 50

# Lowest level captured: off, error, warn, info, debug, trace.
level = "info"

# Key the entries are stored under.
storage_key = "debug_logs"

# Store file, relative to the config directory.
store_path = ".sigtrim/diagnostics.json"

# ---------------------------------------------------------------------------
# Realtime log feed
# ---------------------------------------------------------------------------
[feed]
# Table whose insert events `sigtrim tail` renders.
table = "debug_logs"

# Print each record's structured details under its line.
show_details = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel trim workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
