//! Tool configuration.
//!
//! Settings come from an optional `phototone.toml`. Every key has a default,
//! so a config file only lists what it wants to change:
//!
//! ```toml
//! [adjustments]
//! sepia = 40
//!
//! [export]
//! format = "png"
//! ```
//!
//! Loading merges the user file on top of the stock defaults, rejects
//! unknown keys, and validates the result. Command-line flags are applied on
//! top of the loaded config by the binary.

use crate::export::ExportSettings;
use crate::imaging::{AdjustmentState, OutputFormat, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything `phototone.toml` can set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToneConfig {
    /// Starting adjustment values, each 0-100.
    pub adjustments: AdjustmentState,
    pub export: ExportConfig,
    pub processing: ProcessingConfig,
}

impl ToneConfig {
    /// Validate values that serde alone can't check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.export.quality) {
            return Err(ConfigError::Validation(
                "export.quality must be 1-100".into(),
            ));
        }
        if self.export.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "export.output_dir must not be empty".into(),
            ));
        }
        if self.export.name_prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.name_prefix must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Where and how exports are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory exports are written into; created on first save.
    pub output_dir: PathBuf,
    pub name_prefix: String,
    pub format: OutputFormat,
    /// JPEG quality 1-100. Ignored for PNG.
    pub quality: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("filtered"),
            name_prefix: "Image-Filtered".to_string(),
            format: OutputFormat::Jpeg,
            quality: 100,
        }
    }
}

impl ExportConfig {
    pub fn settings(&self) -> ExportSettings {
        ExportSettings {
            format: self.format,
            quality: Quality::new(self.quality),
            name_prefix: self.name_prefix.clone(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of images exported at once.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Loading and merging
// =============================================================================

/// The stock defaults as a TOML table, the base layer for user overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToneConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut table), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                let value = match table.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                table.insert(key, value);
            }
            toml::Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as raw TOML. `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ToneConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(user) => merge_toml(base, user),
        None => base,
    };
    let config: ToneConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path`, falling back to defaults when it is missing.
pub fn load_config(path: &Path) -> Result<ToneConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// A fully commented stock `phototone.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# phototone configuration
# =======================
# All settings are optional. Values shown are the defaults.
# Unknown keys cause an error.

# Starting adjustments, each 0-100. Command-line flags override these.
[adjustments]
# Blend toward luminance-weighted gray.
gray = 0
# 0 is off. Otherwise scales every channel by amount/50:
# 50 leaves the image unchanged, 100 doubles it.
brightness = 0
# Stretch around mid-gray. 0 is no change.
contrast = 0
# Blend toward a warm brown tone.
sepia = 0
# Invert every color channel.
negative = false

[export]
# Directory exports are written into. Created if missing.
output_dir = "filtered"
# File names are "<prefix>-<source name>-<milliseconds>-<batch position>.<ext>".
name_prefix = "Image-Filtered"
# "jpeg" or "png". JPEG drops the alpha channel.
format = "jpeg"
# JPEG quality 1-100.
quality = 100

[processing]
# Maximum images exported in parallel. Defaults to the CPU core count.
# max_processes = 4
"##
}
