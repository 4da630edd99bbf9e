//! Normalizer configuration.
//!
//! Handles loading, validating, and merging `imgnorm.toml`. Stock defaults
//! reproduce the classic behaviour (1000px bound, quality 90, EXIF stripped);
//! a config file overrides any subset of them, and CLI flags override the file.
//!
//! ## Config File Location
//!
//! `imgnorm.toml` in the directory being normalized, or any file passed with
//! `--config`:
//!
//! ```text
//! photos/
//! ├── imgnorm.toml      # optional
//! ├── IMG_0001.jpg
//! └── banner.png
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! max_size = 1000           # Bound for both edges, in pixels
//! extensions = ["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"]
//! exif = "strip"            # "strip" or "preserve"
//!
//! [jpeg]
//! quality = 90              # 1-100
//! progressive = true        # false writes baseline scans
//! optimize = true           # optimized Huffman tables
//!
//! [webp]
//! quality = 90              # 1-100
//! method = 6                # 0 (fast) - 6 (smallest)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ExifPolicy, ImageKind, NormalizeSettings, PolicyTable, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the target directory.
pub const CONFIG_FILE_NAME: &str = "imgnorm.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Normalizer configuration loaded from `imgnorm.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    /// Images larger than this on either edge are shrunk to fit.
    pub max_size: u32,
    /// File extensions (without the dot, case-insensitive) that are processed.
    pub extensions: Vec<String>,
    /// What happens to the source EXIF block on save.
    pub exif: ExifPolicy,
    pub jpeg: JpegConfig,
    pub webp: WebpConfig,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            extensions: ["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"]
                .map(String::from)
                .to_vec(),
            exif: ExifPolicy::Strip,
            jpeg: JpegConfig::default(),
            webp: WebpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JpegConfig {
    pub quality: u32,
    pub progressive: bool,
    pub optimize: bool,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            progressive: true,
            optimize: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebpConfig {
    pub quality: u32,
    /// libwebp effort level.
    pub method: u8,
}

impl Default for WebpConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            method: 6,
        }
    }
}

impl NormalizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(ConfigError::Validation("max_size must be non-zero".into()));
        }
        if !(1..=100).contains(&self.jpeg.quality) {
            return Err(ConfigError::Validation("jpeg.quality must be 1-100".into()));
        }
        if !(1..=100).contains(&self.webp.quality) {
            return Err(ConfigError::Validation("webp.quality must be 1-100".into()));
        }
        if self.webp.method > 6 {
            return Err(ConfigError::Validation("webp.method must be 0-6".into()));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        if let Some(unknown) = self
            .extensions
            .iter()
            .find(|ext| ImageKind::from_extension(ext.trim_start_matches('.')).is_none())
        {
            return Err(ConfigError::Validation(format!(
                "extensions: '{unknown}' is not a supported image extension"
            )));
        }
        Ok(())
    }

    /// Whether a file name ends in one of the configured extensions.
    pub fn matches(&self, file_name: &str) -> bool {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        self.extensions
            .iter()
            .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// The per-file settings handed to the imaging layer.
    pub fn normalize_settings(&self) -> NormalizeSettings {
        NormalizeSettings {
            max_size: self.max_size,
            policies: PolicyTable::new(
                Quality::new(self.jpeg.quality),
                Quality::new(self.webp.quality),
                self.webp.method,
            )
            .with_jpeg_modes(self.jpeg.progressive, self.jpeg.optimize),
            exif: self.exif,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(NormalizerConfig::default()).expect("default config must serialize")
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

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<NormalizerConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: NormalizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `imgnorm.toml` from the target directory, falling back to defaults.
pub fn load_config(dir: &Path) -> Result<NormalizerConfig, ConfigError> {
    resolve_config(load_raw_config(&dir.join(CONFIG_FILE_NAME))?)
}

/// Load an explicitly named config file. Unlike [`load_config`], it must exist.
pub fn load_config_file(path: &Path) -> Result<NormalizerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    resolve_config(Some(toml::from_str(&content)?))
}

/// Returns a fully-commented stock `imgnorm.toml`.
///
/// Used by the `--gen-config` CLI flag.
pub fn stock_config_toml() -> &'static str {
    r##"# imgnorm configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the directory you normalize, or pass it with --config.
# Unknown keys will cause an error.

# Largest allowed width or height in pixels. Bigger images are shrunk
# (aspect ratio preserved, Lanczos3); smaller ones keep their size.
max_size = 1000

# Extensions (case-insensitive) of the files to process. Everything else in
# the directory is left alone.
extensions = ["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"]

# EXIF handling on save:
#   "strip"    - write no EXIF at all (default)
#   "preserve" - keep EXIF with the orientation tag reset to 1
#                (JPEG, PNG and WebP only)
exif = "strip"

# ---------------------------------------------------------------------------
# JPEG: flattened to RGB
# ---------------------------------------------------------------------------
[jpeg]
quality = 90
# Progressive scans; false writes a baseline JPEG (faster, larger).
progressive = true
# Optimized Huffman tables.
optimize = true

# ---------------------------------------------------------------------------
# WebP: flattened to RGB, lossy
# ---------------------------------------------------------------------------
[webp]
quality = 90
# Compression effort, 0 (fast) to 6 (slowest, smallest).
method = 6
"##
}
