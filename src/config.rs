//! Version profile configuration.
//!
//! A profile file names the versions to derive from every upload. Each
//! `[versions.<name>]` table becomes one [`VersionConfig`]; the reserved name
//! `source` overrides the bounds of the stored original.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All keys are optional.
//!
//! [versions.thumb]
//! width = 100           # Target box width in pixels (omit = unconstrained)
//! height = 100          # Target box height in pixels (omit = unconstrained)
//! crop = false          # Fill the box and cut the overflow (default false)
//! center = true         # Center the image when cropping (default true)
//! enlarge = false       # Allow upscaling images smaller than the box (default false)
//! convert_to = "png"    # Output format: jpeg, png or gif (omit = keep)
//! jpeg_quality = 90     # JPEG quality (1-100, default 90)
//! png_quality = 5       # PNG compression level (1-9, default 5)
//! ```
//!
//! Unknown keys are rejected, as are negative sizes, out-of-range qualities
//! and formats outside the list above.

use crate::imaging::VersionConfig;
use crate::pipeline::VersionSet;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// A profile file as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub versions: BTreeMap<String, VersionSpec>,
}

/// One `[versions.<name>]` table before validation.
///
/// Numbers are read as signed so that negative values produce a validation
/// error naming the key instead of a generic TOML type error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionSpec {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub crop: Option<bool>,
    pub center: Option<bool>,
    pub enlarge: Option<bool>,
    pub convert_to: Option<String>,
    pub jpeg_quality: Option<i64>,
    pub png_quality: Option<i64>,
}

fn dimension(name: &str, key: &str, value: Option<i64>) -> Result<Option<u32>, ConfigError> {
    value
        .map(|v| {
            u32::try_from(v).map_err(|_| {
                ConfigError::Validation(format!("versions.{name}.{key} must be a non-negative integer, got {v}"))
            })
        })
        .transpose()
}

fn quality(name: &str, key: &str, value: i64) -> Result<u32, ConfigError> {
    u32::try_from(value)
        .map_err(|_| ConfigError::Validation(format!("versions.{name}.{key} out of range: {value}")))
}

/// Prefix a builder error with the table it came from.
fn in_version(name: &str, err: ConfigError) -> ConfigError {
    match err {
        ConfigError::Validation(msg) => ConfigError::Validation(format!("versions.{name}: {msg}")),
        other => other,
    }
}

impl VersionSpec {
    /// Validate into a [`VersionConfig`], starting from its defaults.
    pub fn to_version_config(&self, name: &str) -> Result<VersionConfig, ConfigError> {
        let mut config = VersionConfig::new();
        if let Some(width) = dimension(name, "width", self.width)? {
            config = config.with_width(Some(width));
        }
        if let Some(height) = dimension(name, "height", self.height)? {
            config = config.with_height(Some(height));
        }
        if let Some(crop) = self.crop {
            config = config.with_crop(crop);
        }
        if let Some(center) = self.center {
            config = config.with_centering(center);
        }
        if let Some(enlarge) = self.enlarge {
            config = config.with_enlarge(enlarge);
        }
        if let Some(format) = &self.convert_to {
            config = config
                .with_convert_to_name(format)
                .map_err(|e| in_version(name, e))?;
        }
        if let Some(q) = self.jpeg_quality {
            config = config
                .with_jpeg_quality(quality(name, "jpeg_quality", q)?)
                .map_err(|e| in_version(name, e))?;
        }
        if let Some(q) = self.png_quality {
            config = config
                .with_png_quality(quality(name, "png_quality", q)?)
                .map_err(|e| in_version(name, e))?;
        }
        Ok(config)
    }
}

/// Version names end up inside file names as a single `-`-delimited token,
/// which is what lets cleanup tell `photo-thumb-...` from `photo-2-thumb-...`.
fn validate_version_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation("version names must not be empty".into()));
    }
    if name.contains(['/', '\\', '.', '-']) || name.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "version name '{name}' must not contain path separators, dots, dashes or whitespace"
        )));
    }
    Ok(())
}

impl ProfileConfig {
    /// Validate every table into a [`VersionSet`].
    pub fn into_version_set(self) -> Result<VersionSet, ConfigError> {
        self.versions
            .iter()
            .map(|(name, table)| {
                validate_version_name(name)?;
                Ok((name.clone(), table.to_version_config(name)?))
            })
            .collect()
    }
}

/// Parse and validate a profile from TOML text.
pub fn from_toml_str(content: &str) -> Result<VersionSet, ConfigError> {
    let profile: ProfileConfig = toml::from_str(content)?;
    profile.into_version_set()
}

/// Load and validate a profile file.
pub fn load(path: &Path) -> Result<VersionSet, ConfigError> {
    let content = fs::read_to_string(path)?;
    from_toml_str(&content)
}

/// Returns a fully-commented stock profile with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgver version profile
# ======================
# Each [versions.<name>] table describes one derived image. Generated files
# are named <base>-<name>-<W>x<H>-<crp|ncrp>-<cen|ncen>-<enl|nenl>.<ext>.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Stored original
# ---------------------------------------------------------------------------
# The reserved name "source" bounds the stored copy of the upload.
# Without this table the original is capped at 1920x1200, uncropped.
[versions.source]
width = 1920
height = 1200
center = false

# ---------------------------------------------------------------------------
# Derived versions
# ---------------------------------------------------------------------------
[versions.thumb]
# Target box in pixels. Omit one side to scale by the other.
width = 100
height = 100

# Fill the whole box, cutting whatever overflows.
crop = true

# Center the image in the box when cropping (false = anchor top-left).
center = true

# Scale up images smaller than the box.
enlarge = false

# Output format override: "jpeg", "png" or "gif". Omit to keep the
# source's format.
# convert_to = "png"

# Encoder settings.
jpeg_quality = 90       # 1-100
png_quality = 5         # 1-9 (compression level)
"##
}
