//! Per-version resize configuration.
//!
//! A [`VersionConfig`] describes one derived rendition of an uploaded image:
//! the fit box, the crop/center/enlarge policy, an optional output format and
//! the encoder quality. Values are immutable; every `with_*` call returns a
//! new config, so a shared default can never be mutated by accident.
//!
//! ```
//! # use imgver::imaging::VersionConfig;
//! let thumb = VersionConfig::new()
//!     .with_width(Some(200))
//!     .with_height(Some(200))
//!     .with_crop(true);
//! assert_eq!(thumb.file_name_suffix("thumbnail"), "-thumbnail-200x200-crp-cen-nenl");
//! ```
//!
//! ## File name suffix
//!
//! [`VersionConfig::file_name_suffix`] is part of the on-disk naming contract.
//! It doubles as a cache key: cleanup and lazy restore both rely on
//! regenerating exactly the same suffix for the same settings.

use super::format::Format;
use super::params::{PngCompression, Quality};
use crate::config::ConfigError;

/// Reserved version name for the stored original.
pub const SOURCE_VERSION_NAME: &str = "source";

/// Bounding box applied to the stored original unless the caller overrides it.
pub const SOURCE_MAX_WIDTH: u32 = 1920;
pub const SOURCE_MAX_HEIGHT: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConfig {
    /// `None` when never set; `Some(0)` means unconstrained.
    width: Option<u32>,
    height: Option<u32>,
    allow_crop: bool,
    allow_centering: bool,
    allow_enlarge: bool,
    convert_to: Option<Format>,
    jpeg_quality: Quality,
    png_quality: PngCompression,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            allow_crop: false,
            allow_centering: true,
            allow_enlarge: false,
            convert_to: None,
            jpeg_quality: Quality::default(),
            png_quality: PngCompression::default(),
        }
    }
}

impl VersionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for the stored original: capped at 1920×1200, never cropped,
    /// enlarged or centered.
    pub fn source_default() -> Self {
        Self::new()
            .with_width(Some(SOURCE_MAX_WIDTH))
            .with_height(Some(SOURCE_MAX_HEIGHT))
            .with_centering(false)
    }

    /// Set the fit width. `None` and `Some(0)` both mean "fit to aspect ratio".
    pub fn with_width(self, width: Option<u32>) -> Self {
        Self {
            width: Some(width.unwrap_or(0)),
            ..self
        }
    }

    /// Set the fit height. `None` and `Some(0)` both mean "fit to aspect ratio".
    pub fn with_height(self, height: Option<u32>) -> Self {
        Self {
            height: Some(height.unwrap_or(0)),
            ..self
        }
    }

    pub fn with_crop(self, allow: bool) -> Self {
        Self {
            allow_crop: allow,
            ..self
        }
    }

    pub fn with_centering(self, allow: bool) -> Self {
        Self {
            allow_centering: allow,
            ..self
        }
    }

    pub fn with_enlarge(self, allow: bool) -> Self {
        Self {
            allow_enlarge: allow,
            ..self
        }
    }

    pub fn with_convert_to(self, format: Option<Format>) -> Self {
        Self {
            convert_to: format,
            ..self
        }
    }

    /// Parse and set the conversion target. Empty means "keep source format".
    pub fn with_convert_to_name(self, name: &str) -> Result<Self, ConfigError> {
        let format = if name.is_empty() {
            None
        } else {
            Some(name.parse::<Format>()?)
        };
        Ok(self.with_convert_to(format))
    }

    pub fn with_jpeg_quality(self, quality: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            jpeg_quality: Quality::new(quality)?,
            ..self
        })
    }

    pub fn with_png_quality(self, quality: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            png_quality: PngCompression::new(quality)?,
            ..self
        })
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Fit width for planning; unset counts as unconstrained.
    pub fn fit_width(&self) -> u32 {
        self.width.unwrap_or(0)
    }

    pub fn fit_height(&self) -> u32 {
        self.height.unwrap_or(0)
    }

    pub fn is_crop_allowed(&self) -> bool {
        self.allow_crop
    }

    pub fn is_centering_allowed(&self) -> bool {
        self.allow_centering
    }

    pub fn is_enlarge_allowed(&self) -> bool {
        self.allow_enlarge
    }

    pub fn convert_to(&self) -> Option<Format> {
        self.convert_to
    }

    pub fn is_content_type_convert_required(&self) -> bool {
        self.convert_to.is_some()
    }

    pub fn jpeg_quality(&self) -> Quality {
        self.jpeg_quality
    }

    pub fn png_quality(&self) -> PngCompression {
        self.png_quality
    }

    /// Suffix appended to the base name for this version's file.
    ///
    /// Format: `-[<name>-]<W>x<H>-<crp|ncrp>-<cen|ncen>-<enl|nenl>`. An unset
    /// dimension renders as an empty string, an explicit zero as `0`.
    pub fn file_name_suffix(&self, version_name: &str) -> String {
        let dim = |d: Option<u32>| d.map(|v| v.to_string()).unwrap_or_default();
        let summary = format!(
            "{}x{}-{}-{}-{}",
            dim(self.width),
            dim(self.height),
            if self.allow_crop { "crp" } else { "ncrp" },
            if self.allow_centering { "cen" } else { "ncen" },
            if self.allow_enlarge { "enl" } else { "nenl" },
        );
        if version_name.is_empty() {
            format!("-{summary}")
        } else {
            format!("-{version_name}-{summary}")
        }
    }
}
