//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`pipeline`](crate::pipeline) (which decides which
//! versions to render and where) and the [`backend`](super::backend) (which
//! does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing pipeline logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Validated on construction.
//! - [`PngCompression`]: PNG compression level (1–9, default 5). Validated on construction.
//! - [`RenderParams`]: Full specification for rendering one version from a source file.
//! - [`RotateParams`]: Full specification for rotating a stored file.

use super::calculations::SizePlan;
use super::format::Format;
use crate::config::ConfigError;
use std::path::PathBuf;

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Result<Self, ConfigError> {
        if !(1..=100).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "JPEG quality should be within 1 and 100, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Quality used when rewriting rotated JPEGs.
    pub fn rotation() -> Self {
        Self(70)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// PNG compression level (1-9). Higher is smaller and slower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PngCompression(u32);

impl PngCompression {
    pub fn new(value: u32) -> Result<Self, ConfigError> {
        if !(1..=9).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "PNG quality should be within 1 and 9, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Near-lossless level used when rewriting rotated PNGs.
    pub fn rotation() -> Self {
        Self(8)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for PngCompression {
    fn default() -> Self {
        Self(5)
    }
}

/// Encoder settings for one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    pub format: Format,
    pub jpeg_quality: Quality,
    pub png_compression: PngCompression,
}

/// Parameters for rendering one version: resample the source into a
/// `new_width × new_height` canvas at the plan's offsets, then encode.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub plan: SizePlan,
    pub encoding: Encoding,
}

/// Parameters for a clockwise rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct RotateParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub format: Format,
    /// Normalized to 1..360. Right angles keep the exact pixels; any other
    /// angle grows the canvas to fit the rotated corners.
    pub degrees: u32,
}
