//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the codec seam of the crate: everything that
//! decodes, resamples or encodes pixels goes through it. The pipeline only
//! ever talks to this trait, so tests can swap in a recording mock and assert
//! on what *would* have been rendered.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::format::Format;
use super::params::{RenderParams, RotateParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid source image: {0}")]
    InvalidSource(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub dimensions: Dimensions,
    pub format: Format,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Read dimensions and detected format without a full decode.
    fn identify(&self, path: &Path) -> Result<ImageInfo, ImageError>;

    /// Decode the source, resample it onto the planned canvas and encode the
    /// result to `params.output`.
    fn render(&self, params: &RenderParams) -> Result<(), ImageError>;

    /// Rotate clockwise by `params.degrees` and write the result.
    fn rotate(&self, params: &RotateParams) -> Result<(), ImageError>;
}
