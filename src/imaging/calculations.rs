//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! [`plan`] decides, for one source image and one [`VersionConfig`], whether
//! the version needs resampling at all and, if so, the scale factor, the
//! pre-crop ("lossless") dimensions, the final canvas dimensions and the
//! offset at which the scaled image is pasted onto that canvas.

use super::backend::{Dimensions, ImageError};
use super::format::Format;
use super::version::VersionConfig;

/// Geometric transform for one (source, version) pair.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SizePlan {
    pub original_width: u32,
    pub original_height: u32,
    /// Requested box; an unconstrained side is recomputed from the ratio.
    pub fit_width: u32,
    pub fit_height: u32,
    pub must_resize: bool,
    pub aspect_ratio: f64,
    /// Scaled dimensions before cropping.
    pub lossless_width: u32,
    pub lossless_height: u32,
    /// Canvas dimensions after cropping.
    pub new_width: u32,
    pub new_height: u32,
    /// Paste offset of the scaled image on the canvas (zero or negative).
    pub offset_x: i32,
    pub offset_y: i32,
    pub source_format: Format,
}

impl SizePlan {
    fn pass_through(source: Dimensions, format: Format, fit_width: u32, fit_height: u32) -> Self {
        Self {
            original_width: source.width,
            original_height: source.height,
            fit_width,
            fit_height,
            must_resize: false,
            aspect_ratio: 1.0,
            lossless_width: source.width,
            lossless_height: source.height,
            new_width: source.width,
            new_height: source.height,
            offset_x: 0,
            offset_y: 0,
            source_format: format,
        }
    }

    /// Final canvas dimensions.
    pub fn target(&self) -> Dimensions {
        Dimensions {
            width: self.new_width,
            height: self.new_height,
        }
    }
}

fn round_u32(value: f64) -> u32 {
    value.round() as u32
}

/// Compute the sizing plan for a source image.
///
/// Exact comparison operators in the ratio choice matter at the fit-box
/// boundary: with crop, `test_width == fit_width` picks the height ratio
/// (overfill); without crop, `test_width > fit_width` picks the width ratio
/// (underfill).
///
/// # Examples
/// ```
/// # use imgver::imaging::{plan, Dimensions, Format, VersionConfig};
/// let config = VersionConfig::new().with_width(Some(500)).with_height(Some(500));
/// let p = plan(Dimensions { width: 1000, height: 500 }, Format::Jpeg, &config).unwrap();
/// assert!(p.must_resize);
/// assert_eq!((p.new_width, p.new_height), (500, 250));
/// ```
pub fn plan(source: Dimensions, format: Format, config: &VersionConfig) -> Result<SizePlan, ImageError> {
    if source.width == 0 || source.height == 0 {
        return Err(ImageError::InvalidSource(format!(
            "source has non-positive dimensions {}x{}",
            source.width, source.height
        )));
    }

    let mut fit_width = config.fit_width();
    let mut fit_height = config.fit_height();
    let (orig_w, orig_h) = (source.width, source.height);

    if (fit_width == 0 && fit_height == 0) || (orig_w == fit_width && orig_h == fit_height) {
        return Ok(SizePlan::pass_through(source, format, fit_width, fit_height));
    }

    if !config.is_enlarge_allowed()
        && ((orig_w < fit_width && orig_h < fit_height)
            || (orig_w < fit_width && fit_height == 0)
            || (orig_h < fit_height && fit_width == 0))
    {
        return Ok(SizePlan::pass_through(source, format, fit_width, fit_height));
    }

    let aspect_by_width = f64::from(fit_width) / f64::from(orig_w);
    let aspect_by_height = f64::from(fit_height) / f64::from(orig_h);
    let test_height = round_u32(aspect_by_width * f64::from(orig_h));
    let test_width = round_u32(aspect_by_height * f64::from(orig_w));

    let aspect_ratio = if fit_width == 0 {
        fit_width = round_u32(f64::from(orig_w) * aspect_by_height);
        aspect_by_height
    } else if fit_height == 0 {
        fit_height = round_u32(f64::from(orig_h) * aspect_by_width);
        aspect_by_width
    } else if config.is_crop_allowed() {
        if test_height < fit_height || test_width == fit_width {
            aspect_by_height
        } else {
            aspect_by_width
        }
    } else if test_height < fit_height || test_width > fit_width {
        aspect_by_width
    } else {
        aspect_by_height
    };

    let lossless_width = round_u32(f64::from(orig_w) * aspect_ratio);
    let lossless_height = round_u32(f64::from(orig_h) * aspect_ratio);
    let (new_width, new_height) = if config.is_crop_allowed() {
        (fit_width, fit_height)
    } else {
        (lossless_width, lossless_height)
    };

    let (offset_x, offset_y) = if config.is_centering_allowed() {
        (
            centering_offset(lossless_width, new_width),
            centering_offset(lossless_height, new_height),
        )
    } else {
        (0, 0)
    };

    Ok(SizePlan {
        original_width: orig_w,
        original_height: orig_h,
        fit_width,
        fit_height,
        must_resize: true,
        aspect_ratio,
        lossless_width,
        lossless_height,
        new_width,
        new_height,
        offset_x,
        offset_y,
        source_format: format,
    })
}

/// `-round((lossless - new) / 2)`
fn centering_offset(lossless: u32, new: u32) -> i32 {
    -(((f64::from(lossless) - f64::from(new)) / 2.0).round() as i32)
}
