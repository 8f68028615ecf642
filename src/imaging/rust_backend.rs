//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::with_guessed_format` + `into_dimensions` |
//! | Decode (JPEG, PNG, GIF) | `image` crate decoders |
//! | Resample | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Crop / center | `image::imageops::replace` onto a fixed-size canvas |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (compression from level 1–9) |
//! | Encode → GIF | `image::codecs::gif` via `DynamicImage::write_to` |
//! | Rotate (right angles) | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Rotate (other angles) | `imageproc::geometric_transformations::rotate_about_center`, bilinear |

use super::backend::{Dimensions, ImageBackend, ImageError, ImageInfo};
use super::format::Format;
use super::params::{Encoding, PngCompression, Quality, RenderParams, RotateParams};
use crate::storage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage, RgbImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use std::io::Write;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, detecting the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, ImageError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| ImageError::InvalidSource(format!("failed to decode {}: {}", path.display(), e)))
}

/// Map the 1–9 PNG level onto the encoder's three compression presets.
fn png_compression_type(level: PngCompression) -> CompressionType {
    match level.value() {
        1..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Encode `img` to `path` in the requested format.
fn save_image(img: &DynamicImage, path: &Path, encoding: &Encoding) -> Result<(), ImageError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);

    let result = match encoding.format {
        Format::Jpeg => {
            // JPEG has no alpha channel; flatten first.
            let encoder = JpegEncoder::new_with_quality(&mut writer, encoding.jpeg_quality.value() as u8);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        Format::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut writer,
                png_compression_type(encoding.png_compression),
                PngFilter::Adaptive,
            );
            img.write_with_encoder(encoder)
        }
        Format::Gif => DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut writer, ImageFormat::Gif),
    };
    result.map_err(|e| {
        ImageError::ProcessingFailed(format!("{} encode failed for {}: {}", encoding.format, path.display(), e))
    })?;
    writer.flush()?;
    storage::set_mode(path, storage::FILE_MODE)?;
    Ok(())
}

/// Resample the source onto the planned canvas.
///
/// The whole source is scaled to the lossless dimensions and pasted at the
/// plan's offset; whatever falls outside the canvas is cropped. PNG canvases
/// start fully transparent so uncovered areas keep alpha.
fn compose(img: &DynamicImage, params: &RenderParams) -> DynamicImage {
    let plan = &params.plan;
    let scaled = if (plan.lossless_width, plan.lossless_height) == (img.width(), img.height()) {
        img.clone()
    } else {
        img.resize_exact(plan.lossless_width, plan.lossless_height, FilterType::Lanczos3)
    };
    let (x, y) = (i64::from(plan.offset_x), i64::from(plan.offset_y));

    if plan.source_format == Format::Png {
        let mut canvas = RgbaImage::from_pixel(plan.new_width, plan.new_height, Rgba([255, 255, 255, 0]));
        imageops::replace(&mut canvas, &scaled.to_rgba8(), x, y);
        DynamicImage::ImageRgba8(canvas)
    } else {
        let mut canvas = RgbImage::new(plan.new_width, plan.new_height);
        imageops::replace(&mut canvas, &scaled.to_rgb8(), x, y);
        DynamicImage::ImageRgb8(canvas)
    }
}

/// Rotate clockwise by an arbitrary angle.
///
/// The canvas grows to the rotated bounding box so no corner is cut off.
/// Uncovered areas are transparent for PNG and black otherwise.
fn rotate_any(img: &DynamicImage, degrees: u32, transparent: bool) -> DynamicImage {
    let theta = (degrees as f32).to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let (w, h) = (img.width() as f32, img.height() as f32);
    let bound_w = ((w * cos + h * sin).round() as u32).max(1);
    let bound_h = ((w * sin + h * cos).round() as u32).max(1);

    let background = Rgba([0, 0, 0, if transparent { 0 } else { 255 }]);
    let mut canvas = RgbaImage::from_pixel(bound_w, bound_h, background);
    let x = (i64::from(bound_w) - i64::from(img.width())) / 2;
    let y = (i64::from(bound_h) - i64::from(img.height())) / 2;
    imageops::replace(&mut canvas, &img.to_rgba8(), x, y);

    DynamicImage::ImageRgba8(rotate_about_center(&canvas, theta, Interpolation::Bilinear, background))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<ImageInfo, ImageError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .and_then(Format::from_image_format)
            .ok_or_else(|| ImageError::InvalidSource(format!("unrecognized image format: {}", path.display())))?;
        let (width, height) = reader.into_dimensions().map_err(|e| {
            ImageError::InvalidSource(format!("failed to read dimensions of {}: {}", path.display(), e))
        })?;
        Ok(ImageInfo {
            dimensions: Dimensions { width, height },
            format,
        })
    }

    fn render(&self, params: &RenderParams) -> Result<(), ImageError> {
        let img = load_image(&params.source)?;
        let canvas = compose(&img, params);
        save_image(&canvas, &params.output, &params.encoding)
    }

    fn rotate(&self, params: &RotateParams) -> Result<(), ImageError> {
        let img = load_image(&params.source)?;
        let rotated = match params.degrees {
            90 => img.rotate90(),
            180 => img.rotate180(),
            270 => img.rotate270(),
            other => rotate_any(&img, other, params.format == Format::Png),
        };
        let encoding = Encoding {
            format: params.format,
            jpeg_quality: Quality::rotation(),
            png_compression: PngCompression::rotation(),
        };
        save_image(&rotated, &params.output, &encoding)
    }
}
