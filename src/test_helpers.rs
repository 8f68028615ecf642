//! Shared test utilities for the imgver test suite.
//!
//! Provides synthetic image fixtures, upload construction and small
//! filesystem assertions used by the pipeline and backend tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let upload = jpeg_upload(tmp.path(), "photo.jpg", 300, 200);
//! let names = resize(&RustBackend::new(), &upload, &dest, "avatar42", &configs).unwrap();
//! assert_files(&dest, &["avatar42.jpg"]);
//! ```

use image::{ImageEncoder, Rgba, RgbaImage, RgbImage};
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::pipeline::UploadedFile;

// =========================================================================
// Fixture images
// =========================================================================

/// Write a gradient JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a half-transparent gradient PNG with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 200, if x < width / 2 { 0 } else { 255 }])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Uploads
// =========================================================================

/// Create a JPEG upload in `dir` with a matching declared content type.
pub fn jpeg_upload(dir: &Path, original_name: &str, width: u32, height: u32) -> UploadedFile {
    let temp_path = dir.join(format!("upload-{original_name}.tmp"));
    create_test_jpeg(&temp_path, width, height);
    upload_for(&temp_path, "image/jpeg", original_name)
}

/// Create a PNG upload in `dir` with a matching declared content type.
pub fn png_upload(dir: &Path, original_name: &str, width: u32, height: u32) -> UploadedFile {
    let temp_path = dir.join(format!("upload-{original_name}.tmp"));
    create_test_png(&temp_path, width, height);
    upload_for(&temp_path, "image/png", original_name)
}

/// Describe an existing temp file as an upload.
pub fn upload_for(temp_path: &Path, declared_mime_type: &str, original_name: &str) -> UploadedFile {
    UploadedFile {
        temp_path: temp_path.to_path_buf(),
        declared_mime_type: declared_mime_type.to_string(),
        original_name: original_name.to_string(),
        size: std::fs::metadata(temp_path).map(|m| m.len()).unwrap_or(0),
    }
}

// =========================================================================
// Filesystem assertions
// =========================================================================

/// Sorted file names directly inside `dir`.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Assert `dir` contains exactly `expected` (order-insensitive).
pub fn assert_files(dir: &Path, expected: &[&str]) {
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(list_files(dir), expected, "unexpected files in {}", dir.display());
}

/// Move a file's modification time into the past.
pub fn backdate(path: &Path, secs: u64) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(secs))
        .unwrap();
}
