//! Image formats and the content-type ↔ extension table.
//!
//! Only JPEG and PNG uploads are accepted. The table below is the whole
//! contract: anything not listed (GIF, BMP, WebP, ...) is rejected at intake
//! even though the codec could decode it.
//!
//! | Content type | Extension |
//! |---|---|
//! | `image/jpeg` | `jpg` |
//! | `image/pjpeg` | `jpg` |
//! | `image/x-png` | `png` |
//! | `image/jpg` | `jpg` |
//! | `image/png` | `png` |
//!
//! GIF exists in [`Format`] only as a conversion target.

use crate::config::ConfigError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported upload content types, in lookup order.
pub const CONTENT_TYPE_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/pjpeg", "jpg"),
    ("image/x-png", "png"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
];

/// Distinct extensions from [`CONTENT_TYPE_EXTENSIONS`], in first-seen order.
///
/// An upload named with one of these gets its content sniffed when the
/// declared type is wrong.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Every extension the pipeline may write, including conversion targets.
pub const OUTPUT_EXTENSIONS: &[&str] = &["jpg", "png", "gif"];

/// Encodable image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Jpeg,
    Png,
    Gif,
}

impl Format {
    /// File extension written for this format (no leading dot).
    pub fn extension(self) -> &'static str {
        match self {
            Format::Jpeg => "jpg",
            Format::Png => "png",
            Format::Gif => "gif",
        }
    }

    /// Canonical content type for this format.
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Jpeg => "image/jpeg",
            Format::Png => "image/png",
            Format::Gif => "image/gif",
        }
    }

    /// Resolve a content type to its format: any supported upload type, or
    /// the canonical type of a conversion target (`image/gif`).
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match extension_for_content_type(content_type) {
            Some("jpg") => Some(Format::Jpeg),
            Some("png") => Some(Format::Png),
            _ if content_type == Format::Gif.content_type() => Some(Format::Gif),
            _ => None,
        }
    }

    /// Format written under an output extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        [Format::Jpeg, Format::Png, Format::Gif]
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    /// Map a format detected by the `image` crate.
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Format::Jpeg),
            image::ImageFormat::Png => Some(Format::Png),
            image::ImageFormat::Gif => Some(Format::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Jpeg => "jpeg",
            Format::Png => "png",
            Format::Gif => "gif",
        })
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    /// Accepts exactly `jpeg`, `png` or `gif`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpeg" => Ok(Format::Jpeg),
            "png" => Ok(Format::Png),
            "gif" => Ok(Format::Gif),
            other => Err(ConfigError::Validation(format!(
                "invalid image format '{other}', expected one of: jpeg, png, gif"
            ))),
        }
    }
}

/// Whether an upload with this content type is accepted.
pub fn is_content_type_supported(content_type: &str) -> bool {
    extension_for_content_type(content_type).is_some()
}

/// Look up the extension for a supported content type.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    CONTENT_TYPE_EXTENSIONS
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
}

/// Reverse lookup: the last table entry wins, so `jpg` → `image/jpg`
/// and `png` → `image/png`.
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    CONTENT_TYPE_EXTENSIONS
        .iter()
        .rev()
        .find(|(_, e)| e.eq_ignore_ascii_case(ext))
        .map(|(ct, _)| *ct)
}

/// Content type of a final output: the conversion target if any, else the source's.
pub fn target_content_type(source_content_type: &str, convert_to: Option<Format>) -> &str {
    match convert_to {
        Some(format) => format.content_type(),
        None => source_content_type,
    }
}

/// Extension of a final output, honoring conversion targets outside the upload table.
///
/// Without a conversion target the extension follows the source's content
/// type, and is unknown when that is.
pub fn target_extension(source_content_type: Option<&str>, convert_to: Option<Format>) -> Option<&'static str> {
    match convert_to {
        Some(format) => Some(format.extension()),
        None => source_content_type
            .and_then(Format::from_content_type)
            .map(Format::extension),
    }
}

/// Content type of a file, sniffed from its leading bytes.
///
/// Returns `None` for unreadable files and formats outside [`Format`].
pub fn sniff_content_type(path: &Path) -> Option<&'static str> {
    let format = image::ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .format()?;
    Format::from_image_format(format).map(Format::content_type)
}

/// Whether a file name ends in one of the upload extensions (case-insensitive).
pub fn has_source_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
}
