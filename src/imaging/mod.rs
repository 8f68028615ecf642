//! Image processing: version settings, sizing plans and the codec seam.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::with_guessed_format` |
//! | **Resize / crop** | Lanczos3 resample pasted onto a fixed canvas |
//! | **Encode** | `image` JPEG, PNG and GIF encoders |
//! | **Rotate** | `DynamicImage::rotate90/180/270` |
//!
//! The module is split into:
//! - **Format**: content-type table and [`Format`]
//! - **Version**: [`VersionConfig`], one per named output variant
//! - **Calculations**: the pure [`plan`] function (unit testable, no I/O)
//! - **Parameters**: data structures describing a render or rotation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod format;
pub mod params;
pub mod rust_backend;
mod version;

pub use backend::{Dimensions, ImageBackend, ImageError, ImageInfo};
pub use calculations::{SizePlan, plan};
pub use format::Format;
pub use params::{PngCompression, Quality};
pub use rust_backend::RustBackend;
pub use version::{SOURCE_MAX_HEIGHT, SOURCE_MAX_WIDTH, SOURCE_VERSION_NAME, VersionConfig};
