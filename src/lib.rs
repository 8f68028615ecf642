//! # imgver
//!
//! Derives named, resized versions of uploaded images and keeps them in sync
//! on disk. An upload is stored once as the bounded `source` version; every
//! other version (thumbnails, banners, icons) is rendered from that stored
//! copy and can be regenerated lazily when a file goes missing.
//!
//! # Architecture: Config → Plan → Render
//!
//! ```text
//! 1. Config    versions.toml  →  VersionConfig per name   (validated, immutable)
//! 2. Plan      source dims + VersionConfig  →  SizePlan   (pure geometry)
//! 3. Render    SizePlan  →  <dir>/<base>-<suffix>.<ext>   (codec + filesystem)
//! ```
//!
//! Planning is a pure function from dimensions to dimensions, so the crop and
//! fit rules are unit tested without decoding a single pixel. Rendering goes
//! through the [`imaging::ImageBackend`] trait; tests swap in a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Version settings, sizing planner, codec trait and its `image` crate backend |
//! | [`pipeline`] | Upload validation, stale-file cleanup, version rendering, restore, URLs and paths |
//! | [`storage`] | Filesystem helpers: permission bits, quiet deletes, extension probing |
//! | [`config`] | `versions.toml` profile loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## File Names Are the Cache Key
//!
//! Every derived file name encodes the settings that produced it:
//!
//! ```text
//! avatar42.jpg                              ← source
//! avatar42-thumb-100x100-crp-cen-nenl.jpg   ← thumb: 100×100, crop, center, no enlarge
//! ```
//!
//! Changing a version's settings changes its name, so a stale rendition is
//! never served under a new configuration. The same scheme lets a fresh
//! upload find and delete every file the previous one produced, and lets
//! [`pipeline::restore_version`] map a requested file name back to its config.
//!
//! ## Derive From the Stored Source
//!
//! Versions are rendered from the stored, already bounded original rather
//! than from the raw upload. The upload is deleted after storage, and a lazy
//! restore months later produces the same pixels as the initial resize did.
//!
//! ## Skip Work That Is Already Done
//!
//! A destination with the planned dimensions that is at least as new as its
//! source is left alone. Images that need no resizing and no format change
//! are copied byte for byte instead of being re-encoded.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;
