//! Multi-version image pipeline.
//!
//! Takes an uploaded image, stores a bounded copy of it as the `source`
//! version and derives every other named version from that stored copy.
//!
//! ## Resize flow
//!
//! ```text
//! Validate → Cleanup → StoreSource → RenderVersion* → Done
//! ```
//!
//! 1. **Validate**: base name and directory must be non-empty; the upload's
//!    content type (declared, or sniffed when the declared one is wrong but
//!    the file name looks like a JPEG/PNG) must be in the supported table.
//!    Nothing is touched on disk before this passes.
//! 2. **Cleanup**: files in the directory matching [`file_names_regex`] are
//!    deleted. Deletes are best effort; a failure is logged and skipped.
//! 3. **StoreSource**: the upload is written to `<dir>/<base>.<ext>`, capped at
//!    1920×1200 unless the caller supplies its own `source` config.
//! 4. **RenderVersion**: every other version is derived from the stored
//!    source into `<dir>/<base><suffix>.<ext>`.
//!
//! Versions render sequentially. The call is not atomic: an error part way
//! through leaves the versions rendered so far on disk.
//!
//! ## Idempotence
//!
//! [`apply_resize`] skips rendering when the destination already exists with
//! the planned dimensions and is at least as new as its source, so repeated
//! restore requests do not resample the same image again.
//!
//! ## Concurrency
//!
//! No locking. Two concurrent `resize` calls for the same directory and base
//! name race on cleanup-then-write.

use crate::imaging::format::{self, Format, OUTPUT_EXTENSIONS, is_content_type_supported};
use crate::imaging::params::{Encoding, RenderParams, RotateParams};
use crate::imaging::{ImageBackend, ImageError, SOURCE_VERSION_NAME, SizePlan, VersionConfig, plan};
use crate::storage::{self, DIR_MODE, FILE_MODE};
use log::{debug, info};
use regex::Regex;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("Unsupported content type: '{0}'")]
    UnsupportedContentType(String),
    #[error("Image processing failed: {0}")]
    Image(#[from] ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid file name pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Named version configs for one base file name.
pub type VersionSet = BTreeMap<String, VersionConfig>;

/// An uploaded file waiting in a temporary location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub temp_path: PathBuf,
    /// Content type as sent by the client.
    pub declared_mime_type: String,
    /// File name as sent by the client.
    pub original_name: String,
    pub size: u64,
}

impl UploadedFile {
    /// Copy a local file into the system temp directory as an upload.
    ///
    /// The pipeline consumes its upload, so the caller's file stays put.
    /// Without a declared type the content is sniffed.
    pub fn stage(input: &Path, declared_mime_type: Option<String>) -> std::io::Result<Self> {
        let original_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = std::env::temp_dir().join(format!(".imgver-{}-{}.tmp", std::process::id(), original_name));
        let size = std::fs::copy(input, &temp_path)?;
        let declared_mime_type = declared_mime_type
            .or_else(|| format::sniff_content_type(input).map(str::to_string))
            .unwrap_or_default();
        Ok(Self {
            temp_path,
            declared_mime_type,
            original_name,
            size,
        })
    }
}

/// Whether an upload is non-empty and declares a supported image type.
pub fn is_image(upload: &UploadedFile) -> bool {
    upload.size > 0 && is_content_type_supported(&upload.declared_mime_type)
}

/// Resolve the content type of an upload.
///
/// The declared type wins when supported. Otherwise, if the file name has a
/// JPEG/PNG extension, the type is sniffed from the file content; clients
/// regularly send `application/octet-stream` for perfectly valid photos.
pub fn content_type_for_upload(upload: &UploadedFile) -> String {
    if is_content_type_supported(&upload.declared_mime_type)
        || !format::has_source_extension(&upload.original_name)
    {
        return upload.declared_mime_type.clone();
    }
    match format::sniff_content_type(&upload.temp_path) {
        Some(sniffed) => {
            debug!(
                "declared type '{}' of {} replaced by sniffed '{}'",
                upload.declared_mime_type, upload.original_name, sniffed
            );
            sniffed.to_string()
        }
        None => upload.declared_mime_type.clone(),
    }
}

/// Pattern matching every file a previous `resize` for `base_name` may have
/// written: the bare source and any suffixed version, in any output format.
///
/// The version name is a single dash-free token, so the versions of a
/// sibling base such as `photo-2` never match the pattern for `photo`.
pub fn file_names_regex(base_name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)^{}(?:(?:-[^-.]+)?-\d*x\d*-n?crp-n?cen-n?enl)?\.(?:{})$",
        regex::escape(base_name),
        OUTPUT_EXTENSIONS.join("|")
    ))
}

/// Delete files directly inside `dir` whose names match `pattern`.
///
/// Returns the number of files removed.
pub fn delete_existing_files(dir: &Path, pattern: &Regex) -> usize {
    storage::list_file_names(dir)
        .into_iter()
        .filter(|name| pattern.is_match(name))
        .filter(|name| storage::remove_quietly(&dir.join(name)))
        .count()
}

/// `path` with `.ext` appended, keeping any dots already in the file name.
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

/// Store an upload and derive all named versions from it.
///
/// Returns version name → generated file name (with extension). The
/// `source` entry is always present.
pub fn resize(
    backend: &impl ImageBackend,
    upload: &UploadedFile,
    dest_dir: &Path,
    base_name: &str,
    versions: &VersionSet,
) -> Result<BTreeMap<String, String>, PipelineError> {
    if dest_dir.as_os_str().is_empty() {
        return Err(PipelineError::MissingArgument("destination directory"));
    }
    if base_name.is_empty() {
        return Err(PipelineError::MissingArgument("base file name"));
    }
    let content_type = content_type_for_upload(upload);
    if !is_content_type_supported(&content_type) {
        return Err(PipelineError::UnsupportedContentType(content_type));
    }
    info!(
        "resizing {} ({}) into {} as '{}'",
        upload.original_name,
        content_type,
        dest_dir.display(),
        base_name
    );

    if dest_dir.is_dir() {
        let removed = delete_existing_files(dest_dir, &file_names_regex(base_name)?);
        debug!("removed {removed} stale files for '{base_name}'");
    } else {
        storage::ensure_dir(dest_dir, DIR_MODE)?;
    }

    let source_config = versions
        .get(SOURCE_VERSION_NAME)
        .cloned()
        .unwrap_or_else(VersionConfig::source_default);
    let source_ext = apply_resize(
        backend,
        &upload.temp_path,
        &dest_dir.join(base_name),
        &source_config,
        &content_type,
    )?;
    let source_name = format!("{base_name}.{source_ext}");
    let source_path = dest_dir.join(&source_name);
    if upload.temp_path != source_path {
        storage::remove_quietly(&upload.temp_path);
    }
    let source_content_type =
        format::target_content_type(&content_type, source_config.convert_to()).to_string();

    let mut generated = BTreeMap::new();
    generated.insert(SOURCE_VERSION_NAME.to_string(), source_name);

    for (name, config) in versions.iter().filter(|(name, _)| *name != SOURCE_VERSION_NAME) {
        let stem = format!("{base_name}{}", config.file_name_suffix(name));
        let ext = apply_resize(
            backend,
            &source_path,
            &dest_dir.join(&stem),
            config,
            &source_content_type,
        )?;
        generated.insert(name.clone(), format!("{stem}.{ext}"));
    }

    info!("generated {} files for '{}'", generated.len(), base_name);
    Ok(generated)
}

/// Render one version of `src` to `dest_no_ext` plus the target extension.
///
/// A pass-through plan in the source's own format copies the bytes verbatim.
/// Otherwise the version is rendered unless the destination is already up to
/// date (same planned dimensions, modified no earlier than the source).
///
/// Returns the extension (without dot) of the written file.
pub fn apply_resize(
    backend: &impl ImageBackend,
    src: &Path,
    dest_no_ext: &Path,
    config: &VersionConfig,
    content_type: &str,
) -> Result<&'static str, PipelineError> {
    let declared_format = Format::from_content_type(content_type)
        .ok_or_else(|| PipelineError::UnsupportedContentType(content_type.to_string()))?;
    let source = backend.identify(src)?;
    let size_plan = plan(source.dimensions, source.format, config)?;

    let target_format = config.convert_to().unwrap_or(declared_format);
    let ext = target_format.extension();
    let dest = append_extension(dest_no_ext, ext);

    if !size_plan.must_resize && target_format == source.format {
        if src != dest {
            storage::copy_file(src, &dest, FILE_MODE)?;
            debug!("copied {} → {}", src.display(), dest.display());
        }
        return Ok(ext);
    }

    if is_up_to_date(backend, src, &dest, &size_plan) {
        debug!("{} is up to date", dest.display());
        return Ok(ext);
    }

    backend.render(&RenderParams {
        source: src.to_path_buf(),
        output: dest.clone(),
        plan: size_plan,
        encoding: Encoding {
            format: target_format,
            jpeg_quality: config.jpeg_quality(),
            png_compression: config.png_quality(),
        },
    })?;
    debug!("rendered {}", dest.display());
    Ok(ext)
}

/// Idempotence guard: does `dest` already hold this plan's output?
fn is_up_to_date(backend: &impl ImageBackend, src: &Path, dest: &Path, size_plan: &SizePlan) -> bool {
    if !dest.is_file() {
        return false;
    }
    match backend.identify(dest) {
        Ok(existing) if existing.dimensions == size_plan.target() => {}
        _ => return false,
    }
    match (storage::modified(dest), storage::modified(src)) {
        (Some(dest_time), Some(src_time)) => dest_time >= src_time,
        _ => false,
    }
}

/// Rotate an image clockwise, in place unless `new_path` is given.
///
/// `degrees` is normalized modulo 360; a zero rotation succeeds without
/// touching the file. Returns `Ok(false)` when `path` is missing or is a
/// directory.
pub fn rotate(
    backend: &impl ImageBackend,
    path: &Path,
    format: Format,
    degrees: i32,
    new_path: Option<&Path>,
) -> Result<bool, PipelineError> {
    let degrees = degrees.rem_euclid(360) as u32;
    if degrees == 0 {
        return Ok(true);
    }
    if !path.is_file() {
        return Ok(false);
    }
    let output = new_path.unwrap_or(path);
    backend.rotate(&RotateParams {
        source: path.to_path_buf(),
        output: output.to_path_buf(),
        format,
        degrees,
    })?;
    info!("rotated {} by {} degrees → {}", path.display(), degrees, output.display());
    Ok(true)
}

/// Strip a trailing output extension (`.jpg`, `.png`, `.gif`) if present.
fn strip_output_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if OUTPUT_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) => stem,
        _ => file_name,
    }
}

/// Find the stored source for `base_name`: its extension and format.
///
/// Probes every output extension, since a `source` config may convert the
/// original to another format (including GIF).
fn find_source(dir: &Path, base_name: &str) -> Option<(&'static str, Format)> {
    let ext = storage::find_extension(dir, base_name, OUTPUT_EXTENSIONS)?;
    Format::from_extension(ext).map(|format| (ext, format))
}

/// Regenerate a single derived file from the stored source.
///
/// `file_name` may be given with or without extension. Returns the path of
/// the existing or newly rendered file, or `None` when there is no stored
/// source or no version produces that name.
pub fn restore_version(
    backend: &impl ImageBackend,
    file_name: &str,
    base_name: &str,
    dir: &Path,
    versions: &VersionSet,
) -> Result<Option<PathBuf>, PipelineError> {
    let Some((source_ext, source_format)) = find_source(dir, base_name) else {
        debug!("no stored source for '{}' in {}", base_name, dir.display());
        return Ok(None);
    };
    let source_path = storage::with_extension(dir, base_name, source_ext);
    let requested = strip_output_extension(file_name);
    if requested == base_name {
        return Ok(Some(source_path));
    }
    let content_type = source_format.content_type();

    for (name, config) in versions.iter().filter(|(name, _)| *name != SOURCE_VERSION_NAME) {
        let stem = format!("{base_name}{}", config.file_name_suffix(name));
        if requested != stem {
            continue;
        }
        if let Some(ext) = storage::find_extension(dir, &stem, OUTPUT_EXTENSIONS) {
            return Ok(Some(storage::with_extension(dir, &stem, ext)));
        }
        info!("restoring '{}' from {}", name, source_path.display());
        let ext = apply_resize(backend, &source_path, &dir.join(&stem), config, content_type)?;
        return Ok(Some(storage::with_extension(dir, &stem, ext)));
    }
    Ok(None)
}

/// One resolved version location: name, file stem and extension (if known).
struct ResolvedVersion {
    name: String,
    stem: String,
    ext: Option<&'static str>,
}

/// Resolve the expected file stem and extension of every version.
///
/// Versions without a conversion target inherit the stored source's
/// extension, which is unknown when the source is missing.
fn resolve_versions(dir: &Path, base_name: &str, versions: &VersionSet) -> Vec<ResolvedVersion> {
    let source = find_source(dir, base_name);
    let source_content_type = source.map(|(_, format)| format.content_type());
    let mut resolved = vec![ResolvedVersion {
        name: SOURCE_VERSION_NAME.to_string(),
        stem: base_name.to_string(),
        ext: source.map(|(ext, _)| ext),
    }];
    resolved.extend(
        versions
            .iter()
            .filter(|(name, _)| *name != SOURCE_VERSION_NAME)
            .map(|(name, config)| ResolvedVersion {
                name: name.clone(),
                stem: format!("{base_name}{}", config.file_name_suffix(name)),
                ext: format::target_extension(source_content_type, config.convert_to()),
            }),
    );
    resolved
}

/// Public URL of every version: `base_url + stem + .ext`.
///
/// The extension is omitted when it cannot be determined.
pub fn versions_urls(
    dir: &Path,
    base_url: &str,
    base_name: &str,
    versions: &VersionSet,
) -> BTreeMap<String, String> {
    resolve_versions(dir, base_name, versions)
        .into_iter()
        .map(|v| {
            let url = match v.ext {
                Some(ext) => format!("{base_url}{}.{ext}", v.stem),
                None => format!("{base_url}{}", v.stem),
            };
            (v.name, url)
        })
        .collect()
}

/// Filesystem path of every version, or an empty string when the extension
/// cannot be determined.
pub fn versions_paths(dir: &Path, base_name: &str, versions: &VersionSet) -> BTreeMap<String, String> {
    resolve_versions(dir, base_name, versions)
        .into_iter()
        .map(|v| {
            let path = v
                .ext
                .map(|ext| storage::with_extension(dir, &v.stem, ext).to_string_lossy().to_string())
                .unwrap_or_default();
            (v.name, path)
        })
        .collect()
}
