//! Filesystem helpers used by the pipeline.
//!
//! Thin wrappers over `std::fs` that add the conventions web-servable image
//! directories need: permission bits on everything written, quiet deletes for
//! stale-file cleanup, and extension probing for stored images.
//!
//! Deletes during cleanup are advisory. [`remove_quietly`] logs a failure and
//! moves on instead of aborting the resize that triggered it.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Permission bits for written image files.
pub const FILE_MODE: u32 = 0o666;

/// Permission bits for created image directories.
pub const DIR_MODE: u32 = 0o777;

/// Set unix permission bits. No-op on other platforms.
pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
    Ok(())
}

/// Create `dir` (and parents) if missing and apply `mode` to it.
pub fn ensure_dir(dir: &Path, mode: u32) -> io::Result<()> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)?;
        set_mode(dir, mode)?;
    }
    Ok(())
}

/// Copy `src` over `dst` and apply `mode` to the copy.
pub fn copy_file(src: &Path, dst: &Path, mode: u32) -> io::Result<()> {
    std::fs::copy(src, dst)?;
    set_mode(dst, mode)
}

/// Delete a file, logging instead of failing.
///
/// Returns whether the file is gone afterwards.
pub fn remove_quietly(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            log::warn!("failed to delete {}: {}", path.display(), e);
            false
        }
    }
}

/// Names of the regular files directly inside `dir`.
///
/// A missing or unreadable directory lists as empty.
pub fn list_file_names(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect()
}

/// Last modification time, or `None` when unavailable.
pub fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// `dir/stem.ext` for a stem and extension.
pub fn with_extension(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    dir.join(format!("{stem}.{ext}"))
}

/// First extension in `candidates` for which `dir/stem.ext` exists as a file.
pub fn find_extension(dir: &Path, stem: &str, candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .copied()
        .find(|ext| with_extension(dir, stem, ext).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn ensure_dir_creates_nested() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b/c");
        ensure_dir(&dir, DIR_MODE).unwrap();
        assert!(dir.is_dir());
        // Second call is a no-op
        ensure_dir(&dir, DIR_MODE).unwrap();
    }

    #[test]
    fn copy_file_copies_bytes() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.bin");
        let dst = tmp.path().join("dst.bin");
        fs::write(&src, b"bytes").unwrap();
        fs::write(&dst, b"old").unwrap();

        copy_file(&src, &dst, FILE_MODE).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"bytes");
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.bin");
        let dst = tmp.path().join("dst.bin");
        fs::write(&src, b"x").unwrap();

        copy_file(&src, &dst, 0o640).unwrap();
        let mode = fs::metadata(&dst).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn remove_quietly_tolerates_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(remove_quietly(&tmp.path().join("missing")));
    }

    #[test]
    fn remove_quietly_reports_failure() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a-directory");
        fs::create_dir(&dir).unwrap();
        assert!(!remove_quietly(&dir));
        assert!(dir.exists());
    }

    #[test]
    fn list_file_names_skips_directories() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.jpg"), "").unwrap();
        fs::write(tmp.path().join("b.png"), "").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/c.jpg"), "").unwrap();

        let mut names = list_file_names(tmp.path());
        names.sort();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn list_file_names_missing_dir_is_empty() {
        assert!(list_file_names(Path::new("/nonexistent/dir")).is_empty());
    }

    #[test]
    fn find_extension_checks_in_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("photo.png"), "").unwrap();
        assert_eq!(find_extension(tmp.path(), "photo", &["jpg", "png"]), Some("png"));
        assert_eq!(find_extension(tmp.path(), "other", &["jpg", "png"]), None);
    }
}
