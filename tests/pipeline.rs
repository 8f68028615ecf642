//! End-to-end tests of the version pipeline against real images on disk.

use image::{ImageEncoder, RgbImage};
use imgver::imaging::{Dimensions, ImageBackend, RustBackend, VersionConfig};
use imgver::pipeline::{self, UploadedFile, VersionSet};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn jpeg_upload(dir: &Path, width: u32, height: u32) -> UploadedFile {
    let temp_path = dir.join("php-upload.tmp");
    let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    let file = fs::File::create(&temp_path).unwrap();
    image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    UploadedFile {
        size: fs::metadata(&temp_path).unwrap().len(),
        temp_path,
        declared_mime_type: "image/jpeg".into(),
        original_name: "me.jpg".into(),
    }
}

fn sorted_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn thumb() -> VersionConfig {
    VersionConfig::new()
        .with_width(Some(100))
        .with_height(Some(100))
        .with_crop(true)
        .with_centering(true)
}

#[test]
fn resize_stores_source_and_thumbnail() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("avatars");
    let upload = jpeg_upload(tmp.path(), 640, 480);
    let versions: VersionSet = [("thumb".to_string(), thumb())].into_iter().collect();
    let backend = RustBackend::new();

    let names = pipeline::resize(&backend, &upload, &dest, "avatar42", &versions).unwrap();

    assert_eq!(names.len(), 2);
    assert_eq!(names["source"], "avatar42.jpg");
    assert_eq!(names["thumb"], "avatar42-thumb-100x100-crp-cen-nenl.jpg");
    assert_eq!(
        sorted_files(&dest),
        vec!["avatar42-thumb-100x100-crp-cen-nenl.jpg", "avatar42.jpg"]
    );
    let thumb_info = backend
        .identify(&dest.join("avatar42-thumb-100x100-crp-cen-nenl.jpg"))
        .unwrap();
    assert_eq!(thumb_info.dimensions, Dimensions { width: 100, height: 100 });
    assert!(!upload.temp_path.exists());
}

#[test]
fn second_resize_leaves_no_orphans() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("avatars");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join("unrelated.jpg"), "keep").unwrap();
    let backend = RustBackend::new();

    let first: VersionSet = [
        ("thumb".to_string(), thumb()),
        ("wide".to_string(), VersionConfig::new().with_width(Some(300))),
    ]
    .into_iter()
    .collect();
    pipeline::resize(&backend, &jpeg_upload(tmp.path(), 640, 480), &dest, "avatar42", &first).unwrap();
    assert_eq!(sorted_files(&dest).len(), 4);

    let second: VersionSet = [(
        "small".to_string(),
        VersionConfig::new().with_width(Some(50)).with_height(Some(50)),
    )]
    .into_iter()
    .collect();
    let names =
        pipeline::resize(&backend, &jpeg_upload(tmp.path(), 640, 480), &dest, "avatar42", &second).unwrap();

    assert_eq!(names["small"], "avatar42-small-50x50-ncrp-cen-nenl.jpg");
    assert_eq!(
        sorted_files(&dest),
        vec![
            "avatar42-small-50x50-ncrp-cen-nenl.jpg",
            "avatar42.jpg",
            "unrelated.jpg"
        ]
    );
}

#[test]
fn generated_names_restore_without_rendering() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("avatars");
    let versions: VersionSet = [("thumb".to_string(), thumb())].into_iter().collect();
    let backend = RustBackend::new();
    let names = pipeline::resize(&backend, &jpeg_upload(tmp.path(), 400, 400), &dest, "a", &versions).unwrap();
    let thumb_path = dest.join(&names["thumb"]);
    let before = fs::metadata(&thumb_path).unwrap().modified().unwrap();

    let restored = pipeline::restore_version(&backend, &names["thumb"], "a", &dest, &versions).unwrap();

    assert_eq!(restored, Some(thumb_path.clone()));
    assert_eq!(fs::metadata(&thumb_path).unwrap().modified().unwrap(), before);
}

#[test]
fn deleted_version_is_restored_and_urls_resolve() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("avatars");
    let versions: VersionSet = [("thumb".to_string(), thumb())].into_iter().collect();
    let backend = RustBackend::new();
    let names = pipeline::resize(&backend, &jpeg_upload(tmp.path(), 400, 300), &dest, "a", &versions).unwrap();
    fs::remove_file(dest.join(&names["thumb"])).unwrap();

    let restored = pipeline::restore_version(&backend, "a-thumb-100x100-crp-cen-nenl", "a", &dest, &versions)
        .unwrap()
        .unwrap();
    assert_eq!(backend.identify(&restored).unwrap().dimensions, Dimensions { width: 100, height: 100 });

    let urls = pipeline::versions_urls(&dest, "/static/", "a", &versions);
    assert_eq!(urls["source"], "/static/a.jpg");
    assert_eq!(urls["thumb"], "/static/a-thumb-100x100-crp-cen-nenl.jpg");
}

#[test]
fn staged_upload_leaves_destination_to_the_pipeline() {
    let tmp = TempDir::new().unwrap();
    let input = jpeg_upload(tmp.path(), 64, 48).temp_path;
    let dest = tmp.path().join("new/avatars");

    let upload = UploadedFile::stage(&input, None).unwrap();
    assert!(!dest.exists());
    assert!(upload.temp_path.starts_with(std::env::temp_dir()));
    assert_eq!(upload.declared_mime_type, "image/jpeg");
    assert_eq!(upload.size, fs::metadata(&input).unwrap().len());

    let names = pipeline::resize(&RustBackend::new(), &upload, &dest, "a", &VersionSet::new()).unwrap();

    assert_eq!(names["source"], "a.jpg");
    assert!(input.exists());
    assert!(!upload.temp_path.exists());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, imgver::storage::DIR_MODE);
    }
}
