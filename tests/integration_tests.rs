use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use image::{Rgb, RgbImage};
use screen_nx::{
    cache::UploadCache,
    errors::{AppError, AppResult},
    hoster::HosterConfig,
    uploader::{FormPart, Transport, TransportResponse, Uploader},
    App, AppPaths,
};
use tempfile::tempdir;

/// Integration tests for the upload cache, hoster registry and thumbnailer.
/// These tests verify that the components work together on one data root.

struct CountingTransport {
    calls: Cell<usize>,
    url: String,
}

impl Transport for CountingTransport {
    fn post_multipart(&self, _url: &str, parts: &[FormPart]) -> AppResult<TransportResponse> {
        self.calls.set(self.calls.get() + 1);
        assert!(
            parts.iter().any(|p| matches!(p, FormPart::File { .. })),
            "every configured hoster streams the file"
        );
        Ok(TransportResponse {
            status: 200,
            body: self.url.clone(),
        })
    }
}

fn write_hoster(sites: &Path, file: &str, name: &str) {
    let text = format!(
        "[hoster]\nname={name}\nurl=https://{name}.example/upload\nmime_count=2\n\
         [0]\nname=file\nis_file_data=true\n\
         [1]\nname=key\ndata=secret\n\
         [theme]\ncolor_background=#000000FF\n"
    );
    fs::write(sites.join(file), text).unwrap();
}

fn backdate(path: &Path, days: u64) {
    let when = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
    set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
}

#[test]
fn test_full_upload_workflow() {
    let temp = tempdir().unwrap();
    let app = App::open(AppPaths::new(temp.path().join("data"))).unwrap();

    let sites = app.paths.sites_dir();
    write_hoster(&sites, "alpha.ini", "alpha");
    write_hoster(&sites, "beta.ini", "beta");
    write_hoster(&sites, "gamma.ini", "gamma");
    fs::write(sites.join("broken.ini"), "[hoster]\nname=broken\nmime_count=1\n").unwrap();

    // 1. Registry lists the three usable hosters, newest-like order.
    let configs = app.registry.get_configs();
    let names: Vec<_> = configs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["gamma", "beta", "alpha"]);

    // 2. Persisted index 5 wraps to configs[2].
    app.registry.set_default_config(5).unwrap();
    let hoster = app.registry.get_default_config().unwrap();
    assert_eq!(hoster, configs[2]);
    assert_eq!(hoster.theme.color_background, "#000000FF");

    // 3. Upload twice; the second is served from the cache.
    let capture = temp.path().join("2024051508300000-capture.jpg");
    fs::write(&capture, b"jpeg").unwrap();
    let uploader = Uploader::new(
        CountingTransport {
            calls: Cell::new(0),
            url: "https://alpha.example/i/abc.jpg".to_string(),
        },
        app.cache.clone(),
    );

    let first = uploader.upload_file(&capture, &hoster).unwrap();
    let second = uploader.upload_file(&capture, &hoster).unwrap();
    assert_eq!(first, "https://alpha.example/i/abc.jpg");
    assert_eq!(first, second);
    assert_eq!(uploader.transport().calls.get(), 1);

    // 4. Once stale, the next call uploads again.
    backdate(&app.cache.record_path(&capture), 2);
    uploader.upload_file(&capture, &hoster).unwrap();
    assert_eq!(uploader.transport().calls.get(), 2);

    println!("✅ Upload workflow passed");
}

#[test]
fn test_builtin_fallback_without_hosters() {
    let temp = tempdir().unwrap();
    let app = App::open(AppPaths::new(temp.path())).unwrap();

    let hoster = app.registry.get_default_config().unwrap();
    assert_eq!(hoster.url, "https://lewd.pics/p/index.php");
    assert_eq!(hoster.mime_parts.len(), 2);
    assert_eq!(hoster, HosterConfig::builtin());
}

#[test]
fn test_thumbnails_and_monthly_sweep() {
    let temp = tempdir().unwrap();
    let app = App::open(AppPaths::new(temp.path().join("data"))).unwrap();

    let capture = temp.path().join("a.jpg");
    RgbImage::from_pixel(32, 32, Rgb([10, 200, 10])).save(&capture).unwrap();

    let thumb = app.thumbnails.get_thumbnail(&capture, 100, 50).unwrap();
    assert_eq!(thumb, app.paths.temp_dir().join("a.jpg100x50.jpg"));
    assert_eq!(app.thumbnails.get_thumbnail(&capture, 100, 50).unwrap(), thumb);

    let other = Path::new("notes.unknownext");
    assert_eq!(app.thumbnails.get_thumbnail(other, 100, 50).unwrap(), other);

    app.cache.store_cached_url(&capture, "https://host/a").unwrap();
    let record = app.cache.record_path(&capture);

    backdate(&thumb, 31);
    backdate(&record, 29);
    assert_eq!(app.cache.clear_cache_monthly(), 1);
    assert!(!thumb.exists());
    assert!(record.exists());

    println!("✅ Thumbnail and sweep integration passed");
}

#[test]
fn test_error_handling_integration() {
    let temp = tempdir().unwrap();

    // Missing files are rejected before any network activity.
    let uploader = Uploader::new(
        CountingTransport {
            calls: Cell::new(0),
            url: "unused".to_string(),
        },
        UploadCache::new(temp.path()),
    );
    let result = uploader.upload_file(temp.path().join("missing.jpg"), &HosterConfig::builtin());
    assert!(matches!(result, Err(AppError::FileNotFound { .. })));
    assert_eq!(uploader.transport().calls.get(), 0);

    // Undecodable images surface as recoverable errors.
    let app = App::open(AppPaths::new(temp.path().join("data"))).unwrap();
    let broken = temp.path().join("broken.jpg");
    fs::write(&broken, b"not an image").unwrap();
    let err = app.thumbnails.get_thumbnail(&broken, 10, 10).unwrap_err();
    assert!(matches!(err, AppError::Image(_)));

    println!("✅ Error handling integration passed");
}
