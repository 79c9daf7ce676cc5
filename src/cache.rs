//! Upload URL cache.
//!
//! One small text file per uploaded source, named `<basename>.txt`, holding
//! the URL the hoster returned. The filesystem is the whole store: a record's
//! mtime is its timestamp.
//!
//! Two windows apply. A record younger than [`FRESHNESS_WINDOW`] is reused
//! instead of uploading again. Anything in the temp directory older than
//! [`SWEEP_WINDOW`] (records and thumbnails alike) is deleted by
//! [`UploadCache::clear_cache_monthly`].

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::errors::{AppError, AppResult};
use crate::files::get_directory_files;

pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);
pub const SWEEP_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Artifacts eligible for the monthly sweep.
const SWEEP_EXTENSIONS: &[&str] = &["txt", "jpg"];

#[derive(Debug, Clone)]
pub struct UploadCache {
    dir: PathBuf,
}

impl UploadCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record location for a source file; only its base name matters.
    pub fn record_path(&self, source: impl AsRef<Path>) -> PathBuf {
        let name = source
            .as_ref()
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();
        self.dir.join(format!("{}.txt", name))
    }

    /// Strict lookup: `Ok(None)` for a missing, stale or empty record, `Err`
    /// when the record exists but cannot be read.
    pub fn lookup(&self, source: impl AsRef<Path>) -> AppResult<Option<String>> {
        let record = self.record_path(source);
        let metadata = match fs::metadata(&record) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if age(metadata.modified()?) >= FRESHNESS_WINDOW {
            log::debug!("Cache record {} is stale", record.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&record)?;
        let url = url_from_record(&content);
        if url.is_empty() {
            return Ok(None);
        }
        Ok(Some(url.to_string()))
    }

    /// Cached URL for `source` if a fresh one exists. Read failures are
    /// logged and reported as a miss.
    pub fn check_upload_cache(&self, source: impl AsRef<Path>) -> Option<String> {
        let source = source.as_ref();
        match self.lookup(source) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Ignoring unreadable cache record for {}: {}", source.display(), e);
                None
            }
        }
    }

    /// Create or overwrite the record for `source` and sync it to disk.
    pub fn store_cached_url(&self, source: impl AsRef<Path>, url: &str) -> AppResult<()> {
        let record = self.record_path(source);

        let write = || -> std::io::Result<()> {
            fs::create_dir_all(&self.dir)?;
            let mut file = File::create(&record)?;
            file.write_all(url.as_bytes())?;
            file.flush()?;
            file.sync_all()
        };

        write().map_err(|e| AppError::cache_write(&record, e))?;
        log::debug!("Stored cache record {}", record.display());
        Ok(())
    }

    /// Delete cache records and thumbnails older than [`SWEEP_WINDOW`].
    /// Returns how many files were removed.
    pub fn clear_cache_monthly(&self) -> usize {
        let mut removed = 0;

        for file in get_directory_files(&self.dir, SWEEP_EXTENSIONS) {
            let modified = match fs::metadata(&file).and_then(|m| m.modified()) {
                Ok(modified) => modified,
                // Already gone, e.g. swept by another caller.
                Err(_) => continue,
            };

            if age(modified) > SWEEP_WINDOW {
                match fs::remove_file(&file) {
                    Ok(()) => {
                        log::debug!("Removed old cache file: {}", file.display());
                        removed += 1;
                    }
                    Err(e) => log::warn!("Failed to remove old file {}: {}", file.display(), e),
                }
            }
        }

        if removed > 0 {
            log::info!("Monthly sweep removed {} file(s) from {}", removed, self.dir.display());
        }
        removed
    }
}

/// The URL a record or response body stands for: its first non-blank line,
/// without surrounding whitespace. Empty when there is none.
pub fn url_from_record(content: &str) -> &str {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}

/// Time since `modified`; timestamps in the future count as brand new.
fn age(modified: SystemTime) -> Duration {
    SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO)
}
