//! Upload cache, hoster configuration and thumbnailing for captured
//! screenshots and clips.
//!
//! Everything runs synchronously on the caller's thread. The cache directory
//! and settings file are plain files with no locking, so only one process
//! should use a given root at a time.

pub mod cache;
pub mod config;
pub mod errors;
pub mod files;
pub mod hoster;
pub mod ini;
pub mod security;
pub mod thumbnail;
pub mod uploader;

pub use cache::UploadCache;
pub use config::{AppPaths, ClientOptions, SettingsStore};
pub use errors::{AppError, AppResult};
pub use files::{get_directory_files, get_entries, Entry};
pub use hoster::{HosterConfig, HosterRegistry, MimePart, ThemeConfig};
pub use thumbnail::Thumbnailer;
pub use uploader::Uploader;

/// Every component wired to one root directory.
pub struct App {
    pub paths: AppPaths,
    pub registry: HosterRegistry,
    pub cache: UploadCache,
    pub thumbnails: Thumbnailer,
}

impl App {
    /// Create the directory layout under `paths` and wire the components.
    pub fn open(paths: AppPaths) -> AppResult<Self> {
        paths.init()?;
        let registry = HosterRegistry::new(paths.sites_dir(), SettingsStore::new(paths.settings_file()));
        let cache = UploadCache::new(paths.temp_dir());
        let thumbnails = Thumbnailer::new(paths.temp_dir());
        Ok(Self {
            paths,
            registry,
            cache,
            thumbnails,
        })
    }

    pub fn uploader(&self, options: &ClientOptions) -> AppResult<Uploader> {
        Uploader::with_options(self.cache.clone(), options)
    }
}
