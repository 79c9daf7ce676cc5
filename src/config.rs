use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::ini::IniReader;

/// Section used by the process settings file.
pub const SETTINGS_SECTION: &str = "screen-nx";
/// Key holding the persisted default hoster index.
pub const CONFIG_INDEX_KEY: &str = "config_index";
/// Reserved filename; never treated as a hoster definition.
pub const SETTINGS_FILE_NAME: &str = "config.ini";

const APP_DIR_NAME: &str = "screen-nx";
const SITES_DIR_NAME: &str = "sites";
const TEMP_DIR_NAME: &str = ".temp";

/// On-disk layout of everything the tool reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<data dir>/screen-nx`, or a directory under the system temp dir when
    /// the platform has no data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one `.ini` file per hoster.
    pub fn sites_dir(&self) -> PathBuf {
        self.root.join(SITES_DIR_NAME)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE_NAME)
    }

    /// Cache records and generated thumbnails live here.
    pub fn temp_dir(&self) -> PathBuf {
        self.root.join(TEMP_DIR_NAME)
    }

    /// Create the root, sites and temp directories if they are missing.
    pub fn init(&self) -> AppResult<()> {
        for dir in [self.root.clone(), self.sites_dir(), self.temp_dir()] {
            if !dir.exists() {
                fs::create_dir_all(&dir)?;
                log::info!("Created directory: {}", dir.display());
            }
        }
        Ok(())
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

/// Persisted process settings. Only the default hoster index lives here.
///
/// The file is single-process state: concurrent writers are not coordinated,
/// the last `save` wins.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted index. A missing or unparsable file yields 0 and
    /// an unparsable one is removed so the next `save` starts clean.
    pub fn load(&self) -> i64 {
        if !self.path.exists() {
            return 0;
        }

        log::debug!("Parsing settings from {}", self.path.display());
        let reader = IniReader::open(&self.path);

        match reader.parse_error() {
            None => reader.get_integer(SETTINGS_SECTION, CONFIG_INDEX_KEY, 0),
            Some(e) => {
                log::warn!("Failed to parse settings {}: {}", self.path.display(), e);
                if let Err(e) = fs::remove_file(&self.path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        log::warn!("Failed to remove settings {}: {}", self.path.display(), e);
                    }
                }
                0
            }
        }
    }

    /// Replace the settings file with one recording `index`.
    ///
    /// The new content is written to a sibling temp file, synced, and renamed
    /// over the old file so a power loss leaves either the old or the new
    /// settings, never a truncated file.
    pub fn save(&self, index: i64) -> AppResult<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| AppError::Config(format!("{} has no parent", self.path.display())))?;
        fs::create_dir_all(dir)?;

        let temp_path = dir.join(format!(".{}.{}.tmp", SETTINGS_FILE_NAME, uuid::Uuid::new_v4()));
        let data = format!("[{}]\n{}={}\n", SETTINGS_SECTION, CONFIG_INDEX_KEY, index);

        let written = (|| -> std::io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(data.as_bytes())?;
            file.flush()?;
            file.sync_all()
        })();

        if let Err(e) = written.and_then(|_| fs::rename(&temp_path, &self.path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        log::info!("Default hoster index set to {}", index);
        Ok(())
    }
}

/// Transport settings for uploads.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Skip TLS certificate verification. Off by default; turning it on
    /// reproduces the historical behaviour of accepting any certificate,
    /// including self-signed ones, with no server identity guarantee.
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            timeout: Duration::from_secs(120),
        }
    }
}
