//! Hoster definitions and the registry that loads them.
//!
//! Each `.ini` file in the sites directory describes one upload target:
//!
//! ```ini
//! [hoster]
//! name=lewd.pics
//! url=https://lewd.pics/p/index.php
//! mime_count=2
//!
//! [0]
//! name=fileToUpload
//! is_file_data=true
//!
//! [1]
//! name=curl
//! data=1
//!
//! [theme]
//! color_background=#6C0000FF
//! ```
//!
//! Files that fail to parse, or that have no URL or no mime parts, are left
//! out of the listing with a warning.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{SettingsStore, SETTINGS_FILE_NAME};
use crate::errors::{AppError, AppResult};
use crate::files::get_directory_files;
use crate::ini::IniReader;
use crate::security::InputValidator;

pub const DEFAULT_COLOR_TEXT: &str = "#FFFFFFFF";
pub const DEFAULT_COLOR_BACKGROUND: &str = "#6C0000FF";
pub const DEFAULT_COLOR_FOCUS: &str = "#480001FF";
pub const DEFAULT_COLOR_TOPBAR: &str = "#170909FF";

/// One field of the multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MimePart {
    pub name: String,
    /// Literal value; ignored when `is_file_data` is set.
    pub data: String,
    /// Stream the uploaded file's bytes into this field.
    pub is_file_data: bool,
}

impl MimePart {
    pub fn file(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data: String::new(),
            is_file_data: true,
        }
    }

    pub fn text(name: &str, data: &str) -> Self {
        Self {
            name: name.to_string(),
            data: data.to_string(),
            is_file_data: false,
        }
    }
}

/// Presentation settings shown while a hoster is selected. Colours are kept
/// exactly as written in the file; use [`ThemeConfig::sanitized`] before
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeConfig {
    pub color_text: String,
    pub color_background: String,
    pub color_focus: String,
    pub color_topbar: String,
    pub background_path: String,
    pub image_path: String,
    pub image_x: i64,
    pub image_y: i64,
    pub image_w: i64,
    pub image_h: i64,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_text: DEFAULT_COLOR_TEXT.to_string(),
            color_background: DEFAULT_COLOR_BACKGROUND.to_string(),
            color_focus: DEFAULT_COLOR_FOCUS.to_string(),
            color_topbar: DEFAULT_COLOR_TOPBAR.to_string(),
            background_path: String::new(),
            image_path: String::new(),
            image_x: 0,
            image_y: 0,
            image_w: 0,
            image_h: 0,
        }
    }
}

impl ThemeConfig {
    /// Copy with every malformed colour replaced by its default.
    pub fn sanitized(&self) -> Self {
        fn pick(color: &str, default: &str) -> String {
            if InputValidator::is_valid_hex_color(color) {
                color.trim().to_string()
            } else {
                log::debug!("Replacing malformed theme colour {:?} with {}", color, default);
                default.to_string()
            }
        }

        Self {
            color_text: pick(&self.color_text, DEFAULT_COLOR_TEXT),
            color_background: pick(&self.color_background, DEFAULT_COLOR_BACKGROUND),
            color_focus: pick(&self.color_focus, DEFAULT_COLOR_FOCUS),
            color_topbar: pick(&self.color_topbar, DEFAULT_COLOR_TOPBAR),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HosterConfig {
    pub name: String,
    pub url: String,
    /// Order is the order of fields in the request body.
    pub mime_parts: Vec<MimePart>,
    pub theme: ThemeConfig,
}

impl HosterConfig {
    /// Used when no usable hoster file exists.
    pub fn builtin() -> Self {
        Self {
            name: "lewd.pics".to_string(),
            url: "https://lewd.pics/p/index.php".to_string(),
            mime_parts: vec![MimePart::file("fileToUpload"), MimePart::text("curl", "1")],
            theme: ThemeConfig {
                background_path: "romfs:/bg.jpg".to_string(),
                image_path: "romfs:/owo.png".to_string(),
                image_x: 975,
                image_y: 240,
                image_w: 292,
                image_h: 480,
                ..ThemeConfig::default()
            },
        }
    }

    /// A config needs somewhere to post and something to post.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.url.is_empty() {
            return Err("empty url");
        }
        if self.mime_parts.is_empty() {
            return Err("no mime parts");
        }
        Ok(())
    }

    fn from_reader(reader: &IniReader) -> Self {
        let mime_count = reader.get_integer("hoster", "mime_count", 0).max(0);
        let mime_parts = (0..mime_count)
            .map(|i| {
                let section = i.to_string();
                MimePart {
                    name: reader.get_string(&section, "name", ""),
                    data: reader.get_string(&section, "data", ""),
                    is_file_data: reader.get_boolean(&section, "is_file_data", false),
                }
            })
            .collect();

        let theme = ThemeConfig {
            color_text: reader.get_string("theme", "color_text", DEFAULT_COLOR_TEXT),
            color_background: reader.get_string("theme", "color_background", DEFAULT_COLOR_BACKGROUND),
            color_focus: reader.get_string("theme", "color_focus", DEFAULT_COLOR_FOCUS),
            color_topbar: reader.get_string("theme", "color_topbar", DEFAULT_COLOR_TOPBAR),
            background_path: reader.get_string("theme", "background_path", ""),
            image_path: reader.get_string("theme", "image_path", ""),
            image_x: reader.get_integer("theme", "image_x", 0),
            image_y: reader.get_integer("theme", "image_y", 0),
            image_w: reader.get_integer("theme", "image_w", 0),
            image_h: reader.get_integer("theme", "image_h", 0),
        };

        Self {
            name: reader.get_string("hoster", "name", ""),
            url: reader.get_string("hoster", "url", ""),
            mime_parts,
            theme,
        }
    }
}

/// Parse and validate a single hoster file.
pub fn parse_hoster(path: impl AsRef<Path>) -> AppResult<HosterConfig> {
    let path = path.as_ref();
    let reader = IniReader::open(path);
    if let Some(e) = reader.parse_error() {
        return Err(AppError::ConfigParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        });
    }

    let config = HosterConfig::from_reader(&reader);
    config
        .validate()
        .map_err(|reason| AppError::invalid_hoster(path, reason))?;

    log::debug!("Parsed hoster file {}: {}", path.display(), config.name);
    Ok(config)
}

/// Loads hoster files and tracks which one is the default.
#[derive(Debug, Clone)]
pub struct HosterRegistry {
    sites_dir: PathBuf,
    settings: SettingsStore,
}

impl HosterRegistry {
    pub fn new(sites_dir: impl Into<PathBuf>, settings: SettingsStore) -> Self {
        Self {
            sites_dir: sites_dir.into(),
            settings,
        }
    }

    pub fn sites_dir(&self) -> &Path {
        &self.sites_dir
    }

    /// Every usable hoster, in reverse file name order. Broken files are
    /// skipped, never fatal.
    pub fn get_configs(&self) -> Vec<HosterConfig> {
        get_directory_files(&self.sites_dir, &["ini"])
            .into_iter()
            .filter(|file| file.file_name().is_some_and(|n| n != SETTINGS_FILE_NAME))
            .filter_map(|file| match parse_hoster(&file) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("Skipping hoster file: {}", e);
                    None
                }
            })
            .collect()
    }

    /// The hoster at the persisted index, wrapped modulo the number of usable
    /// hosters, so a stale index from a longer list still selects something.
    /// Falls back to [`HosterConfig::builtin`] when there are no usable
    /// hosters or the selected one has no name.
    pub fn get_default_config(&self) -> AppResult<HosterConfig> {
        let configs = self.get_configs();
        let index = self.settings.load();

        if !configs.is_empty() {
            let selected = index.rem_euclid(configs.len() as i64) as usize;
            if !configs[selected].name.is_empty() {
                return Ok(configs[selected].clone());
            }
            log::warn!("Hoster at index {} has no name, using built-in hoster", selected);
        }

        let fallback = HosterConfig::builtin();
        fallback.validate().map_err(|_| AppError::NoUsableConfig)?;
        Ok(fallback)
    }

    pub fn set_default_config(&self, index: i64) -> AppResult<()> {
        self.settings.save(index)
    }
}
