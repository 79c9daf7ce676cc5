use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unable to parse {path}: {reason}")]
    ConfigParse { path: String, reason: String },

    #[error("Invalid hoster config {path}: {reason}")]
    InvalidHosterConfig { path: String, reason: String },

    #[error("Failed to write cache record {path}: {source}")]
    CacheWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Thumbnail generation failed for {path}: {reason}")]
    ThumbnailFailed { path: String, reason: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("No usable hoster configuration available")]
    NoUsableConfig,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Custom result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::FileNotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    pub fn invalid_hoster(path: impl AsRef<Path>, reason: &str) -> Self {
        Self::InvalidHosterConfig {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn cache_write(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::CacheWrite {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn thumbnail_failed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::ThumbnailFailed {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }
}
