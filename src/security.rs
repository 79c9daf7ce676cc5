use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::errors::{AppError, AppResult};

fn hex_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("hex colour pattern compiles")
    })
}

pub struct InputValidator;

impl InputValidator {
    /// A file about to be uploaded must exist and be a regular file.
    pub fn validate_upload_file(path: &Path) -> AppResult<()> {
        if path.as_os_str().is_empty() {
            return Err(AppError::validation("file_path", "File path cannot be empty"));
        }

        if !path.exists() {
            return Err(AppError::file_not_found(path));
        }

        if !path.is_file() {
            return Err(AppError::validation("file_path", "Path is not a file"));
        }

        Ok(())
    }

    /// `#RRGGBB` or `#RRGGBBAA`.
    pub fn is_valid_hex_color(color: &str) -> bool {
        hex_color_pattern().is_match(color.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_hex_colors() {
        assert!(InputValidator::is_valid_hex_color("#FFFFFFFF"));
        assert!(InputValidator::is_valid_hex_color("#6c0000ff"));
        assert!(InputValidator::is_valid_hex_color("#170909"));
        assert!(!InputValidator::is_valid_hex_color("FFFFFFFF"));
        assert!(!InputValidator::is_valid_hex_color("#FFF"));
        assert!(!InputValidator::is_valid_hex_color("#GGGGGGGG"));
        assert!(!InputValidator::is_valid_hex_color(""));
    }

    #[test]
    fn test_validate_upload_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("a.jpg");
        std::fs::write(&file, b"data").unwrap();

        assert!(InputValidator::validate_upload_file(&file).is_ok());
        assert!(matches!(
            InputValidator::validate_upload_file(&temp.path().join("missing.jpg")),
            Err(AppError::FileNotFound { .. })
        ));
        assert!(matches!(
            InputValidator::validate_upload_file(temp.path()),
            Err(AppError::Validation { .. })
        ));
        assert!(InputValidator::validate_upload_file(Path::new("")).is_err());
    }
}
