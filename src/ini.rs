//! Minimal INI-style key/value reader.
//!
//! Hoster definitions and the process settings file are plain `[section]` /
//! `key=value` text. The reader never fails outright: typed getters fall back
//! to the supplied default on a missing or malformed value, and the first
//! syntax problem is recorded in [`IniReader::parse_error`] so callers can
//! decide whether to trust the file at all.
//!
//! Section and key lookups are case-insensitive. A later duplicate key wins.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniError {
    /// The file could not be opened or was not valid UTF-8.
    Unreadable(String),
    /// 1-based line number of the first line that could not be parsed.
    Syntax(usize),
}

impl fmt::Display for IniError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IniError::Unreadable(reason) => write!(f, "unreadable: {}", reason),
            IniError::Syntax(line) => write!(f, "syntax error on line {}", line),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct IniReader {
    values: HashMap<(String, String), String>,
    error: Option<IniError>,
}

impl IniReader {
    pub fn open(path: impl AsRef<Path>) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(text) => Self::parse(&text),
            Err(e) => Self {
                values: HashMap::new(),
                error: Some(IniError::Unreadable(e.to_string())),
            },
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut reader = Self::default();
        let mut section = String::new();
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                match rest.find(']') {
                    Some(end) => section = rest[..end].trim().to_lowercase(),
                    None => reader.record_error(index + 1),
                }
                continue;
            }

            match line.find(['=', ':']) {
                Some(split) => {
                    let key = line[..split].trim().to_lowercase();
                    let value = strip_inline_comment(line[split + 1..].trim());
                    reader
                        .values
                        .insert((section.clone(), key), value.to_string());
                }
                None => reader.record_error(index + 1),
            }
        }

        reader
    }

    fn record_error(&mut self, line: usize) {
        if self.error.is_none() {
            self.error = Some(IniError::Syntax(line));
        }
    }

    pub fn parse_error(&self) -> Option<&IniError> {
        self.error.as_ref()
    }

    fn raw(&self, section: &str, key: &str) -> Option<&str> {
        self.values
            .get(&(section.to_lowercase(), key.to_lowercase()))
            .map(String::as_str)
    }

    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.raw(section, key).unwrap_or(default).to_string()
    }

    /// Parses a leading decimal or `0x` hexadecimal integer; trailing
    /// garbage after the digits is ignored.
    pub fn get_integer(&self, section: &str, key: &str, default: i64) -> i64 {
        self.raw(section, key)
            .and_then(parse_integer_prefix)
            .unwrap_or(default)
    }

    pub fn get_boolean(&self, section: &str, key: &str, default: bool) -> bool {
        match self.raw(section, key).map(str::to_lowercase).as_deref() {
            Some("true" | "yes" | "on" | "1") => true,
            Some("false" | "no" | "off" | "0") => false,
            _ => default,
        }
    }
}

/// A `;` preceded by whitespace starts a trailing comment.
fn strip_inline_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i] == b';' && bytes[i - 1].is_ascii_whitespace() {
            return value[..i].trim_end();
        }
    }
    value
}

fn parse_integer_prefix(value: &str) -> Option<i64> {
    let value = value.trim();
    let (negative, unsigned) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let (radix, digits) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, unsigned),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
; hoster definition
[hoster]
name = Example Host
url=https://example.com/upload.php
mime_count=2

[0]
name=file
is_file_data=yes

[theme]
color_text=#112233FF
image_x = 12px ; trailing comment
";

    #[test]
    fn test_parse_typed_getters() {
        let reader = IniReader::parse(SAMPLE);
        assert!(reader.parse_error().is_none());
        assert_eq!(reader.get_string("hoster", "name", ""), "Example Host");
        assert_eq!(
            reader.get_string("hoster", "url", ""),
            "https://example.com/upload.php"
        );
        assert_eq!(reader.get_integer("hoster", "mime_count", 0), 2);
        assert!(reader.get_boolean("0", "is_file_data", false));
        assert_eq!(reader.get_string("theme", "color_text", ""), "#112233FF");
        assert_eq!(reader.get_integer("theme", "image_x", 0), 12);
    }

    #[test]
    fn test_missing_and_malformed_values_use_defaults() {
        let reader = IniReader::parse("[a]\nnum=abc\nflag=maybe\n");
        assert_eq!(reader.get_integer("a", "num", 7), 7);
        assert!(reader.get_boolean("a", "flag", true));
        assert_eq!(reader.get_string("a", "missing", "fallback"), "fallback");
        assert_eq!(reader.get_integer("nope", "num", -1), -1);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let reader = IniReader::parse("[Screen-NX]\nConfig_Index=4\n");
        assert_eq!(reader.get_integer("screen-nx", "config_index", 0), 4);
        assert_eq!(reader.get_integer("SCREEN-NX", "CONFIG_INDEX", 0), 4);
    }

    #[test]
    fn test_syntax_error_reports_first_line() {
        let reader = IniReader::parse("[ok]\nkey=value\nthis line is junk\n[broken\n");
        assert_eq!(reader.parse_error(), Some(&IniError::Syntax(3)));
        // Valid lines are still readable.
        assert_eq!(reader.get_string("ok", "key", ""), "value");
    }

    #[test]
    fn test_unreadable_file_flags_error() {
        let reader = IniReader::open("/definitely/not/here.ini");
        assert!(matches!(reader.parse_error(), Some(IniError::Unreadable(_))));
    }

    #[test]
    fn test_integer_prefix_forms() {
        assert_eq!(parse_integer_prefix("0x10"), Some(16));
        assert_eq!(parse_integer_prefix("-5"), Some(-5));
        assert_eq!(parse_integer_prefix("42abc"), Some(42));
        assert_eq!(parse_integer_prefix(""), None);
        assert_eq!(parse_integer_prefix("-"), None);
    }
}
