use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions listed as media entries.
pub const MEDIA_EXTENSIONS: &[&str] = &["jpg", "mp4"];

/// Recursively collect regular files under `dir` whose extension is in
/// `extensions` (empty slice accepts everything), sorted by full path in
/// descending order.
///
/// Capture files are named by timestamp, so reverse path order lists the
/// newest first. A missing or unreadable directory yields an empty list.
pub fn get_directory_files(dir: impl AsRef<Path>, extensions: &[&str]) -> Vec<PathBuf> {
    let dir = dir.as_ref();
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| extensions.is_empty() || has_extension(path, extensions))
        .collect();

    files.sort_unstable_by(|a, b| b.cmp(a));
    files
}

/// Case-sensitive comparison, without the leading dot.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}

/// A listed capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub path: PathBuf,
    pub title: String,
}

/// Turn the leading `YYYYMMDDHHMM` of a capture file name into
/// `YYYY.MM.DD HH:MM`.
///
/// This is a fixed-offset splice of the first twelve characters, not a date
/// parse: separators go in at offsets 10, 8, 6 and 4, in that order, whatever
/// the characters are. Offsets past the end of a short name are skipped.
pub fn entry_title(file_name: &str) -> String {
    let mut title: Vec<char> = file_name.chars().take(12).collect();
    for (offset, separator) in [(10, ':'), (8, ' '), (6, '.'), (4, '.')] {
        if offset <= title.len() {
            title.insert(offset, separator);
        }
    }
    title.into_iter().collect()
}

/// List every capture under `album_dir`, newest first.
pub fn get_entries(album_dir: impl AsRef<Path>) -> Vec<Entry> {
    get_directory_files(album_dir, MEDIA_EXTENSIONS)
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            log::debug!("Added {}", name);
            Entry {
                title: entry_title(&name),
                path,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = tempdir().unwrap();
        assert!(get_directory_files(temp.path().join("nope"), &[]).is_empty());
    }

    #[test]
    fn test_empty_directory_is_empty() {
        let temp = tempdir().unwrap();
        assert!(get_directory_files(temp.path(), &["jpg"]).is_empty());
    }

    #[test]
    fn test_recursive_filter_and_reverse_order() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("2023/01/2023010112000000-AAA.jpg"));
        touch(&root.join("2024/05/2024051508300000-AAA.jpg"));
        touch(&root.join("2024/05/2024051509000000-AAA.mp4"));
        touch(&root.join("2024/05/notes.txt"));

        let files = get_directory_files(root, &["jpg", "mp4"]);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "2024051509000000-AAA.mp4",
                "2024051508300000-AAA.jpg",
                "2023010112000000-AAA.jpg",
            ]
        );
    }

    #[test]
    fn test_empty_extension_set_accepts_all() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("a.txt"));
        touch(&temp.path().join("b"));
        assert_eq!(get_directory_files(temp.path(), &[]).len(), 2);
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        assert!(has_extension(Path::new("a.jpg"), &["jpg"]));
        assert!(!has_extension(Path::new("a.JPG"), &["jpg"]));
        assert!(!has_extension(Path::new("jpg"), &["jpg"]));
    }

    #[test]
    fn test_entry_title_splices_fixed_offsets() {
        assert_eq!(
            entry_title("2024051508300000-0123456789ABCDEF.jpg"),
            "2024.05.15 08:30"
        );
    }

    #[test]
    fn test_entry_title_tolerates_odd_names() {
        // No validation: non-digits are spliced as-is.
        assert_eq!(entry_title("screenshot_final.jpg"), "scre.en.sh ot:_f");
        // Short names must not panic.
        let short = entry_title("abc");
        assert!(short.starts_with("abc"));
        assert_eq!(entry_title(""), "");
    }

    #[test]
    fn test_get_entries_lists_media_only() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("202405150830-a.jpg"));
        touch(&temp.path().join("202405150900-b.mp4"));
        touch(&temp.path().join("202405150901-c.png"));

        let entries = get_entries(temp.path());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "2024.05.15 09:00");
        assert_eq!(entries[1].title, "2024.05.15 08:30");
    }
}
