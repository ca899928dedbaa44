//! Small filesystem helpers used for reporting on stored files.

use std::{fs, io, path::Path};

/// Whether a regular file exists at `path`.
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// Size of the file in bytes.
pub fn file_size(path: impl AsRef<Path>) -> io::Result<u64> {
    Ok(fs::metadata(path)?.len())
}

/// Size of the file formatted for humans, e.g. `12,345 Bytes`.
pub fn human_file_size(path: impl AsRef<Path>) -> io::Result<String> {
    Ok(format!("{} Bytes", group_thousands(file_size(path)?)))
}

/// File name without directory or extension.
pub fn file_stem(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_digits_by_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn reports_size_of_written_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.bin");
        assert!(!file_exists(&path));

        fs::write(&path, vec![0u8; 1_234]).expect("write");
        assert!(file_exists(&path));
        assert_eq!(file_size(&path).expect("size"), 1_234);
        assert_eq!(human_file_size(&path).expect("size"), "1,234 Bytes");
    }

    #[test]
    fn stem_strips_directory_and_extension() {
        assert_eq!(file_stem("/saves/settings.xml").as_deref(), Some("settings"));
        assert_eq!(file_stem("data").as_deref(), Some("data"));
    }
}
