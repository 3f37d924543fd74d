//! Keyword and whitelist loading from plain text files.

use crate::error::{Result, ScanError};
use serptrack_core::{Keyword, Whitelist};
use std::path::Path;
use tracing::info;

/// Read a UTF-8 file and return its non-empty lines, trimmed, in file order.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ScanError::Input {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}

/// Load the keyword list. Duplicate keywords are kept.
pub fn load_keywords(path: impl AsRef<Path>) -> Result<Vec<Keyword>> {
    let path = path.as_ref();
    let keywords: Vec<Keyword> = read_lines(path)?
        .into_iter()
        .filter_map(|line| Keyword::new(line).ok())
        .collect();

    info!(count = keywords.len(), file = %path.display(), "loaded keywords");
    Ok(keywords)
}

/// Load the whitelist, lowercasing and deduplicating domains.
pub fn load_whitelist(path: impl AsRef<Path>) -> Result<Whitelist> {
    let path = path.as_ref();
    let whitelist: Whitelist = read_lines(path)?.into_iter().collect();

    info!(count = whitelist.len(), file = %path.display(), "loaded whitelist");
    Ok(whitelist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_lines_skips_blank_and_trims() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("keywords.txt");
        fs::write(&path, "  rust \n\n\t\nserde json\r\n   \nasync\n").expect("write file");

        let lines = read_lines(&path).expect("read lines");
        assert_eq!(lines, vec!["rust", "serde json", "async"]);
    }

    #[test]
    fn test_read_lines_missing_file() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("missing.txt");

        let err = read_lines(&path).unwrap_err();
        match err {
            ScanError::Input { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_keywords_keeps_order_and_duplicates() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("keywords.txt");
        fs::write(&path, "b\na\nb\n").expect("write file");

        let keywords = load_keywords(&path).expect("load keywords");
        let names: Vec<&str> = keywords.iter().map(Keyword::as_str).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_load_whitelist_lowercases_and_dedups() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("whitelist.txt");
        fs::write(&path, "Wikipedia.org\nwikipedia.org\n\nEXAMPLE.COM\n").expect("write file");

        let whitelist = load_whitelist(&path).expect("load whitelist");
        assert_eq!(whitelist.len(), 2);
        assert!(whitelist.contains("wikipedia.org"));
        assert!(whitelist.contains("example.com"));
    }
}
