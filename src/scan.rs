//! Source discovery for export.
//!
//! The command line accepts any mix of files and directories:
//!
//! ```text
//! phototone export shots/001-pier.jpg shots/Travel/
//! ```
//!
//! - **Files** are taken as given, whatever their extension. A file that
//!   cannot be decoded fails on its own during export.
//! - **Directories** are walked recursively; only files with a supported
//!   image extension are picked up, hidden entries are skipped.
//!
//! Results keep argument order; files found in one directory are sorted by
//! path so a batch is reproducible.

use crate::imaging::supported_input_extensions;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No supported images found")]
    NoSources,
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Expand files and directories into the list of images to export.
pub fn scan_sources(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            sources.extend(scan_dir(input)?);
        } else if input.is_file() {
            sources.push(input.clone());
        } else {
            return Err(ScanError::NotFound(input.clone()));
        }
    }
    if sources.is_empty() {
        return Err(ScanError::NoSources);
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn supported_extension_is_case_insensitive() {
        assert!(is_supported(Path::new("a.JPG")));
        assert!(is_supported(Path::new("a.png")));
        assert!(!is_supported(Path::new("a.txt")));
        assert!(!is_supported(Path::new("noext")));
    }

    #[test]
    fn directory_walk_is_recursive_sorted_and_filtered() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("b.jpg"));
        touch(&root.join("a.png"));
        touch(&root.join("notes.txt"));
        touch(&root.join("nested/c.webp"));
        touch(&root.join(".cache/d.jpg"));

        let found = scan_sources(&[root.to_path_buf()]).unwrap();
        assert_eq!(
            found,
            vec![root.join("a.png"), root.join("b.jpg"), root.join("nested/c.webp")]
        );
    }

    #[test]
    fn explicit_files_are_kept_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let second = tmp.path().join("z.jpg");
        let first = tmp.path().join("raw.dat");
        touch(&second);
        touch(&first);

        let found = scan_sources(&[second.clone(), first.clone()]).unwrap();
        assert_eq!(found, vec![second, first]);
    }

    #[test]
    fn missing_input_errors() {
        let err = scan_sources(&[PathBuf::from("/nonexistent/dir")]).unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }

    #[test]
    fn empty_directory_has_no_sources() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = scan_sources(&[tmp.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ScanError::NoSources));
    }
}
