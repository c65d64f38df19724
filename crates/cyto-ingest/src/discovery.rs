//! Export discovery and processed-file lifecycle.
//!
//! Processed exports are marked by renaming them with the `DONE_` prefix;
//! discovery skips them so reruns over the same directory pick up only new
//! files.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IngestError, Result};

/// Prefix marking an export as already processed.
pub const PROCESSED_PREFIX: &str = "DONE_";

/// Lists the CSV exports in a directory that have not been processed yet.
///
/// Returns files sorted by filename.
pub fn list_unprocessed_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        // Skip directories
        if !path.is_file() {
            continue;
        }

        // Check for .csv extension (case-insensitive)
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv && !is_processed(&path) {
            files.push(path);
        }
    }

    // Sort by filename
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(dir = %dir.display(), count = files.len(), "discovered unprocessed exports");

    Ok(files)
}

/// Checks whether a file already carries the processed marker.
pub fn is_processed(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(PROCESSED_PREFIX))
        .unwrap_or(false)
}

/// Marks an export as processed by renaming it to `DONE_<name>` in place.
///
/// Returns the new path.
pub fn mark_processed(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let target = path.with_file_name(format!("{PROCESSED_PREFIX}{name}"));

    std::fs::rename(path, &target).map_err(|e| IngestError::Rename {
        path: path.to_path_buf(),
        target: target.clone(),
        source: e,
    })?;

    debug!(from = %path.display(), to = %target.display(), "marked export as processed");

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        for name in &[
            "export_b.csv",
            "export_a.csv",
            "export_c.CSV",
            "DONE_export_old.csv",
            "notes.txt",
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, "DataSet;Gate\n").unwrap();
        }

        dir
    }

    #[test]
    fn test_list_unprocessed_files() {
        let dir = create_test_dir();
        let files = list_unprocessed_files(dir.path()).unwrap();

        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();

        // Sorted, uppercase extension included, DONE_ and non-CSV excluded
        assert_eq!(names, ["export_a.csv", "export_b.csv", "export_c.CSV"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not_there");

        let err = list_unprocessed_files(&missing).unwrap_err();
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_mark_processed() {
        let dir = create_test_dir();
        let path = dir.path().join("export_a.csv");

        let renamed = mark_processed(&path).unwrap();

        assert_eq!(
            renamed.file_name().unwrap().to_str().unwrap(),
            "DONE_export_a.csv"
        );
        assert!(!path.exists());
        assert!(renamed.exists());

        // A second discovery pass no longer sees the file
        let files = list_unprocessed_files(dir.path()).unwrap();
        assert!(files.iter().all(|p| p != &path));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_mark_processed_missing_file() {
        let dir = create_test_dir();
        let path = dir.path().join("never_existed.csv");

        let err = mark_processed(&path).unwrap_err();
        assert!(matches!(err, IngestError::Rename { .. }));
    }

    #[test]
    fn test_is_processed() {
        assert!(is_processed(Path::new("/data/DONE_export.csv")));
        assert!(!is_processed(Path::new("/data/export.csv")));
        assert!(!is_processed(Path::new("/data/done_export.csv")));
    }
}
