//! CSV writer for transformed tables.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use thiserror::Error;

use cyto_model::{CSV_DELIMITER, Table};

/// Errors that can occur during write operations.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create the output directory.
    #[error("failed to create output directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the output file.
    #[error("failed to create file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("failed to write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed to flush buffered output.
    #[error("failed to flush {path}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Writes a table into `dir` under the table's own name.
///
/// The directory is created if needed and an existing file is
/// overwritten. Cells are `;`-delimited; records missing a header column
/// write that cell as empty. Returns the path written.
pub fn write_table(dir: &Path, table: &Table) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| WriteError::CreateDirectory {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let path = dir.join(&table.name);
    let file = File::create(&path).map_err(|e| WriteError::CreateFile {
        path: path.clone(),
        source: e,
    })?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .from_writer(BufWriter::new(file));

    writer
        .write_record(&table.columns)
        .map_err(|e| WriteError::Csv {
            path: path.clone(),
            source: e,
        })?;

    for record in &table.records {
        let row: Vec<&str> = table
            .columns
            .iter()
            .map(|column| record.get(column).unwrap_or(""))
            .collect();
        writer.write_record(&row).map_err(|e| WriteError::Csv {
            path: path.clone(),
            source: e,
        })?;
    }

    writer.flush().map_err(|e| WriteError::Flush {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyto_model::Record;
    use tempfile::tempdir;

    fn sample_table() -> Table {
        let mut table = Table::new("aligned_export.csv");
        let mut first = Record::new();
        first.set("DataSet", "A|B|1");
        first.set("Gate", "45,2");
        let mut second = Record::new();
        second.set("DataSet", "C|D|2");
        table.push(first);
        table.push(second);
        table
    }

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let table = sample_table();

        let path = write_table(dir.path(), &table).unwrap();

        assert_eq!(path, dir.path().join("aligned_export.csv"));
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "DataSet;Gate");
        assert_eq!(lines[1], "A|B|1;45,2");
        assert_eq!(lines[2], "C|D|2;");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_creates_output_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("output").join("run1");

        let path = write_table(&nested, &sample_table()).unwrap();

        assert!(path.exists());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aligned_export.csv");
        fs::write(&path, "stale content").unwrap();

        write_table(dir.path(), &sample_table()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("DataSet;Gate"));
    }

    #[test]
    fn test_directory_creation_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "file in the way").unwrap();

        let result = write_table(&blocker, &sample_table());

        match result {
            Err(WriteError::CreateDirectory { .. }) => {}
            other => panic!("expected CreateDirectory error, got {other:?}"),
        }
    }
}
