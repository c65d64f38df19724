//! Result types describing a completed run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use cyto_model::RunConfig;

/// Which instrument pipeline a run executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Kaluza,
    Vesicles,
}

/// Outcome of processing a single export file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    /// Export file name as found in the input directory.
    pub file: String,
    /// Data rows read from the export.
    pub rows: usize,
    /// Aggregated records produced from those rows.
    pub records: usize,
    /// Tables written for this export.
    pub outputs: Vec<PathBuf>,
    /// Whether the export was renamed with the processed prefix.
    pub renamed: bool,
}

/// Aggregated outcome of a full run over one input directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub kind: RunKind,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub files: Vec<FileSummary>,
    /// Path of the cross-file subject union, when one was written.
    pub union_output: Option<PathBuf>,
    /// Non-fatal problems encountered during the run.
    pub errors: Vec<String>,
}

impl RunResult {
    pub fn new(kind: RunKind, config: &RunConfig) -> Self {
        Self {
            kind,
            input_dir: config.input_dir.clone(),
            output_dir: config.output_dir.clone(),
            dry_run: config.dry_run,
            files: Vec::new(),
            union_output: None,
            errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|file| file.rows).sum()
    }

    pub fn total_records(&self) -> usize {
        self.files.iter().map(|file| file.records).sum()
    }
}
