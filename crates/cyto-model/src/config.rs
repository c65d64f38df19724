use std::path::PathBuf;

/// Immutable settings for one processing run.
///
/// Built once by the CLI layer and passed by reference into the
/// aggregators and the pipeline; nothing mutates it after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Directory scanned for instrument exports.
    pub input_dir: PathBuf,
    /// Directory transformed tables are written into.
    pub output_dir: PathBuf,
    /// Rename inputs to `DONE_<name>` after successful processing.
    pub rename_processed: bool,
    /// Aggregate and report, but write and rename nothing.
    pub dry_run: bool,
    /// Decimal places for formatted means (microvesicles outputs).
    pub decimal_precision: usize,
    /// DataSet substrings excluded from alignment (Kaluza inputs).
    pub dataset_filter: Vec<String>,
    /// Separator between the DataSet tokens (Kaluza merge stage).
    pub dataset_separator: char,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            rename_processed: false,
            dry_run: false,
            decimal_precision: 3,
            dataset_filter: Vec::new(),
            dataset_separator: '|',
        }
    }
}
