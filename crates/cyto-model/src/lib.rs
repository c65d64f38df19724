pub mod config;
pub mod record;
pub mod row;

/// Field delimiter of the instrument CSV dialect, shared by inputs and
/// transformed outputs.
pub const CSV_DELIMITER: u8 = b';';

pub use config::RunConfig;
pub use record::{Record, Table};
pub use row::{GATE_ALL, KaluzaRow, VesicleRow};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_export_conventions() {
        let config = RunConfig::default();
        assert_eq!(config.decimal_precision, 3);
        assert_eq!(config.dataset_separator, '|');
        assert!(!config.rename_processed);
        assert!(!config.dry_run);
        assert!(config.dataset_filter.is_empty());
    }
}
