//! Kaluza export alignment and the cross-stimulation merge.
//!
//! The instrument writes one row per gate; alignment collapses them into
//! one wide entry per DataSet. The merge stage then folds entries that
//! share antibody and subject across stimulations into a single record
//! with stimulation-prefixed columns.

use std::collections::HashMap;

use tracing::warn;

use cyto_model::{GATE_ALL, KaluzaRow, Record, RunConfig, Table};

/// Header of the aligned per-sample table.
pub const ALIGNED_COLUMNS: [&str; 10] = [
    "DataSet",
    "Gate",
    "%Gated",
    "X-Med",
    "X-AMean",
    "X-GMean",
    "X-Med-all",
    "X-AMean-all",
    "X-GMean-all",
    "timestamp",
];

/// One aligned sample: the per-gate rows of a DataSet collapsed into a
/// single wide entry.
///
/// The measurement fields are written by the first row whose gate is not
/// `"All"`; the `*_all` fields track the most recent `"All"` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignedEntry {
    pub data_set: String,
    /// Acquisition timestamp from the DataSet suffix, captured when the
    /// entry is created. Empty when the DataSet carries no suffix.
    pub timestamp: String,
    pub gate: Option<String>,
    pub pct_gated: Option<String>,
    pub x_med: Option<String>,
    pub x_amean: Option<String>,
    pub x_gmean: Option<String>,
    pub x_med_all: Option<String>,
    pub x_amean_all: Option<String>,
    pub x_gmean_all: Option<String>,
}

/// Everything produced for one export: the aligned table and, when any
/// entries grouped across stimulations, the merged table.
#[derive(Debug, Clone)]
pub struct KaluzaOutputs {
    pub aligned: Table,
    pub merged: Option<Table>,
}

/// Folds the rows of one export into aligned entries, keyed by the
/// DataSet text before its first `-`.
///
/// Entries are kept in first-encounter order. State is scoped to one
/// export; `finalize` drains it and leaves the aligner ready for the next
/// file.
#[derive(Debug)]
pub struct KaluzaAligner {
    filter: Vec<String>,
    separator: char,
    entries: Vec<AlignedEntry>,
    index: HashMap<String, usize>,
}

impl KaluzaAligner {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            filter: config.dataset_filter.clone(),
            separator: config.dataset_separator,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn process_row(&mut self, row: KaluzaRow) {
        if self
            .filter
            .iter()
            .any(|needle| row.data_set.contains(needle))
        {
            return;
        }

        let (key, timestamp) = split_data_set(&row.data_set);
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.entries.push(AlignedEntry {
                    data_set: key.to_string(),
                    timestamp: timestamp.to_string(),
                    ..AlignedEntry::default()
                });
                self.index.insert(key.to_string(), slot);
                slot
            }
        };

        let entry = &mut self.entries[slot];
        if row.gate == GATE_ALL {
            entry.x_med_all = Some(row.x_med);
            entry.x_amean_all = Some(row.x_amean);
            entry.x_gmean_all = Some(row.x_gmean);
            return;
        }

        // The aligned Gate column carries the %Gated value; the sheets
        // consuming these files expect that layout.
        if entry.gate.is_none() {
            entry.gate = Some(row.pct_gated.clone());
        }
        if entry.pct_gated.is_none() {
            entry.pct_gated = Some(row.pct_gated);
        }
        if entry.x_med.is_none() {
            entry.x_med = Some(row.x_med);
        }
        if entry.x_amean.is_none() {
            entry.x_amean = Some(row.x_amean);
        }
        if entry.x_gmean.is_none() {
            entry.x_gmean = Some(row.x_gmean);
        }
    }

    /// Drains the accumulated entries into the per-export tables and
    /// resets the aligner for the next file.
    pub fn finalize(&mut self, source_name: &str) -> KaluzaOutputs {
        let entries = self.drain();
        let aligned = build_aligned_table(&entries, source_name);
        let merged = merge_entries(&entries, self.separator, source_name);
        KaluzaOutputs { aligned, merged }
    }

    /// Removes and returns the aligned entries in encounter order.
    pub fn drain(&mut self) -> Vec<AlignedEntry> {
        self.index.clear();
        std::mem::take(&mut self.entries)
    }
}

/// Splits a DataSet into its sample key and the timestamp appended after
/// the first `-`; no suffix yields an empty timestamp.
fn split_data_set(data_set: &str) -> (&str, &str) {
    match data_set.split_once('-') {
        Some((key, timestamp)) => (key, timestamp),
        None => (data_set, ""),
    }
}

fn build_aligned_table(entries: &[AlignedEntry], source_name: &str) -> Table {
    let columns = ALIGNED_COLUMNS.iter().copied().map(String::from).collect();
    let mut table = Table::with_columns(format!("aligned_{source_name}"), columns);

    for entry in entries {
        let mut record = Record::new();
        record.set("DataSet", entry.data_set.clone());
        record.set("Gate", entry.gate.clone().unwrap_or_default());
        record.set("%Gated", entry.pct_gated.clone().unwrap_or_default());
        record.set("X-Med", entry.x_med.clone().unwrap_or_default());
        record.set("X-AMean", entry.x_amean.clone().unwrap_or_default());
        record.set("X-GMean", entry.x_gmean.clone().unwrap_or_default());
        record.set("X-Med-all", entry.x_med_all.clone().unwrap_or_default());
        record.set("X-AMean-all", entry.x_amean_all.clone().unwrap_or_default());
        record.set("X-GMean-all", entry.x_gmean_all.clone().unwrap_or_default());
        record.set("timestamp", entry.timestamp.clone());
        table.push(record);
    }

    table
}

/// Groups aligned entries sharing antibody and subject into one record
/// per composite key, with every metric column prefixed by the entry's
/// stimulation. Returns `None` when nothing merged.
fn merge_entries(entries: &[AlignedEntry], separator: char, source_name: &str) -> Option<Table> {
    let mut records: Vec<Record> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let parts: Vec<&str> = entry.data_set.split(separator).collect();
        let &[antibody, stimulation, subject] = parts.as_slice() else {
            warn!(
                data_set = %entry.data_set,
                "DataSet does not split into antibody, stimulation and subject; skipped in merge"
            );
            continue;
        };

        let key = format!("{antibody}{separator}{subject}");
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = records.len();
                let mut record = Record::new();
                record.set("DataSet", key.clone());
                records.push(record);
                index.insert(key, slot);
                slot
            }
        };

        let record = &mut records[slot];
        let metric = |value: &Option<String>| value.clone().unwrap_or_default();
        record.set(format!("{stimulation}-%Gated"), metric(&entry.pct_gated));
        record.set(format!("{stimulation}-X-Med"), metric(&entry.x_med));
        record.set(format!("{stimulation}-X-AMean"), metric(&entry.x_amean));
        record.set(format!("{stimulation}-X-GMean"), metric(&entry.x_gmean));
        record.set(format!("{stimulation}-X-Med-all"), metric(&entry.x_med_all));
        record.set(
            format!("{stimulation}-X-AMean-all"),
            metric(&entry.x_amean_all),
        );
        record.set(
            format!("{stimulation}-X-GMean-all"),
            metric(&entry.x_gmean_all),
        );
    }

    if records.is_empty() {
        return None;
    }

    let mut table = Table::new(format!("merged_{source_name}"));
    for record in records {
        table.push(record);
    }
    Some(table)
}
