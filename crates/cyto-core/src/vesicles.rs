//! Microvesicle panel aggregation: per-parameter means and the run-level
//! subject union.

use std::collections::HashMap;

use tracing::warn;

use cyto_model::{GATE_ALL, Record, RunConfig, Table, VesicleRow};

use crate::locale::{format_locale_number, parse_locale_number};

/// Header of the per-export mean table.
pub const MEAN_COLUMNS: [&str; 5] = [
    "Subject",
    "XParameter",
    "MeanNumber",
    "MeanPctGated",
    "MeanCellsPerUL",
];

/// Column tagging every union row with the export it came from.
pub const SOURCE_FILE_COLUMN: &str = "sourceFile";

/// Name of the run-level union table.
pub const UNION_FILE_NAME: &str = "merged_subjects.csv";

/// Measurements accumulated for one XParameter within one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedGroup {
    pub x_parameter: String,
    /// Subject identifier, derived once when the group is created.
    pub subject: String,
    pub number: Vec<f64>,
    pub pct_gated: Vec<f64>,
    pub cells_per_ul: Vec<f64>,
}

/// Folds the rows of one export into per-parameter groups, in
/// first-encounter order. State is scoped to one export; `finalize`
/// drains it and leaves the aggregator ready for the next file.
#[derive(Debug)]
pub struct VesicleAggregator {
    precision: usize,
    groups: Vec<AggregatedGroup>,
    index: HashMap<String, usize>,
}

impl VesicleAggregator {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            precision: config.decimal_precision,
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn process_row(&mut self, row: VesicleRow) {
        if row.gate == GATE_ALL {
            return;
        }

        let slot = match self.index.get(&row.x_parameter) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.groups.push(AggregatedGroup {
                    x_parameter: row.x_parameter.clone(),
                    subject: derive_subject(&row.data_set),
                    ..AggregatedGroup::default()
                });
                self.index.insert(row.x_parameter.clone(), slot);
                slot
            }
        };

        let group = &mut self.groups[slot];
        group.number.push(parse_locale_number(&row.number));
        group.pct_gated.push(parse_locale_number(&row.pct_gated));
        group
            .cells_per_ul
            .push(parse_locale_number(&row.cells_per_ul));
    }

    /// Drains the accumulated groups into the per-export mean table and
    /// resets the aggregator for the next file.
    ///
    /// The table keeps the export's own name; it is written under the
    /// output directory, so input and output never collide.
    pub fn finalize(&mut self, source_name: &str) -> Table {
        let groups = self.drain();
        let columns = MEAN_COLUMNS.iter().copied().map(String::from).collect();
        let mut table = Table::with_columns(source_name, columns);

        for group in &groups {
            if group.number.is_empty() {
                warn!(
                    x_parameter = %group.x_parameter,
                    "group has no measurements; skipped"
                );
                continue;
            }
            let mut record = Record::new();
            record.set("Subject", group.subject.clone());
            record.set("XParameter", group.x_parameter.clone());
            record.set(
                "MeanNumber",
                format_locale_number(mean(&group.number), self.precision),
            );
            record.set(
                "MeanPctGated",
                format_locale_number(mean(&group.pct_gated), self.precision),
            );
            record.set(
                "MeanCellsPerUL",
                format_locale_number(mean(&group.cells_per_ul), self.precision),
            );
            table.push(record);
        }

        table
    }

    /// Removes and returns the groups in encounter order.
    pub fn drain(&mut self) -> Vec<AggregatedGroup> {
        self.index.clear();
        std::mem::take(&mut self.groups)
    }
}

/// Run-scoped accumulator collecting every emitted mean row across the
/// exports of a run.
#[derive(Debug, Default)]
pub struct SubjectUnion {
    records: Vec<Record>,
}

impl SubjectUnion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends the rows of one export's mean table, tagged with the
    /// export they came from.
    pub fn absorb(&mut self, table: &Table, source_name: &str) {
        for record in &table.records {
            let mut tagged = record.clone();
            tagged.set(SOURCE_FILE_COLUMN, source_name);
            self.records.push(tagged);
        }
    }

    /// The union table, or `None` when no rows were collected.
    pub fn into_table(self) -> Option<Table> {
        if self.records.is_empty() {
            return None;
        }
        let mut table = Table::new(UNION_FILE_NAME);
        for record in self.records {
            table.push(record);
        }
        Some(table)
    }
}

/// Subject identifier: the last `_`-separated token of the DataSet,
/// left-padded with zeros to at least four digits.
fn derive_subject(data_set: &str) -> String {
    let token = data_set.rsplit('_').next().unwrap_or(data_set);
    format!("{token:0>4}")
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
