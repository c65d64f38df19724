//! Semicolon-delimited CSV reading into typed instrument rows.
//!
//! Both instruments write `;`-delimited exports with a header row, but the
//! header spellings drift between software versions (`DataSet` vs
//! `Data Set`, `Cells/µL` with either micro glyph). Columns are therefore
//! resolved by a normalized spelling rather than an exact match.

use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use cyto_model::{CSV_DELIMITER, KaluzaRow, VesicleRow};

use crate::error::{IngestError, Result};

/// A required column: the label used in error messages plus the
/// normalized spellings accepted for it.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub label: &'static str,
    pub aliases: &'static [&'static str],
}

/// Decodes one CSV record into a typed instrument row.
///
/// Implementations declare their required columns once; the reader
/// resolves them against the header row up front and hands every record
/// over together with the resolved indexes, in `columns()` order.
pub trait RowDecode: Sized {
    fn columns() -> &'static [ColumnSpec];
    fn decode(record: &StringRecord, indexes: &[usize]) -> Self;
}

/// Uppercased ASCII-alphanumeric fold of a header cell.
///
/// Collapses spelling variants: `Data Set` and `DataSet` both fold to
/// `DATASET`, `%Gated` to `GATED`. Non-ASCII glyphs drop out, so the two
/// micro signs in `Cells/µL` fold identically.
fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

const KALUZA_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        label: "DataSet",
        aliases: &["DATASET"],
    },
    ColumnSpec {
        label: "Gate",
        aliases: &["GATE"],
    },
    ColumnSpec {
        label: "%Gated",
        aliases: &["GATED"],
    },
    ColumnSpec {
        label: "X-Med",
        aliases: &["XMED"],
    },
    ColumnSpec {
        label: "X-AMean",
        aliases: &["XAMEAN"],
    },
    ColumnSpec {
        label: "X-GMean",
        aliases: &["XGMEAN"],
    },
];

const VESICLE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        label: "DataSet",
        aliases: &["DATASET"],
    },
    ColumnSpec {
        label: "XParameter",
        aliases: &["XPARAMETER"],
    },
    ColumnSpec {
        label: "Gate",
        aliases: &["GATE"],
    },
    ColumnSpec {
        label: "Number",
        aliases: &["NUMBER"],
    },
    ColumnSpec {
        label: "%Gated",
        aliases: &["GATED"],
    },
    ColumnSpec {
        label: "Cells/µL",
        aliases: &["CELLSL", "CELLSUL", "CELLSPERUL"],
    },
];

impl RowDecode for KaluzaRow {
    fn columns() -> &'static [ColumnSpec] {
        KALUZA_COLUMNS
    }

    fn decode(record: &StringRecord, indexes: &[usize]) -> Self {
        let cell = |slot: usize| record.get(indexes[slot]).unwrap_or("").to_string();
        Self {
            data_set: cell(0),
            gate: cell(1),
            pct_gated: cell(2),
            x_med: cell(3),
            x_amean: cell(4),
            x_gmean: cell(5),
        }
    }
}

impl RowDecode for VesicleRow {
    fn columns() -> &'static [ColumnSpec] {
        VESICLE_COLUMNS
    }

    fn decode(record: &StringRecord, indexes: &[usize]) -> Self {
        let cell = |slot: usize| record.get(indexes[slot]).unwrap_or("").to_string();
        Self {
            data_set: cell(0),
            x_parameter: cell(1),
            gate: cell(2),
            number: cell(3),
            pct_gated: cell(4),
            cells_per_ul: cell(5),
        }
    }
}

/// Streaming reader over the typed rows of one export.
///
/// Blank records are skipped; short records fill missing cells with the
/// empty string.
pub struct RowReader<T: RowDecode> {
    path: PathBuf,
    reader: csv::Reader<File>,
    indexes: Vec<usize>,
    _marker: PhantomData<T>,
}

impl<T: RowDecode> RowReader<T> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| IngestError::FileOpen {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(CSV_DELIMITER)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| IngestError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?
            .clone();
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

        let mut indexes = Vec::with_capacity(T::columns().len());
        for spec in T::columns() {
            let index = normalized
                .iter()
                .position(|header| spec.aliases.contains(&header.as_str()))
                .ok_or_else(|| IngestError::MissingColumn {
                    column: spec.label.to_string(),
                    path: path.to_path_buf(),
                })?;
            indexes.push(index);
        }

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            indexes,
            _marker: PhantomData,
        })
    }
}

impl<T: RowDecode> Iterator for RowReader<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        loop {
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    if record.iter().all(|cell| cell.is_empty()) {
                        continue;
                    }
                    return Some(Ok(T::decode(&record, &self.indexes)));
                }
                Ok(false) => return None,
                Err(e) => {
                    return Some(Err(IngestError::Csv {
                        path: self.path.clone(),
                        source: e,
                    }));
                }
            }
        }
    }
}
