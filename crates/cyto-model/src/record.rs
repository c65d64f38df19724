//! Insertion-ordered output rows and tables.
//!
//! Merged outputs grow their column set while data is being folded in, so
//! the header is only known once every record has been built. `Record`
//! keeps columns in first-set order and `Table::push` unions them into the
//! table header in first-encounter order.

/// An output row as an ordered mapping of column name to cell value.
///
/// Columns appear in the order they were first set; setting an existing
/// column replaces its value without moving it. Column counts stay small
/// (tens at most), so lookup is a linear scan over the pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, replacing the previous value if the column exists.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A named output file: a header plus its records.
///
/// `name` is the file name the table is written under. The header is the
/// union of all record columns in first-encounter order; records missing a
/// header column serialize that cell as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            records: Vec::new(),
        }
    }

    /// A table with a fixed header laid out up front.
    pub fn with_columns(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            records: Vec::new(),
        }
    }

    /// Appends a record, extending the header with any columns it
    /// introduces.
    pub fn push(&mut self, record: Record) {
        for column in record.columns() {
            if !self.columns.iter().any(|existing| existing == column) {
                self.columns.push(column.to_string());
            }
        }
        self.records.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_insertion_order() {
        let mut record = Record::new();
        record.set("DataSet", "A|B|1");
        record.set("B-%Gated", "12,3");
        record.set("B-X-Med", "4,5");
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, ["DataSet", "B-%Gated", "B-X-Med"]);
    }

    #[test]
    fn record_set_overwrites_in_place() {
        let mut record = Record::new();
        record.set("DataSet", "first");
        record.set("Gate", "Lymphs");
        record.set("DataSet", "second");
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, ["DataSet", "Gate"]);
        assert_eq!(record.get("DataSet"), Some("second"));
    }

    #[test]
    fn record_get_missing_column() {
        let record = Record::new();
        assert_eq!(record.get("DataSet"), None);
    }

    #[test]
    fn table_unions_columns_in_encounter_order() {
        let mut table = Table::new("merged_export.csv");
        let mut first = Record::new();
        first.set("DataSet", "A|1");
        first.set("X-%Gated", "1,0");
        let mut second = Record::new();
        second.set("DataSet", "A|2");
        second.set("Y-%Gated", "2,0");
        second.set("X-%Gated", "3,0");
        table.push(first);
        table.push(second);
        assert_eq!(table.columns, ["DataSet", "X-%Gated", "Y-%Gated"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn fixed_columns_survive_pushes() {
        let mut table = Table::with_columns(
            "aligned_export.csv",
            vec!["DataSet".to_string(), "Gate".to_string()],
        );
        let mut record = Record::new();
        record.set("DataSet", "A|B|1");
        table.push(record);
        assert_eq!(table.columns, ["DataSet", "Gate"]);
    }
}
