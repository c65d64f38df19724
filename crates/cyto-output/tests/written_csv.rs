//! Snapshot coverage for written CSV bytes.

use std::fs;

use cyto_model::{Record, Table};
use cyto_output::write_table;

#[test]
fn merged_table_bytes() {
    let dir = tempfile::tempdir().expect("temp dir");

    let mut table = Table::new("merged_export.csv");
    let mut first = Record::new();
    first.set("DataSet", "CD3|1");
    first.set("Unstim-%Gated", "45,2");
    first.set("Unstim-X-Med", "1,1");
    let mut second = Record::new();
    second.set("DataSet", "CD3|2");
    second.set("PMA-%Gated", "12,0");
    table.push(first);
    table.push(second);

    let path = write_table(dir.path(), &table).expect("write table");
    let content = fs::read_to_string(&path).expect("read written file");
    let rendered = content.lines().collect::<Vec<&str>>().join("\n");

    insta::assert_snapshot!("merged_table", rendered);
}
