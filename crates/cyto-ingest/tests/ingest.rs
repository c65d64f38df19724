//! End-to-end ingestion flow: discover, read, mark processed.

use std::path::PathBuf;

use tempfile::TempDir;

use cyto_ingest::{RowReader, list_unprocessed_files, mark_processed};
use cyto_model::{KaluzaRow, VesicleRow};

fn write_export(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write export");
    path
}

#[test]
fn discover_read_and_mark_a_kaluza_export() {
    let dir = TempDir::new().expect("temp dir");
    write_export(
        &dir,
        "kaluza_run1.csv",
        "DataSet;Gate;%Gated;X-Med;X-AMean;X-GMean\n\
         CD3|Unstim|1-20240101;Lymphs;45,2;1,1;2,2;3,3\n\
         CD3|Unstim|1-20240101;All;100,0;9,9;8,8;7,7\n",
    );
    write_export(&dir, "DONE_kaluza_run0.csv", "DataSet;Gate\nA;B\n");

    let files = list_unprocessed_files(dir.path()).expect("list files");
    assert_eq!(files.len(), 1);

    let rows: Vec<KaluzaRow> = RowReader::open(&files[0])
        .expect("open export")
        .collect::<cyto_ingest::Result<_>>()
        .expect("read rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].data_set, "CD3|Unstim|1-20240101");

    let renamed = mark_processed(&files[0]).expect("mark processed");
    assert!(renamed.ends_with("DONE_kaluza_run1.csv"));

    let remaining = list_unprocessed_files(dir.path()).expect("relist files");
    assert!(remaining.is_empty());
}

#[test]
fn vesicle_export_reads_with_unit_header() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_export(
        &dir,
        "vesicles.csv",
        "DataSet;XParameter;Gate;Number;%Gated;Cells/\u{00b5}L\n\
         Plt_EV_12;CD41;B1;5;2,0;7,5\n\
         Plt_EV_12;CD41;All;99;100,0;1,0\n",
    );

    let rows: Vec<VesicleRow> = RowReader::open(&path)
        .expect("open export")
        .collect::<cyto_ingest::Result<_>>()
        .expect("read rows");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].x_parameter, "CD41");
    assert_eq!(rows[0].cells_per_ul, "7,5");
    assert_eq!(rows[1].gate, "All");
}
