//! Integration tests driving full runs over temporary directories.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use cyto_cli::pipeline::{run_kaluza, run_vesicles};
use cyto_cli::types::RunKind;
use cyto_model::RunConfig;

fn config_for(dir: &Path) -> RunConfig {
    RunConfig {
        input_dir: dir.to_path_buf(),
        output_dir: dir.join("output"),
        ..RunConfig::default()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

fn write_kaluza_export(dir: &Path, name: &str) {
    let content = "\
DataSet;Gate;%Gated;X-Med;X-AMean;X-GMean
CD3|Unstim|1-20240101;All;100;5,0;6,0;7,0
CD3|Unstim|1-20240101;Lymphs;45,2;1,1;2,2;3,3
CD3|PMA|1-20240101;Lymphs;50,0;4,4;5,5;6,6
Beads;Lymphs;1;1;1;1
";
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_kaluza_run_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_kaluza_export(dir.path(), "export.csv");
    // Noise that discovery must skip
    fs::write(dir.path().join("DONE_old.csv"), "DataSet;Gate\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "not an export\n").unwrap();

    let config = config_for(dir.path());
    let result = run_kaluza(&config).unwrap();

    assert_eq!(result.kind, RunKind::Kaluza);
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].file, "export.csv");
    assert_eq!(result.files[0].rows, 4);
    assert_eq!(result.files[0].records, 3);
    assert_eq!(result.files[0].outputs.len(), 2);
    assert!(!result.files[0].renamed);
    assert!(!result.has_errors());

    let aligned = read_lines(&config.output_dir.join("aligned_export.csv"));
    assert_eq!(
        aligned[0],
        "DataSet;Gate;%Gated;X-Med;X-AMean;X-GMean;X-Med-all;X-AMean-all;X-GMean-all;timestamp"
    );
    assert_eq!(
        aligned[1],
        "CD3|Unstim|1;45,2;45,2;1,1;2,2;3,3;5,0;6,0;7,0;20240101"
    );
    assert_eq!(aligned[2], "CD3|PMA|1;50,0;50,0;4,4;5,5;6,6;;;;20240101");
    assert_eq!(aligned[3], "Beads;1;1;1;1;1;;;;");
    assert_eq!(aligned.len(), 4);

    // Both stimulations of CD3 subject 1 fold into one merged record;
    // "Beads" has no antibody/stimulation/subject split and is left out
    let merged = read_lines(&config.output_dir.join("merged_export.csv"));
    assert_eq!(
        merged[0],
        "DataSet;Unstim-%Gated;Unstim-X-Med;Unstim-X-AMean;Unstim-X-GMean;\
         Unstim-X-Med-all;Unstim-X-AMean-all;Unstim-X-GMean-all;\
         PMA-%Gated;PMA-X-Med;PMA-X-AMean;PMA-X-GMean;\
         PMA-X-Med-all;PMA-X-AMean-all;PMA-X-GMean-all"
    );
    assert_eq!(
        merged[1],
        "CD3|1;45,2;1,1;2,2;3,3;5,0;6,0;7,0;50,0;4,4;5,5;6,6;;;"
    );
    assert_eq!(merged.len(), 2);
}

#[test]
fn test_kaluza_run_without_mergeable_entries() {
    let dir = TempDir::new().unwrap();
    let content = "\
DataSet;Gate;%Gated;X-Med;X-AMean;X-GMean
Beads-20240101;Lymphs;1;2;3;4
";
    fs::write(dir.path().join("beads.csv"), content).unwrap();

    let config = config_for(dir.path());
    let result = run_kaluza(&config).unwrap();

    assert_eq!(result.files[0].outputs.len(), 1);
    assert!(config.output_dir.join("aligned_beads.csv").exists());
    assert!(!config.output_dir.join("merged_beads.csv").exists());
}

#[test]
fn test_kaluza_run_marks_exports_processed() {
    let dir = TempDir::new().unwrap();
    write_kaluza_export(dir.path(), "export.csv");

    let config = RunConfig {
        rename_processed: true,
        ..config_for(dir.path())
    };
    let result = run_kaluza(&config).unwrap();

    assert!(result.files[0].renamed);
    assert!(!dir.path().join("export.csv").exists());
    assert!(dir.path().join("DONE_export.csv").exists());

    // A second run over the same directory finds nothing to do
    let rerun = run_kaluza(&config).unwrap();
    assert!(rerun.files.is_empty());
}

#[test]
fn test_dry_run_writes_and_renames_nothing() {
    let dir = TempDir::new().unwrap();
    write_kaluza_export(dir.path(), "export.csv");

    let config = RunConfig {
        rename_processed: true,
        dry_run: true,
        ..config_for(dir.path())
    };
    let result = run_kaluza(&config).unwrap();

    assert!(result.dry_run);
    assert_eq!(result.files[0].records, 3);
    assert!(result.files[0].outputs.is_empty());
    assert!(!result.files[0].renamed);
    assert!(dir.path().join("export.csv").exists());
    assert!(!config.output_dir.exists());
}

#[test]
fn test_missing_input_directory_yields_empty_run() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir.path().join("not_there"));

    let result = run_kaluza(&config).unwrap();

    assert!(result.files.is_empty());
    assert!(!result.has_errors());
}

#[test]
fn test_vesicles_run_with_subject_union() {
    let dir = TempDir::new().unwrap();
    let first = "\
DataSet;XParameter;Gate;Number;%Gated;Cells/\u{b5}L
Plt_EV_7;CD41;Gate B1;10;1,0;100,0
Plt_EV_7;CD41;Gate B2;20;3,0;200,0
Plt_EV_7;CD63;Gate B1;5;2,0;50,0
Plt_EV_7;CD63;All;99;99;99
";
    let second = "\
DataSet;XParameter;Gate;Number;%Gated;Cells/\u{b5}L
Plt_EV_12;CD41;Gate B1;8;4,0;80,0
";
    fs::write(dir.path().join("a.csv"), first).unwrap();
    fs::write(dir.path().join("b.csv"), second).unwrap();

    let config = config_for(dir.path());
    let result = run_vesicles(&config).unwrap();

    assert_eq!(result.kind, RunKind::Vesicles);
    assert_eq!(result.files.len(), 2);
    assert_eq!(result.total_rows(), 5);
    assert_eq!(result.total_records(), 3);

    let means = read_lines(&config.output_dir.join("a.csv"));
    assert_eq!(
        means[0],
        "Subject;XParameter;MeanNumber;MeanPctGated;MeanCellsPerUL"
    );
    assert_eq!(means[1], "0007;CD41;15,000;2,000;150,000");
    assert_eq!(means[2], "0007;CD63;5,000;2,000;50,000");
    assert_eq!(means.len(), 3);

    let union_path = result.union_output.expect("union written");
    assert_eq!(union_path, config.output_dir.join("merged_subjects.csv"));
    let union = read_lines(&union_path);
    assert_eq!(
        union[0],
        "Subject;XParameter;MeanNumber;MeanPctGated;MeanCellsPerUL;sourceFile"
    );
    assert_eq!(union[1], "0007;CD41;15,000;2,000;150,000;a.csv");
    assert_eq!(union[2], "0007;CD63;5,000;2,000;50,000;a.csv");
    assert_eq!(union[3], "0012;CD41;8,000;4,000;80,000;b.csv");
    assert_eq!(union.len(), 4);
}

#[test]
fn test_vesicles_export_missing_a_column_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let content = "\
DataSet;Gate;Number;%Gated;Cells/\u{b5}L
Plt_EV_7;Gate B1;10;1,0;100,0
";
    fs::write(dir.path().join("broken.csv"), content).unwrap();

    let config = config_for(dir.path());
    let error = run_vesicles(&config).unwrap_err();

    assert!(format!("{error:#}").contains("XParameter"));
}

#[test]
fn test_run_result_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    write_kaluza_export(dir.path(), "export.csv");

    let config = config_for(dir.path());
    let result = run_kaluza(&config).unwrap();
    let json = serde_json::to_string(&result).unwrap();

    assert!(json.contains("\"kind\":\"kaluza\""));
    assert!(json.contains("\"file\":\"export.csv\""));
    assert!(json.contains("\"union_output\":null"));
}
