//! Run pipeline driving one instrument command over one input directory.
//!
//! A run follows these stages in order:
//! 1. **Discover**: List unprocessed CSV exports in the input directory
//! 2. **Aggregate**: Fold each export's rows through the instrument aggregator
//! 3. **Write**: Emit the transformed tables into the output directory
//! 4. **Mark**: Rename processed exports with the `DONE_` prefix
//!
//! CSV failures abort the run. A failed rename is recorded on the result
//! and the run continues with the remaining exports.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use cyto_core::{KaluzaAligner, SubjectUnion, VesicleAggregator};
use cyto_ingest::{IngestError, RowReader, list_unprocessed_files, mark_processed};
use cyto_model::{KaluzaRow, RunConfig, VesicleRow};
use cyto_output::write_table;

use crate::types::{FileSummary, RunKind, RunResult};

// ============================================================================
// Kaluza run
// ============================================================================

/// Processes every unprocessed Kaluza export in the input directory.
///
/// Each export yields an aligned table and, when any DataSet grouped
/// across stimulations, a merged table.
pub fn run_kaluza(config: &RunConfig) -> Result<RunResult> {
    let run_span = info_span!("kaluza_run", input_dir = %config.input_dir.display());
    let _run_guard = run_span.enter();
    let run_start = Instant::now();

    let mut result = RunResult::new(RunKind::Kaluza, config);
    let files = discover(config)?;
    let mut aligner = KaluzaAligner::new(config);

    for path in &files {
        let summary = process_kaluza_file(path, config, &mut aligner)?;
        finish_file(path, config, summary, &mut result);
    }

    info!(
        files = result.files.len(),
        rows = result.total_rows(),
        records = result.total_records(),
        duration_ms = run_start.elapsed().as_millis(),
        "kaluza run complete"
    );
    Ok(result)
}

fn process_kaluza_file(
    path: &Path,
    config: &RunConfig,
    aligner: &mut KaluzaAligner,
) -> Result<FileSummary> {
    let file = export_name(path);
    info_span!("export", file = %file).in_scope(|| -> Result<FileSummary> {
        let start = Instant::now();

        let reader =
            RowReader::<KaluzaRow>::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut rows = 0usize;
        for row in reader {
            let row = row.with_context(|| format!("read {}", path.display()))?;
            aligner.process_row(row);
            rows += 1;
        }

        let outputs = aligner.finalize(&file);
        let records = outputs.aligned.len();

        let mut written = Vec::new();
        if config.dry_run {
            info!(rows, records, "dry run, tables not written");
        } else {
            written.push(
                write_table(&config.output_dir, &outputs.aligned)
                    .with_context(|| format!("write {}", outputs.aligned.name))?,
            );
            match &outputs.merged {
                Some(merged) => written.push(
                    write_table(&config.output_dir, merged)
                        .with_context(|| format!("write {}", merged.name))?,
                ),
                None => warn!(
                    file = %file,
                    "no DataSet grouped across stimulations; merged table skipped"
                ),
            }
        }

        info!(
            rows,
            records,
            outputs = written.len(),
            duration_ms = start.elapsed().as_millis(),
            "export processed"
        );
        Ok(FileSummary {
            file,
            rows,
            records,
            outputs: written,
            renamed: false,
        })
    })
}

// ============================================================================
// Vesicles run
// ============================================================================

/// Processes every unprocessed microvesicle export in the input
/// directory, then writes the run-level subject union.
pub fn run_vesicles(config: &RunConfig) -> Result<RunResult> {
    let run_span = info_span!("vesicles_run", input_dir = %config.input_dir.display());
    let _run_guard = run_span.enter();
    let run_start = Instant::now();

    let mut result = RunResult::new(RunKind::Vesicles, config);
    let files = discover(config)?;
    let mut aggregator = VesicleAggregator::new(config);
    let mut union = SubjectUnion::new();

    for path in &files {
        let summary = process_vesicle_file(path, config, &mut aggregator, &mut union)?;
        finish_file(path, config, summary, &mut result);
    }

    match union.into_table() {
        Some(table) => {
            if config.dry_run {
                info!(rows = table.len(), "dry run, subject union not written");
            } else {
                let path = write_table(&config.output_dir, &table)
                    .with_context(|| format!("write {}", table.name))?;
                info!(rows = table.len(), path = %path.display(), "subject union written");
                result.union_output = Some(path);
            }
        }
        None => warn!("no subject rows collected; union not written"),
    }

    info!(
        files = result.files.len(),
        rows = result.total_rows(),
        records = result.total_records(),
        duration_ms = run_start.elapsed().as_millis(),
        "vesicles run complete"
    );
    Ok(result)
}

fn process_vesicle_file(
    path: &Path,
    config: &RunConfig,
    aggregator: &mut VesicleAggregator,
    union: &mut SubjectUnion,
) -> Result<FileSummary> {
    let file = export_name(path);
    info_span!("export", file = %file).in_scope(|| -> Result<FileSummary> {
        let start = Instant::now();

        let reader = RowReader::<VesicleRow>::open(path)
            .with_context(|| format!("open {}", path.display()))?;
        let mut rows = 0usize;
        for row in reader {
            let row = row.with_context(|| format!("read {}", path.display()))?;
            aggregator.process_row(row);
            rows += 1;
        }

        let table = aggregator.finalize(&file);
        let records = table.len();
        union.absorb(&table, &file);

        let mut written = Vec::new();
        if config.dry_run {
            info!(rows, records, "dry run, table not written");
        } else {
            written.push(
                write_table(&config.output_dir, &table)
                    .with_context(|| format!("write {}", table.name))?,
            );
        }

        info!(
            rows,
            records,
            duration_ms = start.elapsed().as_millis(),
            "export processed"
        );
        Ok(FileSummary {
            file,
            rows,
            records,
            outputs: written,
            renamed: false,
        })
    })
}

// ============================================================================
// Shared stages
// ============================================================================

/// Lists the unprocessed exports, tolerating a missing input directory.
fn discover(config: &RunConfig) -> Result<Vec<PathBuf>> {
    match list_unprocessed_files(&config.input_dir) {
        Ok(files) => {
            info!(
                dir = %config.input_dir.display(),
                count = files.len(),
                "discovered exports"
            );
            Ok(files)
        }
        Err(IngestError::DirectoryNotFound { path }) => {
            warn!(dir = %path.display(), "input directory does not exist; nothing to process");
            Ok(Vec::new())
        }
        Err(error) => {
            Err(error).with_context(|| format!("list exports in {}", config.input_dir.display()))
        }
    }
}

/// Marks the export processed when the run asks for it, then records the
/// file on the result.
fn finish_file(path: &Path, config: &RunConfig, mut summary: FileSummary, result: &mut RunResult) {
    if config.rename_processed && !config.dry_run {
        match mark_processed(path) {
            Ok(_) => summary.renamed = true,
            Err(error) => {
                warn!(file = %path.display(), %error, "could not mark export as processed");
                result.errors.push(format!("{}: {error}", path.display()));
            }
        }
    }
    result.files.push(summary);
}

fn export_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
