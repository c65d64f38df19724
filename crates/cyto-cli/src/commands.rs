use std::path::Path;

use anyhow::{Context, Result};

use cyto_cli::pipeline::{run_kaluza, run_vesicles};
use cyto_cli::types::RunResult;
use cyto_model::RunConfig;

use crate::cli::{KaluzaArgs, SeparatorArg, VesicleArgs};

pub fn run_kaluza_command(args: &KaluzaArgs) -> Result<RunResult> {
    let config = RunConfig {
        input_dir: args.input_dir.clone(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| args.input_dir.join("output")),
        rename_processed: args.rename,
        dry_run: args.dry_run,
        dataset_filter: args.exclude.clone(),
        dataset_separator: match args.separator {
            SeparatorArg::Pipe => '|',
            SeparatorArg::Underscore => '_',
        },
        ..RunConfig::default()
    };
    let result = run_kaluza(&config)?;
    write_summary_json(args.summary_json.as_deref(), &result)?;
    Ok(result)
}

pub fn run_vesicles_command(args: &VesicleArgs) -> Result<RunResult> {
    let config = RunConfig {
        input_dir: args.input_dir.clone(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| args.input_dir.join("output")),
        rename_processed: args.rename,
        dry_run: args.dry_run,
        decimal_precision: usize::from(args.precision),
        ..RunConfig::default()
    };
    let result = run_vesicles(&config)?;
    write_summary_json(args.summary_json.as_deref(), &result)?;
    Ok(result)
}

fn write_summary_json(path: Option<&Path>, result: &RunResult) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let json = serde_json::to_string_pretty(result).context("serialize run summary")?;
    std::fs::write(path, json).with_context(|| format!("write run summary {}", path.display()))?;
    Ok(())
}
