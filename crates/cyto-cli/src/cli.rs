//! CLI argument definitions for the cytometry export preparation tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cytoprep",
    version,
    about = "Cytometry export preparation - align and aggregate instrument CSV exports",
    long_about = "Prepare semicolon-delimited cytometry exports for analysis.\n\n\
                  Kaluza exports are aligned into one row per DataSet and merged across\n\
                  stimulations; microvesicle exports are averaged per XParameter with a\n\
                  run-level subject union."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Align Kaluza exports and merge samples across stimulations.
    Kaluza(KaluzaArgs),

    /// Average microvesicle exports per XParameter and collect the subject union.
    Vesicles(VesicleArgs),
}

#[derive(Parser)]
pub struct KaluzaArgs {
    /// Folder containing instrument CSV exports.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output directory for transformed tables (default: <INPUT_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip DataSets containing this text (repeatable).
    #[arg(long = "exclude", value_name = "TEXT")]
    pub exclude: Vec<String>,

    /// Separator between the antibody, stimulation and subject tokens.
    #[arg(long = "separator", value_enum, default_value = "pipe")]
    pub separator: SeparatorArg,

    /// Rename processed exports to DONE_<name>.
    #[arg(long = "rename")]
    pub rename: bool,

    /// Aggregate and report without writing or renaming files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write the run summary as JSON to this path.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct VesicleArgs {
    /// Folder containing instrument CSV exports.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output directory for transformed tables (default: <INPUT_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Decimal places in formatted means.
    #[arg(
        long = "precision",
        value_name = "N",
        default_value_t = 3,
        value_parser = clap::value_parser!(u8).range(0..=9)
    )]
    pub precision: u8,

    /// Rename processed exports to DONE_<name>.
    #[arg(long = "rename")]
    pub rename: bool,

    /// Aggregate and report without writing or renaming files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write the run summary as JSON to this path.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

/// DataSet token separator choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum SeparatorArg {
    Pipe,
    Underscore,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
