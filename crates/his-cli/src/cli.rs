//! CLI argument definitions for the HIS consolidator.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use his_model::FilterKind;
use his_report::{DEFAULT_PREVIEW_LIMIT, ExportFormat};

#[derive(Parser)]
#[command(
    name = "his",
    version,
    about = "HIS consolidator - merge HIS extracts and flag coding errors",
    long_about = "Consolidate HIS transaction files (trama/plano) with their masters into one \
                  record per visit row.\n\n\
                  Validate consolidated files against the coding rules of each health program \
                  and export the flagged rows."
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

    /// Allow patient values (visit ids, documents) in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Consolidate uploaded extracts into one table.
    Consolidate(ConsolidateArgs),

    /// Run a validation rule group over a consolidated file.
    Validate(ValidateArgs),

    /// List the validation rule groups and data-quality filters.
    Filters,
}

#[derive(Parser)]
pub struct ConsolidateArgs {
    /// CSV files, ZIP archives or directories with the trama and master uploads.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory holding the static MAESTRO_* reference files.
    #[arg(long = "masters-dir", value_name = "DIR", default_value = "data")]
    pub masters_dir: PathBuf,

    /// Export format for the consolidated table.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: ExportFormatArg,

    /// Output file (default: consolidado.csv or consolidado.xml).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
#[command(group(
    ArgGroup::new("selection")
        .required(true)
        .args(["filter", "all"])
))]
pub struct ValidateArgs {
    /// Consolidated CSV file to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Rule group or data-quality filter to run (see `his filters`).
    #[arg(long = "filter", value_name = "NAME", value_parser = parse_filter_arg)]
    pub filter: Option<FilterKind>,

    /// Run every rule group and tag each row with its group.
    #[arg(long = "all")]
    pub all: bool,

    /// Maximum number of rows in the preview.
    #[arg(long = "limit", default_value_t = DEFAULT_PREVIEW_LIMIT)]
    pub limit: usize,

    /// Print the preview as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,

    /// Write the error report of this run to a file (.csv or .xml).
    #[arg(long = "errors-out", value_name = "PATH")]
    pub errors_out: Option<PathBuf>,
}

/// Unknown names surface as usage errors.
fn parse_filter_arg(value: &str) -> Result<FilterKind, String> {
    his_validate::parse_filter(value).map_err(|error| error.to_string())
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormatArg {
    Csv,
    /// SpreadsheetML workbook (opens in Excel or LibreOffice).
    Spreadsheet,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(value: ExportFormatArg) -> Self {
        match value {
            ExportFormatArg::Csv => ExportFormat::Csv,
            ExportFormatArg::Spreadsheet => ExportFormat::Spreadsheet,
        }
    }
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
