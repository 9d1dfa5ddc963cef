use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{Level, info, info_span, trace};

use his_cli::logging::redact_value;
use his_cli::pipeline::{consolidate_inputs, load_upload, run_selection, selection_from_flags};
use his_ingest::RepairTable;
use his_model::{FilterKind, VISIT_ID};
use his_report::{ExportFormat, Preview, export_table, preview_outcome, write_error_report};
use his_transform::DeriveOptions;
use his_validate::ERROR_COLUMN;

use crate::cli::{ConsolidateArgs, ValidateArgs};
use crate::summary::{apply_table_style, header_cell};
use crate::types::{ConsolidateResult, ValidateResult};

pub fn run_filters() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Filter"),
        header_cell("Kind"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for kind in FilterKind::ALL {
        let group = if kind.is_quality_filter() {
            "data quality"
        } else {
            "rule group"
        };
        table.add_row(vec![kind.as_str(), group, kind.description()]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_consolidate(args: &ConsolidateArgs) -> Result<ConsolidateResult> {
    let _span = info_span!("consolidate_command", inputs = args.inputs.len()).entered();
    let format = ExportFormat::from(args.format);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("consolidado.{}", format.extension())));

    let run = consolidate_inputs(
        &args.inputs,
        &args.masters_dir,
        &RepairTable::default(),
        &DeriveOptions::default(),
    )?;
    let data = &run.consolidation.data;

    {
        let _span = info_span!("export", path = %output.display(), %format).entered();
        export_table(data, &output, format)
            .with_context(|| format!("write {}", output.display()))?;
        info!(rows = data.height(), "wrote consolidated table");
    }

    Ok(ConsolidateResult {
        output,
        format,
        input_rows: run.consolidation.input_rows,
        rows: data.height(),
        columns: data.width(),
        upload_files: run.upload_files,
        transaction_files: run.transaction_files,
        master_roles: run.master_roles,
        unknown_files: run.unknown_files,
        joins: run.consolidation.joins,
    })
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidateResult> {
    let selection = selection_from_flags(args.filter, args.all)?;
    let _span = info_span!("validate_command", path = %args.file.display(), %selection).entered();

    let df = load_upload(&args.file, &RepairTable::default())?;
    let outcome = run_selection(&df, selection)?;
    info!(flagged = outcome.len(), "validation complete");

    let preview = preview_outcome(&outcome, args.limit);
    log_flagged_rows(&preview);

    let errors_out = match &args.errors_out {
        Some(path) => {
            let format = ExportFormat::from_path(path)
                .with_context(|| format!("choose a format for {}", path.display()))?;
            write_error_report(&outcome, path, format)
                .with_context(|| format!("write error report {}", path.display()))?;
            info!(path = %path.display(), rows = outcome.len(), "wrote error report");
            Some(path.clone())
        }
        None => None,
    };

    Ok(ValidateResult {
        selection,
        preview,
        errors_out,
    })
}

fn log_flagged_rows(preview: &Preview) {
    if !tracing::enabled!(Level::TRACE) {
        return;
    }
    let position = |name: &str| preview.columns.iter().position(|column| column == name);
    let (Some(visit), Some(error)) = (position(VISIT_ID), position(ERROR_COLUMN)) else {
        return;
    };
    for row in &preview.data {
        trace!(
            visit = redact_value(&row[visit]),
            error = %row[error],
            "flagged row"
        );
    }
}
