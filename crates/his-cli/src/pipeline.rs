//! Pipeline stages shared by the CLI commands.
//!
//! Each stage runs inside an `info_span!` and adds file context to its
//! errors; the commands only decide where results go.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use his_ingest::{LoadOptions, RepairTable, UploadSet, classify_uploads, load_table};
use his_model::{FilterKind, MasterRole};
use his_transform::{
    Consolidation, DeriveOptions, DynamicMasters, StaticMasters, build_consolidated,
    load_transactions, prepare_upload,
};
use his_validate::{FilterOutcome, FilterSelection};

/// Consolidated table plus what was found in the uploads.
#[derive(Debug)]
pub struct ConsolidationRun {
    pub consolidation: Consolidation,
    pub upload_files: usize,
    pub transaction_files: usize,
    pub master_roles: Vec<MasterRole>,
    pub unknown_files: Vec<PathBuf>,
}

/// Expands the uploads, loads every master and builds the Final Schema table.
///
/// Extracted archive members live in a scratch directory that is removed
/// before this returns.
pub fn consolidate_inputs(
    inputs: &[PathBuf],
    masters_dir: &Path,
    repair: &RepairTable,
    options: &DeriveOptions,
) -> Result<ConsolidationRun> {
    let uploads = {
        let _span = info_span!("ingest", inputs = inputs.len()).entered();
        let uploads = UploadSet::collect(inputs).context("collect uploads")?;
        if uploads.is_empty() {
            bail!("no CSV files found in the uploads");
        }
        info!(files = uploads.files().len(), "collected uploads");
        uploads
    };
    let classified = classify_uploads(uploads.files());
    if !classified.unknown.is_empty() {
        warn!(
            count = classified.unknown.len(),
            "some uploads were not recognized and will be ignored"
        );
    }

    let statics = {
        let _span = info_span!("static_masters", dir = %masters_dir.display()).entered();
        StaticMasters::load(masters_dir, repair).with_context(|| {
            format!("load static masters from {}", masters_dir.display())
        })?
    };
    let dynamics = DynamicMasters::load(&classified, repair).context("load uploaded masters")?;
    let transactions =
        load_transactions(&classified, repair).context("merge transaction files")?;

    let consolidation = {
        let _span = info_span!("consolidate", rows = transactions.height()).entered();
        let start = Instant::now();
        let consolidation = build_consolidated(transactions, &statics, &dynamics, options)
            .context("build consolidated table")?;
        info!(
            rows = consolidation.data.height(),
            columns = consolidation.data.width(),
            joined = consolidation.joined().count(),
            skipped = consolidation.skipped().count(),
            duration_ms = start.elapsed().as_millis(),
            "consolidation complete"
        );
        consolidation
    };

    Ok(ConsolidationRun {
        consolidation,
        upload_files: uploads.files().len(),
        transaction_files: classified.transactions.len(),
        master_roles: classified.masters.keys().copied().collect(),
        unknown_files: classified.unknown,
    })
}

/// Loads a consolidated file the user wants validated and prepares it for
/// the rule engine (full names, formatted age, display dates).
pub fn load_upload(path: &Path, repair: &RepairTable) -> Result<DataFrame> {
    let _span = info_span!("load_upload", path = %path.display()).entered();
    let loaded = load_table(path, &LoadOptions::new(), repair)
        .with_context(|| format!("load {}", path.display()))?;
    info!(
        rows = loaded.data.height(),
        columns = loaded.data.width(),
        encoding = loaded.encoding.label(),
        "loaded upload"
    );
    prepare_upload(loaded.data).with_context(|| format!("prepare {}", path.display()))
}

/// Runs the selected rule group (or every group) over a prepared table.
pub fn run_selection(df: &DataFrame, selection: FilterSelection) -> Result<FilterOutcome> {
    let outcome = match selection {
        FilterSelection::One(kind) => his_validate::validate(df, kind),
        FilterSelection::AllRuleGroups => his_validate::validate_all(df),
    };
    outcome.with_context(|| format!("run validation '{selection}'"))
}

/// Picks the selection from the `--filter` / `--all` flags.
pub fn selection_from_flags(filter: Option<FilterKind>, all: bool) -> Result<FilterSelection> {
    match (filter, all) {
        (Some(kind), false) => Ok(FilterSelection::One(kind)),
        (None, true) => Ok(FilterSelection::AllRuleGroups),
        (Some(_), true) => bail!("--filter and --all cannot be combined"),
        (None, false) => bail!("either --filter or --all is required"),
    }
}
