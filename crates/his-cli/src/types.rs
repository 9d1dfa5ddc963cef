use std::path::PathBuf;

use his_model::MasterRole;
use his_report::{ExportFormat, Preview};
use his_transform::JoinRecord;
use his_validate::FilterSelection;

#[derive(Debug)]
pub struct ConsolidateResult {
    pub output: PathBuf,
    pub format: ExportFormat,
    pub input_rows: usize,
    pub rows: usize,
    pub columns: usize,
    pub upload_files: usize,
    pub transaction_files: usize,
    pub master_roles: Vec<MasterRole>,
    pub unknown_files: Vec<PathBuf>,
    pub joins: Vec<JoinRecord>,
}

#[derive(Debug)]
pub struct ValidateResult {
    pub selection: FilterSelection,
    pub preview: Preview,
    pub errors_out: Option<PathBuf>,
}
