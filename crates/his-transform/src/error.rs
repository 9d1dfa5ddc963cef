//! Error types for consolidation.

use std::path::PathBuf;

use his_ingest::IngestError;
use his_model::{MasterRole, StaticMaster};
use thiserror::Error;

/// Failures that abort a consolidation run.
///
/// Skipped joins and unparseable cells are not errors; they are logged and
/// the run continues.
#[derive(Debug, Error)]
pub enum ConsolidationError {
    /// A static master file is absent from the masters directory.
    #[error("static master '{master}' not found at {path}")]
    MissingStaticMaster { master: StaticMaster, path: PathBuf },

    /// A static master file exists but could not be read.
    #[error("failed to load static master '{master}' from {path}: {source}")]
    StaticMasterLoad {
        master: StaticMaster,
        path: PathBuf,
        #[source]
        source: IngestError,
    },

    /// An uploaded dynamic master could not be read.
    #[error("failed to load {role} master from {path}: {source}")]
    DynamicMasterLoad {
        role: MasterRole,
        path: PathBuf,
        #[source]
        source: IngestError,
    },

    /// No transaction (trama) file was uploaded.
    #[error("no transaction (trama/plano) files were uploaded")]
    MissingTransactions,

    /// Transaction files could not be merged.
    #[error("failed to merge transaction files: {0}")]
    Merge(#[source] IngestError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for ConsolidationError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for consolidation operations.
pub type Result<T> = std::result::Result<T, ConsolidationError>;
