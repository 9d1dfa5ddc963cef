//! Error types for validation.

use thiserror::Error;

/// Errors returned by the validation entry points.
///
/// Rule predicates never fail; a rule whose columns are absent is skipped.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The requested filter name is not a known rule group or data-quality
    /// filter. This is a caller mistake, not a pipeline failure.
    #[error("unknown validation filter '{name}'")]
    UnknownFilter { name: String },

    /// A data-quality filter needs a column the table does not have.
    #[error("filter '{filter}' requires column '{column}'")]
    MissingColumn { filter: String, column: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for ValidationError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;
