//! Error types for HIS extract ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading uploads and reference files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the scratch directory for extracted uploads.
    #[error("failed to create scratch directory: {source}")]
    ScratchDir {
        #[source]
        source: std::io::Error,
    },

    // === Decoding and Parsing Errors ===
    /// File is neither valid UTF-8 nor valid Windows-1252.
    #[error("file {path} could not be decoded as UTF-8 or Windows-1252")]
    Undecodable { path: PathBuf },

    /// Failed to parse delimited text.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has no header line.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    // === Upload Errors ===
    /// Upload archive is not a readable ZIP file.
    #[error("failed to read archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// No transaction files were given to the merger.
    #[error("no transaction files to merge")]
    NoTransactionFiles,

    /// A transaction file does not have the same number of columns as the first one.
    #[error("transaction file {path} has {found} columns, expected {expected}")]
    SchemaMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/MAESTRO_HIS_PAIS.csv"),
        };
        assert_eq!(
            err.to_string(),
            "CSV file not found: /data/MAESTRO_HIS_PAIS.csv"
        );

        let err = IngestError::SchemaMismatch {
            path: PathBuf::from("trama_02.csv"),
            expected: 40,
            found: 39,
        };
        assert_eq!(
            err.to_string(),
            "transaction file trama_02.csv has 39 columns, expected 40"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("Id_Cita".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
