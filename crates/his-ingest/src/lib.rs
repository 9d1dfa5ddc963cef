//! HIS extract ingestion.
//!
//! This crate turns uploaded files into string-typed Polars DataFrames:
//!
//! - **Uploads**: expand directories and ZIP archives into CSV files
//! - **Loading**: decode UTF-8 or Windows-1252, detect the delimiter, repair
//!   mis-encoded Spanish text and clean every cell
//! - **Classification**: tell transaction files apart from registrar, patient
//!   and personnel masters
//! - **Merging**: stack monthly transaction files into one table
//!
//! # Example
//!
//! ```ignore
//! use his_ingest::{RepairTable, UploadSet, classify_uploads, merge_transactions};
//!
//! let uploads = UploadSet::collect(&inputs)?;
//! let classified = classify_uploads(uploads.files());
//! let plano = merge_transactions(&classified.transactions, &RepairTable::default())?;
//! ```

mod classify;
mod encoding;
mod error;
mod loader;
mod merge;
mod repair;
mod uploads;

// === Error Types ===
pub use error::{IngestError, Result};

// === Loading ===
pub use encoding::{TextEncoding, decode_text, misread_as_windows_1252};
pub use loader::{
    LoadOptions, LoadedTable, ZERO_PAD_WIDTH, clean_cell, detect_delimiter, load_table,
    read_sample, zero_pad,
};
pub use repair::RepairTable;

// === Classification and Merging ===
pub use classify::{
    Classification, ClassifiedUploads, SAMPLE_ROWS, classify, classify_file, classify_name,
    classify_uploads,
};
pub use merge::{ESTABLISHMENT_ID, merge_transactions};

// === Uploads ===
pub use uploads::{UploadSet, list_csv_files};
