//! Previews and exports for consolidated HIS tables and validation results.
//!
//! - **Preview**: bounded, JSON-serializable view of a validation result
//! - **CSV**: UTF-8 with a byte-order mark
//! - **Spreadsheet**: SpreadsheetML 2003 workbook with typed date cells
//! - **Error report**: presentation columns of the flagged rows

mod delimited;
mod error;
mod export;
mod preview;
mod spreadsheet;

pub use delimited::write_csv;
pub use error::{ReportError, Result};
pub use export::{
    ExportFormat, error_report_table, export_table, report_column_widths, write_error_report,
};
pub use preview::{
    DEFAULT_PREVIEW_LIMIT, Preview, presentation_columns, preview_outcome, preview_table,
};
pub use spreadsheet::{
    DATE_FORMAT, DATETIME_FORMAT, SheetOptions, render_workbook, write_spreadsheet,
};
