//! Delimited text export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use polars::prelude::{AnyValue, DataFrame};
use tracing::info;

use his_common::any_to_string;

use crate::error::{ReportError, Result};

/// Byte-order mark so spreadsheet tools detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes `df` as comma-separated UTF-8 text with a byte-order mark.
///
/// Nulls are written as empty fields and dates as ISO text.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_error = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM).map_err(io_error)?;

    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(df.get_column_names().iter().map(|name| name.as_str()))
        .map_err(csv_error)?;
    let columns = df.get_columns();
    let mut record = Vec::with_capacity(columns.len());
    for idx in 0..df.height() {
        record.clear();
        record.extend(
            columns
                .iter()
                .map(|column| any_to_string(column.get(idx).unwrap_or(AnyValue::Null))),
        );
        writer.write_record(&record).map_err(csv_error)?;
    }
    writer.flush().map_err(io_error)?;
    info!(path = %path.display(), rows = df.height(), columns = df.width(), "CSV written");
    Ok(())
}
