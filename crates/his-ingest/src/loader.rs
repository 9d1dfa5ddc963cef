//! Tabular loader: delimited text into an all-text Polars `DataFrame`.
//!
//! Every cell stays text. Typing happens later, once the consolidated table
//! has its final shape.

use std::path::Path;

use polars::prelude::*;

use his_common::string_column;
use his_model::{BOM_CORRUPTED_VISIT_ID, StaticMasterDescriptor, VISIT_ID};

use crate::encoding::{TextEncoding, decode_text};
use crate::error::{IngestError, Result};
use crate::repair::RepairTable;

/// Delimiters in detection priority order.
const DELIMITER_PRIORITY: [u8; 3] = [b';', b',', b'\t'];

/// Width `zero_pad_column` values are left-padded to.
pub const ZERO_PAD_WIDTH: usize = 6;

/// How a file should be shaped after reading.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Columns guaranteed present after load (synthesized empty if absent).
    pub expected_columns: Vec<String>,
    /// `(old, new)` column renames applied after header cleanup.
    pub rename_map: Vec<(String, String)>,
    /// Column whose values are left-padded with `0` to six characters.
    pub zero_pad_column: Option<String>,
    /// Name columns by position from `expected_columns`, treating the header
    /// line as data.
    pub positional: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a static reference file. Post-join renames are not applied
    /// here; the consolidation engine applies them to the joined table.
    pub fn for_static(descriptor: &StaticMasterDescriptor) -> Self {
        Self {
            expected_columns: descriptor.columns.iter().map(|c| c.to_string()).collect(),
            rename_map: Vec::new(),
            zero_pad_column: descriptor.zero_pad.map(str::to_string),
            positional: descriptor.positional,
        }
    }

    pub fn with_expected_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename_map.push((from.into(), to.into()));
        self
    }

    pub fn with_zero_pad(mut self, column: impl Into<String>) -> Self {
        self.zero_pad_column = Some(column.into());
        self
    }

    pub fn positional(mut self, positional: bool) -> Self {
        self.positional = positional;
        self
    }
}

/// A loaded file and how it was read.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub data: DataFrame,
    pub delimiter: u8,
    pub encoding: TextEncoding,
}

/// Picks the delimiter from the first line: `;`, then `,`, then tab, and `,`
/// when none of them appears.
pub fn detect_delimiter(first_line: &str) -> u8 {
    DELIMITER_PRIORITY
        .into_iter()
        .find(|delimiter| first_line.as_bytes().contains(delimiter))
        .unwrap_or(b',')
}

/// Loads a delimited file.
///
/// The file is decoded as UTF-8, or as Windows-1252 when that fails. Column
/// names are trimmed, the Latin-1 byte-order-mark variant of `Id_Cita` is
/// repaired, renames and zero padding are applied, expected columns are
/// guaranteed, and every cell is trimmed, cleared of `nan` sentinels, stripped
/// of a float-style `.0` suffix and passed through the repair table.
pub fn load_table(path: &Path, options: &LoadOptions, repair: &RepairTable) -> Result<LoadedTable> {
    let (text, encoding) = read_text(path)?;
    let delimiter = detect_delimiter(text.lines().next().unwrap_or_default());
    tracing::debug!(
        path = %path.display(),
        delimiter = %char::from(delimiter).escape_default(),
        encoding = %encoding,
        "detected file layout"
    );

    let records = parse_records(path, &text, delimiter, None)?;
    let (mut names, mut columns) = if options.positional && !options.expected_columns.is_empty() {
        shape_positional(records, &options.expected_columns)
    } else {
        shape_with_header(path, records)?
    };

    normalize_names(&mut names);
    apply_renames(path, &mut names, &options.rename_map);

    if let Some(pad_column) = &options.zero_pad_column
        && let Some(idx) = names.iter().position(|name| name == pad_column)
    {
        for value in &mut columns[idx] {
            *value = zero_pad(value);
        }
    }

    if !options.positional {
        let height = columns.first().map(Vec::len).unwrap_or(0);
        for expected in &options.expected_columns {
            if !names.contains(expected) {
                names.push(expected.clone());
                columns.push(vec![String::new(); height]);
            }
        }
    }

    for column in &mut columns {
        for value in column.iter_mut() {
            *value = clean_cell(value, repair);
        }
    }

    let data = build_frame(names, columns)?;
    tracing::info!(
        path = %path.display(),
        rows = data.height(),
        columns = data.width(),
        encoding = %encoding,
        "loaded file"
    );
    Ok(LoadedTable {
        data,
        delimiter,
        encoding,
    })
}

/// Reads the header and up to `rows` data rows, without cell cleanup.
///
/// Used to classify uploads by column signature.
pub fn read_sample(path: &Path, rows: usize) -> Result<DataFrame> {
    let (text, _) = read_text(path)?;
    let delimiter = detect_delimiter(text.lines().next().unwrap_or_default());
    let records = parse_records(path, &text, delimiter, Some(rows + 1))?;
    let (mut names, columns) = shape_with_header(path, records)?;
    normalize_names(&mut names);
    build_frame(names, columns)
}

fn read_text(path: &Path) -> Result<(String, TextEncoding)> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    decode_text(&bytes).ok_or_else(|| IngestError::Undecodable {
        path: path.to_path_buf(),
    })
}

fn parse_records(
    path: &Path,
    text: &str,
    delimiter: u8,
    limit: Option<usize>,
) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }
        records.push(record.iter().map(str::to_string).collect());
        if limit.is_some_and(|limit| records.len() >= limit) {
            break;
        }
    }
    Ok(records)
}

type Shaped = (Vec<String>, Vec<Vec<String>>);

fn shape_with_header(path: &Path, records: Vec<Vec<String>>) -> Result<Shaped> {
    let mut rows = records.into_iter();
    let header = rows.next().ok_or_else(|| IngestError::EmptyCsv {
        path: path.to_path_buf(),
    })?;
    let names = dedupe_names(header);
    let width = names.len();
    let mut columns = vec![Vec::new(); width];
    let mut ragged = 0usize;
    for row in rows {
        if row.len() != width {
            ragged += 1;
        }
        push_row(&mut columns, row);
    }
    if ragged > 0 {
        tracing::warn!(
            path = %path.display(),
            rows = ragged,
            "rows with a different field count than the header were padded or truncated"
        );
    }
    Ok((names, columns))
}

fn shape_positional(records: Vec<Vec<String>>, expected: &[String]) -> Shaped {
    let mut columns = vec![Vec::with_capacity(records.len()); expected.len()];
    for row in records {
        push_row(&mut columns, row);
    }
    (expected.to_vec(), columns)
}

fn push_row(columns: &mut [Vec<String>], row: Vec<String>) {
    let mut fields = row.into_iter();
    for column in columns.iter_mut() {
        column.push(fields.next().unwrap_or_default());
    }
}

/// Makes header names unique the way spreadsheet tools do: `X`, `X.1`, `X.2`.
fn dedupe_names(header: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(header.len());
    for name in header {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        seen.push(candidate);
    }
    seen
}

fn normalize_names(names: &mut [String]) {
    for name in names.iter_mut() {
        let trimmed = name.trim().trim_start_matches('\u{feff}').trim();
        *name = if trimmed == BOM_CORRUPTED_VISIT_ID {
            tracing::debug!("repaired byte-order-mark prefix on {VISIT_ID}");
            VISIT_ID.to_string()
        } else {
            trimmed.to_string()
        };
    }
}

fn apply_renames(path: &Path, names: &mut [String], renames: &[(String, String)]) {
    for (from, to) in renames {
        if names.contains(to) {
            continue;
        }
        if let Some(name) = names.iter_mut().find(|name| *name == from) {
            tracing::debug!(path = %path.display(), from = %from, to = %to, "renamed column");
            *name = to.clone();
        }
    }
}

/// Left-pads with `0` to [`ZERO_PAD_WIDTH`] characters.
pub fn zero_pad(value: &str) -> String {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len >= ZERO_PAD_WIDTH {
        trimmed.to_string()
    } else {
        format!("{}{trimmed}", "0".repeat(ZERO_PAD_WIDTH - len))
    }
}

/// Cell cleanup applied to every loaded value.
pub fn clean_cell(value: &str, repair: &RepairTable) -> String {
    let trimmed = value.trim();
    if trimmed == "nan" {
        return String::new();
    }
    let unfloated = strip_float_suffix(trimmed);
    if repair.is_empty() {
        return unfloated.to_string();
    }
    repair.apply(unfloated).trim().to_string()
}

/// `"123.0"` becomes `"123"`; anything else is returned as is.
fn strip_float_suffix(value: &str) -> &str {
    match value.strip_suffix(".0") {
        Some(head)
            if !head.is_empty()
                && head
                    .strip_prefix('-')
                    .unwrap_or(head)
                    .bytes()
                    .all(|b| b.is_ascii_digit())
                && head != "-" =>
        {
            head
        }
        _ => value,
    }
}

fn build_frame(names: Vec<String>, columns: Vec<Vec<String>>) -> Result<DataFrame> {
    let columns: Vec<Column> = names
        .iter()
        .zip(columns)
        .map(|(name, values)| string_column(name, values))
        .collect();
    Ok(DataFrame::new(columns)?)
}
