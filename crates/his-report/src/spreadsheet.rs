//! SpreadsheetML 2003 workbook export.
//!
//! The workbook is a single XML document that Excel and LibreOffice open
//! directly. Datetime columns are written as typed dates with a date-only or
//! date-time number format; numeric columns as numbers; everything else as
//! text.

use std::fs;
use std::io::Write;
use std::path::Path;

use polars::prelude::{AnyValue, Column, DataFrame, DataType};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::info;

use his_common::{any_to_datetime, any_to_string};
use his_model::TIMESTAMP_COLUMNS;

use crate::error::{ReportError, Result};

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";
const OFFICE_NS: &str = "urn:schemas-microsoft-com:office:office";
const EXCEL_NS: &str = "urn:schemas-microsoft-com:office:excel";
const HTML_NS: &str = "http://www.w3.org/TR/REC-html40";

const HEADER_STYLE: &str = "header";
const DATE_STYLE: &str = "date";
const DATETIME_STYLE: &str = "datetime";

/// Number format of date-only columns.
pub const DATE_FORMAT: &str = "yyyy-mm-dd";
/// Number format of `Fecha_Registro` and `Fecha_Modificacion`.
pub const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Approximate width of one character in points.
const POINTS_PER_CHAR: f64 = 7.0;

/// Sheet layout options.
#[derive(Debug, Clone)]
pub struct SheetOptions {
    pub sheet_name: String,
    /// Column widths in characters, one per column.
    pub column_widths: Option<Vec<usize>>,
}

impl SheetOptions {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            column_widths: None,
        }
    }

    pub fn with_column_widths(mut self, widths: Vec<usize>) -> Self {
        self.column_widths = Some(widths);
        self
    }
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self::new("Consolidado")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Text,
    Number,
    Date,
    DateTime,
}

fn cell_kind(column: &Column) -> CellKind {
    match column.dtype() {
        DataType::Datetime(..) | DataType::Date => {
            if TIMESTAMP_COLUMNS.contains(&column.name().as_str()) {
                CellKind::DateTime
            } else {
                CellKind::Date
            }
        }
        dtype if dtype.is_numeric() => CellKind::Number,
        _ => CellKind::Text,
    }
}

/// Writes `df` as a one-sheet SpreadsheetML workbook.
pub fn write_spreadsheet(df: &DataFrame, path: &Path, options: &SheetOptions) -> Result<()> {
    let bytes = render_workbook(df, options)?;
    fs::write(path, bytes).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = df.height(), columns = df.width(), "spreadsheet written");
    Ok(())
}

/// Renders the workbook XML in memory.
pub fn render_workbook(df: &DataFrame, options: &SheetOptions) -> Result<Vec<u8>> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 1);
    emit(&mut xml, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("Workbook");
    root.push_attribute(("xmlns", SPREADSHEET_NS));
    root.push_attribute(("xmlns:o", OFFICE_NS));
    root.push_attribute(("xmlns:x", EXCEL_NS));
    root.push_attribute(("xmlns:ss", SPREADSHEET_NS));
    root.push_attribute(("xmlns:html", HTML_NS));
    emit(&mut xml, Event::Start(root))?;

    write_styles(&mut xml)?;

    let mut sheet = BytesStart::new("Worksheet");
    sheet.push_attribute(("ss:Name", options.sheet_name.as_str()));
    emit(&mut xml, Event::Start(sheet))?;
    emit(&mut xml, Event::Start(BytesStart::new("Table")))?;

    if let Some(widths) = &options.column_widths {
        for width in widths {
            let points = format!("{:.1}", *width as f64 * POINTS_PER_CHAR);
            let mut column = BytesStart::new("Column");
            column.push_attribute(("ss:Width", points.as_str()));
            emit(&mut xml, Event::Empty(column))?;
        }
    }

    emit(&mut xml, Event::Start(BytesStart::new("Row")))?;
    for name in df.get_column_names() {
        write_cell(&mut xml, Some(HEADER_STYLE), "String", name.as_str())?;
    }
    emit(&mut xml, Event::End(BytesEnd::new("Row")))?;

    let columns = df.get_columns();
    let kinds: Vec<CellKind> = columns.iter().map(cell_kind).collect();
    for idx in 0..df.height() {
        emit(&mut xml, Event::Start(BytesStart::new("Row")))?;
        for (column, kind) in columns.iter().zip(&kinds) {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            write_value(&mut xml, *kind, value)?;
        }
        emit(&mut xml, Event::End(BytesEnd::new("Row")))?;
    }

    emit(&mut xml, Event::End(BytesEnd::new("Table")))?;
    emit(&mut xml, Event::End(BytesEnd::new("Worksheet")))?;
    emit(&mut xml, Event::End(BytesEnd::new("Workbook")))?;
    Ok(xml.into_inner())
}

fn write_styles<W: Write>(xml: &mut Writer<W>) -> Result<()> {
    emit(xml, Event::Start(BytesStart::new("Styles")))?;

    let mut header = BytesStart::new("Style");
    header.push_attribute(("ss:ID", HEADER_STYLE));
    emit(xml, Event::Start(header))?;
    let mut font = BytesStart::new("Font");
    font.push_attribute(("ss:Bold", "1"));
    emit(xml, Event::Empty(font))?;
    emit(xml, Event::End(BytesEnd::new("Style")))?;

    for (id, format) in [(DATE_STYLE, DATE_FORMAT), (DATETIME_STYLE, DATETIME_FORMAT)] {
        let mut style = BytesStart::new("Style");
        style.push_attribute(("ss:ID", id));
        emit(xml, Event::Start(style))?;
        let mut number_format = BytesStart::new("NumberFormat");
        number_format.push_attribute(("ss:Format", format));
        emit(xml, Event::Empty(number_format))?;
        emit(xml, Event::End(BytesEnd::new("Style")))?;
    }

    emit(xml, Event::End(BytesEnd::new("Styles")))
}

fn write_value<W: Write>(xml: &mut Writer<W>, kind: CellKind, value: AnyValue<'_>) -> Result<()> {
    if matches!(value, AnyValue::Null) {
        return emit(xml, Event::Empty(BytesStart::new("Cell")));
    }
    match kind {
        CellKind::Date | CellKind::DateTime => {
            let style = if kind == CellKind::Date {
                DATE_STYLE
            } else {
                DATETIME_STYLE
            };
            match any_to_datetime(value) {
                Some(datetime) => {
                    let text = datetime.format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
                    write_cell(xml, Some(style), "DateTime", &text)
                }
                None => emit(xml, Event::Empty(BytesStart::new("Cell"))),
            }
        }
        CellKind::Number => write_cell(xml, None, "Number", &any_to_string(value)),
        CellKind::Text => write_cell(xml, None, "String", &any_to_string(value)),
    }
}

fn write_cell<W: Write>(
    xml: &mut Writer<W>,
    style: Option<&str>,
    data_type: &str,
    text: &str,
) -> Result<()> {
    let mut cell = BytesStart::new("Cell");
    if let Some(style) = style {
        cell.push_attribute(("ss:StyleID", style));
    }
    emit(xml, Event::Start(cell))?;
    let mut data = BytesStart::new("Data");
    data.push_attribute(("ss:Type", data_type));
    emit(xml, Event::Start(data))?;
    emit(xml, Event::Text(BytesText::new(text)))?;
    emit(xml, Event::End(BytesEnd::new("Data")))?;
    emit(xml, Event::End(BytesEnd::new("Cell")))
}

fn emit<W: Write>(xml: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    xml.write_event(event).map_err(|err| ReportError::Xml {
        message: err.to_string(),
    })
}
