//! Export of consolidated tables and validation error reports.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use polars::prelude::{AnyValue, DataFrame};
use serde::Serialize;

use his_common::any_to_string;
use his_validate::FilterOutcome;

use crate::delimited::write_csv;
use crate::error::{ReportError, Result};
use crate::preview::presentation_columns;
use crate::spreadsheet::{SheetOptions, write_spreadsheet};

/// Widest error report column, in characters.
const MAX_COLUMN_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    /// SpreadsheetML 2003 workbook.
    Spreadsheet,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xml",
        }
    }

    /// Format implied by a file extension. `.xls` is accepted for the
    /// workbook since that is what users double-click.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xml" | "xls" => Ok(ExportFormat::Spreadsheet),
            _ => Err(ReportError::UnsupportedFormat { name: extension }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "spreadsheet" | "excel" | "xml" => Ok(ExportFormat::Spreadsheet),
            other => Err(ReportError::UnsupportedFormat {
                name: other.to_string(),
            }),
        }
    }
}

/// Writes the consolidated table in the requested format.
pub fn export_table(df: &DataFrame, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(df, path),
        ExportFormat::Spreadsheet => write_spreadsheet(df, path, &SheetOptions::default()),
    }
}

/// The error report table: presentation columns of the flagged rows,
/// `Error` included.
pub fn error_report_table(outcome: &FilterOutcome) -> Result<DataFrame> {
    let columns = presentation_columns(&outcome.table);
    Ok(outcome.table.select(columns)?)
}

/// Column widths of the error report: longest value or header plus two,
/// capped at fifty characters.
pub fn report_column_widths(df: &DataFrame) -> Vec<usize> {
    df.get_columns()
        .iter()
        .map(|column| {
            let longest = (0..df.height())
                .map(|idx| {
                    any_to_string(column.get(idx).unwrap_or(AnyValue::Null))
                        .chars()
                        .count()
                })
                .max()
                .unwrap_or(0)
                .max(column.name().chars().count());
            (longest + 2).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Writes the error report of a validation run.
pub fn write_error_report(outcome: &FilterOutcome, path: &Path, format: ExportFormat) -> Result<()> {
    let table = error_report_table(outcome)?;
    match format {
        ExportFormat::Csv => write_csv(&table, path),
        ExportFormat::Spreadsheet => {
            let options =
                SheetOptions::new("Errores").with_column_widths(report_column_widths(&table));
            write_spreadsheet(&table, path, &options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use his_model::FilterKind;
    use his_validate::FilterSelection;
    use polars::prelude::*;
    use std::path::PathBuf;

    fn outcome() -> FilterOutcome {
        let table = df! {
            "Descripcion_Item" => ["CONSEJERIA"],
            "Error" => ["El tipo de Diagnostico no puede ser R"],
            "Codigo_Item" => ["99403"],
            "Id_Cita" => ["77"],
        }
        .unwrap();
        FilterOutcome {
            selection: FilterSelection::One(FilterKind::Generales),
            table,
        }
    }

    #[test]
    fn report_keeps_presentation_columns_in_order() {
        let table = error_report_table(&outcome()).unwrap();
        let names: Vec<&str> = table.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["Id_Cita", "Codigo_Item", "Error"]);
    }

    #[test]
    fn widths_are_capped() {
        let table = error_report_table(&outcome()).unwrap();
        assert_eq!(report_column_widths(&table), vec![9, 13, 39]);
        let long = df! { "Error" => ["x".repeat(80)] }.unwrap();
        assert_eq!(report_column_widths(&long), vec![50]);
    }

    #[test]
    fn formats_from_names_and_paths() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Spreadsheet);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(
            ExportFormat::from_path(&PathBuf::from("errores.XLS")).unwrap(),
            ExportFormat::Spreadsheet
        );
        assert!(ExportFormat::from_path(&PathBuf::from("errores")).is_err());
    }
}
