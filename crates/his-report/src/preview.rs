//! Bounded preview of a validation result, shaped for JSON transport.

use polars::prelude::{AnyValue, DataFrame};
use serde::Serialize;

use his_common::{any_to_string, is_null_sentinel};
use his_model::PRESENTATION_COLUMNS;
use his_validate::{FILTER_COLUMN, FilterOutcome};

/// Rows shown when the caller does not ask for a limit.
pub const DEFAULT_PREVIEW_LIMIT: usize = 100;

/// Preview of a table: presentation columns and at most `limit` rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub data: Vec<Vec<String>>,
    pub total_records: usize,
    pub shown_records: usize,
}

impl Preview {
    pub fn is_truncated(&self) -> bool {
        self.shown_records < self.total_records
    }
}

/// Columns of `df` shown to users: the presentation columns in their fixed
/// order, then `Tipo_Filtro` for combined results. Tables that share none of
/// the presentation columns are shown whole.
pub fn presentation_columns(df: &DataFrame) -> Vec<String> {
    let names: Vec<&str> = df.get_column_names().iter().map(|name| name.as_str()).collect();
    let mut columns: Vec<String> = PRESENTATION_COLUMNS
        .iter()
        .chain(std::iter::once(&FILTER_COLUMN))
        .filter(|column| names.contains(*column))
        .map(|column| (*column).to_string())
        .collect();
    if columns.is_empty() {
        columns = names.iter().map(|name| (*name).to_string()).collect();
    }
    columns
}

/// Builds the preview of a table, showing at most `limit` rows.
pub fn preview_table(df: &DataFrame, limit: usize) -> Preview {
    let columns = presentation_columns(df);
    let shown = df.height().min(limit);
    let selected: Vec<_> = columns
        .iter()
        .filter_map(|name| df.column(name).ok())
        .collect();
    let data = (0..shown)
        .map(|idx| {
            selected
                .iter()
                .map(|column| display_cell(column.get(idx).unwrap_or(AnyValue::Null)))
                .collect()
        })
        .collect();
    Preview {
        columns,
        data,
        total_records: df.height(),
        shown_records: shown,
    }
}

pub fn preview_outcome(outcome: &FilterOutcome, limit: usize) -> Preview {
    preview_table(&outcome.table, limit)
}

fn display_cell(value: AnyValue<'_>) -> String {
    let text = any_to_string(value);
    if is_null_sentinel(&text) {
        String::new()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn preview_limits_rows_and_blanks_sentinels() {
        let df = df! {
            "Extra" => ["x", "y", "z"],
            "Valor_Lab" => ["nan", "N", "None"],
            "Id_Cita" => ["1", "2", "3"],
            "Error" => ["e1", "e2", "e3"],
        }
        .unwrap();
        let preview = preview_table(&df, 2);
        assert_eq!(preview.columns, vec!["Id_Cita", "Valor_Lab", "Error"]);
        assert_eq!(preview.data, vec![vec!["1", "", "e1"], vec!["2", "N", "e2"]]);
        assert_eq!(preview.total_records, 3);
        assert_eq!(preview.shown_records, 2);
        assert!(preview.is_truncated());
    }

    #[test]
    fn typed_columns_are_stringified() {
        let df = df! {
            "Id_Cita" => ["1", "2"],
            "Hemoglobina" => [Some(11.5), None],
            "Anio" => [Some(2024i64), Some(2023)],
        }
        .unwrap();
        let preview = preview_table(&df, DEFAULT_PREVIEW_LIMIT);
        assert_eq!(preview.columns, vec!["Id_Cita", "Anio", "Hemoglobina"]);
        assert_eq!(preview.data[0], vec!["1", "2024", "11.5"]);
        assert_eq!(preview.data[1], vec!["2", "2023", ""]);
    }

    #[test]
    fn unrelated_tables_are_shown_whole() {
        let df = df! { "a" => ["1"], "b" => ["2"] }.unwrap();
        assert_eq!(preview_table(&df, 10).columns, vec!["a", "b"]);
    }
}
