//! Row-wise, typed read access to a table under validation.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use polars::prelude::DataFrame;

use his_common::{column_strings, is_null_sentinel, parse_datetime, parse_f64, parse_i64};
use his_model::VISIT_ID;

/// Every column of a table as trimmed text, with typed views on demand.
///
/// Null cells and the textual null sentinels both read as `""`.
///
/// Integer, decimal and date reads parse the text the same way the Type
/// Normalizer does, so a consolidated table and a raw upload validate alike.
#[derive(Debug, Clone)]
pub struct RecordSet {
    height: usize,
    columns: HashMap<String, Vec<String>>,
    visit_column: Option<String>,
}

impl RecordSet {
    pub fn from_frame(df: &DataFrame) -> Self {
        let mut columns = HashMap::with_capacity(df.width());
        let mut visit_column = None;
        for name in df.get_column_names() {
            let name = name.as_str();
            if visit_column.is_none() && name.contains(VISIT_ID) {
                visit_column = Some(name.to_string());
            }
            if let Some(values) = column_strings(df, name) {
                let cleaned = values.into_iter().map(|v| clean(&v)).collect();
                columns.insert(name.to_string(), cleaned);
            }
        }
        Self {
            height: df.height(),
            columns,
            visit_column,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// First column whose name contains `Id_Cita`, which also covers headers
    /// carrying a stray byte-order mark.
    pub fn visit_column(&self) -> Option<&str> {
        self.visit_column.as_deref()
    }

    /// Visit identifier of every row. Without a visit column each row is its
    /// own visit.
    pub fn visit_ids(&self) -> Vec<String> {
        match self.visit_column.as_ref().and_then(|name| self.columns.get(name)) {
            Some(values) => values.clone(),
            None => (0..self.height).map(|idx| format!("__row_{idx}")).collect(),
        }
    }

    pub fn row(&self, idx: usize) -> Row<'_> {
        Row { set: self, idx }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.height).map(|idx| self.row(idx))
    }

    fn text(&self, column: &str, idx: usize) -> &str {
        self.columns
            .get(column)
            .and_then(|values| values.get(idx))
            .map_or("", String::as_str)
    }
}

fn clean(value: &str) -> String {
    if is_null_sentinel(value) {
        String::new()
    } else {
        value.trim().to_string()
    }
}

/// One row of a [`RecordSet`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    set: &'a RecordSet,
    idx: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.idx
    }

    /// Trimmed text, `""` when the cell or column is missing.
    pub fn text(&self, column: &str) -> &'a str {
        self.set.text(column, self.idx)
    }

    pub fn is(&self, column: &str, value: &str) -> bool {
        self.text(column) == value
    }

    pub fn is_any(&self, column: &str, values: &[&str]) -> bool {
        values.contains(&self.text(column))
    }

    pub fn is_empty(&self, column: &str) -> bool {
        self.text(column).is_empty()
    }

    pub fn int(&self, column: &str) -> Option<i64> {
        parse_i64(self.text(column))
    }

    pub fn decimal(&self, column: &str) -> Option<f64> {
        parse_f64(self.text(column))
    }

    pub fn date(&self, column: &str) -> Option<NaiveDateTime> {
        parse_datetime(self.text(column))
    }
}
