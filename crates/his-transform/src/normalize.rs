//! Type Normalizer: coerces Final Schema columns and reindexes the table.
//!
//! Coercion never fails. Values that do not parse as their column's class
//! become null; text columns are trimmed and never null.

use polars::prelude::*;

use his_common::{
    any_to_datetime, any_to_f64, any_to_i64, any_to_string, datetime_column, string_column,
};
use his_model::{ColumnClass, FINAL_COLUMNS, column_class};

/// Coerces a single column to `class`. Columns that already have the
/// class's physical type are returned unchanged.
pub fn coerce_column(column: &Column, class: ColumnClass) -> PolarsResult<Column> {
    let name = column.name().clone();
    let height = column.len();
    let values = (0..height).map(|idx| column.get(idx).unwrap_or(AnyValue::Null));

    let coerced = match class {
        ColumnClass::Integer => {
            if column.dtype() == &DataType::Int64 {
                return Ok(column.clone());
            }
            let parsed: Vec<Option<i64>> = values.map(any_to_i64).collect();
            Series::new(name, parsed).into_column()
        }
        ColumnClass::Decimal => {
            if column.dtype() == &DataType::Float64 {
                return Ok(column.clone());
            }
            let parsed: Vec<Option<f64>> = values.map(any_to_f64).collect();
            Series::new(name, parsed).into_column()
        }
        ColumnClass::Date => {
            if column.dtype() == &DataType::Datetime(TimeUnit::Milliseconds, None) {
                return Ok(column.clone());
            }
            let parsed: Vec<_> = values.map(any_to_datetime).collect();
            datetime_column(name.as_str(), &parsed)?
        }
        ColumnClass::Text => {
            let text: Vec<String> = values
                .map(|value| any_to_string(value).trim().to_string())
                .collect();
            string_column(name.as_str(), text)
        }
    };
    Ok(coerced)
}

/// A column of nulls (or empty strings for text) for an absent Final Schema
/// column.
pub fn null_column(name: &str, class: ColumnClass, height: usize) -> PolarsResult<Column> {
    let column = match class {
        ColumnClass::Integer => Series::new(name.into(), vec![None::<i64>; height]).into_column(),
        ColumnClass::Decimal => Series::new(name.into(), vec![None::<f64>; height]).into_column(),
        ColumnClass::Date => datetime_column(name, &vec![None; height])?,
        ColumnClass::Text => string_column(name, vec![String::new(); height]),
    };
    Ok(column)
}

/// Coerces every Final Schema column to its class, synthesizes the missing
/// ones and returns exactly [`FINAL_COLUMNS`], in order.
///
/// Running it on its own output returns an identical table.
pub fn normalize(df: &DataFrame) -> PolarsResult<DataFrame> {
    let height = df.height();
    let mut missing = Vec::new();
    let mut columns = Vec::with_capacity(FINAL_COLUMNS.len());

    for name in FINAL_COLUMNS {
        let class = column_class(name);
        let column = match df.column(name) {
            Ok(existing) => coerce_column(existing, class)?,
            Err(_) => {
                missing.push(*name);
                null_column(name, class, height)?
            }
        };
        columns.push(column);
    }

    if !missing.is_empty() {
        tracing::warn!(
            count = missing.len(),
            columns = ?missing,
            "Final Schema columns missing, synthesized empty"
        );
    }
    let dropped = df.width() + missing.len() - FINAL_COLUMNS.len();
    if dropped > 0 {
        tracing::debug!(dropped, "columns outside the Final Schema dropped");
    }

    DataFrame::new(columns)
}
