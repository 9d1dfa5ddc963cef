//! Text-keyed left joins and column utilities over all-text frames.
//!
//! Consolidation joins happen before any column is typed, so keys are
//! compared as trimmed text. Left joins keep every left row in order; a key
//! with several matches on the right fans the left row out once per match.

use std::collections::HashMap;

use polars::prelude::*;

use his_common::{column_strings, has_column, string_column};

/// Result of a successful left join.
#[derive(Debug, Clone)]
pub struct JoinedFrame {
    pub data: DataFrame,
    /// Left rows that found at least one match.
    pub matched_rows: usize,
    /// Columns actually brought over from the right side.
    pub added_columns: Vec<String>,
}

/// Left-joins `right` onto `left`.
///
/// `columns` pairs a right-side column with the name it takes on the result.
/// An incoming column whose target name already exists on the left is
/// dropped, so earlier sources win. Empty keys never match. The left key is
/// rewritten as trimmed text.
pub fn left_join(
    left: &DataFrame,
    right: &DataFrame,
    left_key: &str,
    right_key: &str,
    columns: &[(&str, &str)],
) -> PolarsResult<JoinedFrame> {
    let left_keys = trimmed_strings(left, left_key)?;
    let right_keys = trimmed_strings(right, right_key)?;

    let mut index: HashMap<&str, Vec<IdxSize>> = HashMap::new();
    for (row, key) in right_keys.iter().enumerate() {
        if !key.is_empty() {
            index.entry(key.as_str()).or_default().push(row as IdxSize);
        }
    }

    let mut left_rows: Vec<IdxSize> = Vec::with_capacity(left.height());
    let mut right_rows: Vec<Option<usize>> = Vec::with_capacity(left.height());
    let mut matched_rows = 0;
    for (row, key) in left_keys.iter().enumerate() {
        match index.get(key.as_str()) {
            Some(matches) => {
                matched_rows += 1;
                for right_row in matches {
                    left_rows.push(row as IdxSize);
                    right_rows.push(Some(*right_row as usize));
                }
            }
            None => {
                left_rows.push(row as IdxSize);
                right_rows.push(None);
            }
        }
    }

    let mut data = if left_rows.len() == left.height() {
        left.clone()
    } else {
        left.take(&IdxCa::from_vec(PlSmallStr::from_static("row"), left_rows))?
    };

    let joined_keys: Vec<String> = data_strings(&data, left_key)?
        .into_iter()
        .map(|value| value.trim().to_string())
        .collect();
    data.with_column(string_column(left_key, joined_keys))?;

    let mut added_columns = Vec::new();
    for (source, target) in columns {
        if has_column(&data, target) {
            tracing::debug!(column = %target, "column already present, keeping existing values");
            continue;
        }
        let Some(source_values) = column_strings(right, source) else {
            tracing::debug!(column = %source, "column not found on joined master");
            continue;
        };
        let values: Vec<String> = right_rows
            .iter()
            .map(|row| row.map(|idx| source_values[idx].clone()).unwrap_or_default())
            .collect();
        data.with_column(string_column(target, values))?;
        added_columns.push((*target).to_string());
    }

    Ok(JoinedFrame {
        data,
        matched_rows,
        added_columns,
    })
}

/// Renames `from` to `to` when `from` exists and `to` does not.
pub fn rename_if_present(df: &mut DataFrame, from: &str, to: &str) -> PolarsResult<bool> {
    if !has_column(df, from) {
        return Ok(false);
    }
    if has_column(df, to) {
        tracing::debug!(from, to, "rename target already exists, keeping both columns");
        return Ok(false);
    }
    df.rename(from, PlSmallStr::from(to))?;
    Ok(true)
}

/// Adds an empty text column when `name` is absent.
pub fn ensure_text_column(df: &mut DataFrame, name: &str) -> PolarsResult<bool> {
    if has_column(df, name) {
        return Ok(false);
    }
    let empty = vec![String::new(); df.height()];
    df.with_column(string_column(name, empty))?;
    Ok(true)
}

/// Reads a column as trimmed text, with `""` for every row when the column
/// is absent.
pub fn text_values(df: &DataFrame, name: &str) -> Vec<String> {
    column_strings(df, name)
        .map(|values| values.into_iter().map(|v| v.trim().to_string()).collect())
        .unwrap_or_else(|| vec![String::new(); df.height()])
}

fn trimmed_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    Ok(data_strings(df, name)?
        .into_iter()
        .map(|value| value.trim().to_string())
        .collect())
}

fn data_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    column_strings(df, name)
        .ok_or_else(|| PolarsError::ColumnNotFound(format!("{name} not found").into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: &[(&str, &[&str])]) -> DataFrame {
        DataFrame::new(
            columns
                .iter()
                .map(|(name, values)| Series::new((*name).into(), *values).into_column())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn left_join_keeps_unmatched_rows() {
        let left = frame(&[("Id_Ups", &["301", " 302 ", "999"])]);
        let right = frame(&[
            ("Id_Ups", &["301", "302"]),
            ("Descripcion_Ups", &["MEDICINA", "DENTAL"]),
        ]);
        let joined = left_join(
            &left,
            &right,
            "Id_Ups",
            "Id_Ups",
            &[("Descripcion_Ups", "Descripcion_Ups")],
        )
        .unwrap();

        assert_eq!(joined.matched_rows, 2);
        assert_eq!(
            column_strings(&joined.data, "Descripcion_Ups").unwrap(),
            vec!["MEDICINA", "DENTAL", ""]
        );
        assert_eq!(
            column_strings(&joined.data, "Id_Ups").unwrap(),
            vec!["301", "302", "999"]
        );
    }

    #[test]
    fn duplicate_master_keys_fan_out() {
        let left = frame(&[("Id_Cita", &["1", "2"]), ("Id_Pais", &["PE", "CL"])]);
        let right = frame(&[
            ("Id_Pais", &["PE", "PE"]),
            ("Descripcion_Pais", &["PERU", "PERU (2)"]),
        ]);
        let joined = left_join(
            &left,
            &right,
            "Id_Pais",
            "Id_Pais",
            &[("Descripcion_Pais", "Descripcion_Pais")],
        )
        .unwrap();

        assert_eq!(joined.data.height(), 3);
        assert_eq!(
            column_strings(&joined.data, "Id_Cita").unwrap(),
            vec!["1", "1", "2"]
        );
        assert_eq!(
            column_strings(&joined.data, "Descripcion_Pais").unwrap(),
            vec!["PERU", "PERU (2)", ""]
        );
    }

    #[test]
    fn existing_columns_win() {
        let left = frame(&[("Id_Etnia", &["80"]), ("Descripcion_Etnia", &["MESTIZO"])]);
        let right = frame(&[("Id_Etnia", &["80"]), ("Descripcion_Etnia", &["OTRO"])]);
        let joined = left_join(
            &left,
            &right,
            "Id_Etnia",
            "Id_Etnia",
            &[("Descripcion_Etnia", "Descripcion_Etnia")],
        )
        .unwrap();
        assert!(joined.added_columns.is_empty());
        assert_eq!(
            column_strings(&joined.data, "Descripcion_Etnia").unwrap(),
            vec!["MESTIZO"]
        );
    }

    #[test]
    fn empty_keys_never_match() {
        let left = frame(&[("Id_Pais", &["", "PE"])]);
        let right = frame(&[("Id_Pais", &["", "PE"]), ("Descripcion_Pais", &["?", "PERU"])]);
        let joined = left_join(
            &left,
            &right,
            "Id_Pais",
            "Id_Pais",
            &[("Descripcion_Pais", "Descripcion_Pais")],
        )
        .unwrap();
        assert_eq!(joined.matched_rows, 1);
        assert_eq!(
            column_strings(&joined.data, "Descripcion_Pais").unwrap(),
            vec!["", "PERU"]
        );
    }

    #[test]
    fn rename_skips_existing_target() {
        let mut df = frame(&[("Disa", &["LIMA"]), ("Descripcion_Disa", &["X"])]);
        assert!(!rename_if_present(&mut df, "Disa", "Descripcion_Disa").unwrap());
        assert!(!rename_if_present(&mut df, "Red", "Descripcion_Red").unwrap());

        let mut df = frame(&[("Red", &["NORTE"])]);
        assert!(rename_if_present(&mut df, "Red", "Descripcion_Red").unwrap());
        assert!(has_column(&df, "Descripcion_Red"));
    }

    #[test]
    fn ensure_text_column_fills_empty() {
        let mut df = frame(&[("Id_Cita", &["1", "2"])]);
        assert!(ensure_text_column(&mut df, "Domicilio_Declarado").unwrap());
        assert!(!ensure_text_column(&mut df, "Id_Cita").unwrap());
        assert_eq!(
            column_strings(&df, "Domicilio_Declarado").unwrap(),
            vec!["", ""]
        );
    }
}
