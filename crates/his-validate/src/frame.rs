use polars::prelude::*;

use his_common::string_column;

/// Column carrying the validation message.
pub const ERROR_COLUMN: &str = "Error";

/// Column naming the filter that flagged a row in combined results.
pub const FILTER_COLUMN: &str = "Tipo_Filtro";

/// Keeps the flagged rows of `df` and attaches their messages as `Error`,
/// replacing any `Error` column already present.
pub(crate) fn flagged_rows(df: &DataFrame, mask: &[bool], errors: Vec<String>) -> PolarsResult<DataFrame> {
    let mut out = df.clone();
    if out.get_column_index(ERROR_COLUMN).is_some() {
        out.drop_in_place(ERROR_COLUMN)?;
    }
    out.with_column(string_column(ERROR_COLUMN, errors))?;
    let mask = BooleanChunked::from_slice("mask".into(), mask);
    out.filter(&mask)
}

/// Empty result with the columns of `df` plus `Error`.
pub(crate) fn empty_result(df: &DataFrame) -> PolarsResult<DataFrame> {
    flagged_rows(df, &vec![false; df.height()], vec![String::new(); df.height()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_error_column_is_replaced() {
        let df = df! {
            "Codigo_Item" => ["A", "B"],
            "Error" => ["viejo", "viejo"],
        }
        .unwrap();
        let out = flagged_rows(&df, &[false, true], vec![String::new(), "nuevo".into()]).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(out.width(), 2);
        let errors: Vec<_> = out.column("Error").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(errors, vec!["nuevo"]);
    }
}
