//! Data-quality filters over identifiers and visit dates.

use std::collections::HashMap;

use polars::prelude::*;

use his_common::parse_datetime;
use his_model::{FilterKind, VISIT_ID};

use crate::error::{Result, ValidationError};
use crate::frame::flagged_rows;
use crate::records::RecordSet;

/// Message carried by rows flagged by a data-quality filter.
pub const QUALITY_MESSAGE: &str = "Error detectado";

/// Number of rows sharing the visit id, added by the duplicate filter.
pub const DUPLICATE_COUNT_COLUMN: &str = "count_duplicates";

const VISIT_DATE: &str = "Fecha_Atencion";
const PATIENT_DOCUMENT: &str = "Numero_Documento_Paciente";
const MIN_DOCUMENT_LENGTH: usize = 3;

/// Runs one of the data-quality filters.
///
/// Returns `None` when `filter` is a rule group.
pub fn run_quality_filter(df: &DataFrame, filter: FilterKind) -> Option<Result<DataFrame>> {
    let result = match filter {
        FilterKind::Duplicados => duplicated_visits(df),
        FilterKind::FechasInvalidas => invalid_visit_dates(df),
        FilterKind::DocumentosInvalidos => invalid_documents(df),
        _ => return None,
    };
    Some(result)
}

fn require(records: &RecordSet, filter: FilterKind, column: &str) -> Result<()> {
    if records.has_column(column) {
        Ok(())
    } else {
        Err(ValidationError::MissingColumn {
            filter: filter.to_string(),
            column: column.to_string(),
        })
    }
}

fn duplicated_visits(df: &DataFrame) -> Result<DataFrame> {
    let records = RecordSet::from_frame(df);
    if records.visit_column().is_none() {
        return Err(ValidationError::MissingColumn {
            filter: FilterKind::Duplicados.to_string(),
            column: VISIT_ID.to_string(),
        });
    }
    let visits = records.visit_ids();
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for visit in &visits {
        *counts.entry(visit.as_str()).or_default() += 1;
    }
    let per_row: Vec<i64> = visits.iter().map(|visit| counts[visit.as_str()]).collect();
    let mask: Vec<bool> = per_row.iter().map(|&count| count > 1).collect();

    let mut with_counts = df.clone();
    with_counts.with_column(Series::new(DUPLICATE_COUNT_COLUMN.into(), per_row).into_column())?;
    Ok(flagged_rows(&with_counts, &mask, messages(&mask))?)
}

fn invalid_visit_dates(df: &DataFrame) -> Result<DataFrame> {
    let records = RecordSet::from_frame(df);
    require(&records, FilterKind::FechasInvalidas, VISIT_DATE)?;
    let mask: Vec<bool> = records
        .rows()
        .map(|row| parse_datetime(row.text(VISIT_DATE)).is_none())
        .collect();
    Ok(flagged_rows(df, &mask, messages(&mask))?)
}

fn invalid_documents(df: &DataFrame) -> Result<DataFrame> {
    let records = RecordSet::from_frame(df);
    require(&records, FilterKind::DocumentosInvalidos, PATIENT_DOCUMENT)?;
    let mask: Vec<bool> = records
        .rows()
        .map(|row| row.text(PATIENT_DOCUMENT).chars().count() < MIN_DOCUMENT_LENGTH)
        .collect();
    Ok(flagged_rows(df, &mask, messages(&mask))?)
}

fn messages(mask: &[bool]) -> Vec<String> {
    mask.iter()
        .map(|&flagged| {
            if flagged {
                QUALITY_MESSAGE.to_string()
            } else {
                String::new()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(df: &DataFrame, name: &str) -> Vec<String> {
        his_common::column_strings(df, name).unwrap()
    }

    #[test]
    fn duplicated_visit_ids() {
        let df = df! {
            "Id_Cita" => ["A", "B", "A", "C"],
            "Codigo_Item" => ["1", "2", "3", "4"],
        }
        .unwrap();
        let out = run_quality_filter(&df, FilterKind::Duplicados).unwrap().unwrap();
        assert_eq!(texts(&out, "Codigo_Item"), vec!["1", "3"]);
        assert_eq!(texts(&out, DUPLICATE_COUNT_COLUMN), vec!["2", "2"]);
        assert_eq!(texts(&out, "Error"), vec![QUALITY_MESSAGE, QUALITY_MESSAGE]);
    }

    #[test]
    fn unparseable_or_empty_dates() {
        let df = df! {
            "Fecha_Atencion" => ["05/01/2024", "", "31/02/2024", "2024-03-01"],
        }
        .unwrap();
        let out = run_quality_filter(&df, FilterKind::FechasInvalidas).unwrap().unwrap();
        assert_eq!(texts(&out, "Fecha_Atencion"), vec!["", "31/02/2024"]);
    }

    #[test]
    fn short_documents() {
        let df = df! {
            "Numero_Documento_Paciente" => ["12", " 123 ", "", "12345678"],
        }
        .unwrap();
        let out = run_quality_filter(&df, FilterKind::DocumentosInvalidos).unwrap().unwrap();
        assert_eq!(texts(&out, "Numero_Documento_Paciente"), vec!["12", ""]);
    }

    #[test]
    fn missing_column_is_reported() {
        let df = df! { "Codigo_Item" => ["1"] }.unwrap();
        let err = run_quality_filter(&df, FilterKind::FechasInvalidas).unwrap().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingColumn { ref column, .. } if column == "Fecha_Atencion"
        ));
        assert!(run_quality_filter(&df, FilterKind::Cred).is_none());
    }
}
