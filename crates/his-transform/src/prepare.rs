//! Preparation of a standalone file for validation.

use polars::prelude::*;

use his_common::{DISPLAY_DATE_FORMAT, any_to_datetime, has_column, string_column};
use his_model::DATE_COLUMNS;

use crate::derive::{BIRTH_DATE, VISIT_DATE, formatted_age, full_name};
use crate::frame::text_values;

pub const PATIENT_FULL_NAME: &str = "Nombres Completo Paciente";
pub const STAFF_FULL_NAME: &str = "Nombres Completo Personal";

/// Adds full names, replaces `Edad_Reg` by the formatted age and renders
/// every date column as `dd/mm/YYYY`.
pub fn prepare_upload(mut df: DataFrame) -> PolarsResult<DataFrame> {
    add_full_name(
        &mut df,
        PATIENT_FULL_NAME,
        [
            "Apellido_Paterno_Paciente",
            "Apellido_Materno_Paciente",
            "Nombres_Paciente",
        ],
    )?;
    add_full_name(
        &mut df,
        STAFF_FULL_NAME,
        [
            "Apellido_Paterno_Personal",
            "Apellido_Materno_Personal",
            "Nombres_Personal",
        ],
    )?;

    let births = datetimes_or_none(&df, BIRTH_DATE);
    let visits = datetimes_or_none(&df, VISIT_DATE);
    let ages: Vec<String> = births
        .into_iter()
        .zip(visits)
        .map(|(birth, visit)| formatted_age(birth, visit))
        .collect();
    df.with_column(string_column("Edad_Reg", ages))?;

    format_display_dates(&mut df)?;
    tracing::info!(rows = df.height(), columns = df.width(), "prepared upload for validation");
    Ok(df)
}

/// Re-renders every present date column as `dd/mm/YYYY`, with `""` for
/// values that are not dates.
pub fn format_display_dates(df: &mut DataFrame) -> PolarsResult<()> {
    for name in DATE_COLUMNS {
        if !has_column(df, name) {
            continue;
        }
        let rendered: Vec<String> = datetimes_or_none(df, name)
            .into_iter()
            .map(|value| {
                value
                    .map(|datetime| datetime.format(DISPLAY_DATE_FORMAT).to_string())
                    .unwrap_or_default()
            })
            .collect();
        df.with_column(string_column(name, rendered))?;
    }
    Ok(())
}

fn add_full_name(df: &mut DataFrame, target: &str, parts: [&str; 3]) -> PolarsResult<()> {
    let [paternal, maternal, given] = parts.map(|column| text_values(df, column));
    let names: Vec<String> = paternal
        .iter()
        .zip(&maternal)
        .zip(&given)
        .map(|((p, m), g)| full_name(p, m, g))
        .collect();
    df.with_column(string_column(target, names))?;
    Ok(())
}

fn datetimes_or_none(df: &DataFrame, name: &str) -> Vec<Option<chrono::NaiveDateTime>> {
    match df.column(name) {
        Ok(column) => (0..df.height())
            .map(|idx| column.get(idx).ok().and_then(any_to_datetime))
            .collect(),
        Err(_) => vec![None; df.height()],
    }
}
