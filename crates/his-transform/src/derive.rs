//! Derived Fields Calculator.
//!
//! Two age algorithms live here and both are user-visible:
//!
//! - [`derive_fields`] computes calendar-aware day, month and year ages
//!   against the visit date and against today, for consolidation.
//! - [`formatted_age`] renders the coarse `{y}A-{m}M-{d}D` age used when a
//!   standalone file is prepared for validation.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;

use his_common::{any_to_datetime, any_to_f64, has_column, string_column};

use crate::frame::text_values;

pub const BIRTH_DATE: &str = "Fecha_Nacimiento_Paciente";
pub const VISIT_DATE: &str = "Fecha_Atencion";
pub const AGE_GROUP: &str = "Grupo_Edad";

/// Age columns relative to the visit date: days, months, years.
pub const VISIT_AGE_COLUMNS: [&str; 3] = [
    "Edad_Dias_Paciente_FechaAtencion",
    "Edad_Meses_Paciente_FechaAtencion",
    "Edad_Anios_Paciente_FechaAtencion",
];

/// Age columns relative to today: days, months, years.
pub const CURRENT_AGE_COLUMNS: [&str; 3] = [
    "Edad_Dias_Paciente_FechaActual",
    "Edad_Meses_Paciente_FechaActual",
    "Edad_Anios_Paciente_FechaActual",
];

/// Settings for [`derive_fields`].
#[derive(Debug, Clone, Copy)]
pub struct DeriveOptions {
    /// Reference date for the `*_FechaActual` ages.
    pub today: NaiveDate,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }
}

impl DeriveOptions {
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }
}

/// Calendar age of a person born on `birth` at `reference`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Age {
    pub days: i64,
    pub months: i64,
    pub years: i64,
}

impl Age {
    /// Returns the zero age when the reference date precedes the birth date.
    pub fn between(birth: NaiveDateTime, reference: NaiveDateTime) -> Self {
        if reference < birth {
            return Self::default();
        }
        let days = (reference - birth).num_days();
        let month_diff = i64::from(reference.month()) - i64::from(birth.month());
        let years = i64::from(reference.year()) - i64::from(birth.year())
            - i64::from(month_diff < 0);
        Self {
            days,
            months: years * 12 + month_diff,
            years,
        }
    }
}

/// Adds ages, the age group and the family-record fallback.
///
/// Age columns are only produced when both the birth and visit date columns
/// exist. Rows with an unparseable date, or a reference date before birth,
/// get zero rather than null.
pub fn derive_fields(mut df: DataFrame, options: &DeriveOptions) -> PolarsResult<DataFrame> {
    if has_column(&df, BIRTH_DATE) && has_column(&df, VISIT_DATE) {
        add_ages(&mut df, options)?;
    } else {
        tracing::warn!(
            birth = BIRTH_DATE,
            visit = VISIT_DATE,
            "date columns missing, ages not calculated"
        );
    }
    add_age_group(&mut df)?;
    apply_family_record_fallback(&mut df)?;
    Ok(df)
}

fn add_ages(df: &mut DataFrame, options: &DeriveOptions) -> PolarsResult<()> {
    let births = datetimes(df, BIRTH_DATE)?;
    let visits = datetimes(df, VISIT_DATE)?;
    let today = options.today.and_time(NaiveTime::MIN);

    let mut at_visit: [Vec<i64>; 3] = Default::default();
    let mut at_today: [Vec<i64>; 3] = Default::default();
    let mut valid = 0usize;
    for (birth, visit) in births.iter().zip(&visits) {
        let visit_age = match (birth, visit) {
            (Some(birth), Some(visit)) => {
                if visit >= birth {
                    valid += 1;
                }
                Age::between(*birth, *visit)
            }
            _ => Age::default(),
        };
        let current_age = birth
            .map(|birth| Age::between(birth, today))
            .unwrap_or_default();
        push_age(&mut at_visit, visit_age);
        push_age(&mut at_today, current_age);
    }

    for (name, values) in VISIT_AGE_COLUMNS.iter().zip(at_visit) {
        df.with_column(Series::new((*name).into(), values))?;
    }
    for (name, values) in CURRENT_AGE_COLUMNS.iter().zip(at_today) {
        df.with_column(Series::new((*name).into(), values))?;
    }
    tracing::info!(valid_rows = valid, rows = df.height(), "ages calculated");
    Ok(())
}

fn push_age(columns: &mut [Vec<i64>; 3], age: Age) {
    columns[0].push(age.days);
    columns[1].push(age.months);
    columns[2].push(age.years);
}

fn datetimes(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<NaiveDateTime>>> {
    let column = df.column(name)?;
    Ok((0..df.height())
        .map(|idx| column.get(idx).ok().and_then(any_to_datetime))
        .collect())
}

/// Bucket for an age recorded in years.
///
/// ```
/// use his_transform::age_group;
///
/// assert_eq!(age_group(11.0), "0 a 11 años");
/// assert_eq!(age_group(12.0), "12 a 17 años");
/// assert_eq!(age_group(11.5), "");
/// ```
pub fn age_group(age: f64) -> &'static str {
    if (0.0..=11.0).contains(&age) {
        "0 a 11 años"
    } else if (12.0..=17.0).contains(&age) {
        "12 a 17 años"
    } else if (18.0..=29.0).contains(&age) {
        "18 a 29 años"
    } else if (30.0..=59.0).contains(&age) {
        "30 a 59 años"
    } else if age >= 60.0 {
        "60 años a más"
    } else {
        ""
    }
}

fn add_age_group(df: &mut DataFrame) -> PolarsResult<()> {
    let mut groups = vec![String::new(); df.height()];
    if has_column(df, "Tipo_Edad") && has_column(df, "Edad_Reg") {
        let age_types = text_values(df, "Tipo_Edad");
        let ages = df.column("Edad_Reg")?;
        for (idx, group) in groups.iter_mut().enumerate() {
            if age_types[idx] != "A" {
                continue;
            }
            if let Some(age) = ages.get(idx).ok().and_then(any_to_f64) {
                *group = age_group(age).to_string();
            }
        }
        let assigned = groups.iter().filter(|g| !g.is_empty()).count();
        tracing::info!(assigned, "age groups calculated");
    }
    df.with_column(string_column(AGE_GROUP, groups))?;
    Ok(())
}

/// Copies `Id_Paciente` into an empty `Ficha_Familiar` when the patient has
/// no document number either.
fn apply_family_record_fallback(df: &mut DataFrame) -> PolarsResult<()> {
    let mut records = text_values(df, "Ficha_Familiar");
    let documents = text_values(df, "Numero_Documento_Paciente");
    let patients = text_values(df, "Id_Paciente");

    let mut filled = 0usize;
    for ((record, document), patient) in records.iter_mut().zip(&documents).zip(&patients) {
        if record.is_empty() && document.is_empty() && !patient.is_empty() {
            record.clone_from(patient);
            filled += 1;
        }
    }
    df.with_column(string_column("Ficha_Familiar", records))?;
    tracing::debug!(filled, "family record fallback applied");
    Ok(())
}

/// Coarse age between two dates as `{y}A-{m}M-{d}D`, counting 365-day years
/// and 30-day months.
///
/// Returns an empty string when either date is missing or the visit precedes
/// the birth date.
pub fn formatted_age(birth: Option<NaiveDateTime>, visit: Option<NaiveDateTime>) -> String {
    let (Some(birth), Some(visit)) = (birth, visit) else {
        return String::new();
    };
    if visit < birth {
        return String::new();
    }
    let total_days = (visit - birth).num_days();
    let years = total_days / 365;
    let months = (total_days % 365) / 30;
    let days = (total_days % 365) % 30;
    format!("{years}A-{months}M-{days}D")
}

/// `paternal maternal given`, trimmed at both ends.
pub fn full_name(paternal: &str, maternal: &str, given: &str) -> String {
    format!("{paternal} {maternal} {given}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use his_common::{column_strings, parse_datetime};
    use proptest::prelude::*;

    fn dt(value: &str) -> NaiveDateTime {
        parse_datetime(value).unwrap()
    }

    fn options() -> DeriveOptions {
        DeriveOptions::with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn ints(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name).unwrap().i64().unwrap().into_iter().collect()
    }

    #[test]
    fn calendar_age() {
        let age = Age::between(dt("2000-08-20"), dt("2024-03-10"));
        assert_eq!(age.years, 23);
        assert_eq!(age.months, 23 * 12 - 5);
        assert_eq!(age.days, 8603);

        // Same month counts the year even before the birthday.
        let age = Age::between(dt("2000-03-20"), dt("2024-03-10"));
        assert_eq!(age.years, 24);
        assert_eq!(age.months, 288);
    }

    #[test]
    fn future_reference_is_zero() {
        assert_eq!(Age::between(dt("2024-03-10"), dt("2024-03-09")), Age::default());
    }

    #[test]
    fn derive_ages_and_groups() {
        let df = DataFrame::new(vec![
            Series::new(BIRTH_DATE.into(), ["2000-08-20", "", "2025-01-01"]).into_column(),
            Series::new(VISIT_DATE.into(), ["2024-03-10", "2024-03-10", "2024-03-10"])
                .into_column(),
            Series::new("Tipo_Edad".into(), ["A", "A", "M"]).into_column(),
            Series::new("Edad_Reg".into(), ["23", "12", "5"]).into_column(),
        ])
        .unwrap();

        let derived = derive_fields(df, &options()).unwrap();
        assert_eq!(
            ints(&derived, "Edad_Anios_Paciente_FechaAtencion"),
            vec![Some(23), Some(0), Some(0)]
        );
        assert_eq!(
            ints(&derived, "Edad_Anios_Paciente_FechaActual"),
            vec![Some(23), Some(0), Some(0)]
        );
        assert_eq!(
            ints(&derived, "Edad_Meses_Paciente_FechaActual"),
            vec![Some(23 * 12 - 2), Some(0), Some(0)]
        );
        assert_eq!(
            column_strings(&derived, AGE_GROUP).unwrap(),
            vec!["18 a 29 años", "12 a 17 años", ""]
        );
    }

    #[test]
    fn ages_need_both_date_columns() {
        let df = DataFrame::new(vec![
            Series::new(BIRTH_DATE.into(), ["2000-08-20"]).into_column(),
        ])
        .unwrap();
        let derived = derive_fields(df, &options()).unwrap();
        assert!(!has_column(&derived, VISIT_AGE_COLUMNS[0]));
        assert_eq!(column_strings(&derived, AGE_GROUP).unwrap(), vec![""]);
    }

    #[test]
    fn family_record_fallback() {
        let df = DataFrame::new(vec![
            Series::new("Ficha_Familiar".into(), ["", "", "F-9", ""]).into_column(),
            Series::new("Numero_Documento_Paciente".into(), ["", "4455", "", ""]).into_column(),
            Series::new("Id_Paciente".into(), ["P1", "P2", "P3", ""]).into_column(),
        ])
        .unwrap();
        let derived = derive_fields(df, &options()).unwrap();
        assert_eq!(
            column_strings(&derived, "Ficha_Familiar").unwrap(),
            vec!["P1", "", "F-9", ""]
        );
    }

    #[test]
    fn formatted_age_uses_day_counts() {
        let birth = parse_datetime("2000-01-01");
        assert_eq!(formatted_age(birth, parse_datetime("2000-01-01")), "0A-0M-0D");
        assert_eq!(formatted_age(birth, parse_datetime("2001-01-01")), "1A-0M-1D");
        assert_eq!(formatted_age(birth, parse_datetime("2000-03-15")), "0A-2M-14D");
        assert_eq!(formatted_age(birth, parse_datetime("1999-12-31")), "");
        assert_eq!(formatted_age(None, parse_datetime("2000-01-01")), "");
    }

    #[test]
    fn full_name_trims_edges_only() {
        assert_eq!(full_name("PEREZ", "", "ANA"), "PEREZ  ANA");
        assert_eq!(full_name("", "", ""), "");
        assert_eq!(full_name("", "ROJAS", "LUIS"), "ROJAS LUIS");
    }

    proptest! {
        #[test]
        fn integral_ages_always_bucketed(age in 0u32..130) {
            prop_assert!(!age_group(f64::from(age)).is_empty());
        }

        #[test]
        fn fractional_gaps_unbucketed(base in prop::sample::select(vec![11.0f64, 17.0, 29.0, 59.0])) {
            prop_assert_eq!(age_group(base + 0.5), "");
        }

        #[test]
        fn negative_ages_unbucketed(age in -1000.0f64..-0.001) {
            prop_assert_eq!(age_group(age), "");
        }
    }
}
