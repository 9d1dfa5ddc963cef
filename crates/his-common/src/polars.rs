//! Polars `AnyValue` and column helpers.
//!
//! Every table in the workspace is a Polars `DataFrame` whose columns are
//! text until normalization assigns each Final Schema column its type. These
//! helpers read cells row-wise as text and build the typed columns back.

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

use crate::dates::{parse_datetime, to_epoch_millis};

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null`, formats floats without trailing zeros
/// and renders datetimes as `YYYY-MM-DD`, adding the time of day only when it
/// is not midnight.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use his_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int64(42)), "42");
/// assert_eq!(any_to_string(AnyValue::String("hola")), "hola");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Date(_) | AnyValue::Datetime(..) | AnyValue::DatetimeOwned(..) => {
            match any_to_datetime(value) {
                Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => {
                    datetime.format("%Y-%m-%d").to_string()
                }
                Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => String::new(),
            }
        }
        other => other.to_string(),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use his_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(11.5), "11.5");
/// ```
pub fn format_numeric(v: f64) -> String {
    if !v.is_finite() {
        return String::new();
    }
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)).filter(|v| v.is_finite()),
        AnyValue::Float64(v) => Some(v).filter(|v| v.is_finite()),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Converts an `AnyValue` to `i64`.
///
/// Floats and numeric text are accepted only when they carry no fractional
/// part, so `"12.0"` becomes `12` while `"12.5"` is `None`.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) => integral(f64::from(v)),
        AnyValue::Float64(v) => integral(v),
        AnyValue::String(s) => parse_i64(s),
        AnyValue::StringOwned(s) => parse_i64(&s),
        _ => None,
    }
}

/// Converts date and datetime values, or parseable text, to a naive timestamp.
pub fn any_to_datetime(value: AnyValue<'_>) -> Option<NaiveDateTime> {
    match value {
        AnyValue::Date(days) => {
            DateTime::from_timestamp(i64::from(days) * 86_400, 0).map(|dt| dt.naive_utc())
        }
        AnyValue::Datetime(v, unit, _) | AnyValue::DatetimeOwned(v, unit, _) => {
            let millis = match unit {
                TimeUnit::Milliseconds => v,
                TimeUnit::Microseconds => v / 1_000,
                TimeUnit::Nanoseconds => v / 1_000_000,
            };
            DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
        }
        AnyValue::String(s) => parse_datetime(s),
        AnyValue::StringOwned(s) => parse_datetime(&s),
        _ => None,
    }
}

/// Parses a string as `f64`, returning `None` for invalid, empty or non-finite strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a string as `i64`. Integral decimals such as `"7.0"` are accepted.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| parse_f64(trimmed).and_then(integral))
}

fn integral(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
        Some(v as i64)
    } else {
        None
    }
}

/// Returns true when the frame has a column with exactly this name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Reads one cell as text. Missing columns and out-of-range rows read as `""`.
pub fn column_value_string(df: &DataFrame, name: &str, idx: usize) -> String {
    match df.column(name) {
        Ok(column) => any_to_string(column.get(idx).unwrap_or(AnyValue::Null)),
        Err(_) => String::new(),
    }
}

/// Reads a whole column as text, or `None` when the column does not exist.
pub fn column_strings(df: &DataFrame, name: &str) -> Option<Vec<String>> {
    let column = df.column(name).ok()?;
    Some(
        (0..df.height())
            .map(|idx| any_to_string(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect(),
    )
}

/// Builds a non-null text column.
pub fn string_column(name: &str, values: Vec<String>) -> Column {
    Series::new(name.into(), values).into_column()
}

/// Builds a millisecond datetime column from optional timestamps.
pub fn datetime_column(name: &str, values: &[Option<NaiveDateTime>]) -> PolarsResult<Column> {
    let millis: Vec<Option<i64>> = values
        .iter()
        .map(|value| value.map(to_epoch_millis))
        .collect();
    let series = Series::new(name.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(series.into_column())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("Id_Cita".into(), ["A1", "A2"]).into_column(),
            Series::new("Edad_Reg".into(), [Some(5i64), None]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_numbers() {
        assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
        assert_eq!(any_to_string(AnyValue::Int64(-100)), "-100");
        assert_eq!(any_to_string(AnyValue::Float64(11.5)), "11.5");
        assert_eq!(any_to_string(AnyValue::Float64(12.0)), "12");
        assert_eq!(any_to_string(AnyValue::Float64(100.0)), "100");
    }

    #[test]
    fn test_any_to_string_datetime() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let value = AnyValue::Datetime(to_epoch_millis(midnight), TimeUnit::Milliseconds, None);
        assert_eq!(any_to_string(value), "2024-01-05");

        let afternoon = midnight + chrono::Duration::hours(15);
        let value = AnyValue::Datetime(to_epoch_millis(afternoon), TimeUnit::Milliseconds, None);
        assert_eq!(any_to_string(value), "2024-01-05 15:00:00");
    }

    #[test]
    fn test_any_to_i64_rejects_fractions() {
        assert_eq!(any_to_i64(AnyValue::String("12")), Some(12));
        assert_eq!(any_to_i64(AnyValue::String("12.0")), Some(12));
        assert_eq!(any_to_i64(AnyValue::String("12.5")), None);
        assert_eq!(any_to_i64(AnyValue::Float64(3.0)), Some(3));
        assert_eq!(any_to_i64(AnyValue::String("doce")), None);
    }

    #[test]
    fn test_parse_f64_rejects_nan() {
        assert_eq!(parse_f64(" 11.2 "), Some(11.2));
        assert_eq!(parse_f64("nan"), None);
        assert_eq!(parse_f64("inf"), None);
        assert_eq!(parse_f64(""), None);
    }

    #[test]
    fn test_column_access() {
        let df = frame();
        assert!(has_column(&df, "Id_Cita"));
        assert!(!has_column(&df, "Id_Paciente"));
        assert_eq!(column_value_string(&df, "Id_Cita", 1), "A2");
        assert_eq!(column_value_string(&df, "Edad_Reg", 1), "");
        assert_eq!(column_value_string(&df, "Id_Paciente", 0), "");
        assert_eq!(
            column_strings(&df, "Edad_Reg"),
            Some(vec!["5".to_string(), String::new()])
        );
        assert_eq!(column_strings(&df, "missing"), None);
    }

    #[test]
    fn test_datetime_column_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let column = datetime_column("Fecha_Atencion", &[Some(date), None]).unwrap();
        assert_eq!(
            column.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(any_to_datetime(column.get(0).unwrap()), Some(date));
        assert_eq!(any_to_datetime(column.get(1).unwrap()), None);
    }
}
