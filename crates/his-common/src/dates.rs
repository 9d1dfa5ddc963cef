//! Permissive date parsing for HIS extracts.
//!
//! Extracts arrive with dates written by several generations of tooling:
//! ISO dates, day-first Peruvian dates, the occasional month-first value,
//! two-digit years and compact `YYYYMMDD` stamps. Every caller that needs a
//! date out of free text goes through [`parse_datetime`] so consolidation and
//! validation agree on what counts as a valid date.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Text values that stand for a missing cell.
///
/// These come from earlier round-trips through dataframe tooling and are
/// treated exactly like an empty string.
pub const NULL_SENTINELS: [&str; 5] = ["", "nan", "None", "NaT", "<NA>"];

/// Formats tried in order. The first one that consumes the whole value wins.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%m-%d-%Y", "%Y/%m/%d",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"];

const SHORT_YEAR_FORMATS: [&str; 2] = ["%d/%m/%y", "%m/%d/%y"];

/// Display format used by the validation views.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Returns true when the value is empty or one of the [`NULL_SENTINELS`].
pub fn is_null_sentinel(value: &str) -> bool {
    let trimmed = value.trim();
    NULL_SENTINELS.contains(&trimmed) || trimmed.eq_ignore_ascii_case("nan")
}

/// Parses a free-text date or timestamp.
///
/// Returns `None` for null sentinels and for values that match none of the
/// accepted layouts. Four-digit-year layouts only accept years written with
/// four digits, so `05/01/24` falls through to the two-digit-year layouts.
///
/// # Examples
///
/// ```
/// use his_common::parse_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(parse_date("2024-01-05"), NaiveDate::from_ymd_opt(2024, 1, 5));
/// assert_eq!(parse_date("05/01/2024"), NaiveDate::from_ymd_opt(2024, 1, 5));
/// assert_eq!(parse_date("20240105"), NaiveDate::from_ymd_opt(2024, 1, 5));
/// assert_eq!(parse_date("NaT"), None);
/// ```
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if is_null_sentinel(trimmed) {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format)
            && has_four_digit_year(trimmed, date)
        {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format)
            && has_four_digit_year(trimmed, datetime.date())
        {
            return Some(datetime);
        }
    }
    for format in SHORT_YEAR_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    parse_compact(trimmed).map(|date| date.and_time(NaiveTime::MIN))
}

/// Date-only view of [`parse_datetime`].
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_datetime(value).map(|datetime| datetime.date())
}

/// Re-renders a date value as `dd/mm/YYYY`, or an empty string when the
/// value does not parse.
pub fn format_display_date(value: &str) -> String {
    parse_date(value)
        .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Milliseconds since the Unix epoch, the physical unit of datetime columns.
pub fn to_epoch_millis(datetime: NaiveDateTime) -> i64 {
    datetime.and_utc().timestamp_millis()
}

fn has_four_digit_year(text: &str, date: NaiveDate) -> bool {
    date.year() >= 1000 && text.contains(&date.year().to_string())
}

fn parse_compact(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text[0..4].parse::<i32>().ok()?;
    let month = text[4..6].parse::<u32>().ok()?;
    let day = text[6..8].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_and_day_first() {
        assert_eq!(parse_date("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("05/01/2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("  05-01-2024 "), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024/01/05"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn day_first_wins_over_month_first() {
        // 03/04 is read as 3 April, never 4 March.
        assert_eq!(parse_date("03/04/2024"), Some(ymd(2024, 4, 3)));
        // Only month-first can make sense of a day above 12 in second position.
        assert_eq!(parse_date("04/23/2024"), Some(ymd(2024, 4, 23)));
    }

    #[test]
    fn keeps_time_of_day() {
        let parsed = parse_datetime("2024-01-05 10:30:15").unwrap();
        assert_eq!(parsed.date(), ymd(2024, 1, 5));
        assert_eq!(parsed.time(), NaiveTime::from_hms_opt(10, 30, 15).unwrap());
        assert!(parse_datetime("05/01/2024 08:00:00").is_some());
    }

    #[test]
    fn two_digit_and_compact_years() {
        assert_eq!(parse_date("05/01/24"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("20240105"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("20241305"), None);
    }

    #[test]
    fn sentinels_and_garbage_are_null() {
        for value in ["", "   ", "nan", "NaN", "None", "NaT", "<NA>", "ayer", "31/02/2024"] {
            assert_eq!(parse_date(value), None, "{value:?}");
        }
    }

    #[test]
    fn display_format() {
        assert_eq!(format_display_date("2024-01-05"), "05/01/2024");
        assert_eq!(format_display_date("05/01/2024"), "05/01/2024");
        assert_eq!(format_display_date("2024-01-05 10:00:00"), "05/01/2024");
        assert_eq!(format_display_date("sin fecha"), "");
    }

    #[test]
    fn epoch_millis() {
        let datetime = ymd(1970, 1, 2).and_time(NaiveTime::MIN);
        assert_eq!(to_epoch_millis(datetime), 86_400_000);
    }

    proptest::proptest! {
        #[test]
        fn display_dates_parse_back(days in 0i64..60_000) {
            let date = ymd(1900, 1, 1) + chrono::Duration::days(days);
            let shown = date.format(DISPLAY_DATE_FORMAT).to_string();
            proptest::prop_assert_eq!(parse_date(&shown), Some(date));
            proptest::prop_assert_eq!(format_display_date(&shown), shown);
        }
    }
}
