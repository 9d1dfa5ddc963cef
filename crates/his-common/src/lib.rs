//! Shared utilities for the HIS consolidation crates.
//!
//! This crate provides the helpers every other crate in the workspace reaches
//! for: Polars `AnyValue` conversions, row-wise column access, and the
//! permissive date parser used by both consolidation and validation.

pub mod dates;
pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use dates::{
    DISPLAY_DATE_FORMAT, NULL_SENTINELS, format_display_date, is_null_sentinel, parse_date,
    parse_datetime, to_epoch_millis,
};
pub use polars::{
    any_to_datetime, any_to_f64, any_to_i64, any_to_string, column_strings, column_value_string,
    datetime_column, format_numeric, has_column, parse_f64, parse_i64, string_column,
};
