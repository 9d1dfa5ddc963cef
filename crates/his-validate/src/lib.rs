//! Business-rule validation of consolidated HIS records.
//!
//! A validation run takes a table (usually an uploaded consolidated file),
//! applies one rule group or data-quality filter, and returns the rows that
//! fail together with an `Error` column. When several rules of a group match
//! the same row, the rule declared last provides the message.
//!
//! ```
//! use his_model::FilterKind;
//! use polars::prelude::*;
//!
//! let df = df! {
//!     "Codigo_Item" => ["F700", "F700"],
//!     "Tipo_Diagnostico" => ["D", "R"],
//! }
//! .unwrap();
//! let outcome = his_validate::validate(&df, FilterKind::Psicologia).unwrap();
//! assert_eq!(outcome.len(), 1);
//! ```

mod catalog;
mod engine;
mod error;
mod frame;
mod quality;
mod records;
mod rule;
mod sequence;

pub use catalog::rules_for;
pub use engine::{FilterOutcome, FilterSelection, RuleEngine, parse_filter};
pub use error::{Result, ValidationError};
pub use frame::{ERROR_COLUMN, FILTER_COLUMN};
pub use quality::{DUPLICATE_COUNT_COLUMN, QUALITY_MESSAGE, run_quality_filter};
pub use records::{RecordSet, Row};
pub use rule::{Findings, Predicate, Rule, RuleKind, SetCheck};
pub use sequence::{CONDITION_GROUPS, ConditionGroup};

use polars::prelude::DataFrame;

use his_model::FilterKind;

/// Runs one rule group or data-quality filter with the built-in catalog.
pub fn validate(df: &DataFrame, filter: FilterKind) -> Result<FilterOutcome> {
    RuleEngine::with_catalog().run(filter, df)
}

/// Like [`validate`], with the filter given by name.
pub fn validate_named(df: &DataFrame, filter: &str) -> Result<FilterOutcome> {
    validate(df, parse_filter(filter)?)
}

/// Runs every rule group and stacks the flagged rows, tagged in `Tipo_Filtro`.
pub fn validate_all(df: &DataFrame) -> Result<FilterOutcome> {
    RuleEngine::with_catalog().run_all(df)
}
