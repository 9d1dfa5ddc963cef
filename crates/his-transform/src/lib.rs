//! HIS consolidation crate.
//!
//! Turns a merged transaction table and its masters into the Final Schema
//! record set:
//!
//! - **Consolidation**: static and dynamic master joins, renames, enrichment
//!   and personnel reconciliation
//! - **Derived fields**: calendar ages, age group, family-record fallback
//! - **Normalization**: Final Schema typing and column order
//! - **Upload preparation**: full names, formatted age and display dates for
//!   files validated on their own
//!
//! # Example
//!
//! ```ignore
//! use his_transform::{DeriveOptions, DynamicMasters, StaticMasters, build_consolidated};
//!
//! let statics = StaticMasters::load(masters_dir, &repair)?;
//! let dynamics = DynamicMasters::load(&classified, &repair)?;
//! let transactions = load_transactions(&classified, &repair)?;
//! let result = build_consolidated(transactions, &statics, &dynamics, &DeriveOptions::default())?;
//! ```

mod consolidate;
mod derive;
mod error;
mod frame;
mod masters;
mod normalize;
mod pipeline;
mod prepare;

// === Error Types ===
pub use error::{ConsolidationError, Result};

// === Consolidation ===
pub use consolidate::{
    Consolidation, JoinRecord, JoinStatus, SkipReason, consolidate, prepare_dynamic_master,
    reconcile_personnel,
};
pub use frame::{JoinedFrame, ensure_text_column, left_join, rename_if_present, text_values};
pub use masters::{DynamicMasters, StaticMasters, load_transactions};
pub use pipeline::build_consolidated;

// === Derived Fields ===
pub use derive::{
    AGE_GROUP, Age, BIRTH_DATE, CURRENT_AGE_COLUMNS, DeriveOptions, VISIT_AGE_COLUMNS, VISIT_DATE,
    age_group, derive_fields, formatted_age, full_name,
};

// === Normalization ===
pub use normalize::{coerce_column, normalize, null_column};

// === Upload Preparation ===
pub use prepare::{PATIENT_FULL_NAME, STAFF_FULL_NAME, format_display_dates, prepare_upload};
