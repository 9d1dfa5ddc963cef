//! The consolidation pipeline: joins, derived fields, normalization.

use std::time::Instant;

use polars::prelude::DataFrame;

use crate::consolidate::{Consolidation, consolidate};
use crate::derive::{DeriveOptions, derive_fields};
use crate::error::Result;
use crate::masters::{DynamicMasters, StaticMasters};
use crate::normalize::normalize;

/// Runs every consolidation stage and returns a Final Schema table.
pub fn build_consolidated(
    transactions: DataFrame,
    statics: &StaticMasters,
    dynamics: &DynamicMasters,
    options: &DeriveOptions,
) -> Result<Consolidation> {
    let start = Instant::now();

    let joined = {
        let _span = tracing::info_span!("consolidate", rows = transactions.height()).entered();
        consolidate(transactions, statics, dynamics)?
    };

    let derived = {
        let _span = tracing::info_span!("derive").entered();
        derive_fields(joined.data, options)?
    };

    let data = {
        let _span = tracing::info_span!("normalize").entered();
        normalize(&derived)?
    };

    tracing::info!(
        rows = data.height(),
        columns = data.width(),
        duration_ms = start.elapsed().as_millis(),
        "consolidation finished"
    );

    Ok(Consolidation {
        data,
        input_rows: joined.input_rows,
        joins: joined.joins,
    })
}
