//! CLI library components for the HIS consolidator.

pub mod logging;
pub mod pipeline;
