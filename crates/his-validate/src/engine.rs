//! Rule engine running the catalog groups and data-quality filters.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use his_common::string_column;
use his_model::FilterKind;

use crate::catalog;
use crate::error::{Result, ValidationError};
use crate::frame::{FILTER_COLUMN, empty_result, flagged_rows};
use crate::quality::run_quality_filter;
use crate::records::RecordSet;
use crate::rule::{Findings, Rule};

/// Which filters produced a [`FilterOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSelection {
    One(FilterKind),
    /// Every rule group, rows tagged with `Tipo_Filtro`.
    AllRuleGroups,
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSelection::One(kind) => write!(f, "{kind}"),
            FilterSelection::AllRuleGroups => write!(f, "todos"),
        }
    }
}

/// Flagged rows of a validation run.
///
/// `table` holds the input columns of every flagged row plus `Error`, and
/// `Tipo_Filtro` when all rule groups ran.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub selection: FilterSelection,
    pub table: DataFrame,
}

impl FilterOutcome {
    pub fn len(&self) -> usize {
        self.table.height()
    }

    pub fn is_empty(&self) -> bool {
        self.table.height() == 0
    }
}

/// Rule engine keyed by rule group.
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules_by_group: BTreeMap<FilterKind, Vec<Rule>>,
}

impl RuleEngine {
    /// Create a new empty rule engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine loaded with the built-in catalog.
    pub fn with_catalog() -> Self {
        let mut engine = Self::new();
        for group in FilterKind::RULE_GROUPS {
            if let Some(rules) = catalog::rules_for(group) {
                engine.add_rules(group, rules.iter().copied());
            }
        }
        engine
    }

    /// Append rules to a group. They run after the rules already present.
    pub fn add_rules(&mut self, group: FilterKind, rules: impl IntoIterator<Item = Rule>) {
        self.rules_by_group.entry(group).or_default().extend(rules);
    }

    pub fn rules_for_group(&self, group: FilterKind) -> &[Rule] {
        self.rules_by_group
            .get(&group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Runs the rules of one group and keeps the rows they flag.
    pub fn execute(&self, group: FilterKind, df: &DataFrame) -> Result<DataFrame> {
        let records = RecordSet::from_frame(df);
        let findings = self.findings(group, &records);
        let (mask, errors) = findings.into_parts();
        Ok(flagged_rows(df, &mask, errors)?)
    }

    fn findings(&self, group: FilterKind, records: &RecordSet) -> Findings {
        let mut findings = Findings::new(records.height());
        for rule in self.rules_for_group(group) {
            if let Some(flagged) = rule.apply(records, &mut findings) {
                debug!(group = %group, rule = rule.id, flagged, "rule applied");
            }
        }
        findings
    }

    /// Runs a rule group or data-quality filter.
    pub fn run(&self, filter: FilterKind, df: &DataFrame) -> Result<FilterOutcome> {
        let span = info_span!("validate", filter = %filter, rows = df.height());
        let _guard = span.enter();
        let start = Instant::now();
        let table = match run_quality_filter(df, filter) {
            Some(result) => result?,
            None => self.execute(filter, df)?,
        };
        info!(
            flagged = table.height(),
            duration_ms = start.elapsed().as_millis(),
            "validation complete"
        );
        Ok(FilterOutcome {
            selection: FilterSelection::One(filter),
            table,
        })
    }

    /// Runs every rule group and stacks their flagged rows in group order,
    /// each tagged with the group name in `Tipo_Filtro`.
    ///
    /// A group that fails is logged and left out.
    pub fn run_all(&self, df: &DataFrame) -> Result<FilterOutcome> {
        let span = info_span!("validate_all", rows = df.height());
        let _guard = span.enter();
        let mut combined: Option<DataFrame> = None;
        for group in FilterKind::RULE_GROUPS {
            let mut flagged = match self.execute(group, df) {
                Ok(flagged) => flagged,
                Err(error) => {
                    warn!(group = %group, %error, "rule group failed");
                    continue;
                }
            };
            if flagged.height() == 0 {
                continue;
            }
            let tags = vec![group.as_str().to_string(); flagged.height()];
            flagged.with_column(string_column(FILTER_COLUMN, tags))?;
            match combined.as_mut() {
                Some(all) => {
                    all.vstack_mut(&flagged)?;
                }
                None => combined = Some(flagged),
            }
        }
        let table = match combined {
            Some(mut all) => {
                all.as_single_chunk_par();
                all
            }
            None => {
                let mut empty = empty_result(df)?;
                empty.with_column(string_column(FILTER_COLUMN, Vec::new()))?;
                empty
            }
        };
        info!(flagged = table.height(), "all rule groups complete");
        Ok(FilterOutcome {
            selection: FilterSelection::AllRuleGroups,
            table,
        })
    }
}

/// Parses a filter name, failing with [`ValidationError::UnknownFilter`].
pub fn parse_filter(name: &str) -> Result<FilterKind> {
    name.parse::<FilterKind>()
        .map_err(|_| ValidationError::UnknownFilter {
            name: name.to_string(),
        })
}
