//! Rule definitions and their evaluation against a [`RecordSet`].

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::records::{RecordSet, Row};

/// Row predicate of a rule.
pub type Predicate = fn(&Row<'_>) -> bool;

/// Set-level check for rules that look across rows.
pub type SetCheck = fn(&RecordSet, &mut Findings);

/// How a rule decides which rows it flags.
#[derive(Debug, Clone, Copy)]
pub enum RuleKind {
    /// Flag every row the predicate matches.
    Row {
        check: Predicate,
        message: &'static str,
    },
    /// Flag the first row of every visit holding at least one matching row.
    FirstPerVisit {
        check: Predicate,
        message: &'static str,
    },
    /// The check flags rows itself.
    Set(SetCheck),
}

/// A validation rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Stable identifier used in logs.
    pub id: &'static str,
    /// Columns the rule reads. The rule is skipped when one is missing.
    pub requires: &'static [&'static str],
    pub kind: RuleKind,
}

impl Rule {
    pub const fn row(
        id: &'static str,
        requires: &'static [&'static str],
        message: &'static str,
        check: Predicate,
    ) -> Self {
        Self {
            id,
            requires,
            kind: RuleKind::Row { check, message },
        }
    }

    pub const fn first_per_visit(
        id: &'static str,
        requires: &'static [&'static str],
        message: &'static str,
        check: Predicate,
    ) -> Self {
        Self {
            id,
            requires,
            kind: RuleKind::FirstPerVisit { check, message },
        }
    }

    pub const fn set(id: &'static str, requires: &'static [&'static str], check: SetCheck) -> Self {
        Self {
            id,
            requires,
            kind: RuleKind::Set(check),
        }
    }

    /// First required column the records lack.
    pub fn missing_column(&self, records: &RecordSet) -> Option<&'static str> {
        self.requires
            .iter()
            .copied()
            .find(|column| !records.has_column(column))
    }

    /// Applies the rule, overwriting earlier findings on the rows it flags.
    ///
    /// Returns the number of rows flagged, or `None` when the rule was skipped.
    pub fn apply(&self, records: &RecordSet, findings: &mut Findings) -> Option<usize> {
        if let Some(column) = self.missing_column(records) {
            warn!(rule = self.id, column, "Skipping rule, required column missing");
            return None;
        }
        let before = findings.writes;
        match self.kind {
            RuleKind::Row { check, message } => {
                for row in records.rows().filter(|row| check(row)) {
                    findings.flag(row.index(), message);
                }
            }
            RuleKind::FirstPerVisit { check, message } => {
                if records.visit_column().is_none() {
                    for row in records.rows().filter(|row| check(row)) {
                        findings.flag(row.index(), message);
                    }
                } else {
                    for idx in first_rows_of_matching_visits(records, check) {
                        findings.flag(idx, message);
                    }
                }
            }
            RuleKind::Set(check) => check(records, findings),
        }
        Some(findings.writes - before)
    }
}

fn first_rows_of_matching_visits(records: &RecordSet, check: Predicate) -> Vec<usize> {
    let visits = records.visit_ids();
    let mut first_row: HashMap<&str, usize> = HashMap::new();
    for (idx, visit) in visits.iter().enumerate() {
        first_row.entry(visit.as_str()).or_insert(idx);
    }
    let matching: HashSet<&str> = records
        .rows()
        .filter(|row| check(row))
        .map(|row| visits[row.index()].as_str())
        .collect();
    let mut rows: Vec<usize> = matching.iter().map(|visit| first_row[visit]).collect();
    rows.sort_unstable();
    rows
}

/// Error message per row. A later write replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct Findings {
    messages: Vec<Option<String>>,
    writes: usize,
}

impl Findings {
    pub fn new(height: usize) -> Self {
        Self {
            messages: vec![None; height],
            writes: 0,
        }
    }

    pub fn flag(&mut self, idx: usize, message: impl Into<String>) {
        if let Some(slot) = self.messages.get_mut(idx) {
            *slot = Some(message.into());
            self.writes += 1;
        }
    }

    pub fn message(&self, idx: usize) -> Option<&str> {
        self.messages.get(idx).and_then(Option::as_deref)
    }

    pub fn flagged_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_some()).count()
    }

    /// Row mask and the `Error` text of every row, `""` when unflagged.
    pub fn into_parts(self) -> (Vec<bool>, Vec<String>) {
        self.messages
            .into_iter()
            .map(|message| match message {
                Some(text) => (true, text),
                None => (false, String::new()),
            })
            .unzip()
    }
}
