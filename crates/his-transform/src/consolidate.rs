//! Consolidation Engine: joins every master onto the transaction table.
//!
//! Order of operations:
//!
//! 1. Static masters, in registry order, on their join key.
//! 2. Post-join renames of every static master.
//! 3. Dynamic masters (patient, personnel, registrar): pre-merge rename,
//!    enrichment from static masters, then a join restricted to Final Schema
//!    columns plus the master's additional and carried columns.
//! 4. Reconciliation of role-specific personnel columns into their Final
//!    Schema names.
//!
//! A join whose key is missing on either side is skipped with a warning.

use std::collections::BTreeSet;
use std::fmt;

use polars::prelude::*;

use his_common::{column_strings, has_column, string_column};
use his_model::{
    DYNAMIC_JOIN_ORDER, ENRICHMENTS, FINAL_COLUMNS, MasterRole, PERSONNEL_RECONCILIATION,
    STATIC_MASTERS, StaticMasterDescriptor, dynamic_descriptor,
};

use crate::error::Result;
use crate::frame::{ensure_text_column, left_join, rename_if_present};
use crate::masters::{DynamicMasters, StaticMasters};

/// Why a join did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The master has no join key configured.
    NoJoinKey,
    /// The key column is not on the consolidated table.
    MissingLeftKey(String),
    /// The key column is not on the master.
    MissingMasterKey(String),
    /// The master was not uploaded or has no rows.
    NotAvailable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoJoinKey => write!(f, "no join key"),
            SkipReason::MissingLeftKey(key) => write!(f, "'{key}' not in consolidated table"),
            SkipReason::MissingMasterKey(key) => write!(f, "'{key}' not in master"),
            SkipReason::NotAvailable => write!(f, "not uploaded or empty"),
        }
    }
}

/// What happened to one master during consolidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinStatus {
    Joined {
        matched_rows: usize,
        rows_after: usize,
    },
    Skipped(SkipReason),
}

/// One line of the consolidation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRecord {
    pub master: String,
    pub key: Option<String>,
    pub status: JoinStatus,
}

impl JoinRecord {
    pub fn is_joined(&self) -> bool {
        matches!(self.status, JoinStatus::Joined { .. })
    }
}

/// The consolidated table and how each master contributed to it.
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub data: DataFrame,
    pub input_rows: usize,
    pub joins: Vec<JoinRecord>,
}

impl Consolidation {
    pub fn joined(&self) -> impl Iterator<Item = &JoinRecord> {
        self.joins.iter().filter(|record| record.is_joined())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &JoinRecord> {
        self.joins.iter().filter(|record| !record.is_joined())
    }
}

/// Joins static and dynamic masters onto the merged transaction table.
///
/// The output has at least as many rows as `transactions`; master keys that
/// repeat fan the matching transaction rows out.
pub fn consolidate(
    transactions: DataFrame,
    statics: &StaticMasters,
    dynamics: &DynamicMasters,
) -> Result<Consolidation> {
    let input_rows = transactions.height();
    let mut joins = Vec::new();
    let mut data = transactions;

    for descriptor in STATIC_MASTERS {
        let record = join_static(&mut data, descriptor, statics)?;
        joins.push(record);
    }

    for descriptor in STATIC_MASTERS {
        for (from, to) in descriptor.rename {
            if rename_if_present(&mut data, from, to)? {
                tracing::debug!(master = %descriptor.master, from, to, "post-join rename");
            }
        }
    }

    for role in DYNAMIC_JOIN_ORDER {
        let record = join_dynamic(&mut data, role, statics, dynamics)?;
        joins.push(record);
    }

    reconcile_personnel(&mut data)?;

    tracing::info!(
        input_rows,
        rows = data.height(),
        columns = data.width(),
        joined = joins.iter().filter(|r| r.is_joined()).count(),
        skipped = joins.iter().filter(|r| !r.is_joined()).count(),
        "consolidation joins complete"
    );

    Ok(Consolidation {
        data,
        input_rows,
        joins,
    })
}

fn join_static(
    data: &mut DataFrame,
    descriptor: &StaticMasterDescriptor,
    statics: &StaticMasters,
) -> Result<JoinRecord> {
    let master = descriptor.master.to_string();
    let Some(key) = descriptor.join_key else {
        return Ok(skipped(master, None, SkipReason::NoJoinKey));
    };
    let Some(table) = statics.get(descriptor.master) else {
        return Ok(skipped(master, Some(key), SkipReason::NotAvailable));
    };
    if !has_column(data, key) {
        tracing::warn!(master = %descriptor.master, key, "join key not in transaction table, skipping join");
        return Ok(skipped(master, Some(key), SkipReason::MissingLeftKey(key.into())));
    }
    if !has_column(table, key) {
        tracing::warn!(master = %descriptor.master, key, "join key not in master, skipping join");
        return Ok(skipped(master, Some(key), SkipReason::MissingMasterKey(key.into())));
    }

    let columns: Vec<(&str, &str)> = descriptor
        .columns
        .iter()
        .filter(|column| **column != key)
        .map(|column| (*column, *column))
        .collect();
    let joined = left_join(data, table, key, key, &columns)?;
    tracing::info!(
        master = %descriptor.master,
        key,
        matched = joined.matched_rows,
        rows = joined.data.height(),
        "joined static master"
    );
    let record = JoinRecord {
        master,
        key: Some(key.to_string()),
        status: JoinStatus::Joined {
            matched_rows: joined.matched_rows,
            rows_after: joined.data.height(),
        },
    };
    *data = joined.data;
    Ok(record)
}

/// Applies the pre-merge renames, guarantees additional columns and runs the
/// static enrichments of one dynamic master.
pub fn prepare_dynamic_master(
    role: MasterRole,
    master: &DataFrame,
    statics: &StaticMasters,
) -> Result<DataFrame> {
    let descriptor = dynamic_descriptor(role);
    let mut prepared = master.clone();

    for (from, to) in descriptor.rename_before_merge {
        if rename_if_present(&mut prepared, from, to)? {
            tracing::debug!(master = %role, from, to, "pre-merge rename");
        }
    }
    for column in descriptor.additional_columns {
        if ensure_text_column(&mut prepared, column)? {
            tracing::debug!(master = %role, column, "added additional column");
        }
    }

    for enrichment in ENRICHMENTS.iter().filter(|e| e.role == role) {
        let Some(table) = statics.get(enrichment.master) else {
            continue;
        };
        if !has_column(&prepared, enrichment.left_key) || !has_column(table, enrichment.master_key)
        {
            tracing::debug!(
                master = %role,
                lookup = %enrichment.master,
                key = enrichment.left_key,
                "enrichment key missing, skipping"
            );
            continue;
        }
        let joined = left_join(
            &prepared,
            table,
            enrichment.left_key,
            enrichment.master_key,
            enrichment.columns,
        )?;
        tracing::info!(
            master = %role,
            lookup = %enrichment.master,
            matched = joined.matched_rows,
            "enriched dynamic master"
        );
        prepared = joined.data;
    }

    Ok(prepared)
}

fn join_dynamic(
    data: &mut DataFrame,
    role: MasterRole,
    statics: &StaticMasters,
    dynamics: &DynamicMasters,
) -> Result<JoinRecord> {
    let descriptor = dynamic_descriptor(role);
    let master = role.to_string();
    let Some(key) = descriptor.join_key else {
        return Ok(skipped(master, None, SkipReason::NoJoinKey));
    };
    let Some(table) = dynamics.get(role).filter(|table| table.height() > 0) else {
        tracing::warn!(master = %role, "dynamic master not available or empty, skipping join");
        return Ok(skipped(master, Some(key), SkipReason::NotAvailable));
    };
    if !has_column(data, key) {
        tracing::warn!(master = %role, key, "join key not in consolidated table, skipping join");
        return Ok(skipped(master, Some(key), SkipReason::MissingLeftKey(key.into())));
    }

    let prepared = prepare_dynamic_master(role, table, statics)?;
    if !has_column(&prepared, key) {
        tracing::warn!(master = %role, key, "join key not in dynamic master, skipping join");
        return Ok(skipped(master, Some(key), SkipReason::MissingMasterKey(key.into())));
    }

    let wanted: BTreeSet<&str> = FINAL_COLUMNS
        .iter()
        .chain(descriptor.additional_columns)
        .chain(descriptor.carried_columns)
        .copied()
        .collect();
    let columns: Vec<(&str, &str)> = prepared
        .get_column_names()
        .into_iter()
        .map(PlSmallStr::as_str)
        .filter(|name| *name != key && wanted.contains(name))
        .map(|name| (name, name))
        .collect();

    let joined = left_join(data, &prepared, key, key, &columns)?;
    tracing::info!(
        master = %role,
        key,
        matched = joined.matched_rows,
        rows_before = data.height(),
        rows_after = joined.data.height(),
        "joined dynamic master"
    );
    let record = JoinRecord {
        master,
        key: Some(key.to_string()),
        status: JoinStatus::Joined {
            matched_rows: joined.matched_rows,
            rows_after: joined.data.height(),
        },
    };
    *data = joined.data;
    Ok(record)
}

/// Folds role-specific personnel columns into their Final Schema names.
///
/// A populated Final Schema value is kept; an empty one takes the
/// role-specific value. The role-specific column is dropped afterwards.
pub fn reconcile_personnel(data: &mut DataFrame) -> Result<()> {
    for (role_column, final_column) in PERSONNEL_RECONCILIATION {
        let Some(role_values) = column_strings(data, role_column) else {
            continue;
        };
        let merged = match column_strings(data, final_column) {
            Some(final_values) => {
                tracing::debug!(from = role_column, into = final_column, "reconciling personnel column");
                final_values
                    .into_iter()
                    .zip(role_values)
                    .map(|(current, fallback)| {
                        if current.trim().is_empty() {
                            fallback
                        } else {
                            current
                        }
                    })
                    .collect()
            }
            None => {
                tracing::debug!(from = role_column, into = final_column, "copying personnel column");
                role_values
            }
        };
        data.with_column(string_column(final_column, merged))?;
        *data = data.drop(role_column)?;
    }
    Ok(())
}

fn skipped(master: String, key: Option<&str>, reason: SkipReason) -> JoinRecord {
    JoinRecord {
        master,
        key: key.map(str::to_string),
        status: JoinStatus::Skipped(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use his_model::StaticMaster;

    fn frame(columns: &[(&str, &[&str])]) -> DataFrame {
        DataFrame::new(
            columns
                .iter()
                .map(|(name, values)| Series::new((*name).into(), *values).into_column())
                .collect(),
        )
        .unwrap()
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<String> {
        column_strings(df, name).unwrap()
    }

    #[test]
    fn static_joins_keep_row_count_and_synthesize_nothing() {
        let transactions = frame(&[
            ("Id_Cita", &["1", "1", "2"]),
            ("Id_Ups", &["301", "302", "301"]),
            ("Id_Pais", &["XX", "YY", "ZZ"]),
        ]);
        let mut statics = StaticMasters::new();
        statics.insert(
            StaticMaster::Ups,
            frame(&[
                ("Id_Ups", &["301", "302"]),
                ("Descripcion_Ups", &["MEDICINA", "DENTAL"]),
            ]),
        );
        statics.insert(
            StaticMaster::Pais,
            frame(&[("Id_Pais", &["PE"]), ("Descripcion_Pais", &["PERU"])]),
        );

        let result = consolidate(transactions, &statics, &DynamicMasters::new()).unwrap();
        assert_eq!(result.data.height(), 3);
        assert_eq!(result.input_rows, 3);
        assert_eq!(
            strings(&result.data, "Descripcion_Ups"),
            vec!["MEDICINA", "DENTAL", "MEDICINA"]
        );
        assert_eq!(strings(&result.data, "Descripcion_Pais"), vec!["", "", ""]);

        let ups = result.joins.iter().find(|r| r.master == "ups").unwrap();
        assert_eq!(
            ups.status,
            JoinStatus::Joined {
                matched_rows: 3,
                rows_after: 3
            }
        );
    }

    #[test]
    fn missing_key_skips_join() {
        let transactions = frame(&[("Id_Cita", &["1"])]);
        let mut statics = StaticMasters::new();
        statics.insert(
            StaticMaster::Ups,
            frame(&[("Id_Ups", &["301"]), ("Descripcion_Ups", &["MEDICINA"])]),
        );

        let result = consolidate(transactions, &statics, &DynamicMasters::new()).unwrap();
        assert!(!has_column(&result.data, "Descripcion_Ups"));
        let ups = result.joins.iter().find(|r| r.master == "ups").unwrap();
        assert_eq!(
            ups.status,
            JoinStatus::Skipped(SkipReason::MissingLeftKey("Id_Ups".into()))
        );
    }

    #[test]
    fn establishment_renames_after_join() {
        let transactions = frame(&[("Id_Cita", &["1"]), ("Id_Establecimiento", &["000123"])]);
        let mut statics = StaticMasters::new();
        statics.insert(
            StaticMaster::Establecimiento,
            frame(&[
                ("Id_Establecimiento", &["000123"]),
                ("Nombre_Establecimiento", &["CS SAN JUAN"]),
                ("Disa", &["LIMA"]),
                ("Red", &["NORTE"]),
                ("MicroRed", &["MR1"]),
            ]),
        );

        let result = consolidate(transactions, &statics, &DynamicMasters::new()).unwrap();
        assert_eq!(strings(&result.data, "Descripcion_Disa"), vec!["LIMA"]);
        assert_eq!(strings(&result.data, "Descripcion_Red"), vec!["NORTE"]);
        assert_eq!(strings(&result.data, "Descripcion_MicroRed"), vec!["MR1"]);
        assert!(!has_column(&result.data, "Disa"));
    }

    #[test]
    fn patient_master_is_renamed_enriched_and_joined() {
        let transactions = frame(&[("Id_Cita", &["1", "2"]), ("Id_Paciente", &[" 10", "11"])]);
        let mut statics = StaticMasters::new();
        statics.insert(
            StaticMaster::TipoDoc,
            frame(&[
                ("Id_Tipo_Documento", &["1"]),
                ("Abrev_Tipo_Doc", &["DNI"]),
                ("Descripcion_Tipo_Documento", &["DOC. NACIONAL"]),
            ]),
        );
        statics.insert(
            StaticMaster::Etnia,
            frame(&[("Id_Etnia", &["58"]), ("Descripcion_Etnia", &["MESTIZO"])]),
        );
        let mut dynamics = DynamicMasters::new();
        dynamics.insert(
            MasterRole::Patient,
            frame(&[
                ("Id_Paciente", &["10"]),
                ("Numero_Documento", &["44556677"]),
                ("Id_Tipo_Documento", &["1"]),
                ("Id_Etnia", &["58"]),
                ("Nombres_Paciente", &["ANA"]),
                ("Columna_Interna", &["x"]),
            ]),
        );

        let result = consolidate(transactions, &statics, &dynamics).unwrap();
        let data = &result.data;
        assert_eq!(strings(data, "Id_Paciente"), vec!["10", "11"]);
        assert_eq!(strings(data, "Numero_Documento_Paciente"), vec!["44556677", ""]);
        assert_eq!(strings(data, "Abrev_Tipo_Doc_Paciente"), vec!["DNI", ""]);
        assert_eq!(strings(data, "Descripcion_Etnia"), vec!["MESTIZO", ""]);
        assert_eq!(strings(data, "Domicilio_Declarado"), vec!["", ""]);
        assert!(!has_column(data, "Columna_Interna"));
        assert!(!has_column(data, "Id_Tipo_Documento_Paciente"));
    }

    #[test]
    fn personnel_columns_are_reconciled() {
        let transactions = frame(&[
            ("Id_Cita", &["1", "2"]),
            ("Id_Personal", &["7", "7"]),
            ("Id_Condicion", &["", "3"]),
        ]);
        let mut statics = StaticMasters::new();
        statics.insert(
            StaticMaster::Profesion,
            frame(&[("Id_Profesion", &["12"]), ("Descripcion_Profesion", &["ENFERMERA"])]),
        );
        let mut dynamics = DynamicMasters::new();
        dynamics.insert(
            MasterRole::Personnel,
            frame(&[
                ("Id_Personal", &["7"]),
                ("Id_Condicion", &["1"]),
                ("Id_Profesion", &["12"]),
                ("Nombres_Personal", &["LUIS"]),
            ]),
        );

        let result = consolidate(transactions, &statics, &dynamics).unwrap();
        let data = &result.data;
        assert_eq!(strings(data, "Id_Condicion"), vec!["1", "3"]);
        assert_eq!(strings(data, "Id_Profesion"), vec!["12", "12"]);
        assert_eq!(strings(data, "Descripcion_Profesion"), vec!["ENFERMERA", "ENFERMERA"]);
        assert!(!has_column(data, "Id_Condicion_Personal"));
        assert!(!has_column(data, "Id_Profesion_Personal"));
    }

    #[test]
    fn absent_dynamic_masters_are_reported() {
        let transactions = frame(&[("Id_Cita", &["1"]), ("Id_Paciente", &["10"])]);
        let result =
            consolidate(transactions, &StaticMasters::new(), &DynamicMasters::new()).unwrap();
        let patient = result.joins.iter().find(|r| r.master == "paciente").unwrap();
        assert_eq!(patient.status, JoinStatus::Skipped(SkipReason::NotAvailable));
        assert_eq!(result.skipped().count(), result.joins.len());
    }
}
