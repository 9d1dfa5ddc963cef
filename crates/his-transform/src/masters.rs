//! Loading of static and dynamic masters.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::DataFrame;

use his_ingest::{
    ClassifiedUploads, IngestError, LoadOptions, RepairTable, load_table, merge_transactions,
};
use his_model::{MasterRole, STATIC_MASTERS, StaticMaster};

use crate::error::{ConsolidationError, Result};

/// Static reference tables, keyed by master.
#[derive(Debug, Clone, Default)]
pub struct StaticMasters {
    tables: BTreeMap<StaticMaster, DataFrame>,
}

impl StaticMasters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every registered static master from `dir`.
    ///
    /// All of them are required: the first one that is missing or unreadable
    /// aborts the run.
    pub fn load(dir: &Path, repair: &RepairTable) -> Result<Self> {
        let mut masters = Self::new();
        for descriptor in STATIC_MASTERS {
            let path = dir.join(descriptor.file_name);
            if !path.is_file() {
                return Err(ConsolidationError::MissingStaticMaster {
                    master: descriptor.master,
                    path,
                });
            }
            let loaded = load_table(&path, &LoadOptions::for_static(descriptor), repair)
                .map_err(|source| ConsolidationError::StaticMasterLoad {
                    master: descriptor.master,
                    path: path.clone(),
                    source,
                })?;
            tracing::info!(
                master = %descriptor.master,
                path = %path.display(),
                rows = loaded.data.height(),
                "loaded static master"
            );
            masters.insert(descriptor.master, loaded.data);
        }
        Ok(masters)
    }

    pub fn insert(&mut self, master: StaticMaster, table: DataFrame) -> Option<DataFrame> {
        self.tables.insert(master, table)
    }

    pub fn get(&self, master: StaticMaster) -> Option<&DataFrame> {
        self.tables.get(&master)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// User-uploaded masters for one run. The transaction table is kept apart
/// because it is the fact table every other master joins onto.
#[derive(Debug, Clone, Default)]
pub struct DynamicMasters {
    tables: BTreeMap<MasterRole, DataFrame>,
}

impl DynamicMasters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the registrar, patient and personnel masters that were uploaded.
    pub fn load(uploads: &ClassifiedUploads, repair: &RepairTable) -> Result<Self> {
        let mut masters = Self::new();
        for (role, path) in &uploads.masters {
            if *role == MasterRole::Transaction {
                continue;
            }
            let loaded = load_table(path, &LoadOptions::new(), repair).map_err(|source| {
                ConsolidationError::DynamicMasterLoad {
                    role: *role,
                    path: path.clone(),
                    source,
                }
            })?;
            tracing::info!(
                master = %role,
                path = %path.display(),
                rows = loaded.data.height(),
                columns = loaded.data.width(),
                "loaded dynamic master"
            );
            masters.insert(*role, loaded.data);
        }
        Ok(masters)
    }

    pub fn insert(&mut self, role: MasterRole, table: DataFrame) -> Option<DataFrame> {
        self.tables.insert(role, table)
    }

    pub fn get(&self, role: MasterRole) -> Option<&DataFrame> {
        self.tables.get(&role)
    }

    pub fn roles(&self) -> impl Iterator<Item = MasterRole> + '_ {
        self.tables.keys().copied()
    }
}

/// Merges the uploaded transaction files into the fact table.
pub fn load_transactions(uploads: &ClassifiedUploads, repair: &RepairTable) -> Result<DataFrame> {
    if uploads.transactions.is_empty() {
        return Err(ConsolidationError::MissingTransactions);
    }
    merge_transactions(&uploads.transactions, repair).map_err(|err| match err {
        IngestError::NoTransactionFiles => ConsolidationError::MissingTransactions,
        other => ConsolidationError::Merge(other),
    })
}
