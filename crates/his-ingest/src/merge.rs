//! Transaction merger: stacks every uploaded transaction file into one table.

use std::path::PathBuf;

use polars::prelude::*;

use his_common::{column_strings, has_column, string_column};

use crate::error::{IngestError, Result};
use crate::loader::{LoadOptions, load_table, zero_pad};
use crate::repair::RepairTable;

/// Establishment key shared by the transaction table and the establishment master.
pub const ESTABLISHMENT_ID: &str = "Id_Establecimiento";

/// Loads and stacks transaction files in the given order.
///
/// Files are appended by position under the first file's column names, so a
/// file with a different column count is rejected. Any failure discards the
/// whole merge. The establishment id is then zero-padded, or added empty when
/// the files do not carry it.
pub fn merge_transactions(paths: &[PathBuf], repair: &RepairTable) -> Result<DataFrame> {
    let mut merged: Option<DataFrame> = None;
    for (index, path) in paths.iter().enumerate() {
        tracing::info!(
            path = %path.display(),
            file = index + 1,
            total = paths.len(),
            "loading transaction file"
        );
        let mut table = load_table(path, &LoadOptions::new(), repair)?.data;
        match merged.as_mut() {
            None => merged = Some(table),
            Some(accumulated) => {
                if table.width() != accumulated.width() {
                    return Err(IngestError::SchemaMismatch {
                        path: path.clone(),
                        expected: accumulated.width(),
                        found: table.width(),
                    });
                }
                let names = accumulated.get_column_names_owned();
                if table.get_column_names_owned() != names {
                    tracing::warn!(
                        path = %path.display(),
                        "transaction columns differ from the first file, appending by position"
                    );
                    table.set_column_names(names)?;
                }
                accumulated.vstack_mut(&table)?;
            }
        }
    }

    let mut merged = merged.ok_or(IngestError::NoTransactionFiles)?;
    pad_establishment(&mut merged)?;
    tracing::info!(
        rows = merged.height(),
        columns = merged.width(),
        files = paths.len(),
        "merged transaction files"
    );
    Ok(merged)
}

fn pad_establishment(df: &mut DataFrame) -> Result<()> {
    let values = if has_column(df, ESTABLISHMENT_ID) {
        column_strings(df, ESTABLISHMENT_ID)
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .map(zero_pad)
            .collect()
    } else {
        tracing::warn!("transaction table has no {ESTABLISHMENT_ID} column");
        vec![String::new(); df.height()]
    };
    df.with_column(string_column(ESTABLISHMENT_ID, values))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use his_common::column_value_string;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn stacks_files_with_their_own_delimiters() {
        let dir = TempDir::new().unwrap();
        let first = write(&dir, "trama_1.csv", "Id_Cita;Id_Establecimiento\nA1;123\n");
        let second = write(&dir, "trama_2.csv", "Id_Cita,Id_Establecimiento\nA2,4567\nA3,\n");

        let merged = merge_transactions(&[first, second], &RepairTable::default()).unwrap();
        assert_eq!(merged.height(), 3);
        assert_eq!(column_value_string(&merged, "Id_Cita", 2), "A3");
        assert_eq!(column_value_string(&merged, ESTABLISHMENT_ID, 0), "000123");
        assert_eq!(column_value_string(&merged, ESTABLISHMENT_ID, 1), "004567");
        assert_eq!(column_value_string(&merged, ESTABLISHMENT_ID, 2), "000000");
    }

    #[test]
    fn adds_missing_establishment_column() {
        let dir = TempDir::new().unwrap();
        let only = write(&dir, "trama.csv", "Id_Cita\nA1\n");
        let merged = merge_transactions(&[only], &RepairTable::default()).unwrap();
        assert_eq!(column_value_string(&merged, ESTABLISHMENT_ID, 0), "");
    }

    #[test]
    fn width_mismatch_fails_the_whole_merge() {
        let dir = TempDir::new().unwrap();
        let first = write(&dir, "trama_1.csv", "Id_Cita,Lote\nA1,1\n");
        let second = write(&dir, "trama_2.csv", "Id_Cita\nA2\n");
        let err = merge_transactions(&[first, second], &RepairTable::default()).unwrap_err();
        assert!(matches!(err, IngestError::SchemaMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn unreadable_file_fails_the_whole_merge() {
        let dir = TempDir::new().unwrap();
        let first = write(&dir, "trama_1.csv", "Id_Cita\nA1\n");
        let missing = dir.path().join("trama_2.csv");
        let err = merge_transactions(&[first, missing], &RepairTable::default()).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn nothing_to_merge() {
        let err = merge_transactions(&[], &RepairTable::default()).unwrap_err();
        assert!(matches!(err, IngestError::NoTransactionFiles));
    }
}
