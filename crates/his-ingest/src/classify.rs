//! Master classifier: decides which dynamic master an uploaded file is.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

use his_common::has_column;
use his_model::{DYNAMIC_MASTERS, MasterRole, TRANSACTION_KEYWORDS};

use crate::loader::read_sample;

/// Rows read when a file has to be classified by its columns.
pub const SAMPLE_ROWS: usize = 5;

/// How a file was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// File name contains a transaction keyword.
    Keyword(MasterRole),
    /// File name contains a registry key.
    RegistryKey(MasterRole),
    /// Sample columns contain a master's identifier signature.
    Signature(MasterRole),
    Unknown,
}

impl Classification {
    pub fn role(&self) -> Option<MasterRole> {
        match self {
            Classification::Keyword(role)
            | Classification::RegistryKey(role)
            | Classification::Signature(role) => Some(*role),
            Classification::Unknown => None,
        }
    }
}

/// Classifies by file name alone. Returns `Unknown` when the columns have to
/// be inspected.
pub fn classify_name(file_name: &str) -> Classification {
    let lowered = file_name.to_lowercase();
    if TRANSACTION_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
    {
        return Classification::Keyword(MasterRole::Transaction);
    }
    DYNAMIC_MASTERS
        .iter()
        .find(|descriptor| lowered.contains(&descriptor.registry_key.to_lowercase()))
        .map(|descriptor| Classification::RegistryKey(descriptor.role))
        .unwrap_or(Classification::Unknown)
}

/// Classifies a file from its name and a few sample rows.
///
/// Name keywords win, then registry keys, then the first master (in
/// declaration order) whose whole identifier signature is present.
pub fn classify(file_name: &str, sample: &DataFrame) -> Classification {
    match classify_name(file_name) {
        Classification::Unknown => DYNAMIC_MASTERS
            .iter()
            .find(|descriptor| {
                !descriptor.identifier_columns.is_empty()
                    && descriptor
                        .identifier_columns
                        .iter()
                        .all(|column| has_column(sample, column))
            })
            .map(|descriptor| Classification::Signature(descriptor.role))
            .unwrap_or(Classification::Unknown),
        named => named,
    }
}

/// Classifies a file on disk, reading a sample only when the name is not enough.
///
/// A file that cannot be read for sampling is reported as unknown.
pub fn classify_file(path: &Path) -> Classification {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let by_name = classify_name(&file_name);
    if by_name != Classification::Unknown {
        return by_name;
    }
    match read_sample(path, SAMPLE_ROWS) {
        Ok(sample) => classify(&file_name, &sample),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "could not sample file for classification");
            Classification::Unknown
        }
    }
}

/// Uploads grouped by role.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedUploads {
    pub transactions: Vec<PathBuf>,
    pub masters: BTreeMap<MasterRole, PathBuf>,
    pub unknown: Vec<PathBuf>,
}

/// Classifies every upload. Unrecognized files are kept aside with a warning;
/// when a single-file role is uploaded twice, the later file wins.
pub fn classify_uploads(paths: &[PathBuf]) -> ClassifiedUploads {
    let mut uploads = ClassifiedUploads::default();
    for path in paths {
        let classification = classify_file(path);
        match classification.role() {
            Some(MasterRole::Transaction) => uploads.transactions.push(path.clone()),
            Some(role) => {
                tracing::info!(path = %path.display(), master = %role, ?classification, "classified upload");
                if let Some(previous) = uploads.masters.insert(role, path.clone()) {
                    tracing::warn!(
                        master = %role,
                        replaced = %previous.display(),
                        path = %path.display(),
                        "master uploaded more than once, keeping the later file"
                    );
                }
            }
            None => {
                tracing::warn!(path = %path.display(), "could not identify master type, skipping file");
                uploads.unknown.push(path.clone());
            }
        }
    }
    uploads
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sample(columns: &[&str]) -> DataFrame {
        DataFrame::new(
            columns
                .iter()
                .map(|name| Series::new((*name).into(), ["x"]).into_column())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn keywords_identify_transactions() {
        for name in ["Trama_Enero.csv", "plano_2024.csv", "NOMINAL.CSV"] {
            assert_eq!(
                classify_name(name),
                Classification::Keyword(MasterRole::Transaction)
            );
        }
    }

    #[test]
    fn registry_keys_identify_masters() {
        assert_eq!(
            classify_name("export_MaestroPaciente_2024.csv"),
            Classification::RegistryKey(MasterRole::Patient)
        );
        assert_eq!(
            classify_name("maestropersonal.csv"),
            Classification::RegistryKey(MasterRole::Personnel)
        );
    }

    #[test]
    fn signature_requires_every_identifier_column() {
        let patient = sample(&[
            "Id_Paciente",
            "Numero_Documento",
            "Nombres_Paciente",
            "Genero",
            "Apellido_Paterno_Paciente",
            "Extra",
        ]);
        assert_eq!(
            classify("pacientes.csv", &patient),
            Classification::Signature(MasterRole::Patient)
        );

        let partial = sample(&["Id_Paciente", "Numero_Documento", "Genero"]);
        assert_eq!(classify("pacientes.csv", &partial), Classification::Unknown);
    }

    #[test]
    fn signature_follows_declaration_order() {
        // Carries the full transaction and personnel signatures.
        let both = sample(&[
            "Id_Cita",
            "Id_Paciente",
            "Id_Establecimiento",
            "Codigo_Item",
            "Fecha_Atencion",
            "Id_Personal",
            "Id_Profesion",
            "Nombres_Personal",
            "Apellido_Paterno_Personal",
        ]);
        assert_eq!(
            classify("datos.csv", &both).role(),
            Some(MasterRole::Transaction)
        );
    }

    #[test]
    fn name_beats_columns() {
        let personnel = sample(&[
            "Id_Personal",
            "Id_Profesion",
            "Nombres_Personal",
            "Apellido_Paterno_Personal",
        ]);
        assert_eq!(
            classify("trama_personal.csv", &personnel),
            Classification::Keyword(MasterRole::Transaction)
        );
    }
}
