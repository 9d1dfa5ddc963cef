//! Integration tests for the pipeline module.

use std::fs;
use std::path::{Path, PathBuf};

use his_cli::pipeline::{consolidate_inputs, load_upload, run_selection, selection_from_flags};
use his_ingest::RepairTable;
use his_model::{FINAL_COLUMNS, FilterKind, MasterRole, STATIC_MASTERS};
use his_report::{ExportFormat, write_error_report};
use his_transform::DeriveOptions;
use his_validate::{ERROR_COLUMN, FilterSelection};
use polars::prelude::PlSmallStr;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

fn masters_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for descriptor in STATIC_MASTERS {
        write(dir.path(), descriptor.file_name, &format!("{}\n", descriptor.columns.join(";")));
    }
    dir
}

fn uploads_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "trama_mayo.csv",
        "Id_Cita;Id_Paciente;Id_Establecimiento;Codigo_Item;Fecha_Atencion\n\
         C1;P1;123;F700;2024-05-10\n\
         C2;P2;123;Z001;2024-05-11\n",
    );
    write(
        dir.path(),
        "pacientes.csv",
        "Id_Paciente,Numero_Documento,Nombres_Paciente,Genero,Apellido_Paterno_Paciente\n\
         P1,12345678,ANA,F,QUISPE\n",
    );
    write(dir.path(), "notas.csv", "Tema,Detalle\nreunion,lunes\n");
    dir
}

#[test]
fn consolidates_a_directory_of_uploads() {
    let masters = masters_dir();
    let uploads = uploads_dir();

    let run = consolidate_inputs(
        &[uploads.path().to_path_buf()],
        masters.path(),
        &RepairTable::default(),
        &DeriveOptions::default(),
    )
    .expect("consolidate");

    assert_eq!(run.upload_files, 3);
    assert_eq!(run.transaction_files, 1);
    assert_eq!(run.master_roles, vec![MasterRole::Patient]);
    assert_eq!(run.unknown_files.len(), 1);

    let data = &run.consolidation.data;
    assert_eq!(data.height(), 2);
    let names: Vec<&str> = data
        .get_column_names()
        .into_iter()
        .map(PlSmallStr::as_str)
        .collect();
    assert_eq!(names, FINAL_COLUMNS);

    let documents = data
        .column("Numero_Documento_Paciente")
        .expect("column")
        .str()
        .expect("text column");
    assert_eq!(documents.get(0), Some("12345678"));
    assert!(
        run.consolidation
            .joined()
            .any(|record| record.master == "paciente")
    );
}

#[test]
fn missing_static_masters_abort_the_run() {
    let empty = TempDir::new().expect("temp dir");
    let uploads = uploads_dir();

    let error = consolidate_inputs(
        &[uploads.path().to_path_buf()],
        empty.path(),
        &RepairTable::default(),
        &DeriveOptions::default(),
    )
    .expect_err("static masters are required");

    assert!(format!("{error:#}").contains("static master"));
}

#[test]
fn uploads_without_csv_files_are_rejected() {
    let masters = masters_dir();
    let uploads = TempDir::new().expect("temp dir");

    let error = consolidate_inputs(
        &[uploads.path().to_path_buf()],
        masters.path(),
        &RepairTable::default(),
        &DeriveOptions::default(),
    )
    .expect_err("nothing to consolidate");

    assert!(error.to_string().contains("no CSV files"));
}

#[test]
fn validates_an_uploaded_file_and_writes_the_report() {
    let dir = TempDir::new().expect("temp dir");
    let upload = write(
        dir.path(),
        "consolidado.csv",
        "Id_Cita;Codigo_Item;Tipo_Diagnostico;Fecha_Atencion\n\
         C1;F700;D;2024-05-10\n\
         C2;F700;R;2024-05-11\n",
    );

    let df = load_upload(&upload, &RepairTable::default()).expect("load upload");
    let selection = selection_from_flags(Some(FilterKind::Psicologia), false).expect("selection");
    let outcome = run_selection(&df, selection).expect("validate");

    assert_eq!(outcome.len(), 1);
    let errors = outcome
        .table
        .column(ERROR_COLUMN)
        .expect("error column")
        .str()
        .expect("text column");
    assert_eq!(errors.get(0), Some("Cambiar el Tipo de Dx Retraso mental a R"));

    let report = dir.path().join("errores.csv");
    write_error_report(&outcome, &report, ExportFormat::Csv).expect("error report");
    let written = fs::read_to_string(&report).expect("read report");
    assert!(written.starts_with('\u{feff}'));
    assert!(written.contains("Retraso mental"));
}

#[test]
fn selection_flags_are_exclusive() {
    assert_eq!(
        selection_from_flags(None, true).expect("all"),
        FilterSelection::AllRuleGroups
    );
    assert!(selection_from_flags(Some(FilterKind::Dental), true).is_err());
    assert!(selection_from_flags(None, false).is_err());
}
