use polars::prelude::*;

use his_model::FilterKind;
use his_validate::{
    ERROR_COLUMN, FILTER_COLUMN, FilterSelection, ValidationError, validate, validate_all,
    validate_named,
};

/// An uploaded consolidated file as read back from CSV: every column text,
/// the visit id header damaged by a byte-order mark.
fn uploaded() -> DataFrame {
    df! {
        "\u{feff}Id_Cita" => ["100", "100", "101", "102", "103", "104"],
        "Mes" => ["9", "9", "3", "10", "10", "10"],
        "Id_Ups" => ["302101", "302101", "301203", "301203", "301203", "301203"],
        "Ficha_Familiar" => ["F-77", "F-77", "", "", "", ""],
        "Id_Condicion_Establecimiento" => ["C", "R", "N", "C", "C", "C"],
        "Id_Condicion_Servicio" => ["C", "C", "N", "C", "C", "C"],
        "Numero_Documento_Paciente" => ["40112233", "40112233", "12", "70001122", "70001122", "70001122"],
        "Fecha_Atencion" => ["02/09/2024", "02/09/2024", "11/03/2024", "04/10/2024", "18/10/2024", "fecha"],
        "Genero" => ["F", "F", "M", "F", "F", "F"],
        "Codigo_Item" => ["99199.22", "Z010", "D1206", "D509", "D509", "90675"],
        "Tipo_Diagnostico" => ["D", "D", "D", "D", "D", "D"],
        "Valor_Lab" => ["N", "", "", "LEV", "LEV", "1"],
    }
    .unwrap()
}

fn texts(df: &DataFrame, name: &str) -> Vec<String> {
    his_common::column_strings(df, name).unwrap()
}

#[test]
fn general_rules_on_an_uploaded_file() {
    let outcome = validate_named(&uploaded(), "generales").unwrap();
    assert_eq!(outcome.selection, FilterSelection::One(FilterKind::Generales));
    assert_eq!(
        texts(&outcome.table, ERROR_COLUMN),
        vec![
            // The blood pressure rule overwrites the continuador message on
            // the first row of visit 100.
            "Deben de tener valores de sistólica y diastólica",
            "El Valor Lab debe ser N o A",
        ]
    );
    assert_eq!(texts(&outcome.table, "\u{feff}Id_Cita"), vec!["100", "100"]);
}

#[test]
fn sequence_and_quality_filters() {
    let df = uploaded();

    let sequence = validate(&df, FilterKind::SecuenciaDx).unwrap();
    assert_eq!(texts(&sequence.table, "Fecha_Atencion"), vec!["04/10/2024", "18/10/2024"]);
    assert!(texts(&sequence.table, ERROR_COLUMN)[0].starts_with("ANEMIA con Tipo D inválido"));

    let dates = validate(&df, FilterKind::FechasInvalidas).unwrap();
    assert_eq!(texts(&dates.table, "Fecha_Atencion"), vec!["fecha"]);

    let documents = validate(&df, FilterKind::DocumentosInvalidos).unwrap();
    assert_eq!(documents.len(), 1);

    let duplicates = validate(&df, FilterKind::Duplicados).unwrap();
    assert_eq!(duplicates.len(), 2);
}

#[test]
fn all_rule_groups_are_stacked_in_order() {
    let outcome = validate_all(&uploaded()).unwrap();
    assert_eq!(outcome.selection, FilterSelection::AllRuleGroups);
    let groups = texts(&outcome.table, FILTER_COLUMN);
    assert_eq!(
        groups,
        vec![
            "generales",
            "generales",
            "dental",
            "inmunizaciones",
            "Error_secuencia_Dx",
            "Error_secuencia_Dx",
        ]
    );
}

#[test]
fn unknown_filter_is_rejected() {
    let err = validate_named(&uploaded(), "laboratorio").unwrap_err();
    assert!(matches!(err, ValidationError::UnknownFilter { .. }));
    assert_eq!(err.to_string(), "unknown validation filter 'laboratorio'");
}
