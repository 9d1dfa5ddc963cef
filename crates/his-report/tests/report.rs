use polars::prelude::*;

use his_model::FilterKind;
use his_report::{
    ExportFormat, export_table, preview_outcome, write_error_report, DEFAULT_PREVIEW_LIMIT,
};
use his_validate::validate;

fn flagged_upload() -> DataFrame {
    df! {
        "Id_Cita" => ["501", "502", "503"],
        "Numero_Documento_Paciente" => ["40112233", "40112233", "71002233"],
        "Genero" => ["F", "M", "F"],
        "Codigo_Item" => ["84152", "O260", "Z001"],
        "Tipo_Diagnostico" => ["D", "D", "D"],
        "Valor_Lab" => ["", "nan", ""],
        "Descripcion_Item" => ["PSA", "EMBARAZO", "CONTROL"],
    }
    .unwrap()
}

#[test]
fn preview_transport_shape() {
    let outcome = validate(&flagged_upload(), FilterKind::Generales).unwrap();
    let preview = preview_outcome(&outcome, DEFAULT_PREVIEW_LIMIT);
    insta::assert_json_snapshot!(preview, @r###"
    {
      "columns": [
        "Id_Cita",
        "Numero_Documento_Paciente",
        "Genero",
        "Tipo_Diagnostico",
        "Valor_Lab",
        "Codigo_Item",
        "Error"
      ],
      "data": [
        [
          "501",
          "40112233",
          "F",
          "D",
          "",
          "84152",
          "Diagnostico solo para varones"
        ],
        [
          "502",
          "40112233",
          "M",
          "D",
          "",
          "O260",
          "Diagnostico solo para mujeres"
        ]
      ],
      "total_records": 2,
      "shown_records": 2
    }
    "###);
}

#[test]
fn exports_land_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let df = flagged_upload();

    let csv_path = dir.path().join("consolidado.csv");
    export_table(&df, &csv_path, ExportFormat::Csv).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("\u{feff}Id_Cita,"));
    assert_eq!(csv.lines().count(), 4);

    let outcome = validate(&df, FilterKind::Generales).unwrap();
    let report_path = dir.path().join("errores.xml");
    write_error_report(&outcome, &report_path, ExportFormat::Spreadsheet).unwrap();
    let xml = std::fs::read_to_string(&report_path).unwrap();
    assert!(xml.contains(r#"<Worksheet ss:Name="Errores">"#));
    assert!(xml.contains("Diagnostico solo para mujeres"));
    assert!(!xml.contains("EMBARAZO"));
}
