//! Registration rules that apply to every service.

use super::{CODE, DX, LAB, MONTH, SEX};
use crate::rule::Rule;

const NON_REPEATABLE_DX: [&str; 13] = [
    "99381.01", "99381", "99382", "99383", "88141", "85018", "59430", "99403", "99199.17",
    "99402.08", "99199.22", "D1310", "D1330",
];

pub(super) static RULES: &[Rule] = &[
    // Only the first row of each visit carries the message.
    Rule::first_per_visit(
        "generales.continuador",
        &["Id_Ups", "Ficha_Familiar", "Id_Condicion_Establecimiento", "Id_Condicion_Servicio"],
        "Condición de establecimiento y servicio deben ser 'C' (Continuadores)",
        |row| {
            row.is("Id_Ups", "302101")
                && !row.text("Ficha_Familiar").starts_with("APP")
                && (!row.is("Id_Condicion_Establecimiento", "C")
                    || !row.is("Id_Condicion_Servicio", "C"))
        },
    ),
    Rule::row(
        "generales.dnt",
        &[CODE, LAB, MONTH],
        "EL VALOR LAB TIENE QUE SER DIFERENTE DNT",
        |row| row.is(CODE, "Z019") && row.is(LAB, "DNT") && row.int(MONTH).is_some_and(|m| m > 7),
    ),
    Rule::row(
        "generales.dosaje",
        &[CODE, LAB],
        "Verificar el numero de Dosaje",
        |row| row.is_any(CODE, &["85018", "85018.01"]) && row.is_empty(LAB),
    ),
    Rule::row(
        "generales.visita_domiciliaria",
        &[CODE, DX],
        "Visita Domiciliaria no puede Tipo_Dx R",
        |row| row.is_any(CODE, &["C0011", "C0011.01"]) && row.is(DX, "R"),
    ),
    Rule::row(
        "generales.presion_arterial",
        &[CODE, LAB, MONTH],
        "Deben de tener valores de sistólica y diastólica",
        |row| {
            row.is(CODE, "99199.22")
                && row.int(MONTH).is_some_and(|m| m > 8)
                && row.is_any(LAB, &["N", "A"])
        },
    ),
    Rule::row(
        "generales.tipo_dx",
        &[CODE, DX],
        "El tipo de Diagnostico no puede ser R",
        |row| row.is_any(CODE, &NON_REPEATABLE_DX) && !row.is(DX, "D"),
    ),
    Rule::row(
        "generales.solo_varones",
        &[CODE, SEX],
        "Diagnostico solo para varones",
        |row| row.is(CODE, "84152") && row.is(SEX, "F"),
    ),
    Rule::row(
        "generales.solo_mujeres",
        &[CODE, SEX],
        "Diagnostico solo para mujeres",
        |row| row.is(CODE, "O260") && row.is(SEX, "M"),
    ),
    Rule::row(
        "generales.examen_fisico",
        &[CODE, LAB],
        "El Valor Lab debe ser N o A",
        |row| row.is(CODE, "Z010") && !row.is_any(LAB, &["N", "A"]),
    ),
    Rule::row(
        "generales.psa",
        &[CODE, SEX],
        "Cambiar por el codigo 84152",
        |row| row.is(CODE, "84153") && row.is(SEX, "F"),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordSet;
    use crate::rule::Findings;
    use polars::prelude::*;

    fn run(df: &DataFrame) -> Findings {
        let records = RecordSet::from_frame(df);
        let mut findings = Findings::new(records.height());
        for rule in RULES {
            rule.apply(&records, &mut findings);
        }
        findings
    }

    #[test]
    fn continuador_condition_flags_first_row_of_visit() {
        let df = df! {
            "Id_Cita" => ["C1", "C1", "C2", "C3"],
            "Id_Ups" => ["302101", "302101", "302101", "302101"],
            "Ficha_Familiar" => ["F1", "F1", "APP12", "F3"],
            "Id_Condicion_Establecimiento" => ["C", "N", "N", "C"],
            "Id_Condicion_Servicio" => ["C", "C", "N", "C"],
        }
        .unwrap();
        let findings = run(&df);
        assert_eq!(
            findings.message(0),
            Some("Condición de establecimiento y servicio deben ser 'C' (Continuadores)")
        );
        assert_eq!(findings.message(1), None);
        assert_eq!(findings.message(2), None);
        assert_eq!(findings.message(3), None);
    }

    #[test]
    fn dnt_only_after_july() {
        let df = df! {
            "Codigo_Item" => ["Z019", "Z019", "Z019"],
            "Valor_Lab" => ["DNT", "DNT", "N"],
            "Mes" => [Some(8i64), Some(7), Some(9)],
        }
        .unwrap();
        let findings = run(&df);
        assert_eq!(findings.message(0), Some("EL VALOR LAB TIENE QUE SER DIFERENTE DNT"));
        assert_eq!(findings.flagged_count(), 1);
    }

    #[test]
    fn later_rule_wins_on_the_same_row() {
        // 85018 with an empty lab and a repeat diagnosis matches both the
        // dosage and the diagnosis-type rule.
        let df = df! {
            "Codigo_Item" => ["85018"],
            "Valor_Lab" => [""],
            "Tipo_Diagnostico" => ["R"],
        }
        .unwrap();
        let findings = run(&df);
        assert_eq!(findings.message(0), Some("El tipo de Diagnostico no puede ser R"));
    }

    #[test]
    fn sex_restricted_codes() {
        let df = df! {
            "Codigo_Item" => ["84152", "O260", "84153", "84152"],
            "Genero" => ["F", "M", "F", "M"],
        }
        .unwrap();
        let findings = run(&df);
        assert_eq!(findings.message(0), Some("Diagnostico solo para varones"));
        assert_eq!(findings.message(1), Some("Diagnostico solo para mujeres"));
        assert_eq!(findings.message(2), Some("Cambiar por el codigo 84152"));
        assert_eq!(findings.message(3), None);
    }
}
