//! Smaller service groups: oral health, adolescent care, nutrition and
//! mental health.

use std::collections::HashSet;

use super::{CODE, DX, LAB};
use crate::records::RecordSet;
use crate::rule::{Findings, Rule};

const PROSTHESIS: [&str; 12] = [
    "D5110", "D5213", "D5120", "D5214", "D5130", "D5225", "D5140", "D5226", "D5211", "D5860",
    "D5212", "D5861",
];

pub(super) static DENTAL: &[Rule] = &[
    Rule::row(
        "dental.protesis",
        &[CODE, LAB],
        "El Valor_Lab no puede estar vacio",
        |row| row.is_any(CODE, &PROSTHESIS) && row.is_empty(LAB),
    ),
    Rule::row(
        "dental.fluor",
        &[CODE, LAB],
        "El Valor_Lab no puede estar vacio",
        |row| row.is_any(CODE, &["D1310", "D1330"]) && row.is_empty(LAB),
    ),
    Rule::row(
        "dental.d1206",
        &[CODE, LAB],
        "El Valor_Lab no puede estar vacio tiene que ser 1 o 2",
        |row| row.is(CODE, "D1206") && row.is_empty(LAB),
    ),
    Rule::row(
        "dental.d1351",
        &[CODE, LAB],
        "El Valor_Lab solo debe llevar lab 1, 2, 3, 4 o FIN",
        |row| row.is(CODE, "D1351") && !row.is_any(LAB, &["1", "2", "3", "4", "FIN"]),
    ),
];

/// Visits with any of these codes are pregnancy or anemia care and are
/// excluded from the adolescent checks.
const ADOLESCENT_EXCLUDED: [&str; 6] = ["D509", "O990", "Z3591", "Z3592", "Z3593", "Z3594"];

const PATIENT_AGE: &str = "Anio_Actual_Paciente";

pub(super) static ADOLESCENTE: &[Rule] = &[Rule::set(
    "adolescente.suplementacion",
    &[CODE, LAB, PATIENT_AGE],
    check_adolescent_supplements,
)];

fn check_adolescent_supplements(records: &RecordSet, findings: &mut Findings) {
    let visits = records.visit_ids();
    let excluded: HashSet<&str> = records
        .rows()
        .filter(|row| row.is_any(CODE, &ADOLESCENT_EXCLUDED))
        .map(|row| visits[row.index()].as_str())
        .collect();

    for row in records.rows() {
        if excluded.contains(visits[row.index()].as_str()) {
            continue;
        }
        let adolescent = row
            .decimal(PATIENT_AGE)
            .is_some_and(|age| (12.0..=17.0).contains(&age));
        if row.is(CODE, "99199.26") && !row.is(LAB, "TA") && adolescent {
            findings.flag(
                row.index(),
                "VERIFICAR SUPLEMENTACION EN ADOLESCENTES QUE NO SEAN TA",
            );
        }
    }
}

pub(super) static NUTRICION: &[Rule] = &[
    Rule::row(
        "nutricion.r628",
        &[CODE, LAB],
        "EL R628 maneja campo lab TP, verificar si el codigo es z724 P/E y T/E",
        |row| row.is(CODE, "R628") && !row.is_any(LAB, &["TP", "PR"]),
    ),
    Rule::row(
        "nutricion.anemia",
        &[CODE, DX, LAB],
        "El Valor de Anemia es 'LEV', 'MOD', 'SEV'",
        |row| {
            row.is_any(CODE, &["D509", "O990"])
                && row.is_any(DX, &["D", "R"])
                && !row.is_any(LAB, &["LEV", "MOD", "SEV", "PR"])
        },
    ),
];

const INTELLECTUAL_DISABILITY: [&str; 19] = [
    "F700", "F710", "F791", "F711", "F721", "F709", "F719", "F701", "F799", "F729", "F720", "F708",
    "F789", "F790", "F798", "F718", "F739", "F781", "F788",
];

pub(super) static PSICOLOGIA: &[Rule] = &[Rule::row(
    "psicologia.retraso_mental",
    &[CODE, DX],
    "Cambiar el Tipo de Dx Retraso mental a R",
    |row| row.is_any(CODE, &INTELLECTUAL_DISABILITY) && row.is(DX, "D"),
)];
