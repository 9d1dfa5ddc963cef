//! Child growth and development (CRED) rules.

use super::{CODE, DX, LAB, LOT};
use crate::rule::Rule;

const SUPPLEMENTS: [&str; 2] = ["99199.17", "99199.19"];
const SUPPLEMENT_DOSES: [&str; 8] = ["1", "2", "3", "4", "5", "6", "7", "TA"];
const HEMOGLOBIN: [&str; 2] = ["85018", "85018.01"];
const WELL_CHILD: [&str; 4] = ["99381.01", "99381", "99382", "99383"];

/// Lot used by the CRED registers.
const CRED_LOT: &str = "CED";

pub(super) static RULES: &[Rule] = &[
    Rule::row(
        "cred.suplementacion",
        &[CODE, LAB],
        "Verificar el numero de suplementacion",
        |row| {
            row.is_any(CODE, &SUPPLEMENTS)
                && !row.is_any(LAB, &SUPPLEMENT_DOSES)
                && !row.is_empty(LAB)
        },
    ),
    Rule::row(
        "cred.tamizaje_vacio",
        &[CODE, LOT, LAB],
        "Lab Vacio, tiene que ir numero de tamizaje",
        |row| row.is_any(CODE, &HEMOGLOBIN) && row.is(LOT, CRED_LOT) && row.is_empty(LAB),
    ),
    Rule::row(
        "cred.hemoglobina",
        &[CODE, LOT, LAB, "Hemoglobina"],
        "Lab Vacio, No tiene Valor de Hemoglobina",
        |row| {
            row.is_any(CODE, &HEMOGLOBIN)
                && row.decimal("Hemoglobina").is_none()
                && row.is(LOT, CRED_LOT)
                && !row.is_empty(LAB)
        },
    ),
    Rule::row(
        "cred.plan_integral",
        &[CODE, LOT, LAB],
        "Plan de Atencion integral Vacio",
        |row| row.is(CODE, "99801") && row.is(LOT, CRED_LOT) && row.is_empty(LAB),
    ),
    Rule::row(
        "cred.control",
        &[CODE, LOT, LAB],
        "Nro de Control Vacio",
        |row| row.is_any(CODE, &WELL_CHILD) && row.is(LOT, CRED_LOT) && row.is_empty(LAB),
    ),
    Rule::row(
        "cred.r620",
        &[CODE, LOT, LAB],
        "VALORES DEBEN SER MOT O LEN",
        |row| row.is(CODE, "R620") && row.is(LOT, CRED_LOT) && !row.is_any(LAB, &["MOT", "LEN"]),
    ),
    Rule::row(
        "cred.desparasitacion",
        &[CODE, LAB],
        "Desparasitación solo debe ser 1 o 2",
        |row| row.is(CODE, "99199.28") && !row.is_any(LAB, &["1", "2"]),
    ),
    Rule::row(
        "cred.z001",
        &[CODE, DX, LAB],
        "Error: Para Z001 solo es válido Tipo_Diagnostico='D' y Valor_Lab vacío",
        |row| row.is(CODE, "Z001") && (!row.is(DX, "D") || !row.is_empty(LAB)),
    ),
    Rule::row(
        "cred.vitamina_a",
        &[CODE, LAB],
        "Suplementacion con vitamina A es VA1 o VA2",
        |row| row.is(CODE, "99199.27") && !row.is_any(LAB, &["VA1", "VA2"]),
    ),
];
