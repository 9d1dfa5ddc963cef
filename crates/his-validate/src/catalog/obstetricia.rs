//! Maternal health and family planning rules.

use super::{CODE, DX, LAB, SEX};
use crate::records::Row;
use crate::rule::Rule;

const SEROLOGY_DX: [&str; 8] = [
    "86703", "87342", "86780", "87340", "86703.01", "86703.02", "86318.01", "86803.01",
];

const RAPID_TESTS: [&str; 5] = ["86703.01", "86703.02", "86780", "86318.01", "87342"];

const CERVICAL_SCREENING: [&str; 3] = ["88141", "88141.01", "99386.03"];

/// Codes only valid for women. They are checked against `Valor_Lab`, where
/// some registrars type the diagnosis.
const FEMALE_ONLY: [&str; 30] = [
    "Z349", "Z3593", "Z359", "Z3491", "Z3592", "88141", "84152", "Z320", "N952", "O990", "Z374",
    "N951", "Z391", "C530", "M800", "O987", "Z014", "O261", "Z392", "Z641", "O479", "Z370", "N939",
    "N771", "O240", "B373", "O260", "N872", "N72X", "Z373",
];

const MALE_ONLY: [&str; 4] = ["N40X", "N433", "C61X", "N481"];

fn code_with_dx(row: &Row<'_>, code: &str, dx: &[&str]) -> bool {
    row.is(CODE, code) && row.is_any(DX, dx)
}

pub(super) static RULES: &[Rule] = &[
    Rule::row(
        "obstetricia.99208_13_r",
        &[CODE, DX, LAB],
        "El codigo 99208.13 con DX R solo acepta el campo LAB con valor 4",
        |row| code_with_dx(row, "99208.13", &["R"]) && !row.is(LAB, "4"),
    ),
    Rule::row(
        "obstetricia.99208_13_d",
        &[CODE, DX, LAB],
        "El codigo 99208.13 con DX D solo acepta el campo LAB con valor 1 o cambiar el Diagnostico a R SI EL LAB ES 4",
        |row| code_with_dx(row, "99208.13", &["D"]) && !row.is(LAB, "1"),
    ),
    Rule::row(
        "obstetricia.99208_02_d",
        &[CODE, DX, LAB],
        "El codigo 99208.02 con DX D solo acepta el campo LAB con valor 10 si el valor lab es 30, corregir DX R",
        |row| code_with_dx(row, "99208.02", &["D"]) && !row.is(LAB, "10"),
    ),
    Rule::row(
        "obstetricia.99208_02_r",
        &[CODE, DX, LAB],
        "El codigo 99208.02 con DX R solo acepta el campo LAB con valor 30 si el valor es 10 poner D",
        |row| code_with_dx(row, "99208.02", &["R"]) && !row.is(LAB, "30"),
    ),
    Rule::row(
        "obstetricia.99208_06_r",
        &[CODE, DX, LAB],
        "El codigo 99208.06 con DX R solo acepta el campo LAB con valor 30",
        |row| code_with_dx(row, "99208.06", &["R"]) && !row.is(LAB, "30"),
    ),
    Rule::row(
        "obstetricia.99208_04",
        &[CODE, DX, LAB],
        "El codigo 99208.04 solo acepta el campo LAB con valor 1",
        |row| code_with_dx(row, "99208.04", &["D", "R"]) && !row.is(LAB, "1"),
    ),
    Rule::row(
        "obstetricia.99208_05",
        &[CODE, DX, LAB],
        "El codigo 99208.05 solo acepta el campo LAB con valor 1",
        |row| code_with_dx(row, "99208.05", &["D", "R"]) && !row.is(LAB, "1"),
    ),
    Rule::row(
        "obstetricia.99208_06_d",
        &[CODE, DX, LAB],
        "El codigo 99208.06 con DX D solo acepta el campo LAB con valor 10",
        |row| code_with_dx(row, "99208.06", &["D"]) && !row.is(LAB, "10"),
    ),
    Rule::row(
        "obstetricia.92100",
        &[CODE, LAB],
        "EL Valor_Lab tiene que ser N o A",
        |row| row.is(CODE, "92100") && !row.is_any(LAB, &["N", "A"]),
    ),
    Rule::row(
        "obstetricia.serologia",
        &[CODE, DX, LAB],
        "El campo LAB debe ser RN= Resultado Negativo o RP= Resultado Positivo",
        |row| row.is_any(CODE, &SEROLOGY_DX) && row.is(DX, "D") && !row.is_any(LAB, &["RP", "RN"]),
    ),
    Rule::row(
        "obstetricia.plan_parto",
        &[CODE, LAB],
        "Plan de Parto debe tener valor_lab 1,2,3 o TA",
        |row| row.is(CODE, "59401.06") && !row.is_any(LAB, &["1", "2", "3", "TA"]),
    ),
    Rule::row(
        "obstetricia.bateria",
        &[CODE, LAB],
        "Corregir la primera bateria 80055.01 Con lab 1 y segunda bateria 80055.02 con lab 2",
        |row| {
            (row.is(CODE, "80055.01") && !row.is(LAB, "1"))
                || (row.is(CODE, "80055.02") && !row.is(LAB, "2"))
        },
    ),
    Rule::row(
        "obstetricia.pruebas_rapidas",
        &[CODE, LAB],
        "Valor_Lab solo debe de Tener RN y RP",
        |row| row.is_any(CODE, &RAPID_TESTS) && !row.is_any(LAB, &["RN", "RP"]),
    ),
    Rule::row(
        "obstetricia.tamizaje_cervical",
        &[CODE, LAB],
        "El Valor debe de ser Normal, Anormal o vacio",
        |row| {
            row.is_any(CODE, &CERVICAL_SCREENING)
                && !row.is_any(LAB, &["N", "A"])
                && !row.is_empty(LAB)
        },
    ),
    Rule::row(
        "obstetricia.riesgo_sexual",
        &[CODE, LAB],
        "EL Valor_Lab tiene que ser RSA,RSR o RSM",
        |row| row.is(CODE, "99208.14") && !row.is_any(LAB, &["RSA", "RSM", "RSR"]),
    ),
    Rule::row(
        "obstetricia.59430",
        &[CODE, LAB],
        "EL Valor_Lab tiene que tener valores 1 o 2",
        |row| row.is(CODE, "59430") && !row.is_any(LAB, &["1", "2"]),
    ),
    Rule::row(
        "obstetricia.59401_05",
        &[CODE, LAB],
        "EL Valor_Lab tiene que ser 1,2,3 o 4",
        |row| row.is(CODE, "59401.05") && !row.is_any(LAB, &["1", "2", "3", "4"]),
    ),
    Rule::row(
        "obstetricia.99401_33",
        &[CODE, LAB],
        "EL Valor_Lab tiene que tener 1,2 o vacio",
        |row| row.is(CODE, "99401.33") && !row.is_any(LAB, &["1", "2", ""]),
    ),
    Rule::row(
        "obstetricia.99401_34",
        &[CODE, LAB],
        "EL Valor_Lab tiene que tener 1,2,rma,rsa o vacio",
        |row| row.is(CODE, "99401.34") && !row.is_any(LAB, &["1", "2", "rma", "rsa", ""]),
    ),
    Rule::row(
        "obstetricia.87621",
        &[CODE, LAB],
        "EL Valor_Lab tiene que tener valores 1, 2, 'N', 'A'",
        |row| row.is(CODE, "87621") && !row.is_any(LAB, &["1", "2", "N", "A"]),
    ),
    Rule::row(
        "obstetricia.solo_mujeres",
        &[SEX, LAB],
        "El genero debe de ser Femenino",
        |row| row.is(SEX, "M") && row.is_any(LAB, &FEMALE_ONLY),
    ),
    Rule::row(
        "obstetricia.solo_varones",
        &[SEX, CODE],
        "El genero debe de ser Masculino",
        |row| row.is(SEX, "F") && row.is_any(CODE, &MALE_ONLY),
    ),
    Rule::row(
        "obstetricia.99386_03",
        &[CODE, LAB],
        "El Valor debe de ser Normal o Anormal",
        |row| row.is(CODE, "99386.03") && !row.is_any(LAB, &["N", "A"]),
    ),
];
