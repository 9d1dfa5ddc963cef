//! Immunization rules.
//!
//! The rabies vaccine (90675) is registered as a pair per visit: one row with
//! the dose number and one row with the PRE/POS exposure scheme.

use std::collections::{BTreeMap, BTreeSet};

use super::{CODE, LAB};
use crate::records::RecordSet;
use crate::rule::{Findings, Rule};

const RABIES: &str = "90675";
const DOSES: [&str; 5] = ["1", "2", "3", "4", "5"];
const SCHEMES: [&str; 2] = ["PRE", "POS"];

pub(super) static RULES: &[Rule] = &[
    Rule::row(
        "inmunizaciones.antirrabica_codigo",
        &[CODE],
        "Vacuna Antirrabica es 90675",
        |row| row.is(CODE, "90676"),
    ),
    Rule::set("inmunizaciones.antirrabica_registro", &[CODE, LAB], check_rabies_pairs),
];

fn check_rabies_pairs(records: &RecordSet, findings: &mut Findings) {
    let visits = records.visit_ids();
    let mut by_visit: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for row in records.rows().filter(|row| row.is(CODE, RABIES)) {
        by_visit.entry(visits[row.index()].as_str()).or_default().push(row.index());
    }

    for rows in by_visit.values() {
        let values: BTreeSet<&str> = rows.iter().map(|&idx| records.row(idx).text(LAB)).collect();
        let has_dose = values.iter().any(|value| DOSES.contains(value));
        let has_scheme = values.iter().any(|value| SCHEMES.contains(value));

        let visit_message = match rows.len() {
            1 if has_dose => Some("FALTA AGREGAR PRE O POS"),
            1 if has_scheme => Some("FALTA AGREGAR VALOR NUMÉRICO (1,2,3,4,5)"),
            1 => Some("Valor_Lab inválido"),
            2 if !(has_dose && has_scheme) => Some("Debe tener un valor numérico y un PRE/POST"),
            2 => None,
            _ => Some("Demasiados registros 90675 - Solo 2 permitidos"),
        };
        if let Some(message) = visit_message {
            for &idx in rows {
                findings.flag(idx, message);
            }
        }

        for &idx in rows {
            let value = records.row(idx).text(LAB);
            if !DOSES.contains(&value) && !SCHEMES.contains(&value) {
                findings.flag(idx, format!("Valor '{value}' inválido - Use 1,2,3,4,5 o PRE,POS"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn rabies_pairs() {
        let df = df! {
            "Id_Cita" => ["V1", "V1", "V2", "V3", "V3", "V4", "V4", "V4", "V5"],
            "Codigo_Item" => ["90675"; 9],
            "Valor_Lab" => ["1", "PRE", "2", "1", "3", "1", "PRE", "POS", "POS"],
        }
        .unwrap();
        let findings = run(&df);
        assert_eq!(findings.message(0), None);
        assert_eq!(findings.message(1), None);
        assert_eq!(findings.message(2), Some("FALTA AGREGAR PRE O POS"));
        assert_eq!(findings.message(3), Some("Debe tener un valor numérico y un PRE/POST"));
        assert_eq!(findings.message(4), Some("Debe tener un valor numérico y un PRE/POST"));
        for idx in 5..8 {
            assert_eq!(
                findings.message(idx),
                Some("Demasiados registros 90675 - Solo 2 permitidos")
            );
        }
        assert_eq!(findings.message(8), Some("FALTA AGREGAR VALOR NUMÉRICO (1,2,3,4,5)"));
    }

    #[test]
    fn invalid_value_overrides_visit_message() {
        let df = df! {
            "Id_Cita" => ["V1", "V1", "V2"],
            "Codigo_Item" => ["90675", "90675", "90676"],
            "Valor_Lab" => ["1", "X", ""],
        }
        .unwrap();
        let findings = run(&df);
        assert_eq!(findings.message(0), Some("Debe tener un valor numérico y un PRE/POST"));
        assert_eq!(
            findings.message(1),
            Some("Valor 'X' inválido - Use 1,2,3,4,5 o PRE,POS")
        );
        assert_eq!(findings.message(2), Some("Vacuna Antirrabica es 90675"));
    }
}
