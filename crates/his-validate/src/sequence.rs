//! Chronic diagnosis sequence checks.
//!
//! A patient gets a single definitive (`D`) diagnosis per condition over
//! their whole history; follow-ups are repeats (`R`). A `D` is wrong when
//! another `D` for the same code falls in the same month under a different
//! visit, or when it comes after the patient's first `D` in a different
//! visit.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDateTime};

use crate::catalog::{CODE, DX};
use crate::records::RecordSet;
use crate::rule::{Findings, Rule};

const PATIENT_DOCUMENT: &str = "Numero_Documento_Paciente";
const VISIT_DATE: &str = "Fecha_Atencion";

/// A condition tracked for diagnosis sequence.
#[derive(Debug, Clone, Copy)]
pub struct ConditionGroup {
    pub key: &'static str,
    pub name: &'static str,
    pub codes: &'static [&'static str],
}

impl ConditionGroup {
    pub fn message(&self) -> String {
        format!(
            "{} con Tipo D inválido: solo se permite un único 'D' por paciente en todo su historial. \
             Duplicados en el mismo mes o 'D' posteriores al primero son error.",
            self.name
        )
    }
}

/// Tracked conditions, checked in this order.
pub const CONDITION_GROUPS: &[ConditionGroup] = &[
    ConditionGroup {
        key: "ANEMIA",
        name: "ANEMIA",
        codes: &["D509"],
    },
    ConditionGroup {
        key: "HIPERTENSION",
        name: "HIPERTENSIÓN ARTERIAL",
        codes: &["I10X"],
    },
    ConditionGroup {
        key: "DIABETES",
        name: "DIABETES MELLITUS",
        codes: &[
            "E111", "E112", "E113", "E114", "E115", "E116", "E117", "E118", "E119", "E141", "E142",
            "E143", "E144", "E145", "E146", "E147", "E148", "E149",
        ],
    },
    ConditionGroup {
        key: "VIOLENCIA",
        name: "VIOLENCIA (FÍSICA, SEXUAL, PSICOLÓGICA, MALTRATO)",
        codes: &[
            "T740", "T741", "T742", "T743", "T748", "T749", "Y040", "Y050", "Y058", "Y060", "Y061",
            "Y062", "Y068", "Y070", "Y071", "Y072", "Y078", "Y079",
        ],
    },
    ConditionGroup {
        key: "DEPRESION",
        name: "DEPRESIÓN",
        codes: &[
            "F314", "F317", "F319", "F320", "F321", "F322", "F323", "F328", "F329", "F330", "F331",
            "F332", "F334", "F339", "F341", "F413",
        ],
    },
    ConditionGroup {
        key: "AUTISMO",
        name: "TRASTORNO DEL ESPECTRO AUTISTA",
        codes: &["F840", "F841", "F845", "F848", "F849"],
    },
    ConditionGroup {
        key: "SINDROME_DOWN",
        name: "SÍNDROME DE DOWN",
        codes: &["Q900", "Q909"],
    },
    ConditionGroup {
        key: "CONDUCTA_SUICIDA",
        name: "INTENTO/CONDUCTA SUICIDA",
        codes: &["X780", "X788", "X849"],
    },
    ConditionGroup {
        key: "ANSIEDAD",
        name: "TRASTORNOS DE ANSIEDAD",
        codes: &[
            "F400", "F401", "F402", "F408", "F409", "F410", "F411", "F412", "F413", "F418", "F419",
            "F420", "F421", "F422", "F428", "F429", "F430", "F431", "F432", "F438", "F439", "F440",
            "F445", "F447", "F448", "F449", "F450", "F451", "F452", "F458", "F459", "F489",
        ],
    },
    ConditionGroup {
        key: "HEPATITIS",
        name: "HEPATITIS B",
        codes: &["B160", "B169", "B180", "B181"],
    },
];

pub(crate) static RULES: &[Rule] = &[Rule::set(
    "secuencia.diagnostico_definitivo",
    &[CODE, DX, PATIENT_DOCUMENT, VISIT_DATE],
    check_sequences,
)];

fn check_sequences(records: &RecordSet, findings: &mut Findings) {
    let visits = records.visit_ids();
    for group in CONDITION_GROUPS {
        let flagged = invalid_definitive_rows(records, &visits, group);
        if flagged.is_empty() {
            continue;
        }
        let message = group.message();
        for idx in flagged {
            findings.flag(idx, message.as_str());
        }
    }
}

struct Definitive<'a> {
    idx: usize,
    patient: &'a str,
    visit: &'a str,
    code: &'a str,
    date: Option<NaiveDateTime>,
}

impl Definitive<'_> {
    fn month(&self) -> Option<(i32, u32)> {
        self.date.map(|date| (date.year(), date.month()))
    }
}

/// Rows of `group` holding an invalid `D`, in table order.
fn invalid_definitive_rows(
    records: &RecordSet,
    visits: &[String],
    group: &ConditionGroup,
) -> Vec<usize> {
    let definitives: Vec<Definitive<'_>> = records
        .rows()
        .filter(|row| row.is_any(CODE, group.codes) && row.is(DX, "D"))
        .map(|row| Definitive {
            idx: row.index(),
            patient: row.text(PATIENT_DOCUMENT),
            visit: visits[row.index()].as_str(),
            code: row.text(CODE),
            date: row.date(VISIT_DATE),
        })
        .collect();
    if definitives.is_empty() {
        return Vec::new();
    }

    let mut per_month: HashMap<(&str, Option<(i32, u32)>, &str), usize> = HashMap::new();
    let mut per_month_visit: HashMap<(&str, Option<(i32, u32)>, &str, &str), usize> =
        HashMap::new();
    let mut first: HashMap<&str, &Definitive<'_>> = HashMap::new();
    for d in &definitives {
        *per_month.entry((d.patient, d.month(), d.code)).or_default() += 1;
        *per_month_visit
            .entry((d.patient, d.month(), d.code, d.visit))
            .or_default() += 1;
        first
            .entry(d.patient)
            .and_modify(|current| {
                if is_earlier(d, *current) {
                    *current = d;
                }
            })
            .or_insert(d);
    }

    definitives
        .iter()
        .filter(|d| {
            let month_duplicate = per_month[&(d.patient, d.month(), d.code)] > 1
                && per_month_visit[&(d.patient, d.month(), d.code, d.visit)] == 1;
            let first_d = first[&d.patient];
            let after_first = first_d.idx != d.idx && first_d.visit != d.visit;
            month_duplicate || after_first
        })
        .map(|d| d.idx)
        .collect()
}

/// Dated rows come before undated ones; ties keep table order.
fn is_earlier(candidate: &Definitive<'_>, current: &Definitive<'_>) -> bool {
    match (candidate.date, current.date) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        _ => false,
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

    fn anemia_message() -> String {
        CONDITION_GROUPS[0].message()
    }

    #[test]
    fn repeated_definitive_in_month_and_after_first() {
        let df = df! {
            "Id_Cita" => ["C1", "C2", "C3"],
            "Numero_Documento_Paciente" => ["12345678"; 3],
            "Fecha_Atencion" => ["10/01/2024", "20/01/2024", "05/03/2024"],
            "Codigo_Item" => ["D509"; 3],
            "Tipo_Diagnostico" => ["D"; 3],
        }
        .unwrap();
        let findings = run(&df);
        let expected = anemia_message();
        assert_eq!(findings.message(0), Some(expected.as_str()));
        assert_eq!(findings.message(1), Some(expected.as_str()));
        assert_eq!(findings.message(2), Some(expected.as_str()));
    }

    #[test]
    fn same_visit_repeat_is_kept_and_later_visit_is_flagged() {
        let df = df! {
            "Id_Cita" => ["C1", "C1", "C2"],
            "Numero_Documento_Paciente" => ["12345678"; 3],
            "Fecha_Atencion" => ["10/01/2024", "10/01/2024", "05/03/2024"],
            "Codigo_Item" => ["D509"; 3],
            "Tipo_Diagnostico" => ["D"; 3],
        }
        .unwrap();
        let findings = run(&df);
        assert_eq!(findings.message(0), None);
        assert_eq!(findings.message(1), None);
        assert_eq!(findings.message(2), Some(anemia_message().as_str()));
    }

    #[test]
    fn single_definitive_with_repeats_is_valid() {
        let df = df! {
            "Id_Cita" => ["C1", "C2", "C3"],
            "Numero_Documento_Paciente" => ["12345678"; 3],
            "Fecha_Atencion" => ["10/01/2024", "20/02/2024", "05/03/2024"],
            "Codigo_Item" => ["I10X"; 3],
            "Tipo_Diagnostico" => ["D", "R", "R"],
        }
        .unwrap();
        assert_eq!(run(&df).flagged_count(), 0);
    }

    #[test]
    fn same_visit_definitives_are_allowed() {
        let df = df! {
            "Id_Cita" => ["C1", "C1", "C2"],
            "Numero_Documento_Paciente" => ["P1", "P1", "P2"],
            "Fecha_Atencion" => ["10/01/2024", "10/01/2024", "01/02/2024"],
            "Codigo_Item" => ["D509", "D509", "D509"],
            "Tipo_Diagnostico" => ["D", "D", "D"],
        }
        .unwrap();
        assert_eq!(run(&df).flagged_count(), 0);
    }

    #[test]
    fn first_definitive_is_chronological_not_row_order() {
        let df = df! {
            "Id_Cita" => ["C2", "C1"],
            "Numero_Documento_Paciente" => ["P1", "P1"],
            "Fecha_Atencion" => ["15/06/2024", "15/01/2024"],
            "Codigo_Item" => ["Q900", "Q900"],
            "Tipo_Diagnostico" => ["D", "D"],
        }
        .unwrap();
        let findings = run(&df);
        assert!(findings.message(0).unwrap().starts_with("SÍNDROME DE DOWN"));
        assert_eq!(findings.message(1), None);
    }

    #[test]
    fn presumptive_rows_are_ignored() {
        let df = df! {
            "Id_Cita" => ["C1", "C2"],
            "Numero_Documento_Paciente" => ["P1", "P1"],
            "Fecha_Atencion" => ["15/01/2024", "16/01/2024"],
            "Codigo_Item" => ["D509", "D509"],
            "Tipo_Diagnostico" => ["D", "P"],
        }
        .unwrap();
        assert_eq!(run(&df).flagged_count(), 0);
    }
}
