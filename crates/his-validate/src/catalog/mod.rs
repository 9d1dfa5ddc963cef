//! Rule catalog, one module per group.
//!
//! Rules run in declaration order and a later match overwrites the message
//! of an earlier one on the same row.

mod cred;
mod generales;
mod inmunizaciones;
mod obstetricia;
mod services;

use his_model::FilterKind;

use crate::rule::Rule;
use crate::sequence;

pub(crate) const CODE: &str = "Codigo_Item";
pub(crate) const LAB: &str = "Valor_Lab";
pub(crate) const DX: &str = "Tipo_Diagnostico";
pub(crate) const SEX: &str = "Genero";
pub(crate) const MONTH: &str = "Mes";
pub(crate) const LOT: &str = "Lote";

/// Rules of a rule group, or `None` for data-quality filters.
pub fn rules_for(filter: FilterKind) -> Option<&'static [Rule]> {
    let rules = match filter {
        FilterKind::Generales => generales::RULES,
        FilterKind::Dental => services::DENTAL,
        FilterKind::Adolescente => services::ADOLESCENTE,
        FilterKind::Obstetricia => obstetricia::RULES,
        FilterKind::Inmunizaciones => inmunizaciones::RULES,
        FilterKind::Cred => cred::RULES,
        FilterKind::Nutricion => services::NUTRICION,
        FilterKind::Psicologia => services::PSICOLOGIA,
        FilterKind::SecuenciaDx => sequence::RULES,
        FilterKind::Duplicados | FilterKind::FechasInvalidas | FilterKind::DocumentosInvalidos => {
            return None;
        }
    };
    Some(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_rule_group_has_rules() {
        for filter in FilterKind::RULE_GROUPS {
            let rules = rules_for(filter).unwrap();
            assert!(!rules.is_empty(), "{filter} has no rules");
        }
        for filter in FilterKind::ALL.into_iter().filter(FilterKind::is_quality_filter) {
            assert!(rules_for(filter).is_none());
        }
    }

    #[test]
    fn rule_ids_are_unique() {
        let mut seen = HashSet::new();
        for filter in FilterKind::RULE_GROUPS {
            for rule in rules_for(filter).unwrap() {
                assert!(seen.insert(rule.id), "duplicate rule id {}", rule.id);
            }
        }
    }
}
