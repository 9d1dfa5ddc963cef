//! Type-safe enumerations for masters, column classes and validation groups.
//!
//! These replace the string keys HIS extracts are usually wired together
//! with, so a typo in a master or filter name is a compile error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic type class of a Final Schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnClass {
    /// Nullable 64-bit integer.
    Integer,
    /// Nullable floating point.
    Decimal,
    /// Nullable timestamp, date-only unless the source carries a time.
    Date,
    /// Trimmed text, never null.
    Text,
}

impl ColumnClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnClass::Integer => "integer",
            ColumnClass::Decimal => "decimal",
            ColumnClass::Date => "date",
            ColumnClass::Text => "text",
        }
    }
}

impl fmt::Display for ColumnClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role a user-uploaded file plays in a consolidation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MasterRole {
    /// Per-visit transaction file ("trama" / "plano"). Several may be uploaded.
    Transaction,
    /// Staff who keyed the visit into the HIS.
    Registrar,
    /// Patient registry.
    Patient,
    /// Attending staff registry.
    Personnel,
}

impl MasterRole {
    /// Declaration order, which is also the classification order.
    pub const ALL: [MasterRole; 4] = [
        MasterRole::Transaction,
        MasterRole::Registrar,
        MasterRole::Patient,
        MasterRole::Personnel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MasterRole::Transaction => "plano",
            MasterRole::Registrar => "registrador",
            MasterRole::Patient => "paciente",
            MasterRole::Personnel => "personal",
        }
    }
}

impl fmt::Display for MasterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MasterRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plano" | "trama" => Ok(MasterRole::Transaction),
            "registrador" => Ok(MasterRole::Registrar),
            "paciente" => Ok(MasterRole::Patient),
            "personal" => Ok(MasterRole::Personnel),
            _ => Err(format!("Unknown master role: {s}")),
        }
    }
}

/// Reference tables shipped with the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StaticMaster {
    Busqueda,
    Pais,
    CieCpms,
    Ups,
    OtraCondicion,
    Profesion,
    CondicionContrato,
    Colegio,
    Etnia,
    TipoDoc,
    Financiador,
    Establecimiento,
}

impl StaticMaster {
    /// Declaration order. Static joins run in this order.
    pub const ALL: [StaticMaster; 12] = [
        StaticMaster::Busqueda,
        StaticMaster::Pais,
        StaticMaster::CieCpms,
        StaticMaster::Ups,
        StaticMaster::OtraCondicion,
        StaticMaster::Profesion,
        StaticMaster::CondicionContrato,
        StaticMaster::Colegio,
        StaticMaster::Etnia,
        StaticMaster::TipoDoc,
        StaticMaster::Financiador,
        StaticMaster::Establecimiento,
    ];

    /// Short logical name used in logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            StaticMaster::Busqueda => "busqueda",
            StaticMaster::Pais => "pais",
            StaticMaster::CieCpms => "cie_cpms",
            StaticMaster::Ups => "ups",
            StaticMaster::OtraCondicion => "otra_condicion",
            StaticMaster::Profesion => "profesion",
            StaticMaster::CondicionContrato => "condicion_contrato",
            StaticMaster::Colegio => "colegio",
            StaticMaster::Etnia => "etnia",
            StaticMaster::TipoDoc => "tipo_doc",
            StaticMaster::Financiador => "financiador",
            StaticMaster::Establecimiento => "establecimiento",
        }
    }
}

impl fmt::Display for StaticMaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named validation filters.
///
/// The first nine are rule catalog groups; the last three are data-quality
/// filters that only look at identifiers and dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    Generales,
    Dental,
    Adolescente,
    Obstetricia,
    Inmunizaciones,
    Cred,
    Nutricion,
    Psicologia,
    SecuenciaDx,
    Duplicados,
    FechasInvalidas,
    DocumentosInvalidos,
}

impl FilterKind {
    pub const RULE_GROUPS: [FilterKind; 9] = [
        FilterKind::Generales,
        FilterKind::Dental,
        FilterKind::Adolescente,
        FilterKind::Obstetricia,
        FilterKind::Inmunizaciones,
        FilterKind::Cred,
        FilterKind::Nutricion,
        FilterKind::Psicologia,
        FilterKind::SecuenciaDx,
    ];

    pub const ALL: [FilterKind; 12] = [
        FilterKind::Generales,
        FilterKind::Dental,
        FilterKind::Adolescente,
        FilterKind::Obstetricia,
        FilterKind::Inmunizaciones,
        FilterKind::Cred,
        FilterKind::Nutricion,
        FilterKind::Psicologia,
        FilterKind::SecuenciaDx,
        FilterKind::Duplicados,
        FilterKind::FechasInvalidas,
        FilterKind::DocumentosInvalidos,
    ];

    /// Identifier accepted on the command line and written to `Tipo_Filtro`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Generales => "generales",
            FilterKind::Dental => "dental",
            FilterKind::Adolescente => "adolescente",
            FilterKind::Obstetricia => "obstetricia",
            FilterKind::Inmunizaciones => "inmunizaciones",
            FilterKind::Cred => "cred",
            FilterKind::Nutricion => "nutricion",
            FilterKind::Psicologia => "psicologia",
            FilterKind::SecuenciaDx => "Error_secuencia_Dx",
            FilterKind::Duplicados => "duplicados",
            FilterKind::FechasInvalidas => "fechas_invalidas",
            FilterKind::DocumentosInvalidos => "documentos_invalidos",
        }
    }

    /// Human-readable description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            FilterKind::Generales => "Reglas generales de registro",
            FilterKind::Dental => "Salud bucal",
            FilterKind::Adolescente => "Atención integral del adolescente",
            FilterKind::Obstetricia => "Salud materna y planificación familiar",
            FilterKind::Inmunizaciones => "Vacunación",
            FilterKind::Cred => "Control de crecimiento y desarrollo",
            FilterKind::Nutricion => "Nutrición",
            FilterKind::Psicologia => "Salud mental",
            FilterKind::SecuenciaDx => "Secuencia de diagnósticos definitivos",
            FilterKind::Duplicados => "Citas duplicadas",
            FilterKind::FechasInvalidas => "Fechas de atención inválidas",
            FilterKind::DocumentosInvalidos => "Documentos de paciente inválidos",
        }
    }

    pub fn is_rule_group(&self) -> bool {
        !self.is_quality_filter()
    }

    pub fn is_quality_filter(&self) -> bool {
        matches!(
            self,
            FilterKind::Duplicados | FilterKind::FechasInvalidas | FilterKind::DocumentosInvalidos
        )
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    /// Filter identifiers are matched exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown filter: {s}"))
    }
}
