//! Master Registry: how every reference table is loaded and joined.
//!
//! Static masters are read from the deployment's data directory on every run.
//! Dynamic masters are uploaded by the user and recognized by
//! [`DYNAMIC_MASTERS`] signatures.

use crate::enums::{MasterRole, StaticMaster};

/// A reference file shipped with the deployment.
#[derive(Debug, Clone, Copy)]
pub struct StaticMasterDescriptor {
    pub master: StaticMaster,
    pub file_name: &'static str,
    /// Declared columns. With `positional` set these name the file's columns
    /// by position and the header line is kept as an ordinary row.
    pub columns: &'static [&'static str],
    /// Renames applied to the consolidated table after every static join.
    pub rename: &'static [(&'static str, &'static str)],
    pub join_key: Option<&'static str>,
    pub positional: bool,
    pub zero_pad: Option<&'static str>,
}

/// A file the user uploads each run.
#[derive(Debug, Clone, Copy)]
pub struct DynamicMasterDescriptor {
    pub role: MasterRole,
    /// Registry key; a lowercase match in the file name classifies the file.
    pub registry_key: &'static str,
    pub join_key: Option<&'static str>,
    /// Renames applied to the master before it is enriched and joined.
    pub rename_before_merge: &'static [(&'static str, &'static str)],
    /// Column signature used when the file name gives nothing away.
    pub identifier_columns: &'static [&'static str],
    /// Columns guaranteed present on the master and always carried by its join.
    pub additional_columns: &'static [&'static str],
    /// Role-specific columns carried by the join so they can be reconciled.
    pub carried_columns: &'static [&'static str],
    pub multiple_files: bool,
}

/// A join of a static master onto a dynamic master before the dynamic master
/// itself is joined onto the transaction table.
#[derive(Debug, Clone, Copy)]
pub struct Enrichment {
    pub role: MasterRole,
    pub master: StaticMaster,
    /// Key column on the dynamic master (after its pre-merge renames).
    pub left_key: &'static str,
    pub master_key: &'static str,
    /// `(static column, name on the dynamic master)` pairs.
    pub columns: &'static [(&'static str, &'static str)],
}

/// File-name keywords that always mean a transaction file.
pub const TRANSACTION_KEYWORDS: [&str; 3] = ["trama", "plano", "nominal"];

pub const STATIC_MASTERS: &[StaticMasterDescriptor] = &[
    StaticMasterDescriptor {
        master: StaticMaster::Busqueda,
        file_name: "MAESTRO_BUSQUEDA.csv",
        columns: &["ITEM", "TIPO_BUSQUEDA"],
        rename: &[
            ("ITEM", "Id_Busqueda"),
            ("TIPO_BUSQUEDA", "Descripcion_Busqueda"),
        ],
        join_key: Some("Id_Busqueda"),
        positional: true,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::Pais,
        file_name: "MAESTRO_HIS_PAIS.csv",
        columns: &["Id_Pais", "Descripcion_Pais"],
        rename: &[],
        join_key: Some("Id_Pais"),
        positional: true,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::CieCpms,
        file_name: "MAESTRO_HIS_CIE_CPMS.csv",
        columns: &["Codigo_Item", "Descripcion_Item"],
        rename: &[],
        join_key: Some("Codigo_Item"),
        positional: true,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::Ups,
        file_name: "MAESTRO_HIS_UPS.csv",
        columns: &["Id_Ups", "Descripcion_Ups"],
        rename: &[],
        join_key: Some("Id_Ups"),
        positional: true,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::OtraCondicion,
        file_name: "MAESTRO_HIS_OTRA_CONDicion.csv",
        columns: &["Id_Otra_Condicion", "Descripcion_Otra_Condicion"],
        rename: &[],
        join_key: Some("Id_Otra_Condicion"),
        positional: false,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::Profesion,
        file_name: "MAESTRO_HIS_PROFESION.csv",
        columns: &["Id_Profesion", "Descripcion_Profesion"],
        rename: &[],
        join_key: Some("Id_Profesion"),
        positional: false,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::CondicionContrato,
        file_name: "MAESTRO_HIS_CONDICION_CONTRATO.csv",
        columns: &["Id_Condicion", "Descripcion_Condicion"],
        rename: &[],
        join_key: Some("Id_Condicion"),
        positional: false,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::Colegio,
        file_name: "MAESTRO_HIS_COLEGIO.csv",
        columns: &["Id_Colegio", "Descripcion_Colegio"],
        rename: &[],
        join_key: Some("Id_Colegio"),
        positional: false,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::Etnia,
        file_name: "MAESTRO_HIS_ETNIA.csv",
        columns: &["Id_Etnia", "Descripcion_Etnia"],
        rename: &[],
        join_key: Some("Id_Etnia"),
        positional: false,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::TipoDoc,
        file_name: "MAESTRO_HIS_TIPO_DOC.csv",
        columns: &["Id_Tipo_Documento", "Abrev_Tipo_Doc", "Descripcion_Tipo_Documento"],
        rename: &[],
        join_key: Some("Id_Tipo_Documento"),
        positional: false,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::Financiador,
        file_name: "MAESTRO_HIS_FINANCIADOR.csv",
        columns: &["Id_Financiador", "Descripcion_Financiador"],
        rename: &[],
        join_key: Some("Id_Financiador"),
        positional: false,
        zero_pad: None,
    },
    StaticMasterDescriptor {
        master: StaticMaster::Establecimiento,
        file_name: "MAESTRO_HIS_ESTABLECIMIENTO.csv",
        columns: &[
            "Id_Establecimiento",
            "Nombre_Establecimiento",
            "Ubigueo_Establecimiento",
            "Codigo_Disa",
            "Disa",
            "Codigo_Red",
            "Red",
            "Codigo_MicroRed",
            "MicroRed",
            "Codigo_Unico",
            "Codigo_Sector",
            "Descripcion_Sector",
            "Departamento",
            "Provincia",
            "Distrito",
        ],
        rename: &[
            ("Disa", "Descripcion_Disa"),
            ("Red", "Descripcion_Red"),
            ("MicroRed", "Descripcion_MicroRed"),
        ],
        join_key: Some("Id_Establecimiento"),
        positional: false,
        zero_pad: Some("Id_Establecimiento"),
    },
];

pub const DYNAMIC_MASTERS: &[DynamicMasterDescriptor] = &[
    DynamicMasterDescriptor {
        role: MasterRole::Transaction,
        registry_key: "NominalTrama",
        join_key: None,
        rename_before_merge: &[],
        identifier_columns: &[
            "Id_Cita",
            "Id_Paciente",
            "Id_Establecimiento",
            "Codigo_Item",
            "Fecha_Atencion",
        ],
        additional_columns: &[],
        carried_columns: &[],
        multiple_files: true,
    },
    DynamicMasterDescriptor {
        role: MasterRole::Registrar,
        registry_key: "MaestroRegistrador",
        join_key: Some("Id_Registrador"),
        rename_before_merge: &[
            ("Numero_Documento", "Numero_Documento_Registrador"),
            ("Id_Tipo_Documento", "Id_Tipo_Documento_Registrador"),
            ("Fecha_Nacimiento", "Fecha_Nacimiento_Registrador"),
        ],
        identifier_columns: &[
            "Id_Registrador",
            "Numero_Documento",
            "Nombres_Registrador",
            "Apellido_Paterno_Registrador",
        ],
        additional_columns: &[],
        carried_columns: &[],
        multiple_files: false,
    },
    DynamicMasterDescriptor {
        role: MasterRole::Patient,
        registry_key: "MaestroPaciente",
        join_key: Some("Id_Paciente"),
        rename_before_merge: &[
            ("Numero_Documento", "Numero_Documento_Paciente"),
            ("Id_Tipo_Documento", "Id_Tipo_Documento_Paciente"),
            ("Fecha_Nacimiento", "Fecha_Nacimiento_Paciente"),
        ],
        identifier_columns: &[
            "Id_Paciente",
            "Numero_Documento",
            "Nombres_Paciente",
            "Genero",
            "Apellido_Paterno_Paciente",
        ],
        additional_columns: &["Domicilio_Declarado", "Referencia_Domicilio"],
        carried_columns: &[],
        multiple_files: false,
    },
    DynamicMasterDescriptor {
        role: MasterRole::Personnel,
        registry_key: "MaestroPersonal",
        join_key: Some("Id_Personal"),
        rename_before_merge: &[
            ("Numero_Documento", "Numero_Documento_Personal"),
            ("Id_Tipo_Documento", "Id_Tipo_Documento_Personal"),
            ("Fecha_Nacimiento", "Fecha_Nacimiento_Personal"),
            ("Id_Condicion", "Id_Condicion_Personal"),
            ("Id_Profesion", "Id_Profesion_Personal"),
            ("Id_Colegio", "Id_Colegio_Personal"),
            ("Numero_Colegiatura", "Numero_Colegiatura_Personal"),
        ],
        identifier_columns: &[
            "Id_Personal",
            "Id_Profesion",
            "Nombres_Personal",
            "Apellido_Paterno_Personal",
        ],
        additional_columns: &[],
        carried_columns: &[
            "Id_Condicion_Personal",
            "Id_Profesion_Personal",
            "Id_Colegio_Personal",
            "Numero_Colegiatura_Personal",
        ],
        multiple_files: false,
    },
];

/// Static lookups joined onto dynamic masters, in application order.
pub const ENRICHMENTS: &[Enrichment] = &[
    Enrichment {
        role: MasterRole::Patient,
        master: StaticMaster::Etnia,
        left_key: "Id_Etnia",
        master_key: "Id_Etnia",
        columns: &[("Descripcion_Etnia", "Descripcion_Etnia")],
    },
    Enrichment {
        role: MasterRole::Patient,
        master: StaticMaster::TipoDoc,
        left_key: "Id_Tipo_Documento_Paciente",
        master_key: "Id_Tipo_Documento",
        columns: &[
            ("Descripcion_Tipo_Documento", "Descripcion_Tipo_Documento_Paciente"),
            ("Abrev_Tipo_Doc", "Abrev_Tipo_Doc_Paciente"),
        ],
    },
    Enrichment {
        role: MasterRole::Personnel,
        master: StaticMaster::CondicionContrato,
        left_key: "Id_Condicion_Personal",
        master_key: "Id_Condicion",
        columns: &[("Descripcion_Condicion", "Descripcion_Condicion")],
    },
    Enrichment {
        role: MasterRole::Personnel,
        master: StaticMaster::Profesion,
        left_key: "Id_Profesion_Personal",
        master_key: "Id_Profesion",
        columns: &[("Descripcion_Profesion", "Descripcion_Profesion")],
    },
    Enrichment {
        role: MasterRole::Personnel,
        master: StaticMaster::Colegio,
        left_key: "Id_Colegio_Personal",
        master_key: "Id_Colegio",
        columns: &[("Descripcion_Colegio", "Descripcion_Colegio")],
    },
    Enrichment {
        role: MasterRole::Personnel,
        master: StaticMaster::TipoDoc,
        left_key: "Id_Tipo_Documento_Personal",
        master_key: "Id_Tipo_Documento",
        columns: &[
            ("Descripcion_Tipo_Documento", "Descripcion_Tipo_Documento_Personal"),
            ("Abrev_Tipo_Doc", "Abrev_Tipo_Doc_Personal"),
        ],
    },
    Enrichment {
        role: MasterRole::Registrar,
        master: StaticMaster::TipoDoc,
        left_key: "Id_Tipo_Documento_Registrador",
        master_key: "Id_Tipo_Documento",
        columns: &[
            ("Descripcion_Tipo_Documento", "Descripcion_Tipo_Documento_Registrador"),
            ("Abrev_Tipo_Doc", "Abrev_Tipo_Doc_Registrador"),
        ],
    },
];

/// `(role-specific column, Final Schema column)` pairs merged after the
/// personnel join.
pub const PERSONNEL_RECONCILIATION: &[(&str, &str)] = &[
    ("Id_Condicion_Personal", "Id_Condicion"),
    ("Id_Profesion_Personal", "Id_Profesion"),
    ("Id_Colegio_Personal", "Id_Colegio"),
    ("Numero_Colegiatura_Personal", "Numero_Colegiatura"),
];

/// Order in which dynamic masters are joined onto the transaction table.
pub const DYNAMIC_JOIN_ORDER: [MasterRole; 3] =
    [MasterRole::Patient, MasterRole::Personnel, MasterRole::Registrar];

/// Descriptor for a static master. Descriptors are declared in
/// [`StaticMaster::ALL`] order.
pub fn static_descriptor(master: StaticMaster) -> &'static StaticMasterDescriptor {
    &STATIC_MASTERS[master as usize]
}

/// Descriptor for a dynamic master role.
pub fn dynamic_descriptor(role: MasterRole) -> &'static DynamicMasterDescriptor {
    &DYNAMIC_MASTERS[role as usize]
}
