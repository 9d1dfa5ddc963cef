//! The Final Schema of the consolidated record set.
//!
//! Every consolidated output has exactly [`FINAL_COLUMNS`], in this order.
//! Each column belongs to one [`ColumnClass`]; the type lists below decide it.

use crate::enums::ColumnClass;

/// Canonical visit identifier column.
pub const VISIT_ID: &str = "Id_Cita";

/// First-column name produced when a UTF-8 byte-order mark is read as Latin-1.
pub const BOM_CORRUPTED_VISIT_ID: &str = "\u{ef}\u{bb}\u{bf}Id_Cita";

pub const FINAL_COLUMNS: &[&str] = &[
    "Id_Cita",
    "Anio",
    "Mes",
    "Dia",
    "Fecha_Atencion",
    "Lote",
    "Num_Pag",
    "Num_Reg",
    "Id_Ups",
    "Descripcion_Ups",
    "Descripcion_Sector",
    "Descripcion_Disa",
    "Descripcion_Red",
    "Descripcion_MicroRed",
    "Codigo_Unico",
    "Nombre_Establecimiento",
    "Abrev_Tipo_Doc_Paciente",
    "Numero_Documento_Paciente",
    "Apellido_Paterno_Paciente",
    "Apellido_Materno_Paciente",
    "Nombres_Paciente",
    "Fecha_Nacimiento_Paciente",
    "Genero",
    "Id_Etnia",
    "Descripcion_Etnia",
    "Historia_Clinica",
    "Ficha_Familiar",
    "Id_Financiador",
    "Descripcion_Financiador",
    "Descripcion_Pais",
    "Abrev_Tipo_Doc_Personal",
    "Numero_Documento_Personal",
    "Apellido_Paterno_Personal",
    "Apellido_Materno_Personal",
    "Nombres_Personal",
    "Fecha_Nacimiento_Personal",
    "Id_Condicion",
    "Descripcion_Condicion",
    "Id_Profesion",
    "Descripcion_Profesion",
    "Id_Colegio",
    "Descripcion_Colegio",
    "Numero_Colegiatura",
    "Abrev_Tipo_Doc_Registrador",
    "Numero_Documento_Registrador",
    "Apellido_Paterno_Registrador",
    "Apellido_Materno_Registrador",
    "Nombres_Registrador",
    "Fecha_Nacimiento_Registrador",
    "Id_Condicion_Establecimiento",
    "Id_Condicion_Servicio",
    "Edad_Reg",
    "Tipo_Edad",
    "Anio_Actual_Paciente",
    "Mes_Actual_Paciente",
    "Dia_Actual_Paciente",
    // Derived ages and bucket.
    "Edad_Dias_Paciente_FechaAtencion",
    "Edad_Meses_Paciente_FechaAtencion",
    "Edad_Anios_Paciente_FechaAtencion",
    "Edad_Dias_Paciente_FechaActual",
    "Edad_Meses_Paciente_FechaActual",
    "Edad_Anios_Paciente_FechaActual",
    "Grupo_Edad",
    "Id_Turno",
    "Codigo_Item",
    "Descripcion_Item",
    "Tipo_Diagnostico",
    "Valor_Lab",
    "Id_Correlativo",
    "Id_Correlativo_Lab",
    "Peso",
    "Talla",
    "Hemoglobina",
    "Perimetro_Abdominal",
    "Perimetro_Cefalico",
    "Descripcion_Otra_Condicion",
    "Fecha_Ultima_Regla",
    "Fecha_Solicitud_Hb",
    "Fecha_Resultado_Hb",
    "Fecha_Registro",
    "Fecha_Modificacion",
];

/// Nullable integer columns. Checked before every other class, so
/// `Id_Condicion` and the correlatives are integers even though upstream
/// extracts treat them as codes.
pub const INTEGER_COLUMNS: &[&str] = &[
    "Num_Pag",
    "Num_Reg",
    "Tipo_Doc_Paciente",
    "Tipo_Doc_Personal",
    "Tipo_Doc_Registrador",
    "Id_Condicion",
    "Anio_Actual_Paciente",
    "Mes_Actual_Paciente",
    "Dia_Actual_Paciente",
    "Id_Correlativo",
    "Id_Correlativo_Lab",
    "Edad_Dias_Paciente_FechaAtencion",
    "Edad_Meses_Paciente_FechaAtencion",
    "Edad_Anios_Paciente_FechaAtencion",
    "Edad_Dias_Paciente_FechaActual",
    "Edad_Meses_Paciente_FechaActual",
    "Edad_Anios_Paciente_FechaActual",
    "Mes",
    "Edad_Reg",
];

pub const DECIMAL_COLUMNS: &[&str] = &[
    "Peso",
    "Talla",
    "Hemoglobina",
    "Perimetro_Abdominal",
    "Perimetro_Cefalico",
];

pub const DATE_COLUMNS: &[&str] = &[
    "Fecha_Atencion",
    "Fecha_Nacimiento_Paciente",
    "Fecha_Nacimiento_Personal",
    "Fecha_Nacimiento_Registrador",
    "Fecha_Ultima_Regla",
    "Fecha_Solicitud_Hb",
    "Fecha_Resultado_Hb",
    "Fecha_Registro",
    "Fecha_Modificacion",
];

/// Date columns that keep their time of day on export.
pub const TIMESTAMP_COLUMNS: &[&str] = &["Fecha_Registro", "Fecha_Modificacion"];

/// Columns shown in validation previews and error reports, in display order.
pub const PRESENTATION_COLUMNS: &[&str] = &[
    "Id_Cita",
    "Anio",
    "Mes",
    "Fecha_Atencion",
    "Lote",
    "Num_Pag",
    "Num_Reg",
    "Id_Ups",
    "Descripcion_Ups",
    "Nombre_Establecimiento",
    "Numero_Documento_Paciente",
    "Nombres Completo Paciente",
    "Fecha_Nacimiento_Paciente",
    "Genero",
    "Numero_Documento_Personal",
    "Nombres Completo Personal",
    "Id_Condicion_Establecimiento",
    "Id_Condicion_Servicio",
    "Edad_Reg",
    "Mes_Actual_Paciente",
    "Anio_Actual_Paciente",
    "Tipo_Diagnostico",
    "Valor_Lab",
    "Codigo_Item",
    "id_ups",
    "Hemoglobina",
    "Observaciones",
    "Error",
];

/// Returns the type class a column is normalized to.
///
/// Columns outside the three typed lists are text.
pub fn column_class(name: &str) -> ColumnClass {
    if INTEGER_COLUMNS.contains(&name) {
        ColumnClass::Integer
    } else if DECIMAL_COLUMNS.contains(&name) {
        ColumnClass::Decimal
    } else if DATE_COLUMNS.contains(&name) {
        ColumnClass::Date
    } else {
        ColumnClass::Text
    }
}
