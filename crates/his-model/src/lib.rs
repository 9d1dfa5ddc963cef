pub mod enums;
pub mod registry;
pub mod schema;

pub use enums::{ColumnClass, FilterKind, MasterRole, StaticMaster};
pub use registry::{
    DYNAMIC_JOIN_ORDER, DYNAMIC_MASTERS, DynamicMasterDescriptor, ENRICHMENTS, Enrichment, PERSONNEL_RECONCILIATION,
    STATIC_MASTERS, StaticMasterDescriptor, TRANSACTION_KEYWORDS, dynamic_descriptor,
    static_descriptor,
};
pub use schema::{
    BOM_CORRUPTED_VISIT_ID, DATE_COLUMNS, DECIMAL_COLUMNS, FINAL_COLUMNS, INTEGER_COLUMNS,
    PRESENTATION_COLUMNS, TIMESTAMP_COLUMNS, VISIT_ID, column_class,
};
