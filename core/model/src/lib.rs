//! FILENAME: core/model/src/lib.rs
//! PURPOSE: Shared data model for the pivot workspace.
//! CONTEXT: Re-exports the record, value and schema types used by the
//! `pivot-engine` and `persistence` crates.

pub mod record;
pub mod schema;
pub mod value;

pub use record::{RecordEntity, RecordId};
pub use schema::{
    AxisDomain, FieldDef, FieldKey, FieldRole, FieldType, FlagStyle, Schema, SchemaError,
    StyleRule,
};
pub use value::FieldValue;
