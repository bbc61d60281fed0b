//! Schema registry subsystem
//!
//! Schemas are first-class definitions, one per entity kind, fixed at
//! startup. Documents are evaluated against them field by field in
//! declaration order.

mod definitions;
mod errors;
mod registry;
mod types;

pub use definitions::{builtin_schemas, opaque_schema, place_schema};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use registry::{schema_file_name, SchemaRegistry};
pub use types::{Constraint, FieldConstraint, Presence, Schema, ValueShape};
