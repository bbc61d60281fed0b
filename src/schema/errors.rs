//! Schema registry error types
//!
//! Error codes:
//! - PLACE_UNKNOWN_SCHEMA: no schema registered for the entity kind
//! - PLACE_SCHEMA_IMMUTABLE: a kind was registered twice
//! - PLACE_MALFORMED_SCHEMA: a schema definition or file is invalid

use std::fmt;

use crate::model::EntityKind;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    UnknownSchema,
    SchemaImmutable,
    MalformedSchema,
}

impl SchemaErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownSchema => "PLACE_UNKNOWN_SCHEMA",
            SchemaErrorCode::SchemaImmutable => "PLACE_SCHEMA_IMMUTABLE",
            SchemaErrorCode::MalformedSchema => "PLACE_MALFORMED_SCHEMA",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    entity_kind: Option<EntityKind>,
}

impl SchemaError {
    pub fn unknown_schema(kind: EntityKind) -> Self {
        Self {
            code: SchemaErrorCode::UnknownSchema,
            message: format!("No schema registered for '{}'", kind),
            entity_kind: Some(kind),
        }
    }

    pub fn schema_immutable(kind: EntityKind) -> Self {
        Self {
            code: SchemaErrorCode::SchemaImmutable,
            message: format!("Schema for '{}' is already registered", kind),
            entity_kind: Some(kind),
        }
    }

    /// Create an error for a malformed schema file or definition
    pub fn malformed_schema(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::MalformedSchema,
            message: format!("Malformed schema '{}': {}", origin.into(), reason.into()),
            entity_kind: None,
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn entity_kind(&self) -> Option<EntityKind> {
        self.entity_kind
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
