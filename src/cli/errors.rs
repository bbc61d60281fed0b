//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit status.

use std::fmt;
use std::io;

use crate::migration::MigrationError;
use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file missing or invalid
    ConfigError,
    /// I/O error (stdin/stdout, store files)
    IoError,
    /// Input is not a JSON document
    InvalidDocument,
    /// Schemas could not be loaded
    SchemaError,
    /// Schema migration failed
    MigrationFailed,
    /// Document was not accepted
    DocumentRejected,
    /// At least one stored Place failed validation
    StoreInconsistent,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PLACE_CLI_CONFIG_ERROR",
            Self::IoError => "PLACE_CLI_IO_ERROR",
            Self::InvalidDocument => "PLACE_CLI_INVALID_DOCUMENT",
            Self::SchemaError => "PLACE_CLI_SCHEMA_ERROR",
            Self::MigrationFailed => "PLACE_CLI_MIGRATION_FAILED",
            Self::DocumentRejected => "PLACE_CLI_DOCUMENT_REJECTED",
            Self::StoreInconsistent => "PLACE_CLI_STORE_INCONSISTENT",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidDocument, msg)
    }

    /// Validation finished with a verdict other than accepted
    pub fn document_rejected(verdict: &str, violations: usize) -> Self {
        Self::new(
            CliErrorCode::DocumentRejected,
            format!("Document {} with {} violation(s)", verdict, violations),
        )
    }

    pub fn store_inconsistent(failing: usize, total: usize) -> Self {
        Self::new(
            CliErrorCode::StoreInconsistent,
            format!("{} of {} stored places not accepted", failing, total),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the command already wrote its result before failing.
    ///
    /// Rejections print the validation result as data, so no error
    /// envelope follows them.
    pub fn outcome_reported(&self) -> bool {
        matches!(
            self.code,
            CliErrorCode::DocumentRejected | CliErrorCode::StoreInconsistent
        )
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

impl From<MigrationError> for CliError {
    fn from(e: MigrationError) -> Self {
        Self::new(CliErrorCode::MigrationFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
