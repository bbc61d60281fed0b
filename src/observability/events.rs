//! Observable events
//!
//! Events are explicit and typed; the string form is what lands in the
//! `event` key of a log line.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,
    SchemasLoaded,

    // Validation
    ValidationBegin,
    ValidationComplete,
    ValidationRejected,
    ValidationInconclusive,
    /// A resolver lookup failed
    ResolverUnavailable,
    /// Ancestor chain loops without passing through the candidate
    AncestorLoopDetected,
    /// Ancestor chain longer than the configured depth
    ContainmentDepthExceeded,

    // Migration
    SchemaInstalled,
    MigrationComplete,

    // Store checks
    StoreCheckBegin,
    StoreCheckComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::ValidationBegin => "VALIDATION_BEGIN",
            Event::ValidationComplete => "VALIDATION_COMPLETE",
            Event::ValidationRejected => "VALIDATION_REJECTED",
            Event::ValidationInconclusive => "VALIDATION_INCONCLUSIVE",
            Event::ResolverUnavailable => "RESOLVER_UNAVAILABLE",
            Event::AncestorLoopDetected => "ANCESTOR_LOOP_DETECTED",
            Event::ContainmentDepthExceeded => "CONTAINMENT_DEPTH_EXCEEDED",
            Event::SchemaInstalled => "SCHEMA_INSTALLED",
            Event::MigrationComplete => "MIGRATION_COMPLETE",
            Event::StoreCheckBegin => "STORE_CHECK_BEGIN",
            Event::StoreCheckComplete => "STORE_CHECK_COMPLETE",
        }
    }

    /// Severity an event is logged at.
    pub fn severity(&self) -> Severity {
        match self {
            Event::ValidationBegin | Event::ValidationComplete => Severity::Trace,
            Event::ResolverUnavailable
            | Event::AncestorLoopDetected
            | Event::ContainmentDepthExceeded => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
