//! Validation subsystem
//!
//! `Validator::validate(document, kind, resolver)` runs the schema's field
//! constraints, checks reference existence through an injected
//! `ReferenceResolver`, and for Places runs the relationship checks. The
//! result carries a verdict and every violation found, in a deterministic
//! order.
//!
//! The validator does not write anything. Callers persist a document only
//! when the result is accepted.

mod evaluator;
mod orchestrator;
mod policy;
mod relationship;
mod violation;

pub use evaluator::{evaluate, field_references};
pub use orchestrator::Validator;
pub use policy::{ValidationPolicy, DEFAULT_MAX_CONTAINMENT_DEPTH};
pub use relationship::RelationshipChecker;
pub use violation::{ValidationResult, Verdict, Violation, ViolationCode, ViolationSeverity};
