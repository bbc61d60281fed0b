//! Violations, verdicts and the validation result
//!
//! Severities:
//! - hard: blocks the write
//! - soft: reported; blocks only when the policy says so
//! - inconclusive: a check could not be completed; the document is neither
//!   accepted nor rejected on that account

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::model::Reference;

use super::policy::ValidationPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    Hard,
    Soft,
    Inconclusive,
}

/// Violation taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    /// Required field absent
    MissingRequiredField,
    /// Value present but wrong shape
    TypeMismatch,
    /// Value not in the closed allowed set
    EnumerationViolation,
    /// Boolean flag disagrees with its reference field
    FlagReferenceMismatch,
    /// Entity references itself
    SelfReference,
    /// Parent chain revisits the entity
    ContainmentCycle,
    /// Referenced entity does not exist
    DanglingReference,
    /// Neighbor does not list this entity back
    NeighborAsymmetry,
    /// Parent does not list this entity as a child
    ContainmentAsymmetry,
    /// Resolver failed; result is inconclusive
    ResolverUnavailable,
    /// Parent chain is longer than the configured depth; cycles past it are unchecked
    ContainmentUnverified,
    /// Field not declared by the schema (strict policy only)
    UnknownField,
    /// Update attempted to change an immutable field
    ImmutableField,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ViolationCode::TypeMismatch => "TYPE_MISMATCH",
            ViolationCode::EnumerationViolation => "ENUMERATION_VIOLATION",
            ViolationCode::FlagReferenceMismatch => "FLAG_REFERENCE_MISMATCH",
            ViolationCode::SelfReference => "SELF_REFERENCE",
            ViolationCode::ContainmentCycle => "CONTAINMENT_CYCLE",
            ViolationCode::DanglingReference => "DANGLING_REFERENCE",
            ViolationCode::NeighborAsymmetry => "NEIGHBOR_ASYMMETRY",
            ViolationCode::ContainmentAsymmetry => "CONTAINMENT_ASYMMETRY",
            ViolationCode::ResolverUnavailable => "RESOLVER_UNAVAILABLE",
            ViolationCode::ContainmentUnverified => "CONTAINMENT_UNVERIFIED",
            ViolationCode::UnknownField => "UNKNOWN_FIELD",
            ViolationCode::ImmutableField => "IMMUTABLE_FIELD",
        }
    }

    pub fn severity(&self) -> ViolationSeverity {
        match self {
            ViolationCode::NeighborAsymmetry | ViolationCode::ContainmentAsymmetry => {
                ViolationSeverity::Soft
            }
            ViolationCode::ResolverUnavailable | ViolationCode::ContainmentUnverified => {
                ViolationSeverity::Inconclusive
            }
            _ => ViolationSeverity::Hard,
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single finding against one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Field path (`childPlaces[2]`, `images.portrait`)
    pub field: String,
    pub code: ViolationCode,
    pub severity: ViolationSeverity,
    pub message: String,
    /// Offending value, when it helps diagnosis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Allowed values for enumeration violations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl Violation {
    pub fn new(code: ViolationCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            severity: code.severity(),
            message: message.into(),
            value: None,
            allowed: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn missing_required(field: impl Into<String>) -> Self {
        Self::new(
            ViolationCode::MissingRequiredField,
            field,
            "required field is absent",
        )
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::new(
            ViolationCode::TypeMismatch,
            field,
            format!("expected {}, got {}", expected, actual),
        )
    }

    pub fn enumeration(field: impl Into<String>, value: &str, allowed: &[String]) -> Self {
        let mut v = Self::new(
            ViolationCode::EnumerationViolation,
            field,
            format!("'{}' is not one of [{}]", value, allowed.join(", ")),
        )
        .with_value(Value::String(value.to_string()));
        v.allowed = Some(allowed.to_vec());
        v
    }

    pub fn flag_mismatch(field: impl Into<String>, flag: &str, flag_value: bool) -> Self {
        let message = if flag_value {
            format!("'{}' is true but the field is absent or empty", flag)
        } else {
            format!("'{}' is false but the field is set", flag)
        };
        Self::new(ViolationCode::FlagReferenceMismatch, field, message)
    }

    pub fn self_reference(field: impl Into<String>, id: &str) -> Self {
        Self::new(
            ViolationCode::SelfReference,
            field,
            format!("place '{}' references itself", id),
        )
    }

    /// `path` runs from the candidate through its ancestors back to the candidate.
    pub fn containment_cycle(field: impl Into<String>, path: &[String]) -> Self {
        Self::new(
            ViolationCode::ContainmentCycle,
            field,
            format!("containment cycle: {}", path.join(" -> ")),
        )
    }

    pub fn dangling(field: impl Into<String>, reference: &Reference) -> Self {
        Self::new(
            ViolationCode::DanglingReference,
            field,
            format!("{} does not exist", reference),
        )
        .with_value(reference.to_value())
    }

    pub fn neighbor_asymmetry(field: impl Into<String>, neighbor: &str, id: &str) -> Self {
        Self::new(
            ViolationCode::NeighborAsymmetry,
            field,
            format!("neighbor '{}' does not list '{}' as a neighbor", neighbor, id),
        )
    }

    pub fn containment_asymmetry(field: impl Into<String>, parent: &str, id: &str) -> Self {
        Self::new(
            ViolationCode::ContainmentAsymmetry,
            field,
            format!("parent '{}' does not list '{}' as a child", parent, id),
        )
    }

    pub fn resolver_unavailable(
        field: impl Into<String>,
        reference: &Reference,
        reason: impl fmt::Display,
    ) -> Self {
        Self::new(
            ViolationCode::ResolverUnavailable,
            field,
            format!("could not resolve {}: {}", reference, reason),
        )
    }

    pub fn containment_unverified(field: impl Into<String>, max_depth: usize) -> Self {
        Self::new(
            ViolationCode::ContainmentUnverified,
            field,
            format!("parent chain exceeds {} levels; containment was not fully checked", max_depth),
        )
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::new(
            ViolationCode::UnknownField,
            field,
            "field is not declared by the schema",
        )
    }

    pub fn immutable_field(field: impl Into<String>, existing: &str, attempted: &str) -> Self {
        Self::new(
            ViolationCode::ImmutableField,
            field,
            format!("cannot change '{}' to '{}'", existing, attempted),
        )
    }

    pub fn is_hard(&self) -> bool {
        self.severity == ViolationSeverity::Hard
    }

    pub fn is_soft(&self) -> bool {
        self.severity == ViolationSeverity::Soft
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.field, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Accepted,
    Rejected,
    /// No blocking violation, but at least one lookup failed
    Inconclusive,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::Rejected => "rejected",
            Verdict::Inconclusive => "inconclusive",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub verdict: Verdict,
    pub accepted: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// Derives the verdict from `violations` under `policy`.
    pub fn from_violations(violations: Vec<Violation>, policy: &ValidationPolicy) -> Self {
        let blocking = violations
            .iter()
            .any(|v| v.is_hard() || (v.is_soft() && policy.soft_violations_block));
        let inconclusive = violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Inconclusive);

        let verdict = if blocking {
            Verdict::Rejected
        } else if inconclusive {
            Verdict::Inconclusive
        } else {
            Verdict::Accepted
        };

        Self {
            verdict,
            accepted: verdict == Verdict::Accepted,
            violations,
        }
    }

    pub fn is_inconclusive(&self) -> bool {
        self.verdict == Verdict::Inconclusive
    }

    pub fn has_code(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }

    pub fn codes(&self) -> Vec<ViolationCode> {
        self.violations.iter().map(|v| v.code).collect()
    }

    pub fn violations_for(&self, field: &str) -> impl Iterator<Item = &Violation> {
        let field = field.to_string();
        self.violations.iter().filter(move |v| v.field == field)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            json!({
                "verdict": self.verdict.as_str(),
                "accepted": self.accepted,
                "error": e.to_string()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classes() {
        assert_eq!(
            ViolationCode::DanglingReference.severity(),
            ViolationSeverity::Hard
        );
        assert_eq!(
            ViolationCode::NeighborAsymmetry.severity(),
            ViolationSeverity::Soft
        );
        assert_eq!(
            ViolationCode::ResolverUnavailable.severity(),
            ViolationSeverity::Inconclusive
        );
    }

    #[test]
    fn test_code_serializes_as_screaming_snake() {
        for code in [
            ViolationCode::MissingRequiredField,
            ViolationCode::FlagReferenceMismatch,
            ViolationCode::ResolverUnavailable,
        ] {
            assert_eq!(
                serde_json::to_value(code).unwrap(),
                Value::String(code.as_str().into())
            );
        }
    }

    #[test]
    fn test_soft_violation_does_not_block_by_default() {
        let violations = vec![Violation::neighbor_asymmetry("neighborPlaces[0]", "b", "a")];
        let result = ValidationResult::from_violations(violations, &ValidationPolicy::default());
        assert!(result.accepted);
        assert_eq!(result.violations.len(), 1);
    }

    #[test]
    fn test_soft_violation_blocks_under_strict_policy() {
        let violations = vec![Violation::neighbor_asymmetry("neighborPlaces[0]", "b", "a")];
        let result = ValidationResult::from_violations(violations, &ValidationPolicy::strict());
        assert_eq!(result.verdict, Verdict::Rejected);
    }

    #[test]
    fn test_hard_beats_inconclusive() {
        let r = Reference::place("b");
        let violations = vec![
            Violation::resolver_unavailable("parentPlace", &r, "timeout"),
            Violation::missing_required("name"),
        ];
        let result = ValidationResult::from_violations(violations, &ValidationPolicy::default());
        assert_eq!(result.verdict, Verdict::Rejected);
        assert!(!result.accepted);
    }

    #[test]
    fn test_inconclusive_is_not_accepted() {
        let r = Reference::place("b");
        let violations = vec![Violation::resolver_unavailable("parentPlace", &r, "timeout")];
        let result = ValidationResult::from_violations(violations, &ValidationPolicy::default());
        assert!(result.is_inconclusive());
        assert!(!result.accepted);
    }

    #[test]
    fn test_enumeration_carries_allowed_set() {
        let allowed = vec!["planet".to_string(), "satellite".to_string()];
        let v = Violation::enumeration("kind", "moon", &allowed);
        assert_eq!(v.allowed.as_deref(), Some(allowed.as_slice()));
        assert!(v.message.contains("satellite"));
        assert_eq!(v.value, Some(Value::String("moon".into())));
    }
}
