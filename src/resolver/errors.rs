//! # Resolver Errors

use thiserror::Error;

/// Result type for resolver lookups
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Lookup failures. None of these say anything about whether the
/// target exists; they make a validation inconclusive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("resolver unavailable: {0}")]
    Unavailable(String),

    #[error("lookup timed out after {0} ms")]
    Timeout(u64),

    #[error("stored document {reference} is unreadable: {reason}")]
    CorruptDocument { reference: String, reason: String },
}

impl ResolverError {
    /// Whether retrying the same lookup may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolverError::Unavailable(_) | ResolverError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ResolverError::Timeout(250).to_string(),
            "lookup timed out after 250 ms"
        );
        let err = ResolverError::CorruptDocument {
            reference: "Places/p1".into(),
            reason: "EOF".into(),
        };
        assert!(err.to_string().contains("Places/p1"));
    }

    #[test]
    fn test_transient() {
        assert!(ResolverError::Unavailable("down".into()).is_transient());
        assert!(!ResolverError::CorruptDocument {
            reference: "Places/p1".into(),
            reason: "EOF".into()
        }
        .is_transient());
    }
}
