//! Caller-configurable validation policy.

/// Default bound on how far up the parent chain related Places are loaded.
pub const DEFAULT_MAX_CONTAINMENT_DEPTH: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Soft violations (asymmetric links) reject the write
    pub soft_violations_block: bool,
    /// Fields not declared by the schema are violations
    pub reject_unknown_fields: bool,
    /// Maximum ancestors loaded while walking the containment chain
    pub max_containment_depth: usize,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            soft_violations_block: false,
            reject_unknown_fields: false,
            max_containment_depth: DEFAULT_MAX_CONTAINMENT_DEPTH,
        }
    }
}

impl ValidationPolicy {
    /// Soft violations and undeclared fields both block.
    pub fn strict() -> Self {
        Self {
            soft_violations_block: true,
            reject_unknown_fields: true,
            ..Self::default()
        }
    }

    pub fn with_max_containment_depth(mut self, depth: usize) -> Self {
        self.max_containment_depth = depth;
        self
    }
}
