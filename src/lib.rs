//! placegraph - A strict, deterministic schema and relationship validator
//! for game-world Place graphs
//!
//! A Place document is checked against its schema field by field, its
//! references are resolved through an injected `ReferenceResolver`, and its
//! parent/child/neighbor links are checked for consistency. The validator
//! owns no storage; it returns a verdict and the full list of violations.
//!
//! ```ignore
//! use placegraph::model::EntityKind;
//! use placegraph::resolver::MemoryResolver;
//! use placegraph::validation::Validator;
//!
//! let result = Validator::builtin().validate(&doc, EntityKind::Place, &MemoryResolver::new())?;
//! assert!(result.accepted);
//! ```

pub mod cli;
pub mod migration;
pub mod model;
pub mod observability;
pub mod resolver;
pub mod schema;
pub mod validation;
