//! Reference resolution
//!
//! The validator never touches storage. Whatever owns the store injects a
//! `ReferenceResolver`, and one validation pass wraps it in a `LookupCache`
//! so a repeated identifier costs a single lookup.
//!
//! Implementations:
//! - `MemoryResolver`: in-memory fake for tests and embedding
//! - `DirectoryResolver`: a store laid out as `<root>/<Collection>/<id>.json`

mod cache;
mod directory;
mod errors;
mod memory;

pub use cache::LookupCache;
pub use directory::DirectoryResolver;
pub use errors::{ResolverError, ResolverResult};
pub use memory::MemoryResolver;

use serde_json::Value;
use std::sync::Arc;

use crate::model::{EntityKind, Reference};

/// Answers "does this reference target exist?"
pub trait ReferenceResolver: Send + Sync {
    /// Whether the target of `reference` exists in its collection.
    fn exists(&self, reference: &Reference) -> ResolverResult<bool>;

    /// Kind of the stored target, if the resolver can tell. `Ok(None)` means unknown.
    fn kind_of(&self, _reference: &Reference) -> ResolverResult<Option<EntityKind>> {
        Ok(None)
    }

    /// Loads a Place document for relationship checks. `Ok(None)` if absent or unsupported.
    fn fetch_place(&self, _id: &str) -> ResolverResult<Option<Value>> {
        Ok(None)
    }
}

impl<R: ReferenceResolver + ?Sized> ReferenceResolver for &R {
    fn exists(&self, reference: &Reference) -> ResolverResult<bool> {
        (**self).exists(reference)
    }

    fn kind_of(&self, reference: &Reference) -> ResolverResult<Option<EntityKind>> {
        (**self).kind_of(reference)
    }

    fn fetch_place(&self, id: &str) -> ResolverResult<Option<Value>> {
        (**self).fetch_place(id)
    }
}

impl<R: ReferenceResolver + ?Sized> ReferenceResolver for Arc<R> {
    fn exists(&self, reference: &Reference) -> ResolverResult<bool> {
        (**self).exists(reference)
    }

    fn kind_of(&self, reference: &Reference) -> ResolverResult<Option<EntityKind>> {
        (**self).kind_of(reference)
    }

    fn fetch_place(&self, id: &str) -> ResolverResult<Option<Value>> {
        (**self).fetch_place(id)
    }
}
