//! In-memory resolver.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::model::{fields, Collection, EntityKind, Reference};

use super::{ReferenceResolver, ResolverError, ResolverResult};

/// Resolver over documents held in memory.
///
/// Places are stored whole so relationship checks can load them; other
/// collections only record identifiers. Individual references can be made
/// to fail, or the whole resolver taken offline, to exercise inconclusive
/// results.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    places: BTreeMap<String, Value>,
    entities: BTreeSet<Reference>,
    failing: BTreeSet<Reference>,
    offline: bool,
    exists_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a Place document under its `_id`. Documents without a string
    /// `_id` are ignored and `None` is returned.
    pub fn insert_place(&mut self, document: Value) -> Option<String> {
        let id = document.get(fields::ID)?.as_str()?.to_string();
        self.places.insert(id.clone(), document);
        Some(id)
    }

    pub fn with_place(mut self, document: Value) -> Self {
        self.insert_place(document);
        self
    }

    /// Records a non-Place entity.
    pub fn insert_entity(&mut self, collection: Collection, id: impl Into<String>) {
        self.entities.insert(Reference::new(collection, id));
    }

    pub fn with_entity(mut self, collection: Collection, id: impl Into<String>) -> Self {
        self.insert_entity(collection, id);
        self
    }

    pub fn remove_place(&mut self, id: &str) -> Option<Value> {
        self.places.remove(id)
    }

    /// Makes every lookup of `reference` fail.
    pub fn fail_on(&mut self, reference: Reference) {
        self.failing.insert(reference);
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::Relaxed)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    fn check_reachable(&self, reference: &Reference) -> ResolverResult<()> {
        if self.offline {
            return Err(ResolverError::Unavailable("resolver is offline".into()));
        }
        if self.failing.contains(reference) {
            return Err(ResolverError::Unavailable(format!(
                "lookup of {} failed",
                reference
            )));
        }
        Ok(())
    }
}

impl ReferenceResolver for MemoryResolver {
    fn exists(&self, reference: &Reference) -> ResolverResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::Relaxed);
        self.check_reachable(reference)?;

        Ok(match reference.collection {
            Collection::Places => self.places.contains_key(&reference.id),
            _ => self.entities.contains(reference),
        })
    }

    fn kind_of(&self, reference: &Reference) -> ResolverResult<Option<EntityKind>> {
        self.check_reachable(reference)?;
        let stored = match reference.collection {
            Collection::Places => self.places.contains_key(&reference.id),
            _ => self.entities.contains(reference),
        };
        Ok(stored.then(|| reference.collection.entity_kind()))
    }

    fn fetch_place(&self, id: &str) -> ResolverResult<Option<Value>> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.check_reachable(&Reference::place(id))?;
        Ok(self.places.get(id).cloned())
    }
}
