//! Per-pass lookup cache.
//!
//! Failures are cached too: one validation pass asks each question once
//! and gets one consistent answer.

use serde_json::Value;
use std::collections::HashMap;

use crate::model::{EntityKind, Reference};

use super::{ReferenceResolver, ResolverResult};

pub struct LookupCache<'r, R: ReferenceResolver + ?Sized> {
    resolver: &'r R,
    exists: HashMap<Reference, ResolverResult<bool>>,
    kinds: HashMap<Reference, ResolverResult<Option<EntityKind>>>,
    places: HashMap<String, ResolverResult<Option<Value>>>,
    misses: usize,
}

impl<'r, R: ReferenceResolver + ?Sized> LookupCache<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self {
            resolver,
            exists: HashMap::new(),
            kinds: HashMap::new(),
            places: HashMap::new(),
            misses: 0,
        }
    }

    pub fn exists(&mut self, reference: &Reference) -> ResolverResult<bool> {
        if let Some(hit) = self.exists.get(reference) {
            return hit.clone();
        }
        self.misses += 1;
        let answer = self.resolver.exists(reference);
        self.exists.insert(reference.clone(), answer.clone());
        answer
    }

    pub fn kind_of(&mut self, reference: &Reference) -> ResolverResult<Option<EntityKind>> {
        if let Some(hit) = self.kinds.get(reference) {
            return hit.clone();
        }
        self.misses += 1;
        let answer = self.resolver.kind_of(reference);
        self.kinds.insert(reference.clone(), answer.clone());
        answer
    }

    pub fn fetch_place(&mut self, id: &str) -> ResolverResult<Option<Value>> {
        if let Some(hit) = self.places.get(id) {
            return hit.clone();
        }
        self.misses += 1;
        let answer = self.resolver.fetch_place(id);
        self.places.insert(id.to_string(), answer.clone());
        answer
    }

    /// Number of calls that reached the resolver.
    pub fn resolver_calls(&self) -> usize {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{MemoryResolver, ResolverError};
    use serde_json::json;

    #[test]
    fn test_repeated_lookup_hits_resolver_once() {
        let resolver = MemoryResolver::new().with_place(json!({"_id": "a"}));
        let mut cache = LookupCache::new(&resolver);

        for _ in 0..3 {
            assert_eq!(cache.exists(&Reference::place("a")), Ok(true));
        }
        assert_eq!(cache.resolver_calls(), 1);
        assert_eq!(resolver.exists_calls(), 1);
    }

    #[test]
    fn test_failures_are_cached() {
        let mut resolver = MemoryResolver::new();
        resolver.fail_on(Reference::place("a"));
        let mut cache = LookupCache::new(&resolver);

        assert!(matches!(
            cache.exists(&Reference::place("a")),
            Err(ResolverError::Unavailable(_))
        ));
        assert!(cache.exists(&Reference::place("a")).is_err());
        assert_eq!(resolver.exists_calls(), 1);
    }

    #[test]
    fn test_fetch_place_cached() {
        let resolver = MemoryResolver::new().with_place(json!({"_id": "a", "name": "A"}));
        let mut cache = LookupCache::new(&resolver);

        let doc = cache.fetch_place("a").unwrap().unwrap();
        assert_eq!(doc["name"], "A");
        assert_eq!(cache.fetch_place("a").unwrap(), Some(doc));
        assert_eq!(cache.fetch_place("zz").unwrap(), None);
        assert_eq!(resolver.fetch_calls(), 2);
    }
}
