//! Validation orchestrator
//!
//! One pass over a document:
//! 1. schema lookup (an unknown kind is an operational error, not a violation)
//! 2. field evaluation in declaration order
//! 3. undeclared fields, when the policy rejects them
//! 4. reference existence through a per-pass lookup cache
//! 5. for Places with a valid `_id` and `kind`: load related Places, then
//!    run the relationship checks
//!
//! Every finding is collected; nothing fails fast.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::model::{fields, Collection, EntityKind, PlaceLinks, Reference};
use crate::observability::{log_event_with_fields, Event};
use crate::resolver::{LookupCache, ReferenceResolver};
use crate::schema::{Schema, SchemaRegistry, SchemaResult};

use super::evaluator::{evaluate, field_references, json_type_name};
use super::policy::ValidationPolicy;
use super::relationship::RelationshipChecker;
use super::violation::{ValidationResult, Verdict, Violation};

/// Field path reported when the document itself is not a mapping.
const ROOT_FIELD: &str = "$root";

/// Validates documents against a shared, read-only schema registry.
///
/// Holds no mutable state; one instance can serve any number of
/// concurrent validations.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: Arc<SchemaRegistry>,
    policy: ValidationPolicy,
}

impl Validator {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            policy: ValidationPolicy::default(),
        }
    }

    /// Validator over the built-in schemas with the default policy.
    pub fn builtin() -> Self {
        Self::new(Arc::new(SchemaRegistry::builtin()))
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Validates `document` as an entity of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` (PLACE_UNKNOWN_SCHEMA) if no schema is
    /// registered for `kind`. Every problem with the document itself is a
    /// violation in the returned result.
    pub fn validate<R: ReferenceResolver + ?Sized>(
        &self,
        document: &Value,
        kind: EntityKind,
        resolver: &R,
    ) -> SchemaResult<ValidationResult> {
        let schema = self.registry.get(kind)?;
        let label = document_label(document);
        log_event_with_fields(
            Event::ValidationBegin,
            &[("kind", kind.as_str()), ("id", label.as_str())],
        );

        let violations = self.collect(schema, document, resolver);
        Ok(self.finish(kind, &label, violations))
    }

    /// Validates a replacement for the stored entity `existing_id`.
    ///
    /// Same checks as [`Validator::validate`], plus `_id` may not change.
    pub fn validate_update<R: ReferenceResolver + ?Sized>(
        &self,
        existing_id: &str,
        document: &Value,
        kind: EntityKind,
        resolver: &R,
    ) -> SchemaResult<ValidationResult> {
        let schema = self.registry.get(kind)?;
        let label = document_label(document);
        log_event_with_fields(
            Event::ValidationBegin,
            &[("kind", kind.as_str()), ("id", label.as_str()), ("update_of", existing_id)],
        );

        let mut violations = self.collect(schema, document, resolver);
        if let Some(id) = document.get(fields::ID).and_then(Value::as_str) {
            if id != existing_id {
                violations.push(Violation::immutable_field(fields::ID, existing_id, id));
            }
        }
        Ok(self.finish(kind, &label, violations))
    }

    fn collect<R: ReferenceResolver + ?Sized>(
        &self,
        schema: &Schema,
        document: &Value,
        resolver: &R,
    ) -> Vec<Violation> {
        let Some(object) = document.as_object() else {
            return vec![Violation::type_mismatch(
                ROOT_FIELD,
                "mapping",
                json_type_name(document),
            )];
        };

        let mut violations = Vec::new();
        let mut valid: BTreeSet<&str> = BTreeSet::new();
        // Fields whose container is sound, even if some elements are not
        let mut referable: BTreeSet<&str> = BTreeSet::new();

        for field in &schema.fields {
            let found = evaluate(field, object.get(&field.name));
            if found.is_empty() {
                valid.insert(field.name.as_str());
            }
            if found.iter().all(|v| v.field != field.name) {
                referable.insert(field.name.as_str());
            }
            violations.extend(found);
        }

        if self.policy.reject_unknown_fields {
            violations.extend(
                object
                    .keys()
                    .filter(|key| !schema.declares(key))
                    .map(Violation::unknown_field),
            );
        }

        // Only a Place can reference itself
        let self_id = if schema.entity_kind == EntityKind::Place && valid.contains(fields::ID) {
            object.get(fields::ID).and_then(Value::as_str)
        } else {
            None
        };

        let mut cache = LookupCache::new(resolver);
        let unresolved =
            check_references(schema, object, &referable, self_id, &mut cache, &mut violations);

        if let Some(id) = self_id {
            if valid.contains(fields::KIND) {
                let related =
                    self.gather_related(id, document, &valid, &unresolved, &mut cache, &mut violations);
                violations.extend(RelationshipChecker::check(document, &related));
            }
        }

        violations
    }

    /// Loads the parent chain and the neighbors of the candidate.
    fn gather_related<R: ReferenceResolver + ?Sized>(
        &self,
        id: &str,
        document: &Value,
        valid: &BTreeSet<&str>,
        unresolved: &Unresolved,
        cache: &mut LookupCache<'_, R>,
        violations: &mut Vec<Violation>,
    ) -> BTreeMap<String, Value> {
        let mut related = BTreeMap::new();
        let links = PlaceLinks::from_document(document);

        let parent = links.parent.as_ref().filter(|p| p.id != id);
        if let Some(parent) = parent {
            if valid.contains(fields::PARENT_PLACE)
                && !unresolved.fields.contains(fields::PARENT_PLACE)
            {
                self.load_ancestors(id, &parent.id, cache, &mut related, violations);
            }
        }

        if valid.contains(fields::NEIGHBOR_PLACES) {
            let neighbors = document
                .get(fields::NEIGHBOR_PLACES)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            for (i, item) in neighbors.iter().enumerate() {
                let Ok(neighbor) = Reference::from_value(item) else {
                    continue;
                };
                if neighbor.id == id
                    || related.contains_key(&neighbor.id)
                    || unresolved.references.contains(&neighbor)
                {
                    continue;
                }
                match cache.fetch_place(&neighbor.id) {
                    Ok(Some(doc)) => {
                        related.insert(neighbor.id.clone(), doc);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        let path = format!("{}[{}]", fields::NEIGHBOR_PLACES, i);
                        log_resolver_failure(&path, &neighbor, &e);
                        violations.push(Violation::resolver_unavailable(path, &neighbor, &e));
                    }
                }
            }
        }

        related
    }

    fn load_ancestors<R: ReferenceResolver + ?Sized>(
        &self,
        id: &str,
        parent_id: &str,
        cache: &mut LookupCache<'_, R>,
        related: &mut BTreeMap<String, Value>,
        violations: &mut Vec<Violation>,
    ) {
        let mut current = parent_id.to_string();

        for _ in 0..self.policy.max_containment_depth {
            if current == id || related.contains_key(&current) {
                return;
            }
            match cache.fetch_place(&current) {
                Ok(Some(doc)) => {
                    let next = PlaceLinks::from_document(&doc).parent;
                    related.insert(current.clone(), doc);
                    match next {
                        Some(next) => current = next.id,
                        None => return,
                    }
                }
                // Absent ancestors are reported as dangling by their own holder
                Ok(None) => return,
                Err(e) => {
                    let reference = Reference::place(current.as_str());
                    log_resolver_failure(fields::PARENT_PLACE, &reference, &e);
                    violations.push(Violation::resolver_unavailable(
                        fields::PARENT_PLACE,
                        &reference,
                        &e,
                    ));
                    return;
                }
            }
        }

        let depth = self.policy.max_containment_depth.to_string();
        log_event_with_fields(
            Event::ContainmentDepthExceeded,
            &[("id", id), ("max_depth", depth.as_str())],
        );
        violations.push(Violation::containment_unverified(
            fields::PARENT_PLACE,
            self.policy.max_containment_depth,
        ));
    }

    fn finish(&self, kind: EntityKind, label: &str, violations: Vec<Violation>) -> ValidationResult {
        let result = ValidationResult::from_violations(violations, &self.policy);
        let count = result.violations.len().to_string();
        let fields = [
            ("kind", kind.as_str()),
            ("id", label),
            ("verdict", result.verdict.as_str()),
            ("violations", count.as_str()),
        ];

        match result.verdict {
            Verdict::Rejected => log_event_with_fields(Event::ValidationRejected, &fields),
            Verdict::Inconclusive => log_event_with_fields(Event::ValidationInconclusive, &fields),
            Verdict::Accepted => {}
        }
        log_event_with_fields(Event::ValidationComplete, &fields);

        result
    }
}

/// References the resolver could not answer for.
#[derive(Default)]
struct Unresolved {
    fields: BTreeSet<String>,
    references: BTreeSet<Reference>,
}

/// Checks that every well-formed reference exists and, when the resolver
/// knows, targets the right kind of entity. Malformed siblings do not
/// stop the others from being checked.
fn check_references<R: ReferenceResolver + ?Sized>(
    schema: &Schema,
    object: &Map<String, Value>,
    referable: &BTreeSet<&str>,
    self_id: Option<&str>,
    cache: &mut LookupCache<'_, R>,
    violations: &mut Vec<Violation>,
) -> Unresolved {
    let mut unresolved = Unresolved::default();

    for field in &schema.fields {
        if field.constraint.reference_collection().is_none()
            || !referable.contains(field.name.as_str())
        {
            continue;
        }
        let Some(value) = object.get(&field.name) else {
            continue;
        };

        for (path, reference) in field_references(field, value) {
            // Reported by the relationship checker as a self-reference
            if reference.collection == Collection::Places && Some(reference.id.as_str()) == self_id {
                continue;
            }

            match cache.exists(&reference) {
                Ok(true) => match cache.kind_of(&reference) {
                    Ok(Some(found)) if found != reference.collection.entity_kind() => {
                        violations.push(
                            Violation::type_mismatch(
                                path,
                                &format!("{} entity", reference.collection.entity_kind()),
                                &format!("{} entity", found),
                            )
                            .with_value(reference.to_value()),
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log_resolver_failure(&path, &reference, &e);
                        violations.push(Violation::resolver_unavailable(path, &reference, &e));
                        unresolved.fields.insert(field.name.clone());
                        unresolved.references.insert(reference);
                    }
                },
                Ok(false) => violations.push(Violation::dangling(path, &reference)),
                Err(e) => {
                    log_resolver_failure(&path, &reference, &e);
                    violations.push(Violation::resolver_unavailable(path, &reference, &e));
                    unresolved.fields.insert(field.name.clone());
                    unresolved.references.insert(reference);
                }
            }
        }
    }

    unresolved
}

fn log_resolver_failure(path: &str, reference: &Reference, error: &impl std::fmt::Display) {
    let target = reference.to_string();
    let reason = error.to_string();
    log_event_with_fields(
        Event::ResolverUnavailable,
        &[("field", path), ("reference", target.as_str()), ("reason", reason.as_str())],
    );
}

fn document_label(document: &Value) -> String {
    document
        .get(fields::ID)
        .and_then(Value::as_str)
        .unwrap_or("<none>")
        .to_string()
}
