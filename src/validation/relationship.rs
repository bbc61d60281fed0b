//! Relationship consistency checker
//!
//! Checks a candidate Place against itself and against the related Places
//! the orchestrator loaded for it:
//! - flag/reference agreement for the four relationship flags
//! - no self-reference in parent, children or neighbors
//! - acyclic containment through the parent chain
//! - containment and neighbor symmetry (soft)
//!
//! The checker never calls a resolver. Anything not present in `related`
//! is treated as unknown and produces no relationship finding.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{fields, Collection, PlaceLinks, Reference};
use crate::observability::{log_event_with_fields, Event};

use super::violation::Violation;

/// Shape of the reference field a flag governs.
#[derive(Debug, Clone, Copy)]
enum Arity {
    Single,
    List,
}

/// Flag, governed field, arity, target collection. Declaration order.
const FLAG_PAIRS: [(&str, &str, Arity, Collection); 4] = [
    (fields::HAS_PARENT, fields::PARENT_PLACE, Arity::Single, Collection::Places),
    (fields::HAS_CHILDREN, fields::CHILD_PLACES, Arity::List, Collection::Places),
    (fields::HAS_NEIGHBORS, fields::NEIGHBOR_PLACES, Arity::List, Collection::Places),
    (fields::CONTAINS_PROPS, fields::PROPS_INVENTORY, Arity::List, Collection::Props),
];

pub struct RelationshipChecker;

impl RelationshipChecker {
    /// Runs every relationship check over `document`.
    ///
    /// `related` maps Place ids to their stored documents. It never needs
    /// to contain the candidate itself.
    pub fn check(document: &Value, related: &BTreeMap<String, Value>) -> Vec<Violation> {
        let mut violations = check_flags(document);

        let links = PlaceLinks::from_document(document);
        let Some(id) = links.id.as_deref() else {
            return violations;
        };

        violations.extend(check_self_references(document, id));

        let parent = links.parent.as_ref().filter(|p| p.id != id);
        let chain = match parent {
            Some(parent) => walk_ancestors(id, &parent.id, related, &mut violations),
            None => Vec::new(),
        };

        violations.extend(check_children_against_ancestors(document, id, &chain));

        if let Some(parent) = parent {
            if let Some(parent_doc) = related.get(&parent.id) {
                if !PlaceLinks::from_document(parent_doc).lists_child(id) {
                    violations.push(Violation::containment_asymmetry(
                        fields::PARENT_PLACE,
                        &parent.id,
                        id,
                    ));
                }
            }
        }

        violations.extend(check_neighbor_symmetry(document, id, related));
        violations
    }
}

fn check_flags(document: &Value) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (flag, field, arity, collection) in FLAG_PAIRS {
        let Some(flag_value) = document.get(flag).and_then(Value::as_bool) else {
            continue;
        };
        // A malformed reference field already carries its own violation
        let Some(is_set) = reference_field_is_set(document.get(field), arity, collection) else {
            continue;
        };
        if flag_value != is_set {
            violations.push(Violation::flag_mismatch(field, flag, flag_value));
        }
    }

    violations
}

/// Whether a reference field counts as set, or `None` if it is malformed.
fn reference_field_is_set(value: Option<&Value>, arity: Arity, collection: Collection) -> Option<bool> {
    let well_formed = |v: &Value| {
        Reference::from_value(v)
            .map(|r| r.collection == collection)
            .unwrap_or(false)
    };

    match value {
        None | Some(Value::Null) => Some(false),
        Some(v) => match arity {
            Arity::Single => well_formed(v).then_some(true),
            Arity::List => {
                let items = v.as_array()?;
                items.iter().all(well_formed).then_some(!items.is_empty())
            }
        },
    }
}

fn check_self_references(document: &Value, id: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(parent) = document.get(fields::PARENT_PLACE).and_then(place_reference) {
        if parent.id == id {
            violations.push(Violation::self_reference(fields::PARENT_PLACE, id));
        }
    }

    for field in [fields::CHILD_PLACES, fields::NEIGHBOR_PLACES] {
        for (i, reference) in indexed_place_references(document, field) {
            if reference.id == id {
                violations.push(Violation::self_reference(format!("{}[{}]", field, i), id));
            }
        }
    }

    violations
}

/// Walks up from `parent_id` through `related`.
///
/// Returns the ancestor chain in walk order, starting with the parent.
/// Reports a cycle if the walk comes back to `id`.
fn walk_ancestors(
    id: &str,
    parent_id: &str,
    related: &BTreeMap<String, Value>,
    violations: &mut Vec<Violation>,
) -> Vec<String> {
    let mut chain: Vec<String> = Vec::new();
    let mut seen = BTreeSet::new();
    let mut current = parent_id.to_string();

    // Each hop either visits a new related document or terminates
    for _ in 0..=related.len() {
        if current == id {
            let mut path = Vec::with_capacity(chain.len() + 2);
            path.push(id.to_string());
            path.extend(chain.iter().cloned());
            path.push(id.to_string());
            violations.push(Violation::containment_cycle(fields::PARENT_PLACE, &path));
            break;
        }
        if !seen.insert(current.clone()) {
            log_event_with_fields(
                Event::AncestorLoopDetected,
                &[("id", id), ("ancestor", current.as_str())],
            );
            break;
        }
        chain.push(current.clone());

        let next = related
            .get(&current)
            .and_then(|doc| PlaceLinks::from_document(doc).parent);
        match next {
            Some(next) => current = next.id,
            None => break,
        }
    }

    chain
}

/// A child that is also an ancestor closes a loop through the candidate.
fn check_children_against_ancestors(document: &Value, id: &str, chain: &[String]) -> Vec<Violation> {
    if chain.is_empty() {
        return Vec::new();
    }

    indexed_place_references(document, fields::CHILD_PLACES)
        .into_iter()
        .filter(|(_, child)| child.id != id)
        .filter_map(|(i, child)| {
            let depth = chain.iter().position(|a| *a == child.id)?;
            let mut path = Vec::with_capacity(depth + 3);
            path.push(id.to_string());
            path.extend(chain[..=depth].iter().cloned());
            path.push(id.to_string());
            Some(Violation::containment_cycle(
                format!("{}[{}]", fields::CHILD_PLACES, i),
                &path,
            ))
        })
        .collect()
}

fn check_neighbor_symmetry(
    document: &Value,
    id: &str,
    related: &BTreeMap<String, Value>,
) -> Vec<Violation> {
    indexed_place_references(document, fields::NEIGHBOR_PLACES)
        .into_iter()
        .filter(|(_, neighbor)| neighbor.id != id)
        .filter_map(|(i, neighbor)| {
            let stored = related.get(&neighbor.id)?;
            if PlaceLinks::from_document(stored).lists_neighbor(id) {
                None
            } else {
                Some(Violation::neighbor_asymmetry(
                    format!("{}[{}]", fields::NEIGHBOR_PLACES, i),
                    &neighbor.id,
                    id,
                ))
            }
        })
        .collect()
}

fn place_reference(value: &Value) -> Option<Reference> {
    Reference::from_value(value)
        .ok()
        .filter(|r| r.collection == Collection::Places)
}

/// Well-formed Place references of a list field, keyed by their original index.
fn indexed_place_references(document: &Value, field: &str) -> Vec<(usize, Reference)> {
    document
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, v)| place_reference(v).map(|r| (i, r)))
                .collect()
        })
        .unwrap_or_default()
}
