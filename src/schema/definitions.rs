//! Built-in schema definitions, one per entity kind.

use crate::model::{fields, Collection, EntityKind, PlaceKind};

use super::types::{Constraint, FieldConstraint, Schema, ValueShape};

/// The Place schema, in evaluation order.
pub fn place_schema() -> Schema {
    use FieldConstraint as F;

    let fields = vec![
        F::required_shape(fields::ID, ValueShape::NonEmptyString),
        F::required_shape(fields::NAME, ValueShape::NonEmptyString),
        F::required_shape(fields::DESCRIPTION, ValueShape::NonEmptyString),
        F::required(
            fields::KIND,
            Constraint::Enumeration {
                allowed: PlaceKind::tags(),
            },
        ),
        F::required_shape(fields::LOCATION, ValueShape::Mapping),
        F::required_shape(fields::HAS_PARENT, ValueShape::Boolean),
        F::required_shape(fields::HAS_CHILDREN, ValueShape::Boolean),
        F::required_shape(fields::HAS_NEIGHBORS, ValueShape::Boolean),
        F::required_shape(fields::CONTAINS_PROPS, ValueShape::Boolean),
        F::optional(
            fields::PARENT_PLACE,
            Constraint::Reference {
                collection: Collection::Places,
            },
        ),
        F::optional(
            fields::CHILD_PLACES,
            Constraint::ReferenceList {
                collection: Collection::Places,
            },
        ),
        F::optional(
            fields::NEIGHBOR_PLACES,
            Constraint::ReferenceList {
                collection: Collection::Places,
            },
        ),
        F::optional(
            fields::PROPS_INVENTORY,
            Constraint::ReferenceList {
                collection: Collection::Props,
            },
        ),
        F::optional(
            fields::GLOSSARY_REF,
            Constraint::Reference {
                collection: Collection::Glossary,
            },
        ),
        F::optional(
            fields::IMAGES,
            Constraint::ReferenceMap {
                collection: Collection::Images,
            },
        ),
        F::optional(
            fields::SOUNDS,
            Constraint::ReferenceMap {
                collection: Collection::Sounds,
            },
        ),
    ];

    Schema::new(EntityKind::Place, fields)
        .with_description("A location within the game world containment hierarchy")
}

/// Schema for a kind that is only ever referenced: an identifier and nothing else.
pub fn opaque_schema(kind: EntityKind) -> Schema {
    Schema::new(
        kind,
        vec![FieldConstraint::required_shape(
            fields::ID,
            ValueShape::NonEmptyString,
        )],
    )
}

/// Every built-in schema, Place first.
pub fn builtin_schemas() -> Vec<Schema> {
    EntityKind::ALL
        .into_iter()
        .map(|kind| match kind {
            EntityKind::Place => place_schema(),
            other => opaque_schema(other),
        })
        .collect()
}
