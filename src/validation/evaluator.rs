//! Field constraint evaluator
//!
//! Evaluation semantics:
//! - absent required field: MISSING_REQUIRED_FIELD
//! - absent or null optional field: ok (not set)
//! - null required field: TYPE_MISMATCH (present, but not the declared shape)
//! - wrong shape: TYPE_MISMATCH
//! - tag outside a closed set: ENUMERATION_VIOLATION with the allowed set
//! - malformed reference: TYPE_MISMATCH at the element path
//!
//! Reference existence is not checked here.

use serde_json::Value;

use crate::model::{Collection, Reference};
use crate::schema::{Constraint, FieldConstraint, ValueShape};

use super::violation::{Violation, ViolationCode};

/// Evaluates one field value against its constraint.
///
/// Returns every violation the value carries. Sequences and mappings of
/// references report each malformed element, so an empty result means
/// the field is fully valid.
pub fn evaluate(field: &FieldConstraint, value: Option<&Value>) -> Vec<Violation> {
    let value = match value {
        None if field.is_required() => return vec![Violation::missing_required(&field.name)],
        None => return Vec::new(),
        Some(Value::Null) if !field.is_required() => return Vec::new(),
        Some(v) => v,
    };

    match &field.constraint {
        Constraint::Type { shape } => check_shape(&field.name, *shape, value)
            .err()
            .into_iter()
            .collect(),
        Constraint::Enumeration { allowed } => match value.as_str() {
            None => vec![type_error(&field.name, "string", value)],
            Some(tag) if allowed.iter().any(|a| a == tag) => Vec::new(),
            Some(tag) => vec![Violation::enumeration(&field.name, tag, allowed)],
        },
        Constraint::Reference { collection } => check_reference(&field.name, *collection, value)
            .err()
            .into_iter()
            .collect(),
        Constraint::ReferenceList { collection } => match value.as_array() {
            None => vec![type_error(&field.name, &field.constraint.describe(), value)],
            Some(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    check_reference(&format!("{}[{}]", field.name, i), *collection, item).err()
                })
                .collect(),
        },
        Constraint::ReferenceMap { collection } => match value.as_object() {
            None => vec![type_error(&field.name, &field.constraint.describe(), value)],
            Some(entries) => entries
                .iter()
                .filter_map(|(label, item)| {
                    check_reference(&format!("{}.{}", field.name, label), *collection, item).err()
                })
                .collect(),
        },
    }
}

/// Well-formed references held by a field, with their paths.
///
/// Elements that do not parse, or that target another collection, are
/// skipped; `evaluate` reports those. A container of the wrong shape
/// yields nothing.
pub fn field_references(field: &FieldConstraint, value: &Value) -> Vec<(String, Reference)> {
    let Some(collection) = field.constraint.reference_collection() else {
        return Vec::new();
    };
    let parse = |path: String, v: &Value| {
        check_reference(&path, collection, v)
            .ok()
            .map(|r| (path, r))
    };

    match &field.constraint {
        Constraint::Reference { .. } => parse(field.name.clone(), value).into_iter().collect(),
        Constraint::ReferenceList { .. } => value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| parse(format!("{}[{}]", field.name, i), v))
                    .collect()
            })
            .unwrap_or_default(),
        Constraint::ReferenceMap { .. } => value
            .as_object()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(label, v)| parse(format!("{}.{}", field.name, label), v))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn check_shape(field: &str, shape: ValueShape, value: &Value) -> Result<(), Violation> {
    let ok = match shape {
        ValueShape::String => value.is_string(),
        ValueShape::NonEmptyString => value.as_str().map_or(false, |s| !s.is_empty()),
        ValueShape::Boolean => value.is_boolean(),
        ValueShape::Mapping => value.is_object(),
        ValueShape::Sequence => value.is_array(),
    };

    if ok {
        Ok(())
    } else if shape == ValueShape::NonEmptyString && value.is_string() {
        Err(Violation::type_mismatch(field, shape.type_name(), "empty string"))
    } else {
        Err(type_error(field, shape.type_name(), value))
    }
}

fn check_reference(path: &str, collection: Collection, value: &Value) -> Result<Reference, Violation> {
    let expected = format!("reference to {}", collection);
    let reference = Reference::from_value(value).map_err(|e| {
        Violation::new(
            ViolationCode::TypeMismatch,
            path,
            format!("expected {}: {}", expected, e),
        )
        .with_value(value.clone())
    })?;

    if reference.collection != collection {
        return Err(Violation::type_mismatch(
            path,
            &expected,
            &format!("reference to {}", reference.collection),
        ));
    }

    Ok(reference)
}

fn type_error(field: &str, expected: &str, actual: &Value) -> Violation {
    Violation::type_mismatch(field, expected, json_type_name(actual))
}

/// Returns the JSON type name for diagnostics.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
