//! Schema type definitions
//!
//! A schema is an ordered list of field constraints. Declaration order is
//! the evaluation order, so violation lists are reproducible.
//!
//! Constraint kinds:
//! - type: primitive shape (string, non-empty string, boolean, mapping, sequence)
//! - enumeration: closed set of string tags
//! - reference / reference_list / reference_map: DBRef shapes bound to a collection

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{fields, Collection, EntityKind};

/// Primitive value shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    String,
    NonEmptyString,
    Boolean,
    Mapping,
    Sequence,
}

impl ValueShape {
    /// Returns the shape name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueShape::String => "string",
            ValueShape::NonEmptyString => "non-empty string",
            ValueShape::Boolean => "boolean",
            ValueShape::Mapping => "mapping",
            ValueShape::Sequence => "sequence",
        }
    }
}

/// What a present value must look like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "constraint", rename_all = "snake_case")]
pub enum Constraint {
    Type { shape: ValueShape },
    Enumeration { allowed: Vec<String> },
    Reference { collection: Collection },
    ReferenceList { collection: Collection },
    ReferenceMap { collection: Collection },
}

impl Constraint {
    /// Short description of the expected value
    pub fn describe(&self) -> String {
        match self {
            Constraint::Type { shape } => shape.type_name().to_string(),
            Constraint::Enumeration { .. } => "string".to_string(),
            Constraint::Reference { collection } => format!("reference to {}", collection),
            Constraint::ReferenceList { collection } => {
                format!("sequence of references to {}", collection)
            }
            Constraint::ReferenceMap { collection } => {
                format!("mapping of references to {}", collection)
            }
        }
    }

    /// Target collection if this constraint describes references.
    pub fn reference_collection(&self) -> Option<Collection> {
        match self {
            Constraint::Reference { collection }
            | Constraint::ReferenceList { collection }
            | Constraint::ReferenceMap { collection } => Some(*collection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Required,
    Optional,
}

/// One field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConstraint {
    pub name: String,
    pub presence: Presence,
    #[serde(flatten)]
    pub constraint: Constraint,
}

impl FieldConstraint {
    pub fn required(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            presence: Presence::Required,
            constraint,
        }
    }

    pub fn optional(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            presence: Presence::Optional,
            constraint,
        }
    }

    pub fn required_shape(name: impl Into<String>, shape: ValueShape) -> Self {
        Self::required(name, Constraint::Type { shape })
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

/// Complete schema for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub entity_kind: EntityKind,
    /// Monotonic definition version
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldConstraint>,
}

impl Schema {
    pub fn new(entity_kind: EntityKind, fields: Vec<FieldConstraint>) -> Self {
        Self {
            entity_kind,
            version: 1,
            description: None,
            fields,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldConstraint> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Validates the schema structure itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        match self.field(fields::ID) {
            None => return Err(format!("Schema must define an '{}' field", fields::ID)),
            Some(id) if !id.is_required() => {
                return Err(format!("'{}' field must be required", fields::ID))
            }
            Some(_) => {}
        }

        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(format!("Field '{}' is declared twice", field.name));
            }
            if let Constraint::Enumeration { allowed } = &field.constraint {
                if allowed.is_empty() {
                    return Err(format!("Enumeration '{}' allows no values", field.name));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_field() -> FieldConstraint {
        FieldConstraint::required_shape(fields::ID, ValueShape::NonEmptyString)
    }

    #[test]
    fn test_schema_structure_valid() {
        let schema = Schema::new(EntityKind::Props, vec![id_field()]);
        assert!(schema.validate_structure().is_ok());
    }

    #[test]
    fn test_schema_missing_id_field() {
        let schema = Schema::new(
            EntityKind::Props,
            vec![FieldConstraint::required_shape("name", ValueShape::String)],
        );
        assert!(schema.validate_structure().is_err());
    }

    #[test]
    fn test_schema_id_must_be_required() {
        let schema = Schema::new(
            EntityKind::Props,
            vec![FieldConstraint::optional(
                fields::ID,
                Constraint::Type {
                    shape: ValueShape::String,
                },
            )],
        );
        let result = schema.validate_structure();
        assert!(result.unwrap_err().contains("required"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = Schema::new(EntityKind::Props, vec![id_field(), id_field()]);
        assert!(schema.validate_structure().unwrap_err().contains("twice"));
    }

    #[test]
    fn test_field_constraint_json_shape() {
        let field = FieldConstraint::optional(
            "childPlaces",
            Constraint::ReferenceList {
                collection: Collection::Places,
            },
        );
        let encoded = serde_json::to_value(&field).unwrap();
        assert_eq!(
            encoded,
            json!({
                "name": "childPlaces",
                "presence": "optional",
                "constraint": "reference_list",
                "collection": "Places"
            })
        );
        let decoded: FieldConstraint = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, field);
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            Constraint::Reference {
                collection: Collection::Glossary
            }
            .describe(),
            "reference to Glossary"
        );
        assert_eq!(
            Constraint::Type {
                shape: ValueShape::Mapping
            }
            .describe(),
            "mapping"
        );
    }
}
