//! Place documents: field names, the typed record, and a lenient link view.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::kind::{Collection, PlaceKind};
use super::reference::Reference;

/// Field names of a Place document.
pub mod fields {
    pub const ID: &str = "_id";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const KIND: &str = "kind";
    pub const LOCATION: &str = "location";
    pub const HAS_PARENT: &str = "hasParent";
    pub const HAS_CHILDREN: &str = "hasChildren";
    pub const HAS_NEIGHBORS: &str = "hasNeighbors";
    pub const CONTAINS_PROPS: &str = "containsProps";
    pub const PARENT_PLACE: &str = "parentPlace";
    pub const CHILD_PLACES: &str = "childPlaces";
    pub const NEIGHBOR_PLACES: &str = "neighborPlaces";
    pub const PROPS_INVENTORY: &str = "propsInventory";
    pub const GLOSSARY_REF: &str = "glossaryRef";
    pub const IMAGES: &str = "images";
    pub const SOUNDS: &str = "sounds";
}

/// Strongly typed Place record.
///
/// Decoding a document into a `Place` does not validate relationships;
/// run the document through the validator before trusting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: PlaceKind,
    /// Coordinate system name to free-form position.
    pub location: Map<String, Value>,
    pub has_parent: bool,
    pub has_children: bool,
    pub has_neighbors: bool,
    pub contains_props: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_place: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_places: Option<Vec<Reference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbor_places: Option<Vec<Reference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props_inventory: Option<Vec<Reference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossary_ref: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<BTreeMap<String, Reference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sounds: Option<BTreeMap<String, Reference>>,
}

impl Place {
    pub fn from_document(document: &Value) -> Result<Self, serde_json::Error> {
        Place::deserialize(document)
    }

    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Relationship links read from a possibly-invalid Place document.
///
/// Malformed entries are dropped rather than reported; the field
/// evaluator owns shape diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceLinks {
    pub id: Option<String>,
    pub parent: Option<Reference>,
    pub children: Vec<Reference>,
    pub neighbors: Vec<Reference>,
}

impl PlaceLinks {
    pub fn from_document(document: &Value) -> Self {
        let id = document
            .get(fields::ID)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let parent = document
            .get(fields::PARENT_PLACE)
            .and_then(place_reference);

        Self {
            id,
            parent,
            children: place_references(document.get(fields::CHILD_PLACES)),
            neighbors: place_references(document.get(fields::NEIGHBOR_PLACES)),
        }
    }

    pub fn lists_child(&self, id: &str) -> bool {
        self.children.iter().any(|r| r.id == id)
    }

    pub fn lists_neighbor(&self, id: &str) -> bool {
        self.neighbors.iter().any(|r| r.id == id)
    }
}

fn place_reference(value: &Value) -> Option<Reference> {
    Reference::from_value(value)
        .ok()
        .filter(|r| r.collection == Collection::Places)
}

fn place_references(value: Option<&Value>) -> Vec<Reference> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(place_reference).collect())
        .unwrap_or_default()
}
