//! Typed, non-owning references between entities.
//!
//! References travel in the DBRef shape:
//!
//! ```json
//! { "$ref": "Places", "$id": "kitchen", "$db": "world" }
//! ```
//!
//! `$db` is optional and ignored, but must be a string when present.
//! No other keys are allowed.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::kind::Collection;

pub const REF_KEY: &str = "$ref";
pub const ID_KEY: &str = "$id";
pub const DB_KEY: &str = "$db";

/// Reasons a value is not a well-formed reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceShapeError {
    NotAMapping,
    MissingCollection,
    UnknownCollection(String),
    MissingId,
    EmptyId,
    InvalidDatabase,
    UnexpectedKey(String),
}

impl fmt::Display for ReferenceShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceShapeError::NotAMapping => write!(f, "reference must be a mapping"),
            ReferenceShapeError::MissingCollection => {
                write!(f, "reference is missing a string '{}'", REF_KEY)
            }
            ReferenceShapeError::UnknownCollection(name) => {
                write!(f, "reference targets unknown collection '{}'", name)
            }
            ReferenceShapeError::MissingId => {
                write!(f, "reference is missing a string '{}'", ID_KEY)
            }
            ReferenceShapeError::EmptyId => write!(f, "reference '{}' is empty", ID_KEY),
            ReferenceShapeError::InvalidDatabase => {
                write!(f, "reference '{}' must be a string", DB_KEY)
            }
            ReferenceShapeError::UnexpectedKey(key) => {
                write!(f, "reference has unexpected key '{}'", key)
            }
        }
    }
}

/// Pointer to an entity in a named collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub collection: Collection,
    pub id: String,
}

impl Reference {
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }

    /// Reference into the Places collection.
    pub fn place(id: impl Into<String>) -> Self {
        Self::new(Collection::Places, id)
    }

    /// Parses a DBRef-shaped value.
    pub fn from_value(value: &Value) -> Result<Self, ReferenceShapeError> {
        let obj = value.as_object().ok_or(ReferenceShapeError::NotAMapping)?;

        if let Some(key) = obj
            .keys()
            .find(|k| !matches!(k.as_str(), REF_KEY | ID_KEY | DB_KEY))
        {
            return Err(ReferenceShapeError::UnexpectedKey(key.clone()));
        }

        let name = obj
            .get(REF_KEY)
            .and_then(Value::as_str)
            .ok_or(ReferenceShapeError::MissingCollection)?;
        let collection = Collection::parse(name)
            .ok_or_else(|| ReferenceShapeError::UnknownCollection(name.to_string()))?;

        let id = obj
            .get(ID_KEY)
            .and_then(Value::as_str)
            .ok_or(ReferenceShapeError::MissingId)?;
        if id.is_empty() {
            return Err(ReferenceShapeError::EmptyId);
        }
        if obj.get(DB_KEY).map_or(false, |db| !db.is_string()) {
            return Err(ReferenceShapeError::InvalidDatabase);
        }

        Ok(Self::new(collection, id))
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(REF_KEY.into(), Value::String(self.collection.as_str().into()));
        obj.insert(ID_KEY.into(), Value::String(self.id.clone()));
        Value::Object(obj)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Reference::from_value(&value).map_err(de::Error::custom)
    }
}
