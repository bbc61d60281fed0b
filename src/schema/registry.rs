//! Schema registry
//!
//! - One schema per entity kind
//! - Populated at startup, either from the built-in definitions or from a
//!   directory of installed schema files (`schema_<kind>.json`)
//! - Read-only once built; share it behind an `Arc`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::EntityKind;

use super::definitions::builtin_schemas;
use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;

/// File name an installed schema is stored under.
pub fn schema_file_name(kind: EntityKind) -> String {
    format!("schema_{}.json", kind.as_str())
}

/// Registry of schemas indexed by entity kind.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<EntityKind, Schema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in definition.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for schema in builtin_schemas() {
            registry.schemas.insert(schema.entity_kind, schema);
        }
        registry
    }

    /// Loads every `schema_*.json` file in `dir`.
    ///
    /// Files are read in name order; a malformed file fails the whole load.
    pub fn load_dir(dir: &Path) -> SchemaResult<Self> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed_schema(
                dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            let is_schema_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with("schema_") && n.ends_with(".json"));
            if is_schema_file {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            registry.register(Self::read_schema_file(&path)?)?;
        }

        Ok(registry)
    }

    fn read_schema_file(path: &Path) -> SchemaResult<Schema> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })
    }

    /// Registers a schema. Each kind may be registered once.
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        schema
            .validate_structure()
            .map_err(|e| SchemaError::malformed_schema(schema.entity_kind.as_str(), e))?;

        if self.schemas.contains_key(&schema.entity_kind) {
            return Err(SchemaError::schema_immutable(schema.entity_kind));
        }

        self.schemas.insert(schema.entity_kind, schema);
        Ok(())
    }

    pub fn get(&self, kind: EntityKind) -> SchemaResult<&Schema> {
        self.schemas
            .get(&kind)
            .ok_or_else(|| SchemaError::unknown_schema(kind))
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.schemas.contains_key(&kind)
    }

    /// Schemas in entity kind order.
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
