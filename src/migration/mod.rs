//! Schema migration
//!
//! Installs the registry's schema definitions into a store:
//!
//! ```text
//! <store>/metadata/schemas/schema_<kind>.json
//! <store>/metadata/migrations.jsonl
//! ```
//!
//! Migration is idempotent. A definition already installed verbatim is left
//! alone and not journaled, so running it twice changes nothing.

mod journal;

pub use journal::{JournalEntry, MigrationJournal};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::EntityKind;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{schema_file_name, Schema, SchemaRegistry};

pub type MigrationResult<T> = Result<T, MigrationError>;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot encode schema for {kind}: {reason}")]
    Encode { kind: EntityKind, reason: String },

    #[error("migration journal: {0}")]
    Journal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationAction {
    Installed,
    Updated,
    Unchanged,
}

impl MigrationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationAction::Installed => "installed",
            MigrationAction::Updated => "updated",
            MigrationAction::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStep {
    pub kind: EntityKind,
    pub action: MigrationAction,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub steps: Vec<MigrationStep>,
}

impl MigrationReport {
    /// Number of steps that wrote a file.
    pub fn applied(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.action != MigrationAction::Unchanged)
            .count()
    }

    pub fn is_noop(&self) -> bool {
        self.applied() == 0
    }

    pub fn to_json(&self) -> Value {
        let steps: Vec<Value> = self
            .steps
            .iter()
            .map(|s| {
                json!({
                    "kind": s.kind.as_str(),
                    "action": s.action.as_str(),
                    "path": s.path.display().to_string(),
                })
            })
            .collect();
        json!({ "applied": self.applied(), "steps": steps })
    }
}

/// Directory installed schemas live in.
pub fn schema_dir(store_dir: &Path) -> PathBuf {
    store_dir.join("metadata").join("schemas")
}

pub fn journal_path(store_dir: &Path) -> PathBuf {
    store_dir.join("metadata").join("migrations.jsonl")
}

/// Installs every schema in `registry` under `store_dir`.
pub fn migrate(store_dir: &Path, registry: &SchemaRegistry) -> MigrationResult<MigrationReport> {
    let dir = schema_dir(store_dir);
    fs::create_dir_all(&dir).map_err(|e| MigrationError::Io {
        path: dir.clone(),
        source: e,
    })?;

    let journal = MigrationJournal::new(journal_path(store_dir));
    let mut report = MigrationReport::default();

    for schema in registry.schemas() {
        let path = dir.join(schema_file_name(schema.entity_kind));
        let action = install(schema, &path)?;

        if action != MigrationAction::Unchanged {
            journal.append(&JournalEntry::new(
                schema.entity_kind,
                action,
                schema.version,
            ))?;
            log_event_with_fields(
                Event::SchemaInstalled,
                &[
                    ("kind", schema.entity_kind.as_str()),
                    ("action", action.as_str()),
                ],
            );
        }

        report.steps.push(MigrationStep {
            kind: schema.entity_kind,
            action,
            path,
        });
    }

    let applied = report.applied().to_string();
    let store = store_dir.display().to_string();
    log_event_with_fields(
        Event::MigrationComplete,
        &[("store_dir", store.as_str()), ("applied", applied.as_str())],
    );

    Ok(report)
}

fn install(schema: &Schema, path: &Path) -> MigrationResult<MigrationAction> {
    let action = match fs::read_to_string(path) {
        Ok(existing) => match serde_json::from_str::<Schema>(&existing) {
            Ok(installed) if installed == *schema => return Ok(MigrationAction::Unchanged),
            // Unreadable definitions are replaced
            _ => MigrationAction::Updated,
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => MigrationAction::Installed,
        Err(e) => {
            return Err(MigrationError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let encoded = serde_json::to_string_pretty(schema).map_err(|e| MigrationError::Encode {
        kind: schema.entity_kind,
        reason: e.to_string(),
    })?;

    // Synced temp file, rename, then directory sync: readers see the old
    // schema or the new one, never a partial write
    let tmp = path.with_extension("json.tmp");
    let mut file = File::create(&tmp).map_err(io_error(&tmp))?;
    file.write_all(encoded.as_bytes()).map_err(io_error(&tmp))?;
    file.sync_all().map_err(io_error(&tmp))?;
    drop(file);

    fs::rename(&tmp, path).map_err(io_error(path))?;

    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(action)
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> MigrationError {
    let path = path.to_path_buf();
    move |source| MigrationError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldConstraint, ValueShape};
    use tempfile::TempDir;

    #[test]
    fn test_fresh_store_installs_everything() {
        let dir = TempDir::new().unwrap();
        let registry = SchemaRegistry::builtin();

        let report = migrate(dir.path(), &registry).unwrap();
        assert_eq!(report.applied(), registry.len());
        assert!(report
            .steps
            .iter()
            .all(|s| s.action == MigrationAction::Installed));
        assert!(schema_dir(dir.path()).join("schema_place.json").exists());

        let journal = MigrationJournal::new(journal_path(dir.path()));
        assert_eq!(journal.entries().unwrap().len(), registry.len());
    }

    #[test]
    fn test_install_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        migrate(dir.path(), &SchemaRegistry::builtin()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(schema_dir(dir.path()))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{:?}", leftovers);
    }

    #[test]
    fn test_second_run_is_noop() {
        let dir = TempDir::new().unwrap();
        let registry = SchemaRegistry::builtin();

        migrate(dir.path(), &registry).unwrap();
        let again = migrate(dir.path(), &registry).unwrap();

        assert!(again.is_noop());
        let journal = MigrationJournal::new(journal_path(dir.path()));
        assert_eq!(journal.entries().unwrap().len(), registry.len());
    }

    #[test]
    fn test_changed_definition_is_updated() {
        let dir = TempDir::new().unwrap();
        migrate(dir.path(), &SchemaRegistry::builtin()).unwrap();

        let mut changed = SchemaRegistry::new();
        let mut sound = crate::schema::opaque_schema(EntityKind::Sound);
        sound.version = 2;
        sound
            .fields
            .push(FieldConstraint::required_shape("uri", ValueShape::NonEmptyString));
        changed.register(sound).unwrap();

        let report = migrate(dir.path(), &changed).unwrap();
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.steps[0].action, MigrationAction::Updated);
    }

    #[test]
    fn test_installed_schemas_load_back() {
        let dir = TempDir::new().unwrap();
        let builtin = SchemaRegistry::builtin();
        migrate(dir.path(), &builtin).unwrap();

        let loaded = SchemaRegistry::load_dir(&schema_dir(dir.path())).unwrap();
        assert_eq!(loaded.len(), builtin.len());
        assert_eq!(
            loaded.get(EntityKind::Place).unwrap(),
            builtin.get(EntityKind::Place).unwrap()
        );
    }

    #[test]
    fn test_corrupt_schema_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let schemas = schema_dir(dir.path());
        fs::create_dir_all(&schemas).unwrap();
        fs::write(schemas.join("schema_place.json"), "garbage").unwrap();

        let report = migrate(dir.path(), &SchemaRegistry::builtin()).unwrap();
        let place = report
            .steps
            .iter()
            .find(|s| s.kind == EntityKind::Place)
            .unwrap();
        assert_eq!(place.action, MigrationAction::Updated);
    }
}
