//! CLI command implementations
//!
//! Commands are thin: load config, build the registry, resolver and
//! validator, run one library operation and print its JSON.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::migration::{migrate as migrate_store, schema_dir};
use crate::model::EntityKind;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::resolver::{DirectoryResolver, ReferenceResolver};
use crate::schema::SchemaRegistry;
use crate::validation::Validator;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_document, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
///
/// Failures that did not already print a result are written to stdout
/// as an error envelope before being returned.
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = dispatch(cmd);
    if let Err(e) = &result {
        if !e.outcome_reported() {
            write_error(e.code_str(), e.message())?;
        }
    }
    result
}

fn dispatch(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Migrate { config } => migrate(&config),
        Command::Validate { config, kind, file } => validate(&config, kind, file.as_deref()),
        Command::Check { config } => check(&config),
        Command::Schema { kind } => schema(kind),
    }
}

/// Install the built-in schemas into the store
pub fn migrate(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let report = migrate_store(config.store_path(), &SchemaRegistry::builtin())?;
    write_response(report.to_json())
}

/// Validate one document against the store
///
/// Prints the validation result; fails when the verdict is not accepted.
pub fn validate(config_path: &Path, kind: EntityKind, file: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let document = read_document(file)?;
    let validator = build_validator(&config)?;
    let resolver = DirectoryResolver::new(config.store_path());

    let result = validator.validate(&document, kind, &resolver)?;
    write_response(result.to_json())?;

    if result.accepted {
        Ok(())
    } else {
        Err(CliError::document_rejected(
            result.verdict.as_str(),
            result.violations.len(),
        ))
    }
}

/// Validate every stored Place
///
/// Surfaces dangling references left behind by deletions.
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let validator = build_validator(&config)?;
    let resolver = DirectoryResolver::new(config.store_path());

    let store_dir = config.store_path().display().to_string();
    log_event_with_fields(Event::StoreCheckBegin, &[("store_dir", store_dir.as_str())]);

    let ids = resolver
        .list_places()
        .map_err(|e| CliError::io_error(e.to_string()))?;

    let mut results = Vec::with_capacity(ids.len());
    let mut failing = 0usize;

    for id in &ids {
        let entry = match resolver.fetch_place(id) {
            Ok(Some(document)) => {
                let result = validator.validate(&document, EntityKind::Place, &resolver)?;
                if !result.accepted {
                    failing += 1;
                }
                json!({ "id": id, "result": result.to_json() })
            }
            // Removed between listing and reading
            Ok(None) => continue,
            Err(e) => {
                failing += 1;
                json!({ "id": id, "error": e.to_string() })
            }
        };
        results.push(entry);
    }

    let total = results.len();
    let accepted = total - failing;
    let (total_str, failing_str) = (total.to_string(), failing.to_string());
    log_event_with_fields(
        Event::StoreCheckComplete,
        &[
            ("store_dir", store_dir.as_str()),
            ("total", total_str.as_str()),
            ("failing", failing_str.as_str()),
        ],
    );

    write_response(json!({
        "total": total,
        "accepted": accepted,
        "failing": failing,
        "places": results,
    }))?;

    if failing == 0 {
        Ok(())
    } else {
        Err(CliError::store_inconsistent(failing, total))
    }
}

/// Print built-in schema definitions
pub fn schema(kind: Option<EntityKind>) -> CliResult<()> {
    let registry = SchemaRegistry::builtin();
    let data = match kind {
        Some(kind) => serde_json::to_value(registry.get(kind)?)?,
        None => Value::Array(
            registry
                .schemas()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    write_response(data)
}

fn load_config(path: &Path) -> CliResult<Config> {
    let config = Config::load(path)?;
    Logger::set_min_severity(config.severity()?);
    let store_dir = config.store_path().display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("store_dir", store_dir.as_str())]);
    Ok(config)
}

/// Schemas installed in the store, or the built-ins if none are installed.
fn load_registry(config: &Config) -> CliResult<SchemaRegistry> {
    let dir = schema_dir(config.store_path());
    let (registry, source) = if dir.is_dir() {
        let installed = SchemaRegistry::load_dir(&dir)?;
        if installed.is_empty() {
            (SchemaRegistry::builtin(), "builtin")
        } else {
            (installed, "store")
        }
    } else {
        (SchemaRegistry::builtin(), "builtin")
    };

    let count = registry.len().to_string();
    log_event_with_fields(
        Event::SchemasLoaded,
        &[("source", source), ("count", count.as_str())],
    );
    Ok(registry)
}

fn build_validator(config: &Config) -> CliResult<Validator> {
    let registry = load_registry(config)?;
    Ok(Validator::new(Arc::new(registry)).with_policy(config.policy()))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use crate::model::Collection;
    use crate::model::Reference;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("placegraph.json");
        let store_dir = temp_dir.path().join("store");

        let config = json!({
            "store_dir": store_dir.to_string_lossy(),
            "log_level": "error"
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    fn store_place(temp_dir: &TempDir, document: &Value) {
        let resolver = DirectoryResolver::new(temp_dir.path().join("store"));
        fs::create_dir_all(resolver.collection_dir(Collection::Places)).unwrap();
        let id = document["_id"].as_str().unwrap();
        let path = resolver.document_path(&Reference::place(id)).unwrap();
        fs::write(path, document.to_string()).unwrap();
    }

    fn place(id: &str) -> Value {
        json!({
            "_id": id,
            "name": id,
            "description": "somewhere",
            "kind": "municipality",
            "location": {},
            "hasParent": false,
            "hasChildren": false,
            "hasNeighbors": false,
            "containsProps": false
        })
    }

    #[test]
    fn test_migrate_creates_schema_files() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        migrate(&config_path).unwrap();

        let schemas = temp_dir.path().join("store").join("metadata").join("schemas");
        assert!(schemas.join("schema_place.json").exists());
        assert!(schemas.join("schema_sound.json").exists());

        // Running it again is harmless
        migrate(&config_path).unwrap();
    }

    #[test]
    fn test_validate_accepts_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        let doc_path = temp_dir.path().join("doc.json");
        fs::write(&doc_path, place("paris").to_string()).unwrap();

        validate(&config_path, EntityKind::Place, Some(&doc_path)).unwrap();
    }

    #[test]
    fn test_validate_reports_rejection() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        let mut doc = place("paris");
        doc["hasParent"] = json!(true);
        let doc_path = temp_dir.path().join("doc.json");
        fs::write(&doc_path, doc.to_string()).unwrap();

        let err = validate(&config_path, EntityKind::Place, Some(&doc_path)).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::DocumentRejected);
    }

    #[test]
    fn test_check_finds_dangling_reference() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        let mut france = place("france");
        france["hasChildren"] = json!(true);
        france["childPlaces"] = json!([{"$ref": "Places", "$id": "paris"}]);
        store_place(&temp_dir, &france);

        let err = check(&config_path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::StoreInconsistent);

        let mut paris = place("paris");
        paris["hasParent"] = json!(true);
        paris["parentPlace"] = json!({"$ref": "Places", "$id": "france"});
        store_place(&temp_dir, &paris);

        check(&config_path).unwrap();
    }

    #[test]
    fn test_check_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        check(&config_path).unwrap();
    }

    #[test]
    fn test_schema_prints_every_builtin() {
        for kind in EntityKind::ALL {
            schema(Some(kind)).unwrap();
        }
        schema(None).unwrap();
    }

    #[test]
    fn test_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("placegraph.json");
        fs::write(&config_path, "{}").unwrap();

        let err = migrate(&config_path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }
}
