//! Store Workflow Tests
//!
//! End-to-end use of the validator against an on-disk store:
//! - migration installs schemas idempotently and journals what it applied
//! - installed schemas load back into a registry
//! - the directory resolver feeds the validator
//! - the operator commands report rejected documents and inconsistent stores

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use placegraph::cli::{error_envelope, run_command, CliErrorCode, Command};
use placegraph::migration::{journal_path, migrate, schema_dir, MigrationAction, MigrationJournal};
use placegraph::model::{Collection, EntityKind, Reference};
use placegraph::resolver::{DirectoryResolver, ReferenceResolver};
use placegraph::schema::SchemaRegistry;
use placegraph::validation::{Validator, Verdict, ViolationCode};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn place(id: &str) -> Value {
    json!({
        "_id": id,
        "name": id,
        "description": "Stored place",
        "kind": "room",
        "location": {"floor": 1},
        "hasParent": false,
        "hasChildren": false,
        "hasNeighbors": false,
        "containsProps": false
    })
}

fn store(resolver: &DirectoryResolver, collection: Collection, document: &Value) {
    fs::create_dir_all(resolver.collection_dir(collection)).unwrap();
    let id = document["_id"].as_str().unwrap();
    let path = resolver
        .document_path(&Reference::new(collection, id))
        .unwrap();
    fs::write(path, serde_json::to_string_pretty(document).unwrap()).unwrap();
}

fn write_config(dir: &Path, store_dir: &Path) -> PathBuf {
    let path = dir.join("placegraph.json");
    let config = json!({
        "store_dir": store_dir.to_string_lossy(),
        "log_level": "error"
    });
    fs::write(&path, config.to_string()).unwrap();
    path
}

/// A hall with two mutually neighboring rooms.
fn seed_house(resolver: &DirectoryResolver) {
    let mut hall = place("hall");
    hall["kind"] = json!("structure");
    hall["hasChildren"] = json!(true);
    hall["childPlaces"] = json!([
        {"$ref": "Places", "$id": "kitchen"},
        {"$ref": "Places", "$id": "pantry"}
    ]);
    store(resolver, Collection::Places, &hall);

    for (id, neighbor) in [("kitchen", "pantry"), ("pantry", "kitchen")] {
        let mut room = place(id);
        room["hasParent"] = json!(true);
        room["parentPlace"] = json!({"$ref": "Places", "$id": "hall"});
        room["hasNeighbors"] = json!(true);
        room["neighborPlaces"] = json!([{"$ref": "Places", "$id": neighbor}]);
        store(resolver, Collection::Places, &room);
    }
}

// =============================================================================
// Migration Tests
// =============================================================================

/// Migration installs every schema once; a rerun applies nothing.
#[test]
fn test_migration_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let registry = SchemaRegistry::builtin();

    let first = migrate(tmp.path(), &registry).unwrap();
    assert_eq!(first.applied(), EntityKind::ALL.len());
    assert!(first
        .steps
        .iter()
        .all(|s| s.action == MigrationAction::Installed));

    let second = migrate(tmp.path(), &registry).unwrap();
    assert!(second.is_noop());

    let entries = MigrationJournal::new(journal_path(tmp.path()))
        .entries()
        .unwrap();
    assert_eq!(entries.len(), EntityKind::ALL.len());
    assert!(entries.iter().all(|e| e.action == MigrationAction::Installed));
}

/// Installed schemas validate exactly like the built-ins.
#[test]
fn test_installed_schemas_drive_validation() {
    let tmp = TempDir::new().unwrap();
    migrate(tmp.path(), &SchemaRegistry::builtin()).unwrap();

    let loaded = SchemaRegistry::load_dir(&schema_dir(tmp.path())).unwrap();
    let installed = Validator::new(Arc::new(loaded));
    let builtin = Validator::builtin();
    let resolver = DirectoryResolver::new(tmp.path());

    let mut doc = place("attic");
    doc["kind"] = json!("loft");
    doc["hasParent"] = json!(true);

    assert_eq!(
        installed.validate(&doc, EntityKind::Place, &resolver).unwrap(),
        builtin.validate(&doc, EntityKind::Place, &resolver).unwrap()
    );
}

// =============================================================================
// Directory Store Tests
// =============================================================================

/// A consistent stored graph validates cleanly, document by document.
#[test]
fn test_consistent_store_validates() {
    let tmp = TempDir::new().unwrap();
    let resolver = DirectoryResolver::new(tmp.path());
    seed_house(&resolver);

    let validator = Validator::builtin();
    for id in resolver.list_places().unwrap() {
        let doc = resolver.fetch_place(&id).unwrap().unwrap();
        let result = validator.validate(&doc, EntityKind::Place, &resolver).unwrap();
        assert!(result.violations.is_empty(), "{}: {:?}", id, result.violations);
    }
}

/// Removing a stored Place leaves its holders with dangling references.
#[test]
fn test_deleted_place_dangles() {
    let tmp = TempDir::new().unwrap();
    let resolver = DirectoryResolver::new(tmp.path());
    seed_house(&resolver);

    let pantry = resolver.document_path(&Reference::place("pantry")).unwrap();
    fs::remove_file(pantry).unwrap();

    let hall = resolver.fetch_place("hall").unwrap().unwrap();
    let result = Validator::builtin()
        .validate(&hall, EntityKind::Place, &resolver)
        .unwrap();
    assert_eq!(result.verdict, Verdict::Rejected);
    assert_eq!(result.codes(), vec![ViolationCode::DanglingReference]);
    assert_eq!(result.violations[0].field, "childPlaces[1]");
}

/// An unreadable related document makes the result inconclusive.
#[test]
fn test_corrupt_neighbor_is_inconclusive() {
    let tmp = TempDir::new().unwrap();
    let resolver = DirectoryResolver::new(tmp.path());
    seed_house(&resolver);

    let pantry = resolver.document_path(&Reference::place("pantry")).unwrap();
    fs::write(pantry, "{ truncated").unwrap();

    let kitchen = resolver.fetch_place("kitchen").unwrap().unwrap();
    let result = Validator::builtin()
        .validate(&kitchen, EntityKind::Place, &resolver)
        .unwrap();
    assert_eq!(result.verdict, Verdict::Inconclusive);
    assert!(result
        .violations_for("neighborPlaces[0]")
        .any(|v| v.code == ViolationCode::ResolverUnavailable));
}

/// External entities are found by collection directory.
#[test]
fn test_external_entities_in_store() {
    let tmp = TempDir::new().unwrap();
    let resolver = DirectoryResolver::new(tmp.path());
    store(&resolver, Collection::Props, &json!({"_id": "kettle"}));

    let mut kitchen = place("kitchen");
    kitchen["containsProps"] = json!(true);
    kitchen["propsInventory"] = json!([
        {"$ref": "Props", "$id": "kettle"},
        {"$ref": "Props", "$id": "toaster"}
    ]);

    let result = Validator::builtin()
        .validate(&kitchen, EntityKind::Place, &resolver)
        .unwrap();
    assert_eq!(result.codes(), vec![ViolationCode::DanglingReference]);
    assert_eq!(result.violations[0].field, "propsInventory[1]");
}

// =============================================================================
// Operator Command Tests
// =============================================================================

/// The check command passes on a consistent store and fails after a deletion.
#[test]
fn test_check_command() {
    let tmp = TempDir::new().unwrap();
    let store_dir = tmp.path().join("store");
    let config = write_config(tmp.path(), &store_dir);
    let resolver = DirectoryResolver::new(&store_dir);
    seed_house(&resolver);

    run_command(Command::Migrate {
        config: config.clone(),
    })
    .unwrap();
    run_command(Command::Check {
        config: config.clone(),
    })
    .unwrap();

    fs::remove_file(resolver.document_path(&Reference::place("kitchen")).unwrap()).unwrap();
    let err = run_command(Command::Check { config }).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::StoreInconsistent);
}

/// The validate command fails with a rejection code for a bad document.
#[test]
fn test_validate_command() {
    let tmp = TempDir::new().unwrap();
    let store_dir = tmp.path().join("store");
    let config = write_config(tmp.path(), &store_dir);

    let good = tmp.path().join("good.json");
    fs::write(&good, place("study").to_string()).unwrap();
    run_command(Command::Validate {
        config: config.clone(),
        kind: EntityKind::Place,
        file: Some(good),
    })
    .unwrap();

    let mut doc = place("study");
    doc["hasChildren"] = json!(true);
    let bad = tmp.path().join("bad.json");
    fs::write(&bad, doc.to_string()).unwrap();
    let err = run_command(Command::Validate {
        config,
        kind: EntityKind::Place,
        file: Some(bad),
    })
    .unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::DocumentRejected);
}

/// Operational failures come back with their coded error.
#[test]
fn test_migrate_command_reports_config_error() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("placegraph.json");
    fs::write(&config, r#"{"store_dir": "./store", "log_level": "loud"}"#).unwrap();

    let err = run_command(Command::Migrate { config }).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
    assert!(!err.outcome_reported());

    let envelope = error_envelope(err.code_str(), err.message());
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["code"], "PLACE_CLI_CONFIG_ERROR");
}
