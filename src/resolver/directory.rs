//! # Directory Store Resolver
//!
//! Resolves references against a store laid out one JSON file per entity:
//!
//! ```text
//! <root>/Places/<id>.json
//! <root>/Props/<id>.json
//! <root>/Glossary/<id>.json
//! ...
//! ```

use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::{Collection, EntityKind, Reference};

use super::{ReferenceResolver, ResolverError, ResolverResult};

#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.as_str())
    }

    /// File a reference resolves to, or `None` if the id cannot name a file.
    pub fn document_path(&self, reference: &Reference) -> Option<PathBuf> {
        if !is_safe_id(&reference.id) {
            return None;
        }
        Some(
            self.collection_dir(reference.collection)
                .join(format!("{}.json", reference.id)),
        )
    }

    /// Identifiers of every stored Place, sorted.
    pub fn list_places(&self) -> ResolverResult<Vec<String>> {
        let dir = self.collection_dir(Collection::Places);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unavailable(&dir, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| unavailable(&dir, e))?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl ReferenceResolver for DirectoryResolver {
    fn exists(&self, reference: &Reference) -> ResolverResult<bool> {
        let Some(path) = self.document_path(reference) else {
            return Ok(false);
        };

        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(unavailable(&path, e)),
        }
    }

    fn kind_of(&self, reference: &Reference) -> ResolverResult<Option<EntityKind>> {
        // The directory a file lives in is its collection
        Ok(self
            .exists(reference)?
            .then(|| reference.collection.entity_kind()))
    }

    fn fetch_place(&self, id: &str) -> ResolverResult<Option<Value>> {
        let reference = Reference::place(id);
        let Some(path) = self.document_path(&reference) else {
            return Ok(None);
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable(&path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ResolverError::CorruptDocument {
                reference: reference.to_string(),
                reason: e.to_string(),
            })
    }
}

fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(&['/', '\\', '\0'][..])
}

fn unavailable(path: &Path, e: io::Error) -> ResolverError {
    ResolverError::Unavailable(format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, DirectoryResolver) {
        let dir = TempDir::new().unwrap();
        let resolver = DirectoryResolver::new(dir.path());
        for collection in [Collection::Places, Collection::Props] {
            fs::create_dir_all(resolver.collection_dir(collection)).unwrap();
        }
        (dir, resolver)
    }

    #[test]
    fn test_exists_and_fetch() {
        let (_dir, resolver) = store();
        let path = resolver.document_path(&Reference::place("a")).unwrap();
        fs::write(&path, json!({"_id": "a", "name": "A"}).to_string()).unwrap();

        assert_eq!(resolver.exists(&Reference::place("a")), Ok(true));
        assert_eq!(resolver.exists(&Reference::place("b")), Ok(false));
        assert_eq!(resolver.fetch_place("a").unwrap().unwrap()["name"], "A");
        assert_eq!(resolver.fetch_place("b"), Ok(None));
        assert_eq!(
            resolver.kind_of(&Reference::place("a")),
            Ok(Some(EntityKind::Place))
        );
    }

    #[test]
    fn test_unsafe_ids_never_exist() {
        let (_dir, resolver) = store();
        assert_eq!(resolver.exists(&Reference::place("../etc/passwd")), Ok(false));
        assert_eq!(resolver.exists(&Reference::place("..")), Ok(false));
        assert!(resolver.document_path(&Reference::place("a/b")).is_none());
    }

    #[test]
    fn test_corrupt_document() {
        let (_dir, resolver) = store();
        let path = resolver.document_path(&Reference::place("bad")).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            resolver.fetch_place("bad"),
            Err(ResolverError::CorruptDocument { .. })
        ));
    }

    #[test]
    fn test_list_places_sorted() {
        let (_dir, resolver) = store();
        for id in ["c", "a", "b"] {
            let path = resolver.document_path(&Reference::place(id)).unwrap();
            fs::write(path, json!({"_id": id}).to_string()).unwrap();
        }
        fs::write(resolver.collection_dir(Collection::Places).join("README"), "x").unwrap();

        assert_eq!(resolver.list_places().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_list_places_missing_dir() {
        let dir = TempDir::new().unwrap();
        let resolver = DirectoryResolver::new(dir.path().join("nowhere"));
        assert_eq!(resolver.list_places().unwrap(), Vec::<String>::new());
    }
}
