//! Append-only migration journal
//!
//! One JSON object per line. Entries are flushed and synced before
//! `append` returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::model::EntityKind;

use super::{MigrationAction, MigrationError, MigrationResult};

/// A single applied migration step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub applied_at: DateTime<Utc>,
    pub kind: EntityKind,
    pub action: MigrationAction,
    pub schema_version: u32,
}

impl JournalEntry {
    pub fn new(kind: EntityKind, action: MigrationAction, schema_version: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            applied_at: Utc::now(),
            kind,
            action,
            schema_version,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MigrationJournal {
    path: PathBuf,
}

impl MigrationJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &JournalEntry) -> MigrationResult<()> {
        let line = serde_json::to_string(entry)
            .map_err(|e| MigrationError::Journal(format!("cannot encode entry: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{}", line).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))
    }

    /// Every entry, oldest first. A missing journal is empty.
    pub fn entries(&self) -> MigrationResult<Vec<JournalEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut entries = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| {
                MigrationError::Journal(format!(
                    "{} line {}: {}",
                    self.path.display(),
                    n + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    pub fn exists(&self) -> bool {
        fs::metadata(&self.path).is_ok()
    }

    fn io_error(&self, e: io::Error) -> MigrationError {
        MigrationError::Io {
            path: self.path.clone(),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_read_back() {
        let dir = TempDir::new().unwrap();
        let journal = MigrationJournal::new(dir.path().join("migrations.jsonl"));
        assert!(!journal.exists());
        assert!(journal.entries().unwrap().is_empty());

        let first = JournalEntry::new(EntityKind::Place, MigrationAction::Installed, 1);
        let second = JournalEntry::new(EntityKind::Sound, MigrationAction::Updated, 2);
        journal.append(&first).unwrap();
        journal.append(&second).unwrap();

        let entries = journal.entries().unwrap();
        assert_eq!(entries, vec![first, second]);
    }

    #[test]
    fn test_entry_encoding() {
        let entry = JournalEntry::new(EntityKind::Place, MigrationAction::Installed, 1);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], "place");
        assert_eq!(value["action"], "installed");
        assert!(value["applied_at"].is_string());
    }

    #[test]
    fn test_corrupt_line_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("migrations.jsonl");
        fs::write(&path, "{\"id\": 1}\n").unwrap();

        let err = MigrationJournal::new(&path).entries().unwrap_err();
        assert!(matches!(err, MigrationError::Journal(_)));
    }
}
