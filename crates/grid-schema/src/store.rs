//! Persisted survey answers.
//!
//! Each survey key maps to one JSON payload. A save replaces the payload
//! unconditionally; the last write wins.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use grid_model::SurveyKey;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSurvey {
    /// Raw JSON sent by the grid.
    pub payload: String,
    pub modified: DateTime<Utc>,
}

impl StoredSurvey {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            modified: Utc::now(),
        }
    }
}

pub trait SurveyStore: Send + Sync {
    fn load(&self, key: &SurveyKey) -> Result<Option<StoredSurvey>, StoreError>;

    /// Replace whatever is stored under `key`.
    fn replace(&self, key: &SurveyKey, payload: &str) -> Result<StoredSurvey, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<SurveyKey, StoredSurvey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SurveyStore for MemoryStore {
    fn load(&self, key: &SurveyKey) -> Result<Option<StoredSurvey>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn replace(&self, key: &SurveyKey, payload: &str) -> Result<StoredSurvey, StoreError> {
        let stored = StoredSurvey::new(payload);
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.clone(), stored.clone());
        Ok(stored)
    }
}

/// One JSON document per key at `<root>/<year>/<farm>/<subtable>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &SurveyKey) -> PathBuf {
        self.root
            .join(key.year.to_string())
            .join(key.farm.as_str())
            .join(format!("{}.json", key.subtable))
    }
}

impl SurveyStore for FileStore {
    fn load(&self, key: &SurveyKey) -> Result<Option<StoredSurvey>, StoreError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    operation: "read",
                    path,
                    source,
                });
            }
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn replace(&self, key: &SurveyKey, payload: &str) -> Result<StoredSurvey, StoreError> {
        let stored = StoredSurvey::new(payload);
        let bytes = serde_json::to_vec_pretty(&stored)?;
        let path = self.path_for(key);
        write_atomic(&path, &bytes)?;
        tracing::debug!(%key, path = %path.display(), "replaced survey data");
        Ok(stored)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|source| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    file.write_all(bytes).map_err(|source| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source,
    })?;
    file.sync_all().map_err(|source| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_model::{FarmId, SubtableId};

    fn key(subtable: &str) -> SurveyKey {
        SurveyKey::new(
            2025,
            FarmId::new("100200").unwrap(),
            SubtableId::new(subtable).unwrap(),
        )
    }

    #[test]
    fn memory_store_last_write_wins() {
        let store = MemoryStore::new();
        assert!(store.load(&key("T01")).unwrap().is_none());
        store.replace(&key("T01"), "[1]").unwrap();
        store.replace(&key("T01"), "[2]").unwrap();
        assert_eq!(store.load(&key("T01")).unwrap().unwrap().payload, "[2]");
        assert!(store.load(&key("T02")).unwrap().is_none());
    }

    #[test]
    fn file_store_layout() {
        let store = FileStore::new("/data");
        assert_eq!(
            store.path_for(&key("T01")),
            PathBuf::from("/data/2025/100200/T01.json")
        );
    }
}
