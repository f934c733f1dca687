//! Local key/value cache
//!
//! The cache is opportunistic: generated concept text and quiz mode flags are
//! kept across runs, but a successful server response always wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::api::ConceptMode;

/// Errors raised by persistent stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Key names used by the client
pub mod keys {
    use crate::api::ConceptMode;

    pub const USER_ID: &str = "user_id";
    pub const USERNAME: &str = "username";
    pub const ONBOARDING_COMPLETED: &str = "onboarding_completed";

    /// Session keys cleared on logout or a failed restore
    pub const SESSION: [&str; 3] = [USER_ID, USERNAME, ONBOARDING_COMPLETED];

    pub fn concept(week_id: u64, mode: ConceptMode) -> String {
        format!("concept_{}_{}", week_id, mode.as_str())
    }

    pub fn quiz_mode(quiz_id: u64) -> String {
        format!("quiz_{}_mode", quiz_id)
    }
}

/// In-memory store, used by tests and as a fallback
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store persisted as one JSON object, rewritten on every mutation
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open a store file, starting empty when it does not exist yet
    ///
    /// # Parameters
    /// * `path` - Location of the JSON file
    ///
    /// # Returns
    /// * `Ok(FileStore)` - Store loaded from disk (or empty)
    /// * `Err(StoreError)` - The file exists but cannot be read or parsed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };

        log::debug!("Opened store {} ({} entries)", path.display(), entries.len());

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let content =
            serde_json::to_string_pretty(&self.entries).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;

        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Remove every cached concept text of a week
pub fn clear_concepts<S: KeyValueStore + ?Sized>(store: &mut S, week_id: u64) -> Result<(), StoreError> {
    for mode in ConceptMode::all() {
        store.remove(&keys::concept(week_id, mode))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        assert_eq!(keys::concept(12, ConceptMode::Summary), "concept_12_summary");
        assert_eq!(keys::concept(12, ConceptMode::DeepDive), "concept_12_deep_dive");
        assert_eq!(keys::quiz_mode(7), "quiz_7_mode");
    }

    #[test]
    fn test_memory_store_set_get_remove() {
        let mut store = MemoryStore::new();

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));

        store.remove("a").unwrap();
        assert_eq!(store.get("a"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("store.json");

        // Act
        {
            let mut store = FileStore::open(&path).unwrap();
            store.set(keys::USER_ID, "42").unwrap();
            store.set(keys::USERNAME, "민지").unwrap();
            store.remove(keys::USERNAME).unwrap();
        }
        let reopened = FileStore::open(&path).unwrap();

        // Assert
        assert_eq!(reopened.get(keys::USER_ID).as_deref(), Some("42"));
        assert_eq!(reopened.get(keys::USERNAME), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let result = FileStore::open(&path);

        assert!(matches!(result, Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_clear_concepts_removes_both_modes() {
        let mut store = MemoryStore::new();
        store.set(&keys::concept(3, ConceptMode::Summary), "요약").unwrap();
        store.set(&keys::concept(3, ConceptMode::DeepDive), "심화").unwrap();
        store.set(&keys::concept(4, ConceptMode::Summary), "다른 주").unwrap();

        clear_concepts(&mut store, 3).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(&keys::concept(4, ConceptMode::Summary)).is_some());
    }
}
