//! Key-value storage module
//!
//! Persisted collections are whole JSON documents stored under a fixed key.
//! [`FileStore`] keeps one JSON file per key in the system's standard data
//! directory; [`MemoryStore`] keeps them in memory.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to determine data directory location
    #[error("Failed to determine data directory location")]
    DataDirectoryNotFound,

    /// Failed to create or access the data directory
    #[error("Failed to create data directory at {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to read a stored value
    #[error("Failed to read {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a stored value
    #[error("Failed to write {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to remove a stored value
    #[error("Failed to remove {path}: {source}")]
    RemoveFailed { path: PathBuf, source: io::Error },

    /// Failed to serialize a collection for storage
    #[error("Failed to serialize data: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A store of whole string values by key.
///
/// Values are always read and written wholesale; there is no partial update.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the value exists but cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the value under `key`; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if an existing value cannot be removed.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Stores each key as a JSON file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// The directory holding one file per key
    data_dir: PathBuf,
}

impl FileStore {
    /// Opens the store in the system's standard data directory
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined or created.
    pub fn open_default() -> Result<Self, StorageError> {
        let proj_dirs = directories::ProjectDirs::from("org", "cinefind", "cinefind")
            .ok_or(StorageError::DataDirectoryNotFound)?;

        Self::open(proj_dirs.data_dir())
    }

    /// Opens (and creates if needed) a store rooted at `data_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();

        fs::create_dir_all(&data_dir).map_err(|e| StorageError::DirectoryCreationFailed {
            path: data_dir.clone(),
            source: e,
        })?;

        Ok(Self { data_dir })
    }

    /// Returns the directory the store writes to
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sanitize_name(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let file_path = self.path_for(key);

        match fs::read_to_string(&file_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                path: file_path,
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let file_path = self.path_for(key);

        fs::write(&file_path, value).map_err(|e| StorageError::WriteFailed {
            path: file_path,
            source: e,
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let file_path = self.path_for(key);

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::RemoveFailed {
                path: file_path,
                source: e,
            }),
        }
    }
}

/// Keeps values in memory for the lifetime of the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Loads the JSON array stored under `key`.
///
/// A missing key, an unreadable value or malformed content all yield an
/// empty collection; the next successful save replaces the bad content.
pub(crate) fn load_collection<T, S>(store: &S, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(error) => {
            tracing::warn!(key, %error, "Failed to read persisted collection, treating as empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(error) => {
            tracing::warn!(key, %error, "Discarding malformed persisted collection");
            Vec::new()
        }
    }
}

/// Writes `items` as a JSON array under `key`
pub(crate) fn save_collection<T, S>(store: &S, key: &str, items: &[T]) -> Result<(), StorageError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(items)?;
    store.set(key, &raw)
}

/// Sanitizes a key for use in file paths
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("cinefind_watchlist"), "cinefind_watchlist");
        assert_eq!(sanitize_name("With Spaces"), "with_spaces");
        assert_eq!(sanitize_name("With-Hyphens"), "with-hyphens");
        assert_eq!(sanitize_name("../escape"), "___escape");
        assert_eq!(sanitize_name("Mixed123ABC"), "mixed123abc");
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        assert_eq!(store.get("cinefind_watchlist").unwrap(), None);

        store.set("cinefind_watchlist", "[1,2,3]").unwrap();
        assert_eq!(
            store.get("cinefind_watchlist").unwrap().as_deref(),
            Some("[1,2,3]")
        );
        assert!(dir.path().join("nested/cinefind_watchlist.json").is_file());

        store.remove("cinefind_watchlist").unwrap();
        assert_eq!(store.get("cinefind_watchlist").unwrap(), None);
        // Removing again is fine
        store.remove("cinefind_watchlist").unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set("key", "value")
            .unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_load_collection_handles_malformed_content() {
        let store = MemoryStore::new();

        let empty: Vec<String> = load_collection(&store, "list");
        assert!(empty.is_empty());

        for malformed in ["not json", "{\"an\":\"object\"}", "[1, 2", "[{\"wrong\":true}]"] {
            store.set("list", malformed).unwrap();
            let loaded: Vec<String> = load_collection(&store, "list");
            assert!(loaded.is_empty(), "expected empty list for {malformed:?}");
        }
    }

    #[test]
    fn test_save_then_load_collection() {
        let store = MemoryStore::new();
        let items = vec!["a".to_string(), "b".to_string()];

        save_collection(&store, "list", &items).unwrap();

        assert_eq!(store.get("list").unwrap().as_deref(), Some(r#"["a","b"]"#));
        let loaded: Vec<String> = load_collection(&store, "list");
        assert_eq!(loaded, items);
    }
}
