//! Storage backends
//!
//! A backend stores exactly one `Record`. `save` replaces it wholesale and
//! `clear` removes it; a missing save loads as an empty record.

use std::sync::{Mutex, PoisonError};

use super::codec::Record;
use super::Result;

/// Durable home for one saved game
pub trait KeyValueStore: Send + Sync {
    /// Load the saved record (empty when nothing is saved)
    fn load(&self) -> Result<Record>;

    /// Replace the saved record
    fn save(&self, record: &Record) -> Result<()>;

    /// Remove every saved key
    fn clear(&self) -> Result<()>;
}

/// In-process store, used by tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record
    pub fn with_record(record: Record) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }

    /// Copy of what is currently stored
    pub fn snapshot(&self) -> Record {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self) -> Result<Record> {
        Ok(self.snapshot())
    }

    fn save(&self, record: &Record) -> Result<()> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = record.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{KeyValueStore, Record, Result};

    /// Single JSON file holding the record as a flat object
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl KeyValueStore for FileStore {
        fn load(&self) -> Result<Record> {
            if !self.path.exists() {
                return Ok(Record::new());
            }
            let json = fs::read_to_string(&self.path)?;
            let entries: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&json)?;

            // A bad entry only costs its own key; decode falls back per key
            let mut record = Record::new();
            for (key, value) in entries {
                let text = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    other => {
                        log::warn!("Ignoring saved {key}: unsupported value {other}");
                        continue;
                    }
                };
                record.insert(key, text);
            }
            log::debug!("Loaded save from {}", self.path.display());
            Ok(record)
        }

        fn save(&self, record: &Record) -> Result<()> {
            if let Some(parent) = self.path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            let temp_path = self.path.with_extension("json.tmp");
            let json = serde_json::to_string_pretty(record)?;

            // Write to temp file
            fs::write(&temp_path, json)?;

            // Atomic rename
            fs::rename(&temp_path, &self.path)?;

            log::debug!("Saved game to {}", self.path.display());
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
                log::debug!("Deleted save {}", self.path.display());
            }
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorageStore;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::{KeyValueStore, Record, Result};
    use crate::persistence::StorageError;
    use crate::persistence::codec::ALL_KEYS;

    /// Browser LocalStorage, one entry per key under a namespace prefix
    #[derive(Debug, Clone)]
    pub struct LocalStorageStore {
        namespace: String,
    }

    impl LocalStorageStore {
        pub fn new(namespace: impl Into<String>) -> Self {
            Self {
                namespace: namespace.into(),
            }
        }

        fn storage_key(&self, key: &str) -> String {
            format!("{}.{}", self.namespace, key)
        }

        fn storage() -> Result<web_sys::Storage> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or_else(|| StorageError::Unavailable("LocalStorage".into()))
        }
    }

    fn js_error(err: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Unavailable(format!("{err:?}"))
    }

    impl KeyValueStore for LocalStorageStore {
        fn load(&self) -> Result<Record> {
            let storage = Self::storage()?;
            let mut record = Record::new();
            for key in ALL_KEYS {
                if let Ok(Some(value)) = storage.get_item(&self.storage_key(key)) {
                    record.insert(key.to_string(), value);
                }
            }
            Ok(record)
        }

        fn save(&self, record: &Record) -> Result<()> {
            let storage = Self::storage()?;
            for key in ALL_KEYS {
                let storage_key = self.storage_key(key);
                match record.get(key) {
                    Some(value) => storage.set_item(&storage_key, value).map_err(js_error)?,
                    None => storage.remove_item(&storage_key).map_err(js_error)?,
                }
            }
            log::debug!("Game saved to LocalStorage");
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            let storage = Self::storage()?;
            for key in ALL_KEYS {
                storage
                    .remove_item(&self.storage_key(key))
                    .map_err(js_error)?;
            }
            log::info!("Saved game cleared");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        [("total_points", "12"), ("last_roll_values", "3,4")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("saves").join("game.json"));

        assert!(store.load().unwrap().is_empty());
        store.save(&sample()).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), sample());

        store.clear().unwrap();
        assert!(!store.path().exists());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_tolerates_non_string_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(
            &path,
            r#"{"total_points":"900","purchased_items":"[\"add_dice_red\"]","number_of_dice":2,"active_multiplier":true,"last_roll_values":[3,4]}"#,
        )
        .unwrap();
        let store = FileStore::new(&path);

        let record = store.load().unwrap();
        assert_eq!(record["number_of_dice"], "2");
        assert_eq!(record["active_multiplier"], "true");
        assert!(!record.contains_key("last_roll_values"));

        let state = crate::persistence::decode(&record, &crate::Catalog::builtin());
        assert_eq!(state.total_points, 900);
        assert_eq!(state.number_of_dice, 2);
        assert_eq!(state.active_multiplier, 1);
        assert_eq!(state.last_roll_values, vec![6]);
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(crate::persistence::StorageError::Json(_))
        ));
    }
}
