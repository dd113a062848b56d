//! Engine settings
//!
//! Persisted separately from the game save (JSON file on native,
//! LocalStorage on web).

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, SaveMode};

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix for saved keys; also the default save file stem
    pub storage_namespace: String,
    /// Explicit save file (native only)
    pub save_file: Option<PathBuf>,
    /// Background or synchronous saves
    pub save_mode: SaveMode,
    /// Fixed dice seed for reproducible sessions
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_namespace: "game_prefs".to_string(),
            save_file: None,
            save_mode: SaveMode::Background,
            rng_seed: None,
        }
    }
}

impl Settings {
    /// LocalStorage key / native settings file stem
    const STORAGE_KEY: &'static str = "dice_roller_settings";

    /// Where the native save file lives
    pub fn save_path(&self) -> PathBuf {
        self.save_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.json", self.storage_namespace)))
    }

    /// Native settings file path
    pub fn default_path() -> PathBuf {
        PathBuf::from(format!("{}.json", Self::STORAGE_KEY))
    }

    /// Open the platform save store
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(crate::persistence::FileStore::new(self.save_path()))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn open_store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(crate::persistence::LocalStorageStore::new(
            self.storage_namespace.clone(),
        ))
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from the default file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        self.save_to(Self::default_path());
    }

    /// Load settings from a JSON file, defaults on any failure
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring corrupt settings {}: {e}", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not read settings {}: {e}", path.display()),
        }

        log::info!("Using default settings");
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) {
        let path = path.as_ref();
        match serde_json::to_string_pretty(self) {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not write settings {}: {e}", path.display()),
            },
            Err(e) => log::warn!("Could not encode settings: {e}"),
        }
    }
}
