//! Save/load persistence
//!
//! Features:
//! - Flat key-value layout, one entry per state field
//! - Per-key fallback to defaults on missing or corrupt data
//! - Repair of derived fields on load
//! - Background save worker (last write wins)
//! - Native file and browser LocalStorage backends

pub mod codec;
pub mod store;
pub mod writer;

pub use codec::{Record, decode, encode};
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;
pub use store::{KeyValueStore, MemoryStore};
pub use writer::{SaveMode, SaveWorker};

use thiserror::Error;

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
