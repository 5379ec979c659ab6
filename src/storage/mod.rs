//! Reading Persistence
//!
//! Pluggable stores behind the [`ReadingStore`] trait:
//! - [`InMemoryStore`]: bounded in-memory store for tests and ephemeral runs
//! - [`SledReadingStore`]: embedded sled database, survives restarts
//!
//! The data directory of the sled backend is guarded by a [`ProcessLock`].

mod lockfile;
mod memory;
mod sled_store;

pub use lockfile::ProcessLock;
pub use memory::InMemoryStore;
pub use sled_store::SledReadingStore;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::types::Reading;

/// Trait for pluggable reading stores.
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across async tasks. Calls are short and never await.
pub trait ReadingStore: Send + Sync {
    /// Persist one accepted reading.
    fn append(&self, reading: &Reading) -> Result<(), StorageError>;

    /// Most recently appended reading.
    fn latest(&self) -> Result<Option<Reading>, StorageError>;

    /// Up to `limit` most recent readings, oldest first.
    fn recent(&self, limit: usize) -> Result<Vec<Reading>, StorageError>;

    /// Number of stored readings.
    fn len(&self) -> Result<usize, StorageError>;

    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Open the store selected by configuration.
pub fn open_store(cfg: &StorageConfig) -> Result<Arc<dyn ReadingStore>, StorageError> {
    let store: Arc<dyn ReadingStore> = match cfg.backend {
        StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        StorageBackend::Sled => Arc::new(SledReadingStore::open(&cfg.path)?),
    };
    tracing::info!(backend = store.backend_name(), "Reading store opened");
    Ok(store)
}
