//! In-memory reading store

use std::collections::VecDeque;
use std::sync::RwLock;

use super::{ReadingStore, StorageError};
use crate::types::Reading;

/// Oldest readings are evicted once `max_readings` is exceeded.
pub struct InMemoryStore {
    readings: RwLock<VecDeque<Reading>>,
    max_readings: usize,
}

impl InMemoryStore {
    /// Default limit of 10 000 readings (about 3 hours at 1 Hz).
    pub fn new() -> Self {
        Self::with_limit(10_000)
    }

    pub fn with_limit(max_readings: usize) -> Self {
        Self {
            readings: RwLock::new(VecDeque::new()),
            max_readings: max_readings.max(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingStore for InMemoryStore {
    fn append(&self, reading: &Reading) -> Result<(), StorageError> {
        let mut store = self
            .readings
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        store.push_back(reading.clone());
        while store.len() > self.max_readings {
            store.pop_front();
        }
        Ok(())
    }

    fn latest(&self) -> Result<Option<Reading>, StorageError> {
        let store = self
            .readings
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(store.back().cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Reading>, StorageError> {
        let store = self
            .readings
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let skip = store.len().saturating_sub(limit);
        Ok(store.iter().skip(skip).cloned().collect())
    }

    fn len(&self) -> Result<usize, StorageError> {
        let store = self
            .readings
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(store.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
