//! Sled-backed reading store
//!
//! Key: monotonic id from `generate_id()` as big-endian bytes, so iteration
//! order is insertion order. Value: JSON-serialized `Reading`.

use std::path::Path;
use std::sync::Arc;

use super::{ReadingStore, StorageError};
use crate::types::Reading;

#[derive(Clone)]
pub struct SledReadingStore {
    db: Arc<sled::Db>,
}

impl SledReadingStore {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        tracing::info!(path = %path.display(), readings = db.len(), "Reading database opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

impl ReadingStore for SledReadingStore {
    /// Does not flush on every write; sled flushes in the background and a
    /// crash loses at most the last few readings.
    fn append(&self, reading: &Reading) -> Result<(), StorageError> {
        let key = self.db.generate_id()?.to_be_bytes();
        let value = serde_json::to_vec(reading)?;
        self.db.insert(key, value)?;
        Ok(())
    }

    fn latest(&self) -> Result<Option<Reading>, StorageError> {
        match self.db.last()? {
            Some((_key, value)) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn recent(&self, limit: usize) -> Result<Vec<Reading>, StorageError> {
        let mut readings = Vec::with_capacity(limit);
        for item in self.db.iter().rev() {
            if readings.len() >= limit {
                break;
            }
            let (_key, value) = item?;
            match serde_json::from_slice::<Reading>(&value) {
                Ok(r) => readings.push(r),
                Err(e) => tracing::warn!(error = %e, "Skipping undecodable stored reading"),
            }
        }
        readings.reverse();
        Ok(readings)
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.db.len())
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}
