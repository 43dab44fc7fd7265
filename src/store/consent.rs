//! High-level `ConsentStore` over a storage backend.
//!
//! `read` and `write` never fail observably. A record that cannot be read
//! is the same as no record, and a write that cannot be persisted is
//! dropped so the banner can still be dismissed. `try_read` and `try_write`
//! expose the underlying error for hosts that want to report it.

use super::backend::StorageBackend;
use super::memory::MemoryBackend;
use super::redb::RedbBackend;
use crate::constants::STORAGE_KEY;
use crate::error::{Error, Result};
use crate::record::ConsentRecord;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads and writes the single persisted consent record.
///
/// `Clone` shares the backend, so every clone sees the same record.
#[derive(Clone)]
pub struct ConsentStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
}

impl ConsentStore {
    /// Creates a store backed by an in-memory map.
    pub fn memory() -> Self {
        Self::custom(MemoryBackend::new())
    }

    /// Creates a store backed by a redb file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self::custom(RedbBackend::open(path)?))
    }

    /// Creates a store over a custom backend (e.g. browser `localStorage`).
    pub fn custom<B: StorageBackend + 'static>(backend: B) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    /// Creates a store over a backend handle that is also used elsewhere.
    pub fn from_shared(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            key: STORAGE_KEY.to_string(),
        }
    }

    /// Overrides the storage key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// The key the record is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored record, reporting why it could not be read.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// - [`Error::StorageUnavailable`] if the backend read fails
    /// - [`Error::CorruptRecord`] if the stored text is not a valid record
    pub fn try_read(&self) -> Result<Option<ConsentRecord>> {
        let stored = self
            .backend
            .get(&self.key)
            .map_err(|e| Error::storage_unavailable(format!("{e:#}")))?;

        match stored {
            Some(text) if !text.is_empty() => ConsentRecord::from_json(&text).map(Some),
            _ => Ok(None),
        }
    }

    /// Reads the stored record. Any failure reads as "no consent yet".
    pub fn read(&self) -> Option<ConsentRecord> {
        match self.try_read() {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %self.key, error = %e, "ignoring unreadable consent record");
                None
            },
        }
    }

    /// Persists `record`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// - [`Error::CorruptRecord`] if the record cannot be serialized
    /// - [`Error::StorageUnavailable`] if the backend write fails
    pub fn try_write(&self, record: &ConsentRecord) -> Result<()> {
        let text = record.to_json()?;
        self.backend
            .set(&self.key, &text)
            .map_err(|e| Error::storage_unavailable(format!("{e:#}")))?;
        debug!(
            key = %self.key,
            functional = record.functional(),
            analytics = record.analytics(),
            "consent record written"
        );
        Ok(())
    }

    /// Persists `record`. A failed write is logged and dropped.
    pub fn write(&self, record: &ConsentRecord) {
        if let Err(e) = self.try_write(record) {
            warn!(key = %self.key, error = %e, "consent record not persisted");
        }
    }
}
