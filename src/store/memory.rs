//! In-memory storage backend.
//!
//! Non-persistent: everything is lost when the backend is dropped. Used by
//! tests and by hosts that only need consent for the current session.

use super::backend::StorageBackend;
use anyhow::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory key-value backend using DashMap.
///
/// `Clone` shares the underlying map, so a test can keep a handle and
/// inspect what the store wrote.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<DashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let backend = MemoryBackend::new();

        backend.set("key1", "value1").unwrap();
        assert_eq!(backend.get("key1").unwrap().as_deref(), Some("value1"));
    }

    #[test]
    fn test_get_nonexistent() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("nonexistent").unwrap(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_overwrite() {
        let backend = MemoryBackend::new();

        backend.set("key", "value1").unwrap();
        backend.set("key", "value2").unwrap();

        assert_eq!(backend.get("key").unwrap().as_deref(), Some("value2"));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_clones_share_data() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();

        backend.set("key", "value").unwrap();
        assert_eq!(handle.get("key").unwrap().as_deref(), Some("value"));
    }
}
