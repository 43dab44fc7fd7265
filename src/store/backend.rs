//! Backend trait for the consent store.
//!
//! Defines the client-scoped key-value storage the store writes to, so the
//! same consent logic runs over `localStorage`, a file, or memory.

use anyhow::Result;

/// Backend trait for string key-value storage.
///
/// The host is single-threaded and event-driven, so no `Send`/`Sync` bound
/// is required; browser storage handles are not thread-safe. Methods take
/// `&self` and implementations use interior mutability.
///
/// Serialization is the store's job. Backends only move strings.
pub trait StorageBackend {
    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable (disabled, sandboxed,
    /// or the underlying read fails).
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a value, overwriting any existing value for the key.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable or the write fails
    /// (quota exceeded, read-only media, etc.).
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
