//! Consent store with pluggable storage backends.
//!
//! Holds exactly one entry: the serialized [`ConsentRecord`](crate::record::ConsentRecord)
//! under a fixed key. Backends:
//!
//! - **MemoryBackend**: non-persistent, for tests and embedding
//! - **RedbBackend**: file-backed, for native or webview hosts
//!
//! A browser host implements [`StorageBackend`] over `localStorage`.
//!
//! # Example
//!
//! ```ignore
//! use falconhurst_consent::record::{ConsentRecord, Preferences};
//! use falconhurst_consent::store::ConsentStore;
//!
//! let store = ConsentStore::memory();
//! assert!(store.read().is_none());
//!
//! store.write(&ConsentRecord::now(Preferences::reject_all()));
//! assert!(store.read().is_some());
//! ```

mod backend;
mod consent;
mod memory;
mod redb;


pub use backend::StorageBackend;
pub use consent::ConsentStore;
pub use memory::MemoryBackend;
pub use redb::RedbBackend;
