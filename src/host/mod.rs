//! In-memory host: a document and a timer that need no browser.
//!
//! [`MemoryDocument`] implements every capability the consent core needs
//! (storage, cookie jar, script loader, banner view) over one shared state
//! and records each side effect in order. [`ManualScheduler`] runs timers on
//! a virtual clock. Together they let tests and non-browser hosts drive the
//! full consent flow.

mod document;
mod scheduler;

pub use document::{BannerSnapshot, DocumentEvent, MemoryDocument};
pub use scheduler::ManualScheduler;
