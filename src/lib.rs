//! Cookie consent core for the Falconhurst site.
//!
//! Keeps one persisted consent record, decides whether analytics may load,
//! and drives the consent banner. Every host capability is injected:
//!
//! - [`store::StorageBackend`]: client-scoped key-value storage
//! - [`policy::CookieJar`]: the document's cookies
//! - [`policy::ScriptLoader`]: analytics queue and script injection
//! - [`presenter::BannerView`]: the banner's DOM subtree
//! - [`presenter::Scheduler`]: timers
//!
//! [`host`] provides in-memory implementations of all five.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use falconhurst_consent::config::ConsentConfig;
//! use falconhurst_consent::host::{ManualScheduler, MemoryDocument};
//! use falconhurst_consent::manager::{ConsentManager, Host, ReadyState};
//!
//! let doc = MemoryDocument::new("falconhurst.example");
//! let host = Host {
//!     storage: Arc::new(doc.clone()),
//!     cookies: Arc::new(doc.clone()),
//!     scripts: Arc::new(doc.clone()),
//!     view: Arc::new(doc.clone()),
//!     scheduler: Arc::new(ManualScheduler::new()),
//! };
//!
//! let mut manager = ConsentManager::from_config(&ConsentConfig::default(), host);
//! manager.start(ReadyState::Complete);
//! manager.handle_click("ccReject")?;
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod logging;
pub mod manager;
pub mod policy;
pub mod presenter;
pub mod record;
pub mod store;

pub use config::ConsentConfig;
pub use error::{Error, Result};
pub use manager::{ConsentManager, Host, ReadyState, Startup};
pub use policy::{ConsentPolicy, PolicyEffect};
pub use presenter::{BannerAction, BannerPresenter, BannerState};
pub use record::{ConsentRecord, Preferences};
pub use store::ConsentStore;
