//! Consent policy: turns a consent record into side effects.
//!
//! - `analytics == true`: load the analytics tag, at most once per page
//! - `analytics == false`: purge analytics cookies (a no-op when there are none)
//! - `functional`: no effect yet
//!
//! Applying the same record twice leaves the page in the same state as
//! applying it once.

mod analytics;
mod cookies;
mod loader;


pub use analytics::{AnalyticsCommand, AnalyticsTag, ScriptTag};
pub use cookies::{CookieJar, CookieMatcher, cookie_names, expiry_assignments, purge};
pub use loader::ScriptLoader;

use crate::config::AnalyticsConfig;
use crate::record::ConsentRecord;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What one `apply` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyEffect {
    /// The analytics tag was injected by this call.
    AnalyticsLoaded,
    /// The analytics tag was already injected earlier in this page's lifetime.
    AnalyticsAlreadyLoaded,
    /// Injection failed; the next grant will retry.
    AnalyticsUnavailable,
    /// Analytics is refused; `count` cookies were expired.
    CookiesPurged { count: usize },
}

/// Applies consent records to the page.
///
/// Owns the "analytics loaded" flag for the lifetime of one page. Create one
/// policy per page load.
pub struct ConsentPolicy {
    cookies: Arc<dyn CookieJar>,
    scripts: Arc<dyn ScriptLoader>,
    tag: AnalyticsTag,
    matcher: CookieMatcher,
    bootstrapped: bool,
    analytics_loaded: bool,
}

impl ConsentPolicy {
    pub fn new(
        config: &AnalyticsConfig,
        cookies: Arc<dyn CookieJar>,
        scripts: Arc<dyn ScriptLoader>,
    ) -> Self {
        Self {
            cookies,
            scripts,
            tag: AnalyticsTag::from_config(config),
            matcher: CookieMatcher::from_config(config),
            bootstrapped: false,
            analytics_loaded: false,
        }
    }

    /// True once the analytics tag has been injected on this page.
    pub fn analytics_loaded(&self) -> bool {
        self.analytics_loaded
    }

    pub fn tag(&self) -> &AnalyticsTag {
        &self.tag
    }

    /// Applies `record` to the page.
    pub fn apply(&mut self, record: &ConsentRecord) -> PolicyEffect {
        if record.analytics() {
            self.load_analytics()
        } else {
            let count = purge(self.cookies.as_ref(), &self.matcher);
            debug!(count, "analytics refused, cookies purged");
            PolicyEffect::CookiesPurged { count }
        }
    }

    fn load_analytics(&mut self) -> PolicyEffect {
        if self.analytics_loaded {
            return PolicyEffect::AnalyticsAlreadyLoaded;
        }

        // The queue is bootstrapped once per page, even if injection is retried
        if !self.bootstrapped {
            self.scripts.install_queue();
            for command in self.tag.bootstrap_commands(Utc::now()) {
                self.scripts.dispatch(&command);
            }
            self.bootstrapped = true;
        }

        let script = self.tag.script();
        match self.scripts.inject(&script) {
            Ok(()) => {
                self.analytics_loaded = true;
                info!(
                    measurement_id = %self.tag.measurement_id(),
                    src = %script.src,
                    "analytics tag loaded"
                );
                PolicyEffect::AnalyticsLoaded
            },
            Err(e) => {
                warn!(src = %script.src, error = %e, "analytics tag not loaded");
                PolicyEffect::AnalyticsUnavailable
            },
        }
    }
}
