//! Cold-load orchestration and the hooks a front end wires its buttons to.
//!
//! On start the manager reads the store. A stored record is applied
//! silently and the banner is never rendered; otherwise the banner is
//! mounted and revealed after its display delay. Every choice runs the same
//! sequence, which completes inside the one event handler that triggered it:
//!
//! 1. write the record through the store
//! 2. apply it through the policy
//! 3. hide the banner
//!
//! Side effects are committed before the UI confirms dismissal.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ConsentConfig;
use crate::error::Error;
use crate::policy::{ConsentPolicy, CookieJar, PolicyEffect, ScriptLoader};
use crate::presenter::{BannerAction, BannerPresenter, BannerState, BannerView, Scheduler, TimerTask};
use crate::record::{ConsentRecord, Preferences};
use crate::store::{ConsentStore, StorageBackend};

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl FromStr for ReadyState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loading" => Ok(Self::Loading),
            "interactive" => Ok(Self::Interactive),
            "complete" => Ok(Self::Complete),
            other => Err(Error::Config(format!("unknown document ready state '{other}'"))),
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loading => "loading",
            Self::Interactive => "interactive",
            Self::Complete => "complete",
        })
    }
}

/// Outcome of starting the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Startup {
    /// The document is still loading; call
    /// [`ConsentManager::on_dom_content_loaded`] when it finishes.
    Deferred,
    /// A stored record was found and applied. No banner.
    Applied(ConsentRecord),
    /// No usable record; the banner was mounted and its reveal scheduled.
    Prompted,
}

/// Host capabilities the consent core runs on.
///
/// In a browser, `storage` wraps `localStorage`, `cookies` and `scripts`
/// wrap `document`/`window`, `view` wraps the banner subtree, and
/// `scheduler` wraps `setTimeout`.
#[derive(Clone)]
pub struct Host {
    pub storage: Arc<dyn StorageBackend>,
    pub cookies: Arc<dyn CookieJar>,
    pub scripts: Arc<dyn ScriptLoader>,
    pub view: Arc<dyn BannerView>,
    pub scheduler: Arc<dyn Scheduler>,
}

/// Wires store, policy and presenter together for one page.
pub struct ConsentManager {
    store: ConsentStore,
    policy: ConsentPolicy,
    presenter: BannerPresenter,
    started: bool,
    initialized: bool,
}

impl ConsentManager {
    pub fn new(store: ConsentStore, policy: ConsentPolicy, presenter: BannerPresenter) -> Self {
        Self {
            store,
            policy,
            presenter,
            started: false,
            initialized: false,
        }
    }

    /// Builds a manager from configuration and host capabilities.
    pub fn from_config(config: &ConsentConfig, host: Host) -> Self {
        let store = ConsentStore::from_shared(host.storage).with_key(&config.storage_key);
        let policy = ConsentPolicy::new(&config.analytics, host.cookies, host.scripts);
        let presenter = BannerPresenter::new(config.banner.clone(), host.view, host.scheduler);
        Self::new(store, policy, presenter)
    }

    pub fn store(&self) -> &ConsentStore {
        &self.store
    }

    pub fn policy(&self) -> &ConsentPolicy {
        &self.policy
    }

    pub fn banner_state(&self) -> BannerState {
        self.presenter.state()
    }

    pub fn is_banner_mounted(&self) -> bool {
        self.presenter.is_mounted()
    }

    /// Starts consent handling for a page in `ready` state.
    ///
    /// Runs initialization at most once per manager; later calls return
    /// `None`.
    pub fn start(&mut self, ready: ReadyState) -> Option<Startup> {
        if self.started {
            return None;
        }
        self.started = true;

        if ready == ReadyState::Loading {
            debug!("document still loading, deferring consent initialization");
            return Some(Startup::Deferred);
        }
        self.initialize()
    }

    /// Finishes a deferred start. Returns `None` if initialization already
    /// ran or the manager was never started.
    pub fn on_dom_content_loaded(&mut self) -> Option<Startup> {
        if !self.started {
            return None;
        }
        self.initialize()
    }

    fn initialize(&mut self) -> Option<Startup> {
        if self.initialized {
            return None;
        }
        self.initialized = true;

        match self.store.read() {
            Some(record) => {
                let effect = self.policy.apply(&record);
                info!(
                    functional = record.functional(),
                    analytics = record.analytics(),
                    ?effect,
                    "stored consent applied"
                );
                Some(Startup::Applied(record))
            },
            None => {
                self.presenter.prompt();
                info!("no stored consent, prompting");
                Some(Startup::Prompted)
            },
        }
    }

    /// "Accept All": every optional category granted.
    pub fn on_accept_all(&mut self) -> Option<ConsentRecord> {
        self.commit(Preferences::accept_all())
    }

    /// "Reject All" from either panel: every optional category refused.
    pub fn on_reject_all(&mut self) -> Option<ConsentRecord> {
        self.commit(Preferences::reject_all())
    }

    /// "Save Preferences" with explicit toggle values.
    pub fn on_save(&mut self, functional: bool, analytics: bool) -> Option<ConsentRecord> {
        self.commit(Preferences::new(functional, analytics))
    }

    /// "Save Preferences" with the toggle values read from the banner.
    pub fn on_save_from_view(&mut self) -> Option<ConsentRecord> {
        let prefs = self.presenter.read_preferences();
        self.commit(prefs)
    }

    /// "Customise": summary -> detail. No persistence.
    pub fn on_customize(&mut self) -> bool {
        self.presenter.show_detail()
    }

    /// "Close" in the detail panel: detail -> summary, unsaved toggles dropped.
    pub fn on_close_detail(&mut self) -> bool {
        self.presenter.show_simple()
    }

    /// Routes a banner button click.
    pub fn handle_action(&mut self, action: BannerAction) {
        debug!(%action, "banner action");
        match action {
            BannerAction::AcceptAll => {
                self.on_accept_all();
            },
            BannerAction::RejectAll => {
                self.on_reject_all();
            },
            BannerAction::Customize => {
                self.on_customize();
            },
            BannerAction::CloseDetail => {
                self.on_close_detail();
            },
            BannerAction::SavePreferences => {
                self.on_save_from_view();
            },
        }
    }

    /// Routes a click on the element with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElement`] if `id` is not a banner button.
    pub fn handle_click(&mut self, id: &str) -> crate::error::Result<()> {
        let action = id.parse::<BannerAction>()?;
        self.handle_action(action);
        Ok(())
    }

    /// Runs a timer task the host scheduled earlier.
    pub fn on_timer(&mut self, task: TimerTask) {
        self.presenter.on_timer(task);
    }

    /// Write, apply, hide. Ignored once the banner is dismissed or if it was
    /// never rendered.
    fn commit(&mut self, prefs: Preferences) -> Option<ConsentRecord> {
        if !self.presenter.accepts_choice() {
            debug!(state = ?self.presenter.state(), "no banner to take a choice, ignoring");
            return None;
        }

        let record = ConsentRecord::now(prefs);
        self.store.write(&record);
        let effect = self.policy.apply(&record);
        self.presenter.hide();

        info!(
            functional = record.functional(),
            analytics = record.analytics(),
            ?effect,
            "consent recorded"
        );
        Some(record)
    }

    /// Applies `record` again without touching storage or the banner.
    ///
    /// For hosts that swap page content client-side and need analytics
    /// cookies purged again.
    pub fn reapply(&mut self, record: &ConsentRecord) -> PolicyEffect {
        self.policy.apply(record)
    }
}
