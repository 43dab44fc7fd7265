//! Banner presenter: the consent banner's UI state machine.
//!
//! ## States
//!
//! - **Hidden**: initial; the banner may be mounted but is not revealed yet
//! - **VisibleSimple**: summary panel (accept all / reject all / customise)
//! - **VisibleDetail**: per-category toggles
//! - **Dismissed**: terminal; a choice was saved and the banner is leaving
//!
//! The presenter only drives the view. Persisting the choice and applying
//! the policy is [`crate::manager::ConsentManager`]'s job, and it does both
//! before asking the presenter to hide.

mod action;
mod markup;
mod scheduler;
mod view;

pub use action::BannerAction;
pub use markup::render_banner;
pub use scheduler::{Scheduler, TimerTask};
pub use view::{BannerView, Panel, ids};

use crate::config::BannerConfig;
use crate::error::Result;
use crate::record::Preferences;
use std::sync::Arc;
use tracing::{debug, trace};

/// Banner UI state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BannerState {
    #[default]
    Hidden,
    VisibleSimple,
    VisibleDetail,
    Dismissed,
}

impl BannerState {
    pub fn is_visible(self) -> bool {
        matches!(self, Self::VisibleSimple | Self::VisibleDetail)
    }
}

/// Owns the banner's DOM subtree through a [`BannerView`].
pub struct BannerPresenter {
    view: Arc<dyn BannerView>,
    scheduler: Arc<dyn Scheduler>,
    config: BannerConfig,
    state: BannerState,
    mounted: bool,
}

impl BannerPresenter {
    pub fn new(
        config: BannerConfig,
        view: Arc<dyn BannerView>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            view,
            scheduler,
            config,
            state: BannerState::Hidden,
            mounted: false,
        }
    }

    pub fn state(&self) -> BannerState {
        self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// True while the banner can still record a choice: mounted and not dismissed.
    pub fn accepts_choice(&self) -> bool {
        self.mounted && self.state != BannerState::Dismissed
    }

    /// Injects the banner markup. Does nothing if already mounted.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        let markup = render_banner(&self.config);
        if tolerate("mount", self.view.mount(&markup)) {
            self.mounted = true;
            debug!("consent banner mounted");
        }
    }

    /// Mounts the banner and schedules its reveal after the display delay.
    pub fn prompt(&mut self) {
        self.mount();
        if self.mounted {
            self.scheduler
                .schedule(TimerTask::Reveal, self.config.show_delay());
        }
    }

    /// Hidden -> VisibleSimple.
    pub fn show(&mut self) {
        if !self.mounted || self.state != BannerState::Hidden {
            trace!(state = ?self.state, "show ignored");
            return;
        }
        tolerate("display banner", self.view.set_displayed(true));
        tolerate("show simple panel", self.view.show_panel(Panel::Simple));
        tolerate("reveal banner", self.view.set_revealed(true));
        self.state = BannerState::VisibleSimple;
        debug!("consent banner shown");
    }

    /// VisibleSimple -> VisibleDetail. Returns whether the transition happened.
    pub fn show_detail(&mut self) -> bool {
        if self.state != BannerState::VisibleSimple {
            return false;
        }
        tolerate("show detail panel", self.view.show_panel(Panel::Detail));
        self.state = BannerState::VisibleDetail;
        true
    }

    /// VisibleDetail -> VisibleSimple, discarding unsaved toggles.
    /// Returns whether the transition happened.
    pub fn show_simple(&mut self) -> bool {
        if self.state != BannerState::VisibleDetail {
            return false;
        }
        for id in [ids::FUNCTIONAL, ids::ANALYTICS] {
            tolerate("reset toggle", self.view.set_checked(id, false));
        }
        tolerate("show simple panel", self.view.show_panel(Panel::Simple));
        self.state = BannerState::VisibleSimple;
        true
    }

    /// Reads the detail toggles. A missing checkbox reads as unchecked.
    pub fn read_preferences(&self) -> Preferences {
        let checked = |id: &str| match self.view.is_checked(id) {
            Ok(checked) => checked,
            Err(e) => {
                debug!(error = %e, "treating missing toggle as unchecked");
                false
            },
        };
        Preferences::new(checked(ids::FUNCTIONAL), checked(ids::ANALYTICS))
    }

    /// Starts the exit transition and schedules removal from layout.
    /// Any state -> Dismissed.
    pub fn hide(&mut self) {
        if self.state == BannerState::Dismissed {
            return;
        }
        self.state = BannerState::Dismissed;
        if !self.mounted {
            return;
        }
        tolerate("start exit transition", self.view.set_revealed(false));
        self.scheduler
            .schedule(TimerTask::Collapse, self.config.hide_delay());
        debug!("consent banner dismissed");
    }

    /// Runs a timer task the host scheduled earlier.
    pub fn on_timer(&mut self, task: TimerTask) {
        match task {
            TimerTask::Reveal => self.show(),
            TimerTask::Collapse => {
                if self.mounted && self.state == BannerState::Dismissed {
                    tolerate("collapse banner", self.view.set_displayed(false));
                }
            },
        }
    }

    /// Removes the banner subtree from the document.
    pub fn destroy(&mut self) {
        if self.mounted {
            tolerate("remove banner", self.view.remove());
            self.mounted = false;
        }
        self.state = BannerState::Dismissed;
    }
}

/// Swallows a view error, logging it. Returns whether the operation succeeded.
fn tolerate(op: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!(op, error = %e, "skipping banner view operation");
            false
        },
    }
}
