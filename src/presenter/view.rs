//! The banner's DOM contract.

use crate::error::Result;

/// Element ids the banner markup defines and the view looks up.
pub mod ids {
    pub const CONTAINER: &str = "cookieConsent";
    pub const SIMPLE_PANEL: &str = "ccSimple";
    pub const DETAIL_PANEL: &str = "ccDetail";
    pub const CUSTOMISE: &str = "ccCustomise";
    pub const REJECT: &str = "ccReject";
    pub const ACCEPT: &str = "ccAccept";
    pub const CLOSE: &str = "ccClose";
    pub const REJECT_DETAIL: &str = "ccRejectDetail";
    pub const SAVE: &str = "ccSave";
    pub const FUNCTIONAL: &str = "ccFunctional";
    pub const ANALYTICS: &str = "ccAnalytics";

    /// Every id in the banner markup, container first.
    pub const ALL: &[&str] = &[
        CONTAINER,
        SIMPLE_PANEL,
        DETAIL_PANEL,
        CUSTOMISE,
        REJECT,
        ACCEPT,
        CLOSE,
        REJECT_DETAIL,
        SAVE,
        FUNCTIONAL,
        ANALYTICS,
    ];
}

/// Which of the two banner panels is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// Summary text with accept / reject / customise.
    Simple,
    /// Per-category toggles.
    Detail,
}

/// DOM operations the presenter needs from its host.
///
/// Every operation reports [`crate::error::Error::DomElementMissing`] when
/// the element it touches does not exist. The presenter treats that as a
/// no-op.
pub trait BannerView {
    /// Appends the banner markup to the document body.
    fn mount(&self, markup: &str) -> Result<()>;

    /// Adds (`true`) or removes (`false`) the visible class that drives the
    /// entry and exit transitions.
    fn set_revealed(&self, revealed: bool) -> Result<()>;

    /// Puts the container into layout (`true`) or takes it out with
    /// `display: none` (`false`).
    fn set_displayed(&self, displayed: bool) -> Result<()>;

    /// Displays `panel` and hides the other one.
    fn show_panel(&self, panel: Panel) -> Result<()>;

    /// Reads a checkbox.
    fn is_checked(&self, id: &str) -> Result<bool>;

    /// Sets a checkbox.
    fn set_checked(&self, id: &str, checked: bool) -> Result<()>;

    /// Removes the banner subtree from the document.
    fn remove(&self) -> Result<()>;
}
