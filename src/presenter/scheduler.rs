//! Timer capability for the banner's delayed transitions.

use std::time::Duration;

/// Deferred work the presenter asks the host to run later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTask {
    /// Reveal the freshly mounted banner.
    Reveal,
    /// Take the dismissed banner out of layout after its exit transition.
    Collapse,
}

/// Host timer (`setTimeout` in a browser).
///
/// When `delay` has elapsed the host hands `task` back through
/// [`crate::manager::ConsentManager::on_timer`]. Tasks are never cancelled;
/// the presenter ignores ones that no longer apply.
pub trait Scheduler {
    fn schedule(&self, task: TimerTask, delay: Duration);
}
