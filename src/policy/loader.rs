//! Script loader capability.

use super::analytics::{AnalyticsCommand, ScriptTag};
use crate::error::Result;

/// Page-global side effects the analytics tag needs.
///
/// A browser host maps these onto `window.dataLayer`, `window.gtag` and a
/// `<script>` appended to `<head>`. The policy decides whether and when to
/// call them; it never inspects the page to find out what already happened.
pub trait ScriptLoader {
    /// Ensures the command queue and the dispatch function exist.
    ///
    /// Must keep an existing queue and its entries.
    fn install_queue(&self);

    /// Calls the dispatch function with `command`.
    fn dispatch(&self, command: &AnalyticsCommand);

    /// Inserts the script element.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::ScriptInjection`] if the element could
    /// not be inserted, for example when the document has no `<head>`.
    fn inject(&self, script: &ScriptTag) -> Result<()>;
}
