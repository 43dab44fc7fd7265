//! Fixed values shared across the consent core.
//!
//! Everything here is a default; [`crate::config::ConsentConfig`] can override
//! the values a deployment is likely to change.

/// Key of the single persisted consent entry.
pub const STORAGE_KEY: &str = "fh_cookie_consent";

/// Schema version written into every record.
pub const RECORD_VERSION: u32 = 1;

/// Analytics account the loader is configured for.
pub const ANALYTICS_MEASUREMENT_ID: &str = "G-WXFB5L04Y8";

/// Base URL of the analytics loader script. The measurement id is appended as `?id=`.
pub const ANALYTICS_LOADER_BASE: &str = "https://www.googletagmanager.com/gtag/js";

/// Cookie name prefixes owned by the analytics client.
pub const ANALYTICS_COOKIE_PREFIXES: &[&str] = &["_ga"];

/// Exact cookie names owned by the analytics client.
pub const ANALYTICS_COOKIE_NAMES: &[&str] = &["_gid", "_gat"];

/// Expiry date used to delete a cookie.
pub const EXPIRED_COOKIE_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Delay between injecting the banner and revealing it (milliseconds).
pub const BANNER_SHOW_DELAY_MS: u64 = 800;

/// Delay between the exit transition and removing the banner from layout (milliseconds).
pub const BANNER_HIDE_DELAY_MS: u64 = 400;

/// Link target for the cookie policy page.
pub const COOKIE_POLICY_URL: &str = "cookies.html";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";
