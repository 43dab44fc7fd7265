//! Cookie jar access and analytics cookie purging.
//!
//! A cookie set on a parent domain cannot be deleted from a subdomain by a
//! host-scoped expiry, so every matching cookie gets two expiry writes: one
//! with `domain=<host>` and one with `domain=.<host>`.

use crate::config::AnalyticsConfig;
use crate::constants::EXPIRED_COOKIE_DATE;
use tracing::debug;

/// The document's cookie jar, seen the way page script sees it.
pub trait CookieJar {
    /// All cookies visible to the document, as a `name=value; name=value` string.
    fn cookie_header(&self) -> String;

    /// Applies one cookie assignment (`name=value;attr=...`), as writing
    /// `document.cookie` does.
    fn set_cookie(&self, assignment: &str);

    /// Host name of the current page.
    fn hostname(&self) -> String;
}

/// Iterates the cookie names in a `name=value; name=value` string.
///
/// Names are trimmed; empty segments are skipped.
pub fn cookie_names(header: &str) -> impl Iterator<Item = &str> {
    header
        .split(';')
        .map(|pair| pair.split('=').next().unwrap_or_default().trim())
        .filter(|name| !name.is_empty())
}

/// Decides which cookie names belong to the analytics client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieMatcher {
    prefixes: Vec<String>,
    names: Vec<String>,
}

impl CookieMatcher {
    pub fn new(prefixes: Vec<String>, names: Vec<String>) -> Self {
        let keep = |v: Vec<String>| v.into_iter().filter(|s| !s.is_empty()).collect();
        Self {
            prefixes: keep(prefixes),
            names: keep(names),
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.cookie_prefixes.clone(), config.cookie_names.clone())
    }

    /// True if `name` starts with a known prefix or equals a known name.
    pub fn matches(&self, name: &str) -> bool {
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
            || self.names.iter().any(|n| n == name)
    }
}

/// The two assignments that expire `name` for `host`: host-scoped, then
/// parent-domain-scoped.
pub fn expiry_assignments(name: &str, host: &str) -> [String; 2] {
    [
        format!("{name}=;expires={EXPIRED_COOKIE_DATE};path=/;domain={host}"),
        format!("{name}=;expires={EXPIRED_COOKIE_DATE};path=/;domain=.{host}"),
    ]
}

/// Expires every cookie in `jar` that `matcher` claims.
///
/// Returns the number of cookie names purged. Nothing is written when no
/// cookie matches.
pub fn purge(jar: &dyn CookieJar, matcher: &CookieMatcher) -> usize {
    let header = jar.cookie_header();
    let host = jar.hostname();
    let mut purged = 0;

    for name in cookie_names(&header).filter(|name| matcher.matches(name)) {
        for assignment in expiry_assignments(name, &host) {
            jar.set_cookie(&assignment);
        }
        debug!(cookie = name, host = %host, "expired analytics cookie");
        purged += 1;
    }

    purged
}
