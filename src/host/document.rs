//! In-memory document.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::bail;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::policy::{AnalyticsCommand, CookieJar, ScriptLoader, ScriptTag};
use crate::presenter::{BannerView, Panel, ids};
use crate::store::StorageBackend;

/// One observable side effect, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    StorageWritten { key: String },
    CookieWritten { assignment: String },
    QueueInstalled,
    CommandDispatched { args: String },
    ScriptInjected { src: String },
    BannerMounted,
    BannerRevealed { revealed: bool },
    BannerDisplayed { displayed: bool },
    PanelShown { panel: Panel },
    BannerRemoved,
}

/// Observable state of the mounted banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerSnapshot {
    /// The visible class is present.
    pub revealed: bool,
    /// The container is in layout (not `display: none`).
    pub displayed: bool,
    pub panel: Panel,
    pub markup: String,
}

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    /// `None` for host-only cookies.
    domain: Option<String>,
}

#[derive(Debug)]
struct BannerElement {
    snapshot: BannerSnapshot,
    present: HashSet<&'static str>,
    checked: HashMap<&'static str, bool>,
}

impl BannerElement {
    fn require(&self, id: &str) -> Result<&'static str> {
        self.present
            .get(id)
            .copied()
            .ok_or_else(|| Error::dom_element_missing(id))
    }
}

#[derive(Debug)]
struct DocumentState {
    hostname: String,
    has_body: bool,
    has_head: bool,
    storage_available: bool,
    local_storage: HashMap<String, String>,
    cookies: Vec<StoredCookie>,
    cookie_writes: Vec<String>,
    data_layer: Option<Vec<Value>>,
    dispatch_installed: bool,
    scripts: Vec<ScriptTag>,
    banner: Option<BannerElement>,
    events: Vec<DocumentEvent>,
}

impl DocumentState {
    fn banner(&mut self) -> Result<&mut BannerElement> {
        self.banner
            .as_mut()
            .ok_or_else(|| Error::dom_element_missing(ids::CONTAINER))
    }
}

/// A page held in memory.
///
/// `Clone` shares the page, so the same document can be handed to the store,
/// the policy and the presenter while a test keeps a handle to inspect it.
#[derive(Clone)]
pub struct MemoryDocument {
    state: Arc<Mutex<DocumentState>>,
}

impl MemoryDocument {
    /// Creates an empty, fully loaded page served from `hostname`.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(DocumentState {
                hostname: hostname.into(),
                has_body: true,
                has_head: true,
                storage_available: true,
                local_storage: HashMap::new(),
                cookies: Vec::new(),
                cookie_writes: Vec::new(),
                data_layer: None,
                dispatch_installed: false,
                scripts: Vec::new(),
                banner: None,
                events: Vec::new(),
            })),
        }
    }

    /// Opens a new page on the same origin: storage and cookies carry over,
    /// everything else starts fresh.
    pub fn reload(&self) -> Self {
        let state = self.state.lock();
        let doc = Self::new(state.hostname.clone());
        {
            let mut fresh = doc.state.lock();
            fresh.storage_available = state.storage_available;
            fresh.local_storage = state.local_storage.clone();
            fresh.cookies = state.cookies.clone();
        }
        doc
    }

    /// Sets a cookie directly, as a third-party script would.
    pub fn add_cookie(&self, name: &str, value: &str, domain: Option<&str>) {
        let mut state = self.state.lock();
        upsert_cookie(&mut state.cookies, name, value, domain.map(str::to_string));
    }

    /// Names of the live cookies, in creation order.
    pub fn cookie_names(&self) -> Vec<String> {
        self.state
            .lock()
            .cookies
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn cookie_value(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.clone())
    }

    /// Every assignment written through [`CookieJar::set_cookie`].
    pub fn cookie_writes(&self) -> Vec<String> {
        self.state.lock().cookie_writes.clone()
    }

    /// Raw `localStorage` item.
    pub fn local_storage(&self, key: &str) -> Option<String> {
        self.state.lock().local_storage.get(key).cloned()
    }

    /// Writes a raw `localStorage` item without recording an event.
    pub fn set_local_storage(&self, key: &str, value: &str) {
        self.state
            .lock()
            .local_storage
            .insert(key.to_string(), value.to_string());
    }

    /// Disables (`false`) or re-enables storage, like a privacy mode.
    pub fn set_storage_available(&self, available: bool) {
        self.state.lock().storage_available = available;
    }

    /// The analytics command queue, if it was installed.
    pub fn data_layer(&self) -> Option<Vec<Value>> {
        self.state.lock().data_layer.clone()
    }

    pub fn dispatch_installed(&self) -> bool {
        self.state.lock().dispatch_installed
    }

    /// Number of script elements whose `src` equals `src`.
    pub fn scripts_with_src(&self, src: &str) -> usize {
        self.state
            .lock()
            .scripts
            .iter()
            .filter(|s| s.src == src)
            .count()
    }

    pub fn scripts(&self) -> Vec<ScriptTag> {
        self.state.lock().scripts.clone()
    }

    /// The mounted banner, if any.
    pub fn banner(&self) -> Option<BannerSnapshot> {
        self.state
            .lock()
            .banner
            .as_ref()
            .map(|b| b.snapshot.clone())
    }

    /// Ticks or unticks a banner checkbox, as the user would.
    /// Does nothing if the checkbox is not on the page.
    pub fn check(&self, id: &str, checked: bool) {
        let mut state = self.state.lock();
        if let Some(banner) = state.banner.as_mut()
            && let Ok(id) = banner.require(id)
        {
            banner.checked.insert(id, checked);
        }
    }

    /// Deletes one element of the mounted banner.
    pub fn remove_element(&self, id: &str) {
        if let Some(banner) = self.state.lock().banner.as_mut() {
            banner.present.remove(id);
        }
    }

    /// Simulates a page without `<body>`.
    pub fn remove_body(&self) {
        self.state.lock().has_body = false;
    }

    /// Simulates a page without `<head>`.
    pub fn remove_head(&self) {
        self.state.lock().has_head = false;
    }

    pub fn restore_head(&self) {
        self.state.lock().has_head = true;
    }

    /// Side effects so far, oldest first.
    pub fn events(&self) -> Vec<DocumentEvent> {
        self.state.lock().events.clone()
    }
}

fn upsert_cookie(cookies: &mut Vec<StoredCookie>, name: &str, value: &str, domain: Option<String>) {
    match cookies
        .iter_mut()
        .find(|c| c.name == name && c.domain == domain)
    {
        Some(existing) => existing.value = value.to_string(),
        None => cookies.push(StoredCookie {
            name: name.to_string(),
            value: value.to_string(),
            domain,
        }),
    }
}

/// Parsed `name=value;attr=value` assignment.
struct Assignment<'a> {
    name: &'a str,
    value: &'a str,
    domain: Option<&'a str>,
    expired: bool,
}

fn parse_assignment(assignment: &str) -> Option<Assignment<'_>> {
    let mut parts = assignment.split(';');
    let pair = parts.next()?;
    let (name, value) = match pair.split_once('=') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => ("", pair.trim()),
    };

    let mut domain = None;
    let mut expired = false;
    for attr in parts {
        let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
        let val = val.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "domain" => domain = Some(val),
            "expires" => {
                expired = DateTime::parse_from_rfc2822(val)
                    .is_ok_and(|at| at.with_timezone(&Utc) <= Utc::now());
            },
            "max-age" => expired = val.parse::<i64>().is_ok_and(|secs| secs <= 0),
            _ => {},
        }
    }

    Some(Assignment {
        name,
        value,
        domain,
        expired,
    })
}

impl CookieJar for MemoryDocument {
    fn cookie_header(&self) -> String {
        self.state
            .lock()
            .cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie(&self, assignment: &str) {
        let mut state = self.state.lock();
        state.cookie_writes.push(assignment.to_string());
        state.events.push(DocumentEvent::CookieWritten {
            assignment: assignment.to_string(),
        });

        let Some(parsed) = parse_assignment(assignment) else {
            return;
        };

        if parsed.expired {
            // A domain attribute only reaches cookies stored under that exact
            // scope; host-only cookies are reached through the bare host name.
            let hostname = state.hostname.clone();
            state.cookies.retain(|c| {
                if c.name != parsed.name {
                    return true;
                }
                let reached = match (parsed.domain, c.domain.as_deref()) {
                    (None, None) => true,
                    (Some(target), None) => target == hostname,
                    (Some(target), Some(scope)) => target == scope,
                    (None, Some(_)) => false,
                };
                !reached
            });
        } else {
            upsert_cookie(
                &mut state.cookies,
                parsed.name,
                parsed.value,
                parsed.domain.map(str::to_string),
            );
        }
    }

    fn hostname(&self) -> String {
        self.state.lock().hostname.clone()
    }
}

impl ScriptLoader for MemoryDocument {
    fn install_queue(&self) {
        let mut state = self.state.lock();
        state.data_layer.get_or_insert_with(Vec::new);
        state.dispatch_installed = true;
        state.events.push(DocumentEvent::QueueInstalled);
    }

    fn dispatch(&self, command: &AnalyticsCommand) {
        let mut state = self.state.lock();
        let args = command.to_args();
        state.events.push(DocumentEvent::CommandDispatched {
            args: args.to_string(),
        });
        state.data_layer.get_or_insert_with(Vec::new).push(args);
    }

    fn inject(&self, script: &ScriptTag) -> Result<()> {
        let mut state = self.state.lock();
        if !state.has_head {
            return Err(Error::script_injection(&script.src, "document has no <head>"));
        }
        state.scripts.push(script.clone());
        state.events.push(DocumentEvent::ScriptInjected {
            src: script.src.clone(),
        });
        Ok(())
    }
}

impl StorageBackend for MemoryDocument {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let state = self.state.lock();
        if !state.storage_available {
            bail!("localStorage is not available");
        }
        Ok(state.local_storage.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock();
        if !state.storage_available {
            bail!("localStorage is not available");
        }
        state
            .local_storage
            .insert(key.to_string(), value.to_string());
        state.events.push(DocumentEvent::StorageWritten {
            key: key.to_string(),
        });
        Ok(())
    }
}

impl BannerView for MemoryDocument {
    fn mount(&self, markup: &str) -> Result<()> {
        let mut state = self.state.lock();
        if !state.has_body {
            return Err(Error::dom_element_missing("body"));
        }

        let present: HashSet<&'static str> = ids::ALL
            .iter()
            .copied()
            .filter(|id| markup.contains(&format!(r#"id="{id}""#)))
            .collect();
        if !present.contains(ids::CONTAINER) {
            return Err(Error::dom_element_missing(ids::CONTAINER));
        }

        state.banner = Some(BannerElement {
            snapshot: BannerSnapshot {
                revealed: false,
                displayed: true,
                panel: Panel::Simple,
                markup: markup.to_string(),
            },
            present,
            checked: HashMap::new(),
        });
        state.events.push(DocumentEvent::BannerMounted);
        Ok(())
    }

    fn set_revealed(&self, revealed: bool) -> Result<()> {
        let mut state = self.state.lock();
        state.banner()?.snapshot.revealed = revealed;
        state.events.push(DocumentEvent::BannerRevealed { revealed });
        Ok(())
    }

    fn set_displayed(&self, displayed: bool) -> Result<()> {
        let mut state = self.state.lock();
        state.banner()?.snapshot.displayed = displayed;
        state.events.push(DocumentEvent::BannerDisplayed { displayed });
        Ok(())
    }

    fn show_panel(&self, panel: Panel) -> Result<()> {
        let mut state = self.state.lock();
        let banner = state.banner()?;
        let id = match panel {
            Panel::Simple => ids::SIMPLE_PANEL,
            Panel::Detail => ids::DETAIL_PANEL,
        };
        banner.require(id)?;
        banner.snapshot.panel = panel;
        state.events.push(DocumentEvent::PanelShown { panel });
        Ok(())
    }

    fn is_checked(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock();
        let banner = state.banner()?;
        let id = banner.require(id)?;
        Ok(banner.checked.get(id).copied().unwrap_or(false))
    }

    fn set_checked(&self, id: &str, checked: bool) -> Result<()> {
        let mut state = self.state.lock();
        let banner = state.banner()?;
        let id = banner.require(id)?;
        banner.checked.insert(id, checked);
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.banner.take().is_none() {
            return Err(Error::dom_element_missing(ids::CONTAINER));
        }
        state.events.push(DocumentEvent::BannerRemoved);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_format() {
        let doc = MemoryDocument::new("example.com");
        doc.add_cookie("_ga", "1", None);
        doc.add_cookie("other", "4", None);
        assert_eq!(doc.cookie_header(), "_ga=1; other=4");
    }

    #[test]
    fn test_set_cookie_creates_and_updates() {
        let doc = MemoryDocument::new("example.com");
        doc.set_cookie("theme=dark;path=/");
        doc.set_cookie("theme=light;path=/");
        assert_eq!(doc.cookie_names(), vec!["theme"]);
        assert_eq!(doc.cookie_value("theme").as_deref(), Some("light"));
    }

    #[test]
    fn test_expiry_only_reaches_matching_scope() {
        let doc = MemoryDocument::new("example.com");
        doc.add_cookie("_ga", "1", Some(".example.com"));

        doc.set_cookie("_ga=;expires=Thu, 01 Jan 1970 00:00:00 GMT;path=/;domain=example.com");
        assert_eq!(doc.cookie_names(), vec!["_ga"]);

        doc.set_cookie("_ga=;expires=Thu, 01 Jan 1970 00:00:00 GMT;path=/;domain=.example.com");
        assert!(doc.cookie_names().is_empty());
    }

    #[test]
    fn test_future_expiry_keeps_cookie() {
        let doc = MemoryDocument::new("example.com");
        doc.set_cookie("keep=1;expires=Fri, 01 Jan 2100 00:00:00 GMT");
        assert_eq!(doc.cookie_value("keep").as_deref(), Some("1"));
    }

    #[test]
    fn test_storage_can_be_disabled() {
        let doc = MemoryDocument::new("example.com");
        doc.set_storage_available(false);
        assert!(StorageBackend::get(&doc, "k").is_err());
        assert!(StorageBackend::set(&doc, "k", "v").is_err());
        assert!(doc.local_storage("k").is_none());
    }

    #[test]
    fn test_reload_keeps_origin_state_only() {
        let doc = MemoryDocument::new("example.com");
        StorageBackend::set(&doc, "k", "v").unwrap();
        doc.add_cookie("c", "1", None);
        doc.install_queue();
        BannerView::mount(&doc, r#"<div id="cookieConsent"></div>"#).unwrap();

        let next = doc.reload();
        assert_eq!(next.local_storage("k").as_deref(), Some("v"));
        assert_eq!(next.cookie_names(), vec!["c"]);
        assert!(next.data_layer().is_none());
        assert!(next.banner().is_none());
        assert!(next.events().is_empty());
    }

    #[test]
    fn test_mount_requires_container() {
        let doc = MemoryDocument::new("example.com");
        let err = BannerView::mount(&doc, "<div></div>").unwrap_err();
        assert!(matches!(err, Error::DomElementMissing { id } if id == "cookieConsent"));
    }

    #[test]
    fn test_inject_without_head_fails() {
        let doc = MemoryDocument::new("example.com");
        doc.remove_head();
        let script = ScriptTag {
            src: "https://cdn.example.com/tag.js".to_string(),
            async_load: true,
        };

        let err = doc.inject(&script).unwrap_err();
        assert!(matches!(err, Error::ScriptInjection { ref src, .. } if src == &script.src));
        assert!(err.is_recoverable());
        assert!(doc.scripts().is_empty());
    }
}
