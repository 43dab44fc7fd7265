//! End-to-end consent flow tests.
//!
//! Drives a full page lifetime through the in-memory host:
//! - first visit prompts, a choice is stored and applied
//! - a reload with a stored record never shows the banner
//! - the detail panel's toggles are what gets saved

use std::sync::Arc;
use std::time::Duration;

use falconhurst_consent::config::ConsentConfig;
use falconhurst_consent::constants::STORAGE_KEY;
use falconhurst_consent::host::{ManualScheduler, MemoryDocument};
use falconhurst_consent::manager::{ConsentManager, Host, ReadyState, Startup};
use falconhurst_consent::presenter::{BannerState, Panel, ids};
use falconhurst_consent::store::ConsentStore;

const LOADER_SRC: &str = "https://www.googletagmanager.com/gtag/js?id=G-WXFB5L04Y8";

/// One page load: a document, its timers and the manager driving them.
struct Page {
    doc: MemoryDocument,
    scheduler: ManualScheduler,
    manager: ConsentManager,
}

impl Page {
    fn open(doc: MemoryDocument) -> Self {
        let scheduler = ManualScheduler::new();
        let host = Host {
            storage: Arc::new(doc.clone()),
            cookies: Arc::new(doc.clone()),
            scripts: Arc::new(doc.clone()),
            view: Arc::new(doc.clone()),
            scheduler: Arc::new(scheduler.clone()),
        };
        let manager = ConsentManager::from_config(&ConsentConfig::default(), host);
        Self {
            doc,
            scheduler,
            manager,
        }
    }

    fn fresh() -> Self {
        Self::open(MemoryDocument::new("www.falconhurst.example"))
    }

    fn reload(&self) -> Self {
        Self::open(self.doc.reload())
    }

    fn wait(&mut self, ms: u64) {
        for task in self.scheduler.advance(Duration::from_millis(ms)) {
            self.manager.on_timer(task);
        }
    }

    fn stored_json(&self) -> serde_json::Value {
        let raw = self.doc.local_storage(STORAGE_KEY).expect("record stored");
        serde_json::from_str(&raw).expect("stored record is JSON")
    }
}

// =============================================================================
// Scenario: reject all, then reload
// =============================================================================

#[test]
fn test_reject_all_then_reload_never_prompts() {
    let mut page = Page::fresh();

    assert_eq!(
        page.manager.start(ReadyState::Complete),
        Some(Startup::Prompted)
    );
    page.wait(800);
    assert_eq!(page.manager.banner_state(), BannerState::VisibleSimple);
    assert_eq!(page.doc.banner().unwrap().panel, Panel::Simple);

    page.manager.handle_click(ids::REJECT).unwrap();

    let stored = page.stored_json();
    assert_eq!(stored["essential"], true);
    assert_eq!(stored["functional"], false);
    assert_eq!(stored["analytics"], false);
    assert_eq!(stored["version"], 1);
    assert!(stored["timestamp"].as_str().unwrap().ends_with('Z'));

    assert_eq!(page.doc.scripts_with_src(LOADER_SRC), 0);
    assert_eq!(page.manager.banner_state(), BannerState::Dismissed);
    page.wait(400);
    assert!(!page.doc.banner().unwrap().displayed);

    let mut next = page.reload();
    match next.manager.start(ReadyState::Complete) {
        Some(Startup::Applied(record)) => {
            assert!(!record.analytics());
            assert!(!record.functional());
        },
        other => panic!("expected stored consent to be applied, got {other:?}"),
    }
    next.wait(5_000);

    assert!(next.doc.banner().is_none());
    assert!(!next.manager.is_banner_mounted());
    assert_eq!(next.doc.scripts_with_src(LOADER_SRC), 0);
}

// =============================================================================
// Scenario: customise, grant analytics only
// =============================================================================

#[test]
fn test_customise_and_save_analytics_only() {
    let mut page = Page::fresh();
    page.manager.start(ReadyState::Complete);
    page.wait(800);

    page.manager.handle_click(ids::CUSTOMISE).unwrap();
    assert_eq!(page.manager.banner_state(), BannerState::VisibleDetail);
    assert_eq!(page.doc.banner().unwrap().panel, Panel::Detail);

    page.doc.check(ids::ANALYTICS, true);
    page.doc.check(ids::FUNCTIONAL, false);
    page.manager.handle_click(ids::SAVE).unwrap();

    let stored = page.stored_json();
    assert_eq!(stored["analytics"], true);
    assert_eq!(stored["functional"], false);
    assert_eq!(page.doc.scripts_with_src(LOADER_SRC), 1);
    assert!(page.doc.scripts()[0].async_load);

    let queue = page.doc.data_layer().unwrap();
    assert_eq!(queue[0][0], "js");
    assert_eq!(queue[1], serde_json::json!(["config", "G-WXFB5L04Y8"]));

    // Reload: analytics loads again on the new page, still exactly once
    let mut next = page.reload();
    next.manager.start(ReadyState::Complete);
    next.wait(5_000);
    assert!(next.doc.banner().is_none());
    assert_eq!(next.doc.scripts_with_src(LOADER_SRC), 1);
}

#[test]
fn test_close_detail_discards_toggles() {
    let mut page = Page::fresh();
    page.manager.start(ReadyState::Complete);
    page.wait(800);

    assert!(page.manager.on_customize());
    page.doc.check(ids::ANALYTICS, true);
    assert!(page.manager.on_close_detail());

    assert!(page.manager.on_customize());
    let record = page.manager.on_save_from_view().unwrap();
    assert!(!record.analytics());
    assert_eq!(page.doc.scripts_with_src(LOADER_SRC), 0);
}

// =============================================================================
// Cookie purge on a returning visitor
// =============================================================================

#[test]
fn test_returning_refusal_purges_existing_analytics_cookies() {
    let doc = MemoryDocument::new("www.falconhurst.example");
    doc.set_local_storage(
        STORAGE_KEY,
        r#"{"essential":true,"functional":true,"analytics":false,"timestamp":"2024-01-01T00:00:00.000Z","version":1}"#,
    );
    doc.add_cookie("_ga", "1", None);
    doc.add_cookie("_gid", "2", None);
    doc.add_cookie("_gat", "3", None);
    doc.add_cookie("other", "4", None);

    let mut page = Page::open(doc);
    assert!(matches!(
        page.manager.start(ReadyState::Interactive),
        Some(Startup::Applied(_))
    ));

    assert_eq!(page.doc.cookie_names(), vec!["other"]);
    let writes = page.doc.cookie_writes();
    for name in ["_ga", "_gid", "_gat"] {
        assert!(writes.iter().any(|w| w.starts_with(&format!("{name}=;"))
            && w.ends_with(";domain=www.falconhurst.example")));
        assert!(writes.iter().any(|w| w.starts_with(&format!("{name}=;"))
            && w.ends_with(";domain=.www.falconhurst.example")));
    }
    assert!(page.doc.banner().is_none());
}

#[test]
fn test_changing_mind_on_next_visit_is_not_possible_without_banner() {
    let mut page = Page::fresh();
    page.manager.start(ReadyState::Complete);
    page.manager.on_accept_all().unwrap();

    let mut next = page.reload();
    next.manager.start(ReadyState::Complete);
    assert!(next.manager.on_reject_all().is_none());
    assert_eq!(next.stored_json()["analytics"], true);
}

// =============================================================================
// Degraded pages
// =============================================================================

#[test]
fn test_corrupt_record_prompts_again() {
    let doc = MemoryDocument::new("www.falconhurst.example");
    doc.set_local_storage(STORAGE_KEY, "{\"analytics\":tru");

    let mut page = Page::open(doc);
    assert_eq!(
        page.manager.start(ReadyState::Complete),
        Some(Startup::Prompted)
    );
    page.wait(800);
    assert_eq!(page.manager.banner_state(), BannerState::VisibleSimple);
}

#[test]
fn test_disabled_storage_prompts_and_dismisses() {
    let doc = MemoryDocument::new("www.falconhurst.example");
    doc.set_storage_available(false);

    let mut page = Page::open(doc);
    page.manager.start(ReadyState::Complete);
    page.wait(800);
    page.manager.handle_click(ids::ACCEPT).unwrap();

    assert_eq!(page.manager.banner_state(), BannerState::Dismissed);
    assert!(page.doc.local_storage(STORAGE_KEY).is_none());
    assert_eq!(page.doc.scripts_with_src(LOADER_SRC), 1);
}

#[test]
fn test_page_without_body_still_applies_nothing_and_does_not_panic() {
    let doc = MemoryDocument::new("www.falconhurst.example");
    doc.remove_body();

    let mut page = Page::open(doc);
    assert_eq!(
        page.manager.start(ReadyState::Complete),
        Some(Startup::Prompted)
    );
    page.wait(800);

    assert!(!page.manager.is_banner_mounted());
    assert!(page.manager.on_accept_all().is_none());
    assert!(page.doc.local_storage(STORAGE_KEY).is_none());
}

#[test]
fn test_deferred_until_dom_content_loaded() {
    let mut page = Page::fresh();
    assert_eq!(
        page.manager.start(ReadyState::Loading),
        Some(Startup::Deferred)
    );
    assert!(page.doc.banner().is_none());

    assert_eq!(
        page.manager.on_dom_content_loaded(),
        Some(Startup::Prompted)
    );
    assert!(page.doc.banner().is_some());
}

// =============================================================================
// Persistent store across process restarts
// =============================================================================

#[test]
fn test_file_store_record_suppresses_banner() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("consent.redb");

    {
        let store = ConsentStore::file(&path).unwrap();
        store.write(&falconhurst_consent::ConsentRecord::now(
            falconhurst_consent::Preferences::reject_all(),
        ));
    }

    let doc = MemoryDocument::new("kiosk.local");
    let scheduler = ManualScheduler::new();
    let store = ConsentStore::file(&path).unwrap();
    let policy = falconhurst_consent::ConsentPolicy::new(
        &ConsentConfig::default().analytics,
        Arc::new(doc.clone()),
        Arc::new(doc.clone()),
    );
    let presenter = falconhurst_consent::BannerPresenter::new(
        ConsentConfig::default().banner,
        Arc::new(doc.clone()),
        Arc::new(scheduler.clone()),
    );
    let mut manager = ConsentManager::new(store, policy, presenter);

    assert!(matches!(
        manager.start(ReadyState::Complete),
        Some(Startup::Applied(_))
    ));
    assert!(doc.banner().is_none());
    assert_eq!(scheduler.pending(), 0);
}
