//! Banner HTML.
//!
//! The markup defines every id in [`super::view::ids`]. The detail panel
//! starts out with `display:none`; the container gets no visible class until
//! the presenter reveals it.

use crate::config::BannerConfig;

/// Renders the banner subtree.
pub fn render_banner(config: &BannerConfig) -> String {
    let policy = escape_attr(&config.policy_url);
    format!(
        r#"<div id="cookieConsent" class="cc-banner" role="dialog" aria-label="Cookie consent"><div class="cc-inner">{simple}{detail}</div></div>"#,
        simple = simple_panel(&policy),
        detail = detail_panel(&policy),
    )
}

fn simple_panel(policy: &str) -> String {
    format!(
        concat!(
            r#"<div id="ccSimple" class="cc-simple">"#,
            r#"<div class="cc-text"><p>We use cookies to improve your experience and analyse site traffic. "#,
            r#"By clicking "Accept All", you consent to our use of cookies. "#,
            r#"<a href="{policy}">Cookie Policy</a></p></div>"#,
            r#"<div class="cc-actions">"#,
            r#"<button class="cc-btn cc-btn-link" id="ccCustomise">Customise</button>"#,
            r#"<button class="cc-btn cc-btn-outline" id="ccReject">Reject All</button>"#,
            r#"<button class="cc-btn cc-btn-primary" id="ccAccept">Accept All</button>"#,
            r#"</div></div>"#,
        ),
        policy = policy
    )
}

fn detail_panel(policy: &str) -> String {
    format!(
        concat!(
            r#"<div id="ccDetail" class="cc-detail" style="display:none">"#,
            r#"<div class="cc-detail-header"><h3>Cookie Preferences</h3>"#,
            r#"<button class="cc-close" id="ccClose" aria-label="Close preferences">&times;</button></div>"#,
            r#"<div class="cc-categories">{essential}{functional}{analytics}</div>"#,
            r#"<div class="cc-detail-footer">"#,
            r#"<a href="{policy}" class="cc-policy-link">Cookie Policy</a>"#,
            r#"<div class="cc-detail-actions">"#,
            r#"<button class="cc-btn cc-btn-outline" id="ccRejectDetail">Reject All</button>"#,
            r#"<button class="cc-btn cc-btn-primary" id="ccSave">Save Preferences</button>"#,
            r#"</div></div></div>"#,
        ),
        essential = category(
            "Essential",
            r#"<span class="cc-always-on">Always Active</span>"#,
            "Required for the website to function properly. These cannot be disabled.",
        ),
        functional = category(
            "Functional",
            &toggle("ccFunctional"),
            "Remember your preferences such as language and region settings.",
        ),
        analytics = category(
            "Analytics",
            &toggle("ccAnalytics"),
            "Help us understand how visitors use our website via Google Analytics. All data is anonymised.",
        ),
        policy = policy
    )
}

fn category(name: &str, control: &str, description: &str) -> String {
    format!(
        r#"<div class="cc-category"><div class="cc-category-header"><span class="cc-category-name">{name}</span>{control}</div><p class="cc-category-desc">{description}</p></div>"#
    )
}

fn toggle(id: &str) -> String {
    format!(
        r#"<label class="cc-toggle"><input type="checkbox" id="{id}"><span class="cc-toggle-slider"></span></label>"#
    )
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
