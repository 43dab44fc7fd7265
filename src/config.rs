//! Configuration for the consent core.
//!
//! Every field has a default from [`crate::constants`], so an empty TOML
//! document is a valid configuration. A deployment typically only sets the
//! analytics measurement id and the policy page URL:
//!
//! ```toml
//! storage_key = "fh_cookie_consent"
//!
//! [analytics]
//! measurement_id = "G-WXFB5L04Y8"
//! cookie_prefixes = ["_ga"]
//! cookie_names = ["_gid", "_gat"]
//!
//! [banner]
//! show_delay_ms = 800
//! hide_delay_ms = 400
//! policy_url = "cookies.html"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants;
use crate::error::Error;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    /// Key of the persisted consent entry.
    pub storage_key: String,
    pub analytics: AnalyticsConfig,
    pub banner: BannerConfig,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            storage_key: constants::STORAGE_KEY.to_string(),
            analytics: AnalyticsConfig::default(),
            banner: BannerConfig::default(),
        }
    }
}

/// Analytics loader and the cookies it owns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub measurement_id: String,
    pub loader_base: String,
    /// Cookies whose name starts with one of these are purged on refusal.
    pub cookie_prefixes: Vec<String>,
    /// Cookies with exactly one of these names are purged on refusal.
    pub cookie_names: Vec<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            measurement_id: constants::ANALYTICS_MEASUREMENT_ID.to_string(),
            loader_base: constants::ANALYTICS_LOADER_BASE.to_string(),
            cookie_prefixes: to_strings(constants::ANALYTICS_COOKIE_PREFIXES),
            cookie_names: to_strings(constants::ANALYTICS_COOKIE_NAMES),
        }
    }
}

/// Banner timing and links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub show_delay_ms: u64,
    pub hide_delay_ms: u64,
    pub policy_url: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            show_delay_ms: constants::BANNER_SHOW_DELAY_MS,
            hide_delay_ms: constants::BANNER_HIDE_DELAY_MS,
            policy_url: constants::COOKIE_POLICY_URL.to_string(),
        }
    }
}

impl BannerConfig {
    /// Delay between injecting the banner and revealing it.
    pub fn show_delay(&self) -> Duration {
        Duration::from_millis(self.show_delay_ms)
    }

    /// Delay between the exit transition and removing the banner from layout.
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

impl ConsentConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a field has the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse consent config")
    }

    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - A field has an invalid type
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] listing every problem found:
    /// - Empty storage key
    /// - Empty measurement id or loader URL
    /// - No cookie prefixes or names to purge
    pub fn validate(&self) -> crate::error::Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.storage_key.trim().is_empty() {
            errors.push("storage_key cannot be empty".to_string());
        }

        let analytics = &self.analytics;
        if analytics.measurement_id.trim().is_empty() {
            errors.push("analytics.measurement_id cannot be empty".to_string());
        } else if !analytics.measurement_id.starts_with("G-") {
            warnings.push(format!(
                "analytics.measurement_id '{}' does not look like a measurement id (expected 'G-...')",
                analytics.measurement_id
            ));
        }

        if analytics.loader_base.trim().is_empty() {
            errors.push("analytics.loader_base cannot be empty".to_string());
        } else if !analytics.loader_base.starts_with("https://") {
            warnings.push(format!(
                "analytics.loader_base '{}' is not served over https",
                analytics.loader_base
            ));
        }

        let has_matcher = analytics
            .cookie_prefixes
            .iter()
            .chain(&analytics.cookie_names)
            .any(|m| !m.trim().is_empty());
        if !has_matcher {
            errors.push(
                "analytics.cookie_prefixes and analytics.cookie_names are both empty; \
                 refusing analytics would purge nothing"
                    .to_string(),
            );
        }

        if self.banner.show_delay_ms == 0 {
            warnings.push(
                "banner.show_delay_ms is 0; the banner will appear without its entry transition"
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(ValidationResult { warnings })
        } else {
            Err(Error::Config(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ConsentConfig::from_toml_str("").unwrap();
        assert_eq!(config, ConsentConfig::default());
        assert_eq!(config.storage_key, "fh_cookie_consent");
        assert_eq!(config.analytics.measurement_id, "G-WXFB5L04Y8");
        assert_eq!(config.banner.show_delay(), Duration::from_millis(800));
        assert_eq!(config.banner.hide_delay(), Duration::from_millis(400));
    }

    #[test]
    fn test_partial_override() {
        let config = ConsentConfig::from_toml_str(
            r#"
            [analytics]
            measurement_id = "G-TEST123"

            [banner]
            policy_url = "/privacy"
            "#,
        )
        .unwrap();

        assert_eq!(config.analytics.measurement_id, "G-TEST123");
        assert_eq!(config.analytics.cookie_names, vec!["_gid", "_gat"]);
        assert_eq!(config.banner.policy_url, "/privacy");
        assert_eq!(config.banner.show_delay_ms, 800);
    }

    #[test]
    fn test_invalid_type_is_an_error() {
        let result = ConsentConfig::from_toml_str("[banner]\nshow_delay_ms = \"soon\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("consent.toml");
        fs::write(&path, "storage_key = \"consent_v2\"\n").unwrap();

        let config = ConsentConfig::load_from(&path).unwrap();
        assert_eq!(config.storage_key, "consent_v2");
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = ConsentConfig::load_from("/nonexistent/consent.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let result = ConsentConfig::default().validate().unwrap();
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut config = ConsentConfig::default();
        config.storage_key = String::new();
        config.analytics.measurement_id = " ".to_string();
        config.analytics.cookie_prefixes.clear();
        config.analytics.cookie_names.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("storage_key cannot be empty"));
        assert!(err.contains("measurement_id cannot be empty"));
        assert!(err.contains("would purge nothing"));
    }

    #[test]
    fn test_validate_warnings() {
        let mut config = ConsentConfig::default();
        config.analytics.measurement_id = "UA-1234".to_string();
        config.banner.show_delay_ms = 0;

        let result = config.validate().unwrap();
        assert_eq!(result.warnings.len(), 2);
    }
}
