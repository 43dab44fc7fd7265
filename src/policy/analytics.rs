//! The analytics tag: what gets loaded when analytics is granted.
//!
//! The tag is two global call conventions plus one script reference. The
//! queue (`dataLayer`) must exist and receive the `js` and `config` commands
//! through the dispatch function (`gtag`) before the loader script runs.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::config::AnalyticsConfig;

/// One command pushed onto the analytics queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsCommand {
    /// `gtag('js', <time>)`: marks when the tag was initialized.
    Js { at: String },
    /// `gtag('config', <id>)`: configures the measurement account.
    Config { measurement_id: String },
}

impl AnalyticsCommand {
    /// The dispatch call's arguments as a JSON array, as the queue stores them.
    pub fn to_args(&self) -> Value {
        match self {
            Self::Js { at } => json!(["js", at]),
            Self::Config { measurement_id } => json!(["config", measurement_id]),
        }
    }
}

/// Script element the policy asks the host to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    pub async_load: bool,
}

/// The configured analytics loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsTag {
    measurement_id: String,
    loader_base: String,
}

impl AnalyticsTag {
    pub fn new(measurement_id: impl Into<String>, loader_base: impl Into<String>) -> Self {
        Self {
            measurement_id: measurement_id.into(),
            loader_base: loader_base.into(),
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(&config.measurement_id, &config.loader_base)
    }

    pub fn measurement_id(&self) -> &str {
        &self.measurement_id
    }

    /// Loader URL: `<loader_base>?id=<measurement_id>`.
    pub fn loader_src(&self) -> String {
        format!("{}?id={}", self.loader_base, self.measurement_id)
    }

    pub fn script(&self) -> ScriptTag {
        ScriptTag {
            src: self.loader_src(),
            async_load: true,
        }
    }

    /// Commands queued before the loader, in dispatch order.
    pub fn bootstrap_commands(&self, now: DateTime<Utc>) -> [AnalyticsCommand; 2] {
        [
            AnalyticsCommand::Js {
                at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
            AnalyticsCommand::Config {
                measurement_id: self.measurement_id.clone(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_loader_src() {
        let tag = AnalyticsTag::from_config(&AnalyticsConfig::default());
        assert_eq!(
            tag.loader_src(),
            "https://www.googletagmanager.com/gtag/js?id=G-WXFB5L04Y8"
        );
        assert!(tag.script().async_load);
    }

    #[test]
    fn test_bootstrap_commands_order() {
        let tag = AnalyticsTag::new("G-TEST", "https://loader.test/gtag/js");
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let [js, config] = tag.bootstrap_commands(now);
        assert_eq!(js.to_args(), json!(["js", "2024-01-02T03:04:05.000Z"]));
        assert_eq!(config.to_args(), json!(["config", "G-TEST"]));
    }
}
