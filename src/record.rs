//! The persisted consent record.
//!
//! A [`ConsentRecord`] is the only entity this crate stores. It is written
//! wholesale on every choice and never merged: the newest write wins.
//!
//! Stored text is parsed leniently but safely. Any value that is not a JSON
//! object with boolean (or missing) category flags is rejected, and missing
//! flags always read as `false`. `essential` is never taken from storage.
//! The timestamp is informational and never invalidates a record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::RECORD_VERSION;
use crate::error::{Error, Result};

/// The user-settable part of a consent choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Preferences {
    pub functional: bool,
    pub analytics: bool,
}

impl Preferences {
    pub const fn new(functional: bool, analytics: bool) -> Self {
        Self {
            functional,
            analytics,
        }
    }

    /// Every optional category granted.
    pub const fn accept_all() -> Self {
        Self::new(true, true)
    }

    /// Every optional category refused. Same as the defaults.
    pub const fn reject_all() -> Self {
        Self::new(false, false)
    }
}

/// A consent choice as it is persisted.
///
/// Field order and names match the stored layout exactly:
/// `essential`, `functional`, `analytics`, `timestamp`, `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsentRecord {
    essential: bool,
    functional: bool,
    analytics: bool,
    timestamp: String,
    version: u32,
}

/// Shape accepted when reading a record back.
#[derive(Deserialize)]
struct StoredRecord {
    #[serde(default)]
    functional: bool,
    #[serde(default)]
    analytics: bool,
    #[serde(default)]
    timestamp: Option<serde_json::Value>,
    #[serde(default = "current_version")]
    version: u32,
}

fn current_version() -> u32 {
    RECORD_VERSION
}

impl ConsentRecord {
    /// Builds a record for `prefs` stamped with `at`.
    pub fn new(prefs: Preferences, at: DateTime<Utc>) -> Self {
        Self {
            essential: true,
            functional: prefs.functional,
            analytics: prefs.analytics,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: RECORD_VERSION,
        }
    }

    /// Builds a record for `prefs` stamped with the current time.
    pub fn now(prefs: Preferences) -> Self {
        Self::new(prefs, Utc::now())
    }

    /// Parses stored text into a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptRecord`] if the text is not JSON, is not an
    /// object, or carries a category flag that is not a boolean.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(Error::corrupt_record)?;
        if !value.is_object() {
            return Err(Error::corrupt_record(format!(
                "expected an object, found {}",
                json_kind(&value)
            )));
        }

        let stored: StoredRecord = serde_json::from_value(value).map_err(Error::corrupt_record)?;
        if stored.version != RECORD_VERSION {
            tracing::debug!(
                version = stored.version,
                expected = RECORD_VERSION,
                "reading consent record with unexpected schema version"
            );
        }

        Ok(Self {
            essential: true,
            functional: stored.functional,
            analytics: stored.analytics,
            timestamp: timestamp_text(stored.timestamp),
            version: stored.version,
        })
    }

    /// Serializes the record in its stored layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptRecord`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::corrupt_record)
    }

    /// Always `true`: essential cookies cannot be refused.
    pub fn essential(&self) -> bool {
        self.essential
    }

    pub fn functional(&self) -> bool {
        self.functional
    }

    pub fn analytics(&self) -> bool {
        self.analytics
    }

    /// ISO-8601 write time. Informational only.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.functional, self.analytics)
    }
}

/// The timestamp is informational, so any stored shape is kept as text.
fn timestamp_text(value: Option<serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(text)) => text,
        Some(other) => other.to_string(),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
