//! Error types for the consent core.
//!
//! Only two failure kinds matter at runtime: storage that cannot be read or
//! written, and page elements the banner expects but cannot find. Both are
//! recovered where they occur; the typed errors exist so hosts and tests can
//! see what was swallowed.

/// Result type for consent operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Consent errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The storage backend refused a read or write.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// A stored value exists but is not a usable consent record.
    #[error("corrupt consent record: {reason}")]
    CorruptRecord { reason: String },

    /// The banner view has no element with this id.
    #[error("element not found: #{id}")]
    DomElementMissing { id: String },

    /// An element id that does not map to any banner action.
    #[error("unknown banner element: #{id}")]
    UnknownElement { id: String },

    /// The analytics loader could not be injected.
    #[error("script injection failed for {src}: {reason}")]
    ScriptInjection { src: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a storage unavailable error.
    pub fn storage_unavailable(reason: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable {
            reason: reason.to_string(),
        }
    }

    /// Create a corrupt record error.
    pub fn corrupt_record(reason: impl std::fmt::Display) -> Self {
        Self::CorruptRecord {
            reason: reason.to_string(),
        }
    }

    /// Create a missing element error.
    pub fn dom_element_missing(id: impl Into<String>) -> Self {
        Self::DomElementMissing { id: id.into() }
    }

    /// Create a script injection error.
    pub fn script_injection(src: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ScriptInjection {
            src: src.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for failures the core recovers from locally.
    ///
    /// Nothing in the consent core is fatal to page rendering; configuration
    /// and lookup errors only occur while a host is being wired up.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. }
                | Self::CorruptRecord { .. }
                | Self::DomElementMissing { .. }
                | Self::ScriptInjection { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = Error::dom_element_missing("ccSave");
        assert_eq!(err.to_string(), "element not found: #ccSave");

        let err = Error::storage_unavailable("quota exceeded");
        assert_eq!(err.to_string(), "storage unavailable: quota exceeded");
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(Error::corrupt_record("bad json").is_recoverable());
        assert!(Error::dom_element_missing("ccAccept").is_recoverable());
        assert!(!Error::Config("empty key".into()).is_recoverable());
        assert!(
            !Error::UnknownElement {
                id: "ccNope".into()
            }
            .is_recoverable()
        );
    }
}
