//! Logging setup.
//!
//! The library only emits `tracing` events. Hosts that want them printed
//! (native embedders, test harnesses) install a subscriber once at startup.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::constants::DEFAULT_LOG_FILTER;

/// Output format for [`init_logging`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Builds the filter from `RUST_LOG`, falling back to `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs a global subscriber writing to stdout.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter());
    match format {
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    }
    .context("Failed to install tracing subscriber")
}
