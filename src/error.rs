//! Error types for the ad lifecycle core.
//!
//! Advertising is best-effort: none of these errors ever reaches the end
//! user.  They exist so that every failure path can be logged with a
//! precise cause and routed back to a safe state.

use core::fmt;

// ---------------------------------------------------------------------------
// Ad subsystem errors
// ---------------------------------------------------------------------------

/// Every failure the lifecycle manager can observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdError {
    /// The ad capability is missing at runtime.  Permanent for the
    /// lifetime of the process; every operation degrades to a no-op.
    AdapterUnavailable,
    /// Fetching an ad failed.  Transient: the next `ensure_loaded()`
    /// retries.
    LoadFailure(String),
    /// Presenting an ad failed.  Transient: the handle is discarded and a
    /// reload is issued.
    ShowFailure(String),
    /// Subscribing to the foreground signal source failed.  The manager
    /// keeps running without foreground-triggered prefetch.
    SignalSource(String),
}

impl AdError {
    /// Whether a later attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LoadFailure(_) | Self::ShowFailure(_))
    }
}

impl fmt::Display for AdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdapterUnavailable => write!(f, "ad adapter unavailable"),
            Self::LoadFailure(reason) => write!(f, "ad load failed: {reason}"),
            Self::ShowFailure(reason) => write!(f, "ad show failed: {reason}"),
            Self::SignalSource(reason) => write!(f, "foreground signal source: {reason}"),
        }
    }
}

impl std::error::Error for AdError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating [`AdConfig`](crate::config::AdConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the schema.
    Parse(serde_json::Error),
    /// A field failed range validation.
    /// The `&'static str` names the field and the rule.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::ValidationFailed(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}
