//! Outbound application events.
//!
//! The [`AdLifecycleManager`](super::service::AdLifecycleManager) emits
//! these through the [`EventSink`](super::ports::EventSink) port.  They
//! are diagnostics only: nothing here is ever shown to the end user.

use crate::error::AdError;
use crate::fsm::StateId;
use crate::inventory::{AdHandle, Generation};

/// Structured events emitted by the ad core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The manager has started.  `available` is the adapter availability check.
    Started { available: bool },

    /// The state machine moved.
    StateChanged { from: StateId, to: StateId },

    /// A load request was issued to the provider.
    LoadRequested(Generation),

    /// The provider delivered an ad.
    AdLoaded { handle: AdHandle, loaded_at: u64 },

    /// A show request was issued to the provider.
    ShowRequested(AdHandle),

    /// A presented ad went away.
    AdClosed(AdHandle),

    /// A cached ad exceeded its freshness window and was dropped.
    StaleDiscarded(AdHandle),

    /// A load or show failed; the manager has already recovered.
    Failure(AdError),

    /// An event arrived for a request or ad that is no longer current.
    LateEventIgnored,

    /// Timers cancelled and signal source released.
    Stopped,
}

/// Running counters since the manager was constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdStats {
    pub loads_requested: u32,
    pub load_failures: u32,
    pub shows_requested: u32,
    pub show_failures: u32,
    pub closes: u32,
    pub stale_discards: u32,
    pub late_events_ignored: u32,
}
