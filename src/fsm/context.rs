//! Shared mutable context threaded through every FSM handler.
//!
//! `AdContext` is the single struct that state handlers read from and
//! write to: the slot, the pacing rules, the current clock reading, and
//! three outboxes (provider requests, diagnostic events, show decision)
//! that the service drains after each dispatch.

use heapless::Vec;

use crate::app::events::{AdStats, AppEvent};
use crate::config::AdConfig;
use crate::fsm::StateId;
use crate::inventory::{AdHandle, AdSlot, Generation};
use crate::policy::{DisplayThrottle, ExpiryPolicy};

/// Capacity of the request outbox.  A single dispatch issues at most one
/// request; the slack absorbs a chained follow-up.
pub const MAX_REQUESTS: usize = 4;

/// Capacity of the diagnostic event outbox.
pub const MAX_EVENTS: usize = 8;

// ---------------------------------------------------------------------------
// Inputs (what the handlers react to)
// ---------------------------------------------------------------------------

/// One thing that happened to the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Make sure an ad is cached or on its way.
    EnsureLoaded,
    /// Present the cached ad if pacing allows.
    ShowIfEligible,
    Loaded {
        generation: Generation,
        handle: AdHandle,
    },
    LoadFailed {
        generation: Generation,
        reason: String,
    },
    Closed {
        handle: AdHandle,
    },
    ShowFailed {
        handle: AdHandle,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Outputs (written by handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// A call the service must make on the ad provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderRequest {
    Load(Generation),
    Show(AdHandle),
}

/// Result of a `show_if_eligible()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowDecision {
    /// A show request was issued.
    Presented,
    /// Shown too recently; try again after `remaining_ms`.
    CoolingDown { remaining_ms: u64 },
    /// A load or presentation is already in flight.
    Busy(StateId),
    /// The cached ad was too old; it was dropped and a reload issued.
    Expired,
    /// Nothing cached; a load was issued.
    NotReady,
    /// The ad capability is missing.
    Unavailable,
}

// ---------------------------------------------------------------------------
// AdContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct AdContext {
    // -- Timing --
    /// Clock reading (ms) for the input being handled.
    pub now_ms: u64,

    // -- Inventory --
    pub slot: AdSlot,

    // -- Pacing --
    pub throttle: DisplayThrottle,
    pub expiry: ExpiryPolicy,

    // -- Outboxes --
    /// Provider calls to make, in order.
    pub requests: Vec<ProviderRequest, MAX_REQUESTS>,
    /// Diagnostic events to emit, in order.
    pub events: Vec<AppEvent, MAX_EVENTS>,
    /// Answer to the last `ShowIfEligible`.
    pub decision: Option<ShowDecision>,
    /// Set when the handler wants a prefetch once it is back in `Idle`.
    pub follow_up: bool,

    // -- Diagnostics --
    pub stats: AdStats,
}

impl AdContext {
    pub fn new(config: &AdConfig) -> Self {
        Self {
            now_ms: 0,
            slot: AdSlot::new(),
            throttle: DisplayThrottle::new(config.cooldown_ms()),
            expiry: ExpiryPolicy::new(config.max_age_ms()),
            requests: Vec::new(),
            events: Vec::new(),
            decision: None,
            follow_up: false,
            stats: AdStats::default(),
        }
    }

    /// Queue a provider call.
    pub fn request(&mut self, request: ProviderRequest) {
        if self.requests.push(request).is_err() {
            log::warn!("Ad request outbox full, dropping {:?}", request);
        }
    }

    /// Queue a diagnostic event.
    pub fn note(&mut self, event: AppEvent) {
        if let Err(dropped) = self.events.push(event) {
            log::debug!("Ad event outbox full, dropping {:?}", dropped);
        }
    }

    /// `true` if the slot holds an ad that is still within `max_age`.
    pub fn has_fresh_ad(&self) -> bool {
        self.slot
            .loaded_at()
            .is_some_and(|at| self.expiry.is_fresh(at, self.now_ms))
    }

    /// Re-derive pacing rules after a config change.
    pub fn apply_config(&mut self, config: &AdConfig) {
        self.throttle.set_cooldown_ms(config.cooldown_ms());
        self.expiry = ExpiryPolicy::new(config.max_age_ms());
    }
}
