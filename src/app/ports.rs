//! Port traits: the hexagonal boundary between the ad lifecycle core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AdLifecycleManager (domain)
//! ```
//!
//! Driven adapters (ad SDK, app-state notifier, presentation surface,
//! clock, event sinks) implement these traits.  The
//! [`AdLifecycleManager`](super::service::AdLifecycleManager) consumes them
//! via generics, so the domain core never touches an SDK directly and can
//! be exercised with fakes.
//!
//! ## Asynchrony
//!
//! Every provider request is fire-and-forget.  Outcomes come back as
//! [`Event`](crate::events::Event)s pushed onto the manager's
//! [`EventQueue`](crate::events::EventQueue), never as return values of a
//! blocking call.

use crate::config::AdConfig;
use crate::error::AdError;
use crate::events::EventQueue;
use crate::inventory::{AdHandle, Generation};

// ───────────────────────────────────────────────────────────────
// App lifecycle
// ───────────────────────────────────────────────────────────────

/// OS-level app state, as delivered by the foreground signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppLifecycle {
    /// In the foreground and receiving input.
    Active,
    /// Visible but not receiving input (app switcher, incoming call).
    Inactive,
    /// Not visible.
    Background,
}

impl AppLifecycle {
    /// Parse the lowercase names used by the host notifier.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "background" => Some(Self::Background),
            _ => None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Ad provider port (driven adapter: domain → ad SDK)
// ───────────────────────────────────────────────────────────────

/// Thin capability interface around the ad SDK.
pub trait AdProvider {
    /// `true` only if the ad capability is present at runtime.
    fn is_available(&self) -> bool;

    /// Start fetching a new ad.  Completion arrives as
    /// `Event::Loaded` / `Event::LoadFailed` carrying `generation`.
    ///
    /// An `Err` is a synchronous rejection and is handled exactly like a
    /// `LoadFailed` event.
    fn request_load(&mut self, generation: Generation) -> Result<(), AdError>;

    /// Present a loaded ad.  Completion arrives as `Event::Closed` /
    /// `Event::ShowFailed` carrying `handle`.
    fn request_show(&mut self, handle: AdHandle) -> Result<(), AdError>;

    /// Give the adapter a chance to run timers or flush callbacks.
    /// Called from the manager's loop on every pump.
    fn poll(&mut self, _now_ms: u64) {}

    /// Configuration changed at runtime.  Applies to the next load or show;
    /// an ad already on screen keeps its settings.
    fn update_config(&mut self, _config: &AdConfig) {}

    /// The manager is going away.  Cancel timers and take down anything on
    /// screen without reporting back.
    fn shutdown(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Foreground signal source (driving adapter: OS → domain)
// ───────────────────────────────────────────────────────────────

/// Token returned by [`ForegroundSource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

/// OS-level app-state notifier.
///
/// Transitions are delivered as `Event::Lifecycle` onto the queue handed
/// over at subscription time, from whatever thread the OS uses.
pub trait ForegroundSource {
    fn subscribe(&mut self, queue: EventQueue) -> Result<SubscriptionId, AdError>;

    /// Release a subscription.  Unknown ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);
}

// ───────────────────────────────────────────────────────────────
// Presentation surface (driven adapter: domain → pixels)
// ───────────────────────────────────────────────────────────────

/// Something that can put literal ad markup on screen.
pub trait PresentationSurface {
    /// Display `markup` full screen.  An `Err` is treated as a show failure.
    fn render(&mut self, markup: &str) -> Result<(), String>;

    /// Update the "Ad closes in Ns" label.
    fn update_countdown(&mut self, secs_left: u8);

    /// Tear the ad down.
    fn dismiss(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Injected so tests can drive time.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from its owner)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a timer fires.
pub trait SchedulerDelegate {
    /// * `label`: the label of the timer that fired.
    /// * `kind` : whether it was a periodic or one-shot fire.
    fn on_schedule_fired(&mut self, label: &'static str, kind: ScheduleFiredKind);
}

/// Discriminant passed to [`SchedulerDelegate::on_schedule_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleFiredKind {
    /// A recurring timer fired.
    Periodic,
    /// A one-shot timer fired (slot freed after).
    OneShot,
}
