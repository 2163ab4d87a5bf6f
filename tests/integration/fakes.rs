//! Recording fakes for the port traits.
//!
//! Every provider call is kept so tests can assert on the full request
//! history without an ad network.

use appopen::adapters::time::ManualClock;
use appopen::app::events::AppEvent;
use appopen::app::ports::{AdProvider, EventSink, ForegroundSource, SubscriptionId};
use appopen::app::service::AdLifecycleManager;
use appopen::config::AdConfig;
use appopen::error::AdError;
use appopen::events::{Event, EventQueue};
use appopen::inventory::{AdHandle, Generation};

// ── Provider call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Load(Generation),
    Show(AdHandle),
}

// ── ScriptedProvider ──────────────────────────────────────────

/// Provider whose completions are pushed by the test, not by itself.
pub struct ScriptedProvider {
    pub calls: Vec<ProviderCall>,
    pub available: bool,
    /// Synchronous rejection for the next load request.
    pub reject_load: Option<AdError>,
    /// Synchronous rejection for the next show request.
    pub reject_show: Option<AdError>,
    pub shutdowns: u32,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            available: true,
            reject_load: None,
            reject_show: None,
            shutdowns: 0,
        }
    }

    pub fn loads(&self) -> Vec<Generation> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ProviderCall::Load(g) => Some(*g),
                ProviderCall::Show(_) => None,
            })
            .collect()
    }

    pub fn shows(&self) -> Vec<AdHandle> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ProviderCall::Show(h) => Some(*h),
                ProviderCall::Load(_) => None,
            })
            .collect()
    }

    pub fn last_load(&self) -> Option<Generation> {
        self.loads().last().copied()
    }
}

impl AdProvider for ScriptedProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_load(&mut self, generation: Generation) -> Result<(), AdError> {
        self.calls.push(ProviderCall::Load(generation));
        self.reject_load.take().map_or(Ok(()), Err)
    }

    fn request_show(&mut self, handle: AdHandle) -> Result<(), AdError> {
        self.calls.push(ProviderCall::Show(handle));
        self.reject_show.take().map_or(Ok(()), Err)
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }
}

// ── Foreground sources ────────────────────────────────────────

/// Keeps the queue it was handed so tests can inject transitions.
#[derive(Default)]
pub struct CapturingSource {
    pub queue: Option<EventQueue>,
    pub unsubscribed: u32,
}

impl ForegroundSource for CapturingSource {
    fn subscribe(&mut self, queue: EventQueue) -> Result<SubscriptionId, AdError> {
        self.queue = Some(queue);
        Ok(SubscriptionId(7))
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) {
        self.unsubscribed += 1;
    }
}

/// A notifier that cannot be reached.
pub struct BrokenSource;

impl ForegroundSource for BrokenSource {
    fn subscribe(&mut self, _queue: EventQueue) -> Result<SubscriptionId, AdError> {
        Err(AdError::SignalSource("notifier not registered".into()))
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) {
        panic!("nothing was subscribed");
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type Manager<F = CapturingSource> = AdLifecycleManager<ScriptedProvider, F, ManualClock>;

/// A started manager with the scripted provider and capturing source.
#[allow(dead_code)]
pub fn started(provider: ScriptedProvider) -> (Manager, ManualClock, LogSink) {
    started_with(provider, CapturingSource::default())
}

pub fn started_with<F: ForegroundSource>(
    provider: ScriptedProvider,
    source: F,
) -> (Manager<F>, ManualClock, LogSink) {
    let clock = ManualClock::new(0);
    let mut sink = LogSink::new();
    let mut mgr = AdLifecycleManager::new(
        AdConfig::default(),
        provider,
        source,
        clock.clone(),
        EventQueue::new(),
    );
    mgr.start(&mut sink);
    (mgr, clock, sink)
}

/// Request a load and answer it with `handle`.
#[allow(dead_code)]
pub fn load<F: ForegroundSource>(mgr: &mut Manager<F>, sink: &mut LogSink, handle: u64) {
    mgr.ensure_loaded(sink);
    let generation = mgr
        .provider()
        .last_load()
        .expect("ensure_loaded must issue a load");
    mgr.handle_event(
        Event::Loaded {
            generation,
            handle: AdHandle(handle),
        },
        sink,
    );
}
