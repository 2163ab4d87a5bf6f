//! Lifecycle manager: the hexagonal core.
//!
//! [`AdLifecycleManager`] owns the FSM, the slot, the pacing rules, the
//! first-run timer, and the foreground subscription.  It is a single
//! logical actor: every mutation happens inside one of its `&mut self`
//! methods, and asynchronous outcomes reach it only through the
//! [`EventQueue`], drained one event at a time by [`pump`].
//!
//! ```text
//!  ForegroundSource ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                       │   AdLifecycleManager    │
//!       AdProvider ◀──▶ │ FSM · Slot · Throttle   │
//!                       └───────────▲─────────────┘
//!                                   │ pump()
//!                              EventQueue
//! ```
//!
//! One instance per process, constructed at app start and dropped at app
//! stop.  It is passed by reference to whoever needs it; there is no
//! global.
//!
//! [`pump`]: AdLifecycleManager::pump

use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::config::AdConfig;
use crate::error::AdError;
use crate::events::{Event, EventQueue};
use crate::fsm::context::{AdContext, Input, ProviderRequest};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::inventory::AdSlot;
use crate::scheduler::{FiredTimers, Schedule, ScheduleKind, Scheduler};

use super::commands::AppCommand;
use super::events::{AdStats, AppEvent};
use super::ports::{AdProvider, AppLifecycle, Clock, EventSink, ForegroundSource, SubscriptionId};

pub use crate::fsm::context::ShowDecision;

/// Label of the one-shot startup check.
const FIRST_RUN_TIMER: &str = "first-run";

/// Label of the one-shot that ends a presentation nobody closed.
const PRESENTATION_WATCHDOG: &str = "presentation-watchdog";

// ───────────────────────────────────────────────────────────────
// AdLifecycleManager
// ───────────────────────────────────────────────────────────────

/// Schedules and presents the single App Open ad slot.
pub struct AdLifecycleManager<P: AdProvider, F: ForegroundSource, C: Clock> {
    fsm: Fsm,
    ctx: AdContext,
    config: AdConfig,
    provider: P,
    source: F,
    clock: C,
    queue: EventQueue,
    timers: Scheduler,
    /// Latched to `false` the first time the adapter reports itself absent.
    available: bool,
    subscription: Option<SubscriptionId>,
    /// Subscription failure, reported on `start()`.
    signal_error: Option<AdError>,
    app_state: AppLifecycle,
    started: bool,
    stopped: bool,
}

impl<P: AdProvider, F: ForegroundSource, C: Clock> AdLifecycleManager<P, F, C> {
    /// Construct the manager and subscribe to the foreground source.
    ///
    /// `queue` must be the same queue the provider pushes completions onto.
    /// Does **not** arm the first-run timer: call [`start`](Self::start).
    pub fn new(config: AdConfig, provider: P, mut source: F, clock: C, queue: EventQueue) -> Self {
        let available = provider.is_available();
        if !available {
            warn!("{}; app open ads disabled for this session", AdError::AdapterUnavailable);
        }

        let (subscription, signal_error) = match source.subscribe(queue.clone()) {
            Ok(id) => (Some(id), None),
            Err(e) => {
                warn!("Foreground subscription failed ({}), continuing without it", e);
                (None, Some(e))
            }
        };

        let mut ctx = AdContext::new(&config);
        ctx.now_ms = clock.now_ms();

        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx,
            config,
            provider,
            source,
            clock,
            queue,
            timers: Scheduler::new(),
            available,
            subscription,
            signal_error,
            app_state: AppLifecycle::Active,
            started: false,
            stopped: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter `Idle` and arm the one-shot first-run check.
    ///
    /// Calling it twice is a no-op.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        if self.started {
            return;
        }
        self.started = true;
        self.fsm.start(&mut self.ctx);

        if let Some(e) = self.signal_error.take() {
            sink.emit(&AppEvent::Failure(e));
        }

        if self.available {
            let armed = self.timers.add(
                Schedule {
                    label: FIRST_RUN_TIMER,
                    kind: ScheduleKind::OneShot {
                        delay_ms: u64::from(self.config.first_run_delay_ms),
                    },
                },
                self.clock.now_ms(),
            );
            if armed.is_none() {
                warn!("No timer slot for the first-run ad check");
            }
        }

        sink.emit(&AppEvent::Started {
            available: self.available,
        });
        info!(
            "Ad manager started (available={}, max_age={}s, cooldown={}s)",
            self.available, self.config.max_age_secs, self.config.cooldown_secs
        );
    }

    /// Cancel timers and release the foreground subscription.
    ///
    /// Idempotent.  The slot is left as-is; nothing is issued afterwards.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        if self.stopped {
            return;
        }
        self.teardown();
        sink.emit(&AppEvent::Stopped);
    }

    fn teardown(&mut self) {
        self.stopped = true;
        self.timers.cancel_all();
        self.provider.shutdown();
        if let Some(id) = self.subscription.take() {
            self.source.unsubscribe(id);
            info!("Ad manager released foreground subscription");
        }
    }

    // ── Operations ────────────────────────────────────────────

    /// Make sure an ad is cached or being fetched.
    pub fn ensure_loaded(&mut self, sink: &mut impl EventSink) {
        if !self.is_live() {
            return;
        }
        self.process(Input::EnsureLoaded, sink);
    }

    /// Present the cached ad if it is fresh and the cooldown has elapsed.
    ///
    /// Never blocks; a `Presented` decision means the show request was
    /// issued, not that the ad is on screen.
    pub fn show_if_eligible(&mut self, sink: &mut impl EventSink) -> ShowDecision {
        if !self.is_live() {
            return ShowDecision::Unavailable;
        }
        self.ctx.decision = None;
        self.process(Input::ShowIfEligible, sink);
        let decision = self
            .ctx
            .decision
            .take()
            .unwrap_or(ShowDecision::Busy(self.fsm.current_state()));
        debug!("show_if_eligible -> {:?}", decision);
        decision
    }

    /// React to an app-state transition.
    pub fn on_lifecycle(&mut self, next: AppLifecycle, sink: &mut impl EventSink) {
        let prev = core::mem::replace(&mut self.app_state, next);
        if prev == next || !self.is_live() {
            return;
        }
        match next {
            AppLifecycle::Active => {
                info!("App has come to the foreground");
                self.show_if_eligible(sink);
            }
            AppLifecycle::Background => {
                // Have something ready for the next foreground.
                self.ensure_loaded(sink);
            }
            AppLifecycle::Inactive => {}
        }
    }

    /// Apply one event from the queue.
    pub fn handle_event(&mut self, event: Event, sink: &mut impl EventSink) {
        let input = match event {
            Event::Lifecycle(state) => {
                self.on_lifecycle(state, sink);
                return;
            }
            Event::Loaded { generation, handle } => Input::Loaded { generation, handle },
            Event::LoadFailed { generation, reason } => Input::LoadFailed { generation, reason },
            Event::Closed { handle } => Input::Closed { handle },
            Event::ShowFailed { handle, reason } => Input::ShowFailed { handle, reason },
        };
        if !self.is_live() {
            debug!("Ad manager inactive, dropping {:?}", input);
            return;
        }
        self.process(input, sink);
    }

    /// Process an external command from the host shell.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::EnsureLoaded => self.ensure_loaded(sink),
            AppCommand::ShowIfEligible => {
                self.show_if_eligible(sink);
            }
            AppCommand::Lifecycle(state) => self.on_lifecycle(state, sink),
            AppCommand::UpdateConfig(config) => {
                if let Err(e) = config.validate() {
                    warn!("Rejected ad config update: {}", e);
                    return;
                }
                self.ctx.apply_config(&config);
                self.provider.update_config(&config);
                self.config = config;
                info!("Ad configuration updated at runtime");
            }
        }
    }

    /// Run one loop iteration: drain the queue in FIFO order, poll the
    /// provider, drain again, fire due timers.  Returns the number of
    /// events handled.
    ///
    /// The queue is emptied before the provider runs so its completions
    /// never compete with a backlog of lifecycle signals.
    pub fn pump(&mut self, sink: &mut impl EventSink) -> usize {
        let now = self.clock.now_ms();
        let mut handled = self.drain(sink);
        if self.is_live() {
            self.provider.poll(now);
        }
        handled += self.drain(sink);

        let mut fired = FiredTimers::default();
        self.timers.poll(now, &mut fired);
        for (label, _) in fired.iter() {
            match *label {
                FIRST_RUN_TIMER => {
                    info!("First-run ad check");
                    self.show_if_eligible(sink);
                }
                PRESENTATION_WATCHDOG => self.presentation_timed_out(sink),
                _ => {}
            }
        }
        handled
    }

    fn drain(&mut self, sink: &mut impl EventSink) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            self.handle_event(event, sink);
            handled += 1;
        }
        handled
    }

    /// No close or error arrived for the ad on screen; the completion was
    /// lost.  Treat it as a show failure so the slot is released.
    fn presentation_timed_out(&mut self, sink: &mut impl EventSink) {
        if !self.is_live() || !self.is_showing() {
            return;
        }
        let Some(handle) = self.ctx.slot.handle() else {
            return;
        };
        warn!(
            "No close for app open ad {} after {}s, releasing it",
            handle, self.config.presentation_watchdog_secs
        );
        self.process(
            Input::ShowFailed {
                handle,
                reason: "presentation timed out".into(),
            },
            sink,
        );
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Read-only view of the slot.
    pub fn slot(&self) -> &AdSlot {
        &self.ctx.slot
    }

    /// When the last display attempt began, if any.
    pub fn last_shown_at(&self) -> Option<u64> {
        self.ctx.throttle.last_shown_at()
    }

    pub fn is_showing(&self) -> bool {
        self.fsm.current_state() == StateId::Presenting
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Number of manager timers still armed.
    pub fn armed_timers(&self) -> usize {
        self.timers.active_count()
    }

    pub fn stats(&self) -> AdStats {
        self.ctx.stats
    }

    pub fn config(&self) -> &AdConfig {
        &self.config
    }

    /// Another handle onto the manager's event queue.
    pub fn queue(&self) -> EventQueue {
        self.queue.clone()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    // ── Internal ──────────────────────────────────────────────

    /// Availability is re-checked on every operation and latches off.
    fn is_live(&mut self) -> bool {
        if self.stopped || !self.available {
            return false;
        }
        if !self.provider.is_available() {
            warn!("{}; app open ads disabled for this session", AdError::AdapterUnavailable);
            self.available = false;
            self.timers.remove_label(FIRST_RUN_TIMER);
            return false;
        }
        true
    }

    /// Dispatch `input` and everything it causes, strictly one at a time.
    fn process(&mut self, input: Input, sink: &mut impl EventSink) {
        let mut pending = VecDeque::from([input]);

        while let Some(input) = pending.pop_front() {
            self.ctx.now_ms = self.clock.now_ms();
            let from = self.fsm.current_state();
            self.fsm.dispatch(&input, &mut self.ctx);
            let to = self.fsm.current_state();
            if from != to {
                sink.emit(&AppEvent::StateChanged { from, to });
                self.track_presentation(from, to);
            }

            for event in self.ctx.events.iter() {
                sink.emit(event);
            }
            self.ctx.events.clear();

            let requests = core::mem::take(&mut self.ctx.requests);
            for request in requests {
                if let Some(failure) = self.issue(request, sink) {
                    pending.push_back(failure);
                }
            }

            if core::mem::take(&mut self.ctx.follow_up) {
                pending.push_back(Input::EnsureLoaded);
            }
        }
    }

    /// Keep the watchdog armed exactly while an ad is on screen.
    fn track_presentation(&mut self, from: StateId, to: StateId) {
        if from == StateId::Presenting {
            self.timers.remove_label(PRESENTATION_WATCHDOG);
        }
        if to == StateId::Presenting {
            let watchdog = Schedule {
                label: PRESENTATION_WATCHDOG,
                kind: ScheduleKind::OneShot {
                    delay_ms: self.config.presentation_watchdog_ms(),
                },
            };
            if self.timers.add(watchdog, self.ctx.now_ms).is_none() {
                warn!("No timer slot for the presentation watchdog");
            }
        }
    }

    /// Make one provider call.  A synchronous rejection comes back as the
    /// matching failure input.
    fn issue(&mut self, request: ProviderRequest, sink: &mut impl EventSink) -> Option<Input> {
        match request {
            ProviderRequest::Load(generation) => {
                info!("Loading app open ad (request {})", generation.0);
                self.ctx.stats.loads_requested += 1;
                sink.emit(&AppEvent::LoadRequested(generation));
                self.provider
                    .request_load(generation)
                    .err()
                    .map(|e| Input::LoadFailed {
                        generation,
                        reason: failure_reason(e),
                    })
            }
            ProviderRequest::Show(handle) => {
                self.ctx.stats.shows_requested += 1;
                sink.emit(&AppEvent::ShowRequested(handle));
                self.provider
                    .request_show(handle)
                    .err()
                    .map(|e| Input::ShowFailed {
                        handle,
                        reason: failure_reason(e),
                    })
            }
        }
    }
}

impl<P: AdProvider, F: ForegroundSource, C: Clock> Drop for AdLifecycleManager<P, F, C> {
    fn drop(&mut self) {
        if !self.stopped {
            self.teardown();
        }
    }
}

fn failure_reason(e: AdError) -> String {
    match e {
        AdError::LoadFailure(reason) | AdError::ShowFailure(reason) => reason,
        other => other.to_string(),
    }
}
