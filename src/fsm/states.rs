//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch.
//!
//! ```text
//!  IDLE ──[ensure_loaded / show]──▶ LOADING ──[LOADED]──▶ READY
//!    ▲                                 │                    │
//!    │◀────────────[ERROR]─────────────┘      [show, fresh, │
//!    │                                         cooled down] │
//!    │                                                      ▼
//!    └──[CLOSED / show ERROR, then prefetch]────────── PRESENTING
//!
//!  READY ──[stale per max_age]──▶ LOADING   (handle discarded)
//! ```
//!
//! Events whose generation or handle does not match the slot are late
//! answers to superseded requests and are dropped without a transition.

use super::context::{AdContext, Input, ProviderRequest, ShowDecision};
use super::{StateDescriptor, StateId};
use crate::app::events::AppEvent;
use crate::error::AdError;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_input: idle_input,
        },
        // Index 1: Loading
        StateDescriptor {
            id: StateId::Loading,
            name: "Loading",
            on_enter: Some(loading_enter),
            on_exit: None,
            on_input: loading_input,
        },
        // Index 2: Ready
        StateDescriptor {
            id: StateId::Ready,
            name: "Ready",
            on_enter: None,
            on_exit: None,
            on_input: ready_input,
        },
        // Index 3: Presenting
        StateDescriptor {
            id: StateId::Presenting,
            name: "Presenting",
            on_enter: Some(presenting_enter),
            on_exit: Some(presenting_exit),
            on_input: presenting_input,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════════════════

fn late(ctx: &mut AdContext, input: &Input) -> Option<StateId> {
    debug!("Ignoring late ad event: {:?}", input);
    ctx.stats.late_events_ignored += 1;
    ctx.note(AppEvent::LateEventIgnored);
    None
}

fn discard_stale(ctx: &mut AdContext) {
    if let Some(ad) = ctx.slot.clear() {
        info!(
            "Discarding stale ad {} (loaded at {}ms, now {}ms)",
            ad.handle, ad.loaded_at, ctx.now_ms
        );
        ctx.stats.stale_discards += 1;
        ctx.note(AppEvent::StaleDiscarded(ad.handle));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut AdContext) {
    ctx.slot.clear();
}

fn idle_input(ctx: &mut AdContext, input: &Input) -> Option<StateId> {
    match input {
        Input::EnsureLoaded => Some(StateId::Loading),
        Input::ShowIfEligible => {
            info!("App open ad not loaded yet, loading");
            ctx.decision = Some(ShowDecision::NotReady);
            Some(StateId::Loading)
        }
        _ => late(ctx, input),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOADING state
// ═══════════════════════════════════════════════════════════════════════════

fn loading_enter(ctx: &mut AdContext) {
    let generation = ctx.slot.begin_loading();
    ctx.request(ProviderRequest::Load(generation));
}

fn loading_input(ctx: &mut AdContext, input: &Input) -> Option<StateId> {
    match input {
        Input::EnsureLoaded => None,
        Input::ShowIfEligible => {
            ctx.decision = Some(ShowDecision::Busy(StateId::Loading));
            None
        }
        Input::Loaded { generation, handle } => {
            if ctx.slot.fill(*generation, *handle, ctx.now_ms) {
                ctx.note(AppEvent::AdLoaded {
                    handle: *handle,
                    loaded_at: ctx.now_ms,
                });
                Some(StateId::Ready)
            } else {
                late(ctx, input)
            }
        }
        Input::LoadFailed { generation, reason } if *generation == ctx.slot.generation() => {
            warn!("App open ad failed to load: {}", reason);
            ctx.stats.load_failures += 1;
            ctx.note(AppEvent::Failure(AdError::LoadFailure(reason.clone())));
            Some(StateId::Idle)
        }
        _ => late(ctx, input),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  READY state
// ═══════════════════════════════════════════════════════════════════════════

fn ready_input(ctx: &mut AdContext, input: &Input) -> Option<StateId> {
    match input {
        Input::EnsureLoaded => {
            if ctx.has_fresh_ad() {
                None
            } else {
                discard_stale(ctx);
                Some(StateId::Loading)
            }
        }
        Input::ShowIfEligible => {
            // Freshness first: a stale ad is dropped even during cooldown.
            if !ctx.has_fresh_ad() {
                discard_stale(ctx);
                ctx.decision = Some(ShowDecision::Expired);
                return Some(StateId::Loading);
            }
            if let Some(remaining_ms) = ctx.throttle.remaining_ms(ctx.now_ms) {
                debug!("App open ad cooling down ({}ms left)", remaining_ms);
                ctx.decision = Some(ShowDecision::CoolingDown { remaining_ms });
                return None;
            }
            ctx.decision = Some(ShowDecision::Presented);
            Some(StateId::Presenting)
        }
        _ => late(ctx, input),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  PRESENTING state
// ═══════════════════════════════════════════════════════════════════════════

fn presenting_enter(ctx: &mut AdContext) {
    // Recorded at the start of the attempt so a show in progress cannot
    // re-trigger itself.
    ctx.throttle.record(ctx.now_ms);
    if let Some(handle) = ctx.slot.begin_showing() {
        info!("Showing app open ad {}", handle);
        ctx.request(ProviderRequest::Show(handle));
    }
}

fn presenting_exit(ctx: &mut AdContext) {
    ctx.slot.clear();
}

fn presenting_input(ctx: &mut AdContext, input: &Input) -> Option<StateId> {
    match input {
        Input::EnsureLoaded => None,
        Input::ShowIfEligible => {
            info!("App open ad is already showing");
            ctx.decision = Some(ShowDecision::Busy(StateId::Presenting));
            None
        }
        Input::Closed { handle } if ctx.slot.is_showing(*handle) => {
            ctx.stats.closes += 1;
            ctx.note(AppEvent::AdClosed(*handle));
            ctx.follow_up = true;
            Some(StateId::Idle)
        }
        Input::ShowFailed { handle, reason } if ctx.slot.is_showing(*handle) => {
            warn!("Error showing app open ad {}: {}", handle, reason);
            ctx.stats.show_failures += 1;
            ctx.note(AppEvent::Failure(AdError::ShowFailure(reason.clone())));
            ctx.follow_up = true;
            Some(StateId::Idle)
        }
        _ => late(ctx, input),
    }
}
