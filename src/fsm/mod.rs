//! Function-pointer finite state machine engine.
//!
//! Table-driven FSM for the App Open ad slot:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌────────────┬───────────┬──────────┬────────────────────┐  │
//! │  │ StateId    │ on_enter  │ on_exit  │ on_input           │  │
//! │  ├────────────┼───────────┼──────────┼────────────────────┤  │
//! │  │ Idle       │ fn(ctx)   │ -        │ fn(ctx,in)->Option │  │
//! │  │ Loading    │ fn(ctx)   │ -        │ fn(ctx,in)->Option │  │
//! │  │ Ready      │ -         │ -        │ fn(ctx,in)->Option │  │
//! │  │ Presenting │ fn(ctx)   │ fn(ctx)  │ fn(ctx,in)->Option │  │
//! │  └────────────┴───────────┴──────────┴────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each [`Input`] is handed to `on_input` of the **current** state.  If it
//! returns `Some(next_id)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next, and updates the current pointer.
//! All functions receive `&mut AdContext`, which holds the slot, the
//! pacing rules, the clock reading, and the outboxes the service drains
//! afterwards.  Handlers never call the provider themselves.

pub mod context;
pub mod states;

use context::{AdContext, Input};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Lifecycle states of the ad slot.
/// Must stay in sync with the table built in [`states::build_state_table`].
///
/// `Expired` is not a state: a `Ready` slot whose ad fails the expiry
/// policy drops its handle and goes straight back to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Loading = 1,
    Ready = 2,
    Presenting = 3,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Loading,
            2 => Self::Ready,
            3 => Self::Presenting,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut AdContext);

/// Signature for the input handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateInputFn = fn(&mut AdContext, &Input) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_input: StateInputFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Number of transitions taken since construction.
    transitions: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id as usize == i),
            "state table rows out of order"
        );
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `dispatch()`.
    pub fn start(&mut self, ctx: &mut AdContext) {
        info!("Ad FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Feed one input to the current state.
    ///
    /// Returns `true` if a transition happened.
    pub fn dispatch(&mut self, input: &Input, ctx: &mut AdContext) -> bool {
        let next = (self.table[self.current].on_input)(ctx, input);
        match next {
            Some(next_id) if next_id as usize != self.current => {
                self.transition(next_id, ctx);
                true
            }
            _ => false,
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        self.table[self.current].id
    }

    /// Total transitions taken.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut AdContext) {
        let next_idx = next_id as usize;

        info!(
            "Ad FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.transitions += 1;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
