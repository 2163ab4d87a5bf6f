//! Inbound event queue.
//!
//! Events are produced by:
//! - the ad provider (load / show completions, possibly from an SDK thread)
//! - the foreground signal source (OS app-state notifier)
//! - presentation surfaces (countdown expiry, user tap, render error)
//!
//! Events are consumed by the lifecycle manager, which processes them one
//! at a time in FIFO order.  This is the only path by which another
//! execution context can influence the slot.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ Ad SDK       │────▶│              │     │                  │
//! │ App state    │────▶│  EventQueue  │────▶│ AdLifecycleMgr   │
//! │ Surface      │────▶│  (bounded)   │     │ (single consumer)│
//! └──────────────┘     └──────────────┘     └──────────────────┘
//! ```

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::ports::AppLifecycle;
use crate::inventory::{AdHandle, Generation};

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 16;

/// Everything the manager can be told asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A load request completed.
    Loaded {
        generation: Generation,
        handle: AdHandle,
    },
    /// A load request failed.
    LoadFailed {
        generation: Generation,
        reason: String,
    },
    /// A presented ad went away (timeout, user tap, or SDK dismissal).
    Closed { handle: AdHandle },
    /// A presentation failed before or while showing.
    ShowFailed { handle: AdHandle, reason: String },
    /// The host app changed lifecycle state.
    Lifecycle(AppLifecycle),
}

/// Bounded MPSC queue shared between producers and the manager.
///
/// Cloning is cheap and yields another handle onto the same queue.
#[derive(Clone)]
pub struct EventQueue {
    inner: Arc<Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_CAP>>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Channel::new()),
        }
    }

    /// Push an event.  Safe to call from any thread.
    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: Event) -> bool {
        match self.inner.try_send(event) {
            Ok(()) => true,
            Err(embassy_sync::channel::TrySendError::Full(dropped)) => {
                warn!("Event queue full, dropping {:?}", dropped);
                false
            }
        }
    }

    /// Pop the next event, or `None` if the queue is empty.
    pub fn pop(&self) -> Option<Event> {
        self.inner.try_receive().ok()
    }

    /// Drain all pending events into a callback, in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl core::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventQueue").field("len", &self.len()).finish()
    }
}
