//! In-process foreground signal source.
//!
//! Implements [`ForegroundSource`] for hosts that learn about app-state
//! changes from their own UI layer.  [`ForegroundNotifier`] handles can be
//! cloned and moved to any thread; `notify()` marshals the transition onto
//! every subscribed manager's [`EventQueue`].

use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::app::ports::{AppLifecycle, ForegroundSource, SubscriptionId};
use crate::error::AdError;
use crate::events::{Event, EventQueue};

#[derive(Default)]
struct Subscribers {
    next_id: u32,
    entries: Vec<(SubscriptionId, EventQueue)>,
}

/// Foreground source backed by a shared subscriber list.
#[derive(Clone, Default)]
pub struct QueueForegroundSource {
    subscribers: Arc<Mutex<Subscribers>>,
}

/// Cloneable producer half of a [`QueueForegroundSource`].
#[derive(Clone)]
pub struct ForegroundNotifier {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl QueueForegroundSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle the OS / UI layer can use to report transitions.
    pub fn notifier(&self) -> ForegroundNotifier {
        ForegroundNotifier {
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl ForegroundSource for QueueForegroundSource {
    fn subscribe(&mut self, queue: EventQueue) -> Result<SubscriptionId, AdError> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| AdError::SignalSource("subscriber list poisoned".into()))?;
        subs.next_id = subs.next_id.wrapping_add(1);
        let id = SubscriptionId(subs.next_id);
        subs.entries.push((id, queue));
        debug!("Foreground source: subscription {} added", id.0);
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        let mut subs = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subs.entries.len();
        subs.entries.retain(|(sid, _)| *sid != id);
        if subs.entries.len() != before {
            debug!("Foreground source: subscription {} removed", id.0);
        }
    }
}

impl ForegroundNotifier {
    /// Deliver a transition to every subscriber.
    pub fn notify(&self, state: AppLifecycle) {
        let subs = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        for (id, queue) in &subs.entries {
            if !queue.push(Event::Lifecycle(state)) {
                warn!("Foreground source: subscriber {} queue full", id.0);
            }
        }
    }
}
