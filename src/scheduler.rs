//! Timer engine.
//!
//! Deadline-based timers polled from the owner's loop.  The scheduler
//! notifies a [`SchedulerDelegate`] when a timer fires; it knows nothing
//! about ads, events, or queues.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Timer Users                          │
//! │                                                          │
//! │  ┌──────────────────┐          ┌──────────────────────┐  │
//! │  │ First-run check  │          │ Interstitial         │  │
//! │  │ (one-shot, 1 s)  │          │ countdown (1 s tick) │  │
//! │  └────────┬─────────┘          └──────────┬───────────┘  │
//! │           ▼                               ▼              │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │              Scheduler::poll(now_ms)               │  │
//! │  └───────────────────────┬────────────────────────────┘  │
//! │                          ▼                               │
//! │                 SchedulerDelegate                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Teardown calls [`Scheduler::cancel_all`] so no timer outlives its owner.

use crate::app::ports::{ScheduleFiredKind, SchedulerDelegate};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A single schedule entry.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Human-readable label, passed back to the delegate.
    pub label: &'static str,
    /// Type of schedule.
    pub kind: ScheduleKind,
}

/// The type of schedule determines how and when it fires.
#[derive(Debug, Clone, Copy)]
pub enum ScheduleKind {
    /// Fire every `interval_ms` milliseconds until removed.
    Periodic { interval_ms: u64 },
    /// Fire once after `delay_ms`, then free the slot.
    OneShot { delay_ms: u64 },
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent timers.
const MAX_SCHEDULES: usize = 4;

/// The scheduler engine.
pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
}

#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    /// Clock reading at which the timer next fires.
    due_at: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None],
        }
    }

    /// Arm a timer relative to `now_ms`.  Returns the slot index, or
    /// `None` if all slots are taken.
    pub fn add(&mut self, schedule: Schedule, now_ms: u64) -> Option<usize> {
        let delay = match schedule.kind {
            ScheduleKind::Periodic { interval_ms } => interval_ms,
            ScheduleKind::OneShot { delay_ms } => delay_ms,
        };
        for (i, slot) in self.schedules.iter_mut().enumerate() {
            if slot.is_none() {
                debug!("Scheduler: armed '{}' at slot {} (+{}ms)", schedule.label, i, delay);
                *slot = Some(ScheduleEntry {
                    schedule,
                    due_at: now_ms.saturating_add(delay),
                });
                return Some(i);
            }
        }
        None
    }

    /// Remove every timer with the given label.
    pub fn remove_label(&mut self, label: &str) {
        for slot in &mut self.schedules {
            if slot.as_ref().is_some_and(|e| e.schedule.label == label) {
                *slot = None;
            }
        }
    }

    /// Drop all timers.
    pub fn cancel_all(&mut self) {
        let n = self.active_count();
        self.schedules = [None, None, None, None];
        if n > 0 {
            info!("Scheduler: cancelled {} timer(s)", n);
        }
    }

    /// Fire every timer whose deadline is `<= now_ms`.
    ///
    /// A periodic timer that fell several intervals behind fires once and
    /// re-arms from `now_ms`.
    pub fn poll(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for slot in &mut self.schedules {
            let Some(entry) = slot else { continue };
            if now_ms < entry.due_at {
                continue;
            }

            let label = entry.schedule.label;
            let kind = entry.schedule.kind;
            match kind {
                ScheduleKind::Periodic { interval_ms } => {
                    entry.due_at = now_ms.saturating_add(interval_ms.max(1));
                    delegate.on_schedule_fired(label, ScheduleFiredKind::Periodic);
                }
                ScheduleKind::OneShot { delay_ms } => {
                    *slot = None;
                    debug!("Scheduler: '{}' one-shot fired (after {}ms)", label, delay_ms);
                    delegate.on_schedule_fired(label, ScheduleFiredKind::OneShot);
                }
            }
        }
    }

    /// Number of armed timers.
    pub fn active_count(&self) -> usize {
        self.schedules.iter().filter(|s| s.is_some()).count()
    }

    /// Whether a timer with this label is armed.
    pub fn is_armed(&self, label: &str) -> bool {
        self.schedules
            .iter()
            .flatten()
            .any(|e| e.schedule.label == label)
    }
}

/// Delegate that just remembers which timers fired, for owners that
/// cannot act on a fire while the scheduler is borrowed.
#[derive(Debug, Default)]
pub struct FiredTimers {
    fired: heapless::Vec<(&'static str, ScheduleFiredKind), MAX_SCHEDULES>,
}

impl FiredTimers {
    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, ScheduleFiredKind)> {
        self.fired.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

impl SchedulerDelegate for FiredTimers {
    fn on_schedule_fired(&mut self, label: &'static str, kind: ScheduleFiredKind) {
        // At most one fire per slot per poll, so this cannot overflow.
        let _ = self.fired.push((label, kind));
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
