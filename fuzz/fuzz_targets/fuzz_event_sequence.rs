//! Fuzz target: `AdLifecycleManager` under arbitrary event sequences
//!
//! Each input byte is one step: the low nibble picks an operation, the
//! high nibble picks which earlier request or ad it refers to (or how far
//! to move the clock).  Asserts that:
//! - nothing panics
//! - the slot holds an ad exactly in `Ready` / `Presenting`
//! - a second show is never issued while one is in flight
//!
//! cargo fuzz run fuzz_event_sequence

#![no_main]

use appopen::adapters::time::ManualClock;
use appopen::app::events::AppEvent;
use appopen::app::ports::{AdProvider, AppLifecycle, EventSink, ForegroundSource, SubscriptionId};
use appopen::app::service::AdLifecycleManager;
use appopen::config::AdConfig;
use appopen::error::AdError;
use appopen::events::{Event, EventQueue};
use appopen::fsm::StateId;
use appopen::inventory::{AdHandle, Generation};
use libfuzzer_sys::fuzz_target;

struct Recorder {
    loads: Vec<Generation>,
    shows: Vec<AdHandle>,
    reject_next: bool,
}

impl AdProvider for Recorder {
    fn is_available(&self) -> bool {
        true
    }
    fn request_load(&mut self, generation: Generation) -> Result<(), AdError> {
        self.loads.push(generation);
        if core::mem::take(&mut self.reject_next) {
            return Err(AdError::LoadFailure("rejected".into()));
        }
        Ok(())
    }
    fn request_show(&mut self, handle: AdHandle) -> Result<(), AdError> {
        self.shows.push(handle);
        if core::mem::take(&mut self.reject_next) {
            return Err(AdError::ShowFailure("rejected".into()));
        }
        Ok(())
    }
}

struct Silent;

impl ForegroundSource for Silent {
    fn subscribe(&mut self, _queue: EventQueue) -> Result<SubscriptionId, AdError> {
        Ok(SubscriptionId(0))
    }
    fn unsubscribe(&mut self, _id: SubscriptionId) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fn pick<T: Copy>(items: &[T], selector: u8) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[usize::from(selector) % items.len()])
    }
}

fuzz_target!(|data: &[u8]| {
    let clock = ManualClock::new(0);
    let queue = EventQueue::new();
    let recorder = Recorder {
        loads: Vec::new(),
        shows: Vec::new(),
        reject_next: false,
    };
    let mut mgr =
        AdLifecycleManager::new(AdConfig::default(), recorder, Silent, clock.clone(), queue.clone());
    let mut sink = Discard;
    mgr.start(&mut sink);

    let mut next_handle = 0u64;
    for &byte in data {
        let (op, arg) = (byte & 0x0f, byte >> 4);
        let was_presenting = mgr.is_showing();
        let shows_before = mgr.provider().shows.len();

        match op {
            0 => mgr.ensure_loaded(&mut sink),
            1 => {
                mgr.show_if_eligible(&mut sink);
            }
            2 => mgr.on_lifecycle(AppLifecycle::Active, &mut sink),
            3 => mgr.on_lifecycle(AppLifecycle::Inactive, &mut sink),
            4 => mgr.on_lifecycle(AppLifecycle::Background, &mut sink),
            5 => clock.advance(u64::from(arg) * 1000),
            6 => clock.advance(u64::from(arg) * 30 * 60 * 1000),
            7 => {
                if let Some(generation) = pick(&mgr.provider().loads, arg) {
                    next_handle += 1;
                    queue.push(Event::Loaded {
                        generation,
                        handle: AdHandle(next_handle),
                    });
                }
            }
            8 => {
                if let Some(generation) = pick(&mgr.provider().loads, arg) {
                    queue.push(Event::LoadFailed {
                        generation,
                        reason: "no fill".into(),
                    });
                }
            }
            9 => {
                if let Some(handle) = pick(&mgr.provider().shows, arg) {
                    queue.push(Event::Closed { handle });
                }
            }
            10 => {
                if let Some(handle) = pick(&mgr.provider().shows, arg) {
                    queue.push(Event::ShowFailed {
                        handle,
                        reason: "dismissed".into(),
                    });
                }
            }
            11 => mgr.provider_mut().reject_next = true,
            _ => {
                mgr.pump(&mut sink);
            }
        }

        if mgr.provider().shows.len() > shows_before {
            assert!(!was_presenting, "second show while one is in flight");
        }
        let holds = mgr.slot().handle().is_some();
        match mgr.state() {
            StateId::Ready | StateId::Presenting => assert!(holds),
            StateId::Idle | StateId::Loading => assert!(!holds),
        }
    }

    mgr.shutdown(&mut sink);
});
