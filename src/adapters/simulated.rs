//! Simulated ad provider.
//!
//! Stand-in for the native SDK on hosts that have none (desktop builds,
//! demos, soak tests).  Loads complete on the next poll; a shown ad closes
//! itself after `display_ms`.  Failures and absence can be scripted.

use std::collections::VecDeque;

use log::info;

use crate::app::ports::AdProvider;
use crate::error::AdError;
use crate::events::{Event, EventQueue};
use crate::inventory::{AdHandle, Generation};

/// How long a simulated ad stays on screen.
pub const DEFAULT_DISPLAY_MS: u64 = 3000;

#[derive(Debug, Clone, Copy)]
struct OnScreen {
    handle: AdHandle,
    /// Set on the first poll after the show request.
    since: Option<u64>,
}

/// Provider that fakes an ad network in-process.
pub struct SimulatedProvider {
    queue: EventQueue,
    available: bool,
    display_ms: u64,
    next_handle: u64,
    latest: Option<AdHandle>,
    pending_loads: VecDeque<Generation>,
    on_screen: Option<OnScreen>,
    fail_next_loads: u32,
}

impl SimulatedProvider {
    pub fn new(queue: EventQueue) -> Self {
        Self {
            queue,
            available: true,
            display_ms: DEFAULT_DISPLAY_MS,
            next_handle: 0,
            latest: None,
            pending_loads: VecDeque::new(),
            on_screen: None,
            fail_next_loads: 0,
        }
    }

    /// A provider that reports the SDK as missing.
    pub fn unavailable(queue: EventQueue) -> Self {
        Self {
            available: false,
            ..Self::new(queue)
        }
    }

    pub fn with_display_ms(mut self, display_ms: u64) -> Self {
        self.display_ms = display_ms;
        self
    }

    /// Make the next `n` loads fail with "no fill".
    pub fn fail_next_loads(&mut self, n: u32) {
        self.fail_next_loads = n;
    }

    /// User tapped the close button.
    pub fn dismiss(&mut self) {
        if let Some(shown) = self.on_screen.take() {
            info!("Simulated ad {} dismissed by user", shown.handle);
            self.queue.push(Event::Closed {
                handle: shown.handle,
            });
        }
    }

    pub fn is_on_screen(&self) -> bool {
        self.on_screen.is_some()
    }
}

impl AdProvider for SimulatedProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_load(&mut self, generation: Generation) -> Result<(), AdError> {
        self.pending_loads.push_back(generation);
        Ok(())
    }

    fn request_show(&mut self, handle: AdHandle) -> Result<(), AdError> {
        if self.latest != Some(handle) {
            return Err(AdError::ShowFailure(format!("{handle} was never loaded")));
        }
        if self.on_screen.is_some() {
            return Err(AdError::ShowFailure("another ad is on screen".into()));
        }
        info!("Simulated ad {} on screen", handle);
        self.on_screen = Some(OnScreen {
            handle,
            since: None,
        });
        Ok(())
    }

    fn shutdown(&mut self) {
        self.pending_loads.clear();
        if let Some(shown) = self.on_screen.take() {
            info!("Simulated ad {} taken down on shutdown", shown.handle);
        }
    }

    fn poll(&mut self, now_ms: u64) {
        while let Some(generation) = self.pending_loads.pop_front() {
            let event = if self.fail_next_loads > 0 {
                self.fail_next_loads -= 1;
                Event::LoadFailed {
                    generation,
                    reason: "no fill".into(),
                }
            } else {
                self.next_handle += 1;
                let handle = AdHandle(self.next_handle);
                self.latest = Some(handle);
                Event::Loaded { generation, handle }
            };
            self.queue.push(event);
        }

        if let Some(shown) = &mut self.on_screen {
            let since = *shown.since.get_or_insert(now_ms);
            if now_ms.saturating_sub(since) >= self.display_ms {
                let handle = shown.handle;
                self.on_screen = None;
                self.queue.push(Event::Closed { handle });
            }
        }
    }
}
