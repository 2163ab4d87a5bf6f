//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured ad events to the `log`
//! facade.  An analytics adapter would implement the same trait.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { available } => {
                info!("START | ads_available={}", available);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::LoadRequested(generation) => {
                info!("LOAD  | request={}", generation.0);
            }
            AppEvent::AdLoaded { handle, loaded_at } => {
                info!("LOAD  | {} ready at {}ms", handle, loaded_at);
            }
            AppEvent::ShowRequested(handle) => {
                info!("SHOW  | {}", handle);
            }
            AppEvent::AdClosed(handle) => {
                info!("SHOW  | {} closed", handle);
            }
            AppEvent::StaleDiscarded(handle) => {
                info!("STALE | {} discarded", handle);
            }
            AppEvent::Failure(e) if e.is_transient() => {
                warn!("FAIL  | {}", e);
            }
            AppEvent::Failure(e) => {
                error!("FAIL  | {} (not retried)", e);
            }
            AppEvent::LateEventIgnored => {
                info!("LATE  | event for superseded request ignored");
            }
            AppEvent::Stopped => {
                info!("STOP  | timers cancelled");
            }
        }
    }
}
