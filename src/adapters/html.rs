//! Local HTML ad provider.
//!
//! Fallback path for hosts without the native app-open SDK: the ad is a
//! literal AdSense snippet rendered full screen on a
//! [`PresentationSurface`], with a countdown that closes it automatically
//! and a close button the user may tap at any time.
//!
//! Because the markup is local, a load completes on the next poll and
//! never fails for lack of fill.  Rendering errors are reported as
//! `ShowFailed`, which the manager treats like any other show error.

use log::{debug, info, warn};

use crate::app::ports::{AdProvider, PresentationSurface, ScheduleFiredKind};
use crate::config::{AdConfig, Platform};
use crate::error::AdError;
use crate::events::{Event, EventQueue};
use crate::inventory::{AdHandle, Generation};
use crate::scheduler::{FiredTimers, Schedule, ScheduleKind, Scheduler};

const COUNTDOWN_LABEL: &str = "countdown";
const COUNTDOWN_TICK_MS: u64 = 1000;

/// Build the full-screen page for one ad unit.
pub fn ad_markup(ad_client: &str, ad_unit_id: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<script async src="https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client={ad_client}" crossorigin="anonymous"></script>
<style>
body {{ margin: 0; display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 100vh; background: #fff; }}
.ad-note {{ font-family: sans-serif; font-size: 12px; color: #666; margin-top: 8px; }}
</style>
</head>
<body>
<h2>Advertisement</h2>
<p class="ad-note">This ad supports Egypt Urban Maps</p>
<ins class="adsbygoogle" style="display:block" data-ad-client="{ad_client}" data-ad-slot="{ad_unit_id}" data-ad-format="auto" data-full-width-responsive="true"></ins>
<script>(adsbygoogle = window.adsbygoogle || []).push({{}});</script>
</body>
</html>"#
    )
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    handle: AdHandle,
    secs_left: u8,
    /// The tick timer is armed on the first poll after render.
    armed: bool,
}

/// [`AdProvider`] that renders markup on a [`PresentationSurface`].
pub struct HtmlAdProvider<S: PresentationSurface> {
    surface: S,
    queue: EventQueue,
    platform: Platform,
    markup: String,
    countdown_secs: u8,
    timers: Scheduler,
    next_handle: u64,
    latest: Option<AdHandle>,
    pending_load: Option<Generation>,
    countdown: Option<Countdown>,
}

impl<S: PresentationSurface> HtmlAdProvider<S> {
    pub fn new(config: &AdConfig, platform: Platform, surface: S, queue: EventQueue) -> Self {
        let markup = ad_markup(&config.ad_client, config.ad_unit_id(platform));
        Self {
            surface,
            queue,
            platform,
            markup,
            countdown_secs: config.presentation_timeout_secs,
            timers: Scheduler::new(),
            next_handle: 0,
            latest: None,
            pending_load: None,
            countdown: None,
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The user tapped the close button.
    pub fn dismiss(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            info!("HTML ad {} closed by user", countdown.handle);
            self.finish(countdown.handle, Event::Closed {
                handle: countdown.handle,
            });
        }
    }

    /// The surface reported an error after rendering (script blocked,
    /// network gone).
    pub fn report_error(&mut self, reason: &str) {
        if let Some(countdown) = self.countdown.take() {
            warn!("HTML ad {} failed: {}", countdown.handle, reason);
            self.finish(countdown.handle, Event::ShowFailed {
                handle: countdown.handle,
                reason: reason.into(),
            });
        }
    }

    pub fn is_presenting(&self) -> bool {
        self.countdown.is_some()
    }

    fn finish(&mut self, handle: AdHandle, event: Event) {
        self.timers.remove_label(COUNTDOWN_LABEL);
        self.surface.dismiss();
        debug!("HTML ad {} torn down", handle);
        self.queue.push(event);
    }

    fn tick(&mut self) {
        let Some(countdown) = &mut self.countdown else {
            return;
        };
        countdown.secs_left = countdown.secs_left.saturating_sub(1);
        let (handle, secs_left) = (countdown.handle, countdown.secs_left);
        if secs_left == 0 {
            self.countdown = None;
            self.finish(handle, Event::Closed { handle });
        } else {
            self.surface.update_countdown(secs_left);
        }
    }
}

impl<S: PresentationSurface> AdProvider for HtmlAdProvider<S> {
    fn is_available(&self) -> bool {
        !self.markup.is_empty()
    }

    fn request_load(&mut self, generation: Generation) -> Result<(), AdError> {
        self.pending_load = Some(generation);
        Ok(())
    }

    fn request_show(&mut self, handle: AdHandle) -> Result<(), AdError> {
        if self.latest != Some(handle) {
            return Err(AdError::ShowFailure(format!("{handle} was never loaded")));
        }
        if self.countdown.is_some() {
            return Err(AdError::ShowFailure("another ad is on screen".into()));
        }
        self.surface
            .render(&self.markup)
            .map_err(AdError::ShowFailure)?;
        self.surface.update_countdown(self.countdown_secs);
        self.countdown = Some(Countdown {
            handle,
            secs_left: self.countdown_secs,
            armed: false,
        });
        info!("HTML ad {} rendered", handle);
        Ok(())
    }

    fn update_config(&mut self, config: &AdConfig) {
        self.markup = ad_markup(&config.ad_client, config.ad_unit_id(self.platform));
        self.countdown_secs = config.presentation_timeout_secs;
        debug!("HTML ad markup rebuilt for {:?}", self.platform);
    }

    fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.pending_load = None;
        if let Some(countdown) = self.countdown.take() {
            self.surface.dismiss();
            info!("HTML ad {} taken down on shutdown", countdown.handle);
        }
    }

    fn poll(&mut self, now_ms: u64) {
        if let Some(generation) = self.pending_load.take() {
            self.next_handle += 1;
            let handle = AdHandle(self.next_handle);
            self.latest = Some(handle);
            self.queue.push(Event::Loaded { generation, handle });
        }

        let needs_timer = self
            .countdown
            .as_mut()
            .is_some_and(|c| !std::mem::replace(&mut c.armed, true));
        if needs_timer {
            let tick = Schedule {
                label: COUNTDOWN_LABEL,
                kind: ScheduleKind::Periodic {
                    interval_ms: COUNTDOWN_TICK_MS,
                },
            };
            if self.timers.add(tick, now_ms).is_none() {
                warn!("No timer slot for the ad countdown");
            }
        }

        let mut fired = FiredTimers::default();
        self.timers.poll(now_ms, &mut fired);
        for &(label, kind) in fired.iter() {
            if label == COUNTDOWN_LABEL && kind == ScheduleFiredKind::Periodic {
                self.tick();
            }
        }
    }
}
