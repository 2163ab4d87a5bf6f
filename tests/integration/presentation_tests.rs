//! The HTML fallback provider driven through the manager.

use super::fakes::{CapturingSource, LogSink};

use appopen::adapters::html::HtmlAdProvider;
use appopen::adapters::time::ManualClock;
use appopen::app::commands::AppCommand;
use appopen::app::events::AppEvent;
use appopen::app::ports::PresentationSurface;
use appopen::app::service::{AdLifecycleManager, ShowDecision};
use appopen::config::{AdConfig, Platform};
use appopen::error::AdError;
use appopen::events::EventQueue;
use appopen::fsm::StateId;

#[derive(Default)]
struct WebView {
    pages: Vec<String>,
    countdowns: Vec<u8>,
    dismissals: u32,
    broken: bool,
}

impl PresentationSurface for WebView {
    fn render(&mut self, markup: &str) -> Result<(), String> {
        if self.broken {
            return Err("renderer crashed".into());
        }
        self.pages.push(markup.to_string());
        Ok(())
    }

    fn update_countdown(&mut self, secs_left: u8) {
        self.countdowns.push(secs_left);
    }

    fn dismiss(&mut self) {
        self.dismissals += 1;
    }
}

type Manager = AdLifecycleManager<HtmlAdProvider<WebView>, CapturingSource, ManualClock>;

fn ready_manager(view: WebView) -> (Manager, ManualClock, LogSink) {
    let config = AdConfig {
        android_unit_id: "android-slot".into(),
        ..Default::default()
    };
    let queue = EventQueue::new();
    let clock = ManualClock::new(0);
    let provider = HtmlAdProvider::new(&config, Platform::Android, view, queue.clone());
    let mut sink = LogSink::new();
    let mut mgr = AdLifecycleManager::new(
        config,
        provider,
        CapturingSource::default(),
        clock.clone(),
        queue,
    );
    mgr.start(&mut sink);
    mgr.ensure_loaded(&mut sink);
    mgr.pump(&mut sink);
    assert_eq!(mgr.state(), StateId::Ready);
    (mgr, clock, sink)
}

#[test]
fn countdown_closes_and_next_ad_is_prefetched() {
    let (mut mgr, clock, mut sink) = ready_manager(WebView::default());

    // The first-run check presents the cached ad.
    clock.set(1000);
    mgr.pump(&mut sink);
    assert!(mgr.is_showing());
    assert_eq!(mgr.provider().surface().pages.len(), 1);
    assert!(mgr.provider().surface().pages[0].contains("android-slot"));

    for t in (1100..=5100).step_by(1000) {
        clock.set(t);
        mgr.pump(&mut sink);
        assert!(mgr.is_showing(), "closed early at {t}ms");
    }

    clock.set(6100);
    mgr.pump(&mut sink);
    assert_eq!(mgr.stats().closes, 1);
    assert_eq!(mgr.state(), StateId::Loading);
    assert_eq!(mgr.provider().surface().countdowns, vec![5, 4, 3, 2, 1]);
    assert_eq!(mgr.provider().surface().dismissals, 1);

    clock.set(6200);
    mgr.pump(&mut sink);
    assert_eq!(mgr.state(), StateId::Ready);
}

#[test]
fn user_tap_closes_early() {
    let (mut mgr, clock, mut sink) = ready_manager(WebView::default());
    clock.set(1000);
    assert_eq!(mgr.show_if_eligible(&mut sink), ShowDecision::Presented);

    mgr.provider_mut().dismiss();
    mgr.pump(&mut sink);
    assert_eq!(mgr.stats().closes, 1);
    assert!(!mgr.is_showing());
}

#[test]
fn render_failure_is_a_show_error() {
    let view = WebView {
        broken: true,
        ..Default::default()
    };
    let (mut mgr, clock, mut sink) = ready_manager(view);
    clock.set(1000);
    mgr.show_if_eligible(&mut sink);

    assert_eq!(mgr.stats().show_failures, 1);
    assert!(sink.contains(&AppEvent::Failure(AdError::ShowFailure(
        "renderer crashed".into()
    ))));
    // Released and reloading.
    assert_eq!(mgr.state(), StateId::Loading);
}

#[test]
fn reported_surface_error_is_a_show_error() {
    let (mut mgr, clock, mut sink) = ready_manager(WebView::default());
    clock.set(1000);
    mgr.show_if_eligible(&mut sink);

    mgr.provider_mut().report_error("script blocked");
    mgr.pump(&mut sink);
    assert_eq!(mgr.stats().show_failures, 1);
    assert_eq!(mgr.provider().surface().dismissals, 1);
    assert!(!mgr.is_showing());
}

#[test]
fn shutdown_mid_countdown_takes_the_page_down() {
    let (mut mgr, clock, mut sink) = ready_manager(WebView::default());
    clock.set(1000);
    mgr.pump(&mut sink);
    clock.set(1100);
    mgr.pump(&mut sink);
    assert!(mgr.provider().is_presenting());

    mgr.shutdown(&mut sink);
    assert!(!mgr.provider().is_presenting());
    assert_eq!(mgr.provider().surface().dismissals, 1);

    clock.set(10_000);
    mgr.pump(&mut sink);
    assert_eq!(mgr.provider().surface().countdowns, vec![5]);
    assert_eq!(mgr.stats().closes, 0);
}

#[test]
fn config_update_changes_the_next_page() {
    let (mut mgr, clock, mut sink) = ready_manager(WebView::default());
    let config = AdConfig {
        android_unit_id: "android-slot-b".into(),
        presentation_timeout_secs: 2,
        ..Default::default()
    };
    mgr.handle_command(AppCommand::UpdateConfig(config), &mut sink);

    clock.set(1000);
    mgr.pump(&mut sink);
    assert!(mgr.provider().surface().pages[0].contains("android-slot-b"));

    for t in [1100, 2100, 3100] {
        clock.set(t);
        mgr.pump(&mut sink);
    }
    assert_eq!(mgr.provider().surface().countdowns, vec![2, 1]);
    assert_eq!(mgr.stats().closes, 1);
}
