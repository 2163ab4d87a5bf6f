//! Foreground transitions, availability, and subscription handling.

use super::fakes::{
    BrokenSource, CapturingSource, ProviderCall, ScriptedProvider, load, started, started_with,
};

use appopen::app::commands::AppCommand;
use appopen::app::events::AppEvent;
use appopen::app::ports::AppLifecycle;
use appopen::app::service::ShowDecision;
use appopen::error::AdError;
use appopen::events::Event;
use appopen::fsm::StateId;
use appopen::inventory::AdHandle;

fn transition(queue_owner: &CapturingSource, state: AppLifecycle) {
    let queue = queue_owner.queue.as_ref().expect("subscribed");
    assert!(queue.push(Event::Lifecycle(state)));
}

#[test]
fn inactive_to_active_presents() {
    let (mut mgr, clock, mut sink) = started(ScriptedProvider::new());
    load(&mut mgr, &mut sink, 1);

    clock.set(500);
    transition(mgr.source(), AppLifecycle::Inactive);
    transition(mgr.source(), AppLifecycle::Active);
    mgr.pump(&mut sink);

    assert_eq!(mgr.provider().shows(), vec![AdHandle(1)]);
    assert_eq!(mgr.last_shown_at(), Some(500));
}

#[test]
fn repeated_active_is_not_a_transition() {
    let (mut mgr, _clock, mut sink) = started(ScriptedProvider::new());
    load(&mut mgr, &mut sink, 1);

    // The manager starts out considering the app active.
    transition(mgr.source(), AppLifecycle::Active);
    transition(mgr.source(), AppLifecycle::Active);
    mgr.pump(&mut sink);
    assert!(mgr.provider().shows().is_empty());
}

#[test]
fn foreground_with_nothing_cached_loads_instead() {
    let (mut mgr, _clock, mut sink) = started(ScriptedProvider::new());
    mgr.on_lifecycle(AppLifecycle::Background, &mut sink);
    assert_eq!(mgr.provider().loads().len(), 1);

    // Load still in flight when the user returns.
    mgr.on_lifecycle(AppLifecycle::Active, &mut sink);
    assert_eq!(mgr.state(), StateId::Loading);
    assert_eq!(mgr.provider().loads().len(), 1, "no duplicate load");
    assert!(mgr.provider().shows().is_empty());
}

#[test]
fn show_from_idle_reports_not_ready_and_loads() {
    let (mut mgr, _clock, mut sink) = started(ScriptedProvider::new());
    assert_eq!(mgr.show_if_eligible(&mut sink), ShowDecision::NotReady);
    assert_eq!(mgr.state(), StateId::Loading);
    assert_eq!(mgr.show_if_eligible(&mut sink), ShowDecision::Busy(StateId::Loading));
}

#[test]
fn signal_source_failure_is_reported_and_manager_continues() {
    let (mut mgr, _clock, mut sink) = started_with(ScriptedProvider::new(), BrokenSource);
    assert!(sink.contains(&AppEvent::Failure(AdError::SignalSource(
        "notifier not registered".into()
    ))));

    load(&mut mgr, &mut sink, 1);
    assert_eq!(mgr.show_if_eligible(&mut sink), ShowDecision::Presented);

    // Nothing to unsubscribe; BrokenSource panics if asked to.
    mgr.shutdown(&mut sink);
}

#[test]
fn unavailable_adapter_issues_nothing() {
    let mut provider = ScriptedProvider::new();
    provider.available = false;
    let (mut mgr, clock, mut sink) = started(provider);

    mgr.ensure_loaded(&mut sink);
    mgr.on_lifecycle(AppLifecycle::Background, &mut sink);
    mgr.on_lifecycle(AppLifecycle::Active, &mut sink);
    clock.set(10_000);
    mgr.pump(&mut sink);
    mgr.handle_command(AppCommand::ShowIfEligible, &mut sink);

    assert!(mgr.provider().calls.is_empty());
    assert!(sink.contains(&AppEvent::Started { available: false }));
}

#[test]
fn adapter_disappearing_mid_session_latches_off() {
    let (mut mgr, clock, mut sink) = started(ScriptedProvider::new());
    load(&mut mgr, &mut sink, 1);
    let calls_before = mgr.provider().calls.len();

    mgr.provider_mut().available = false;
    assert_eq!(mgr.show_if_eligible(&mut sink), ShowDecision::Unavailable);

    // Even if it comes back, the session stays disabled.
    mgr.provider_mut().available = true;
    clock.set(2000);
    mgr.pump(&mut sink);
    mgr.ensure_loaded(&mut sink);
    assert_eq!(mgr.provider().calls.len(), calls_before);
    assert!(!mgr.is_available());
}

#[test]
fn synchronous_load_rejection_counts_as_failure() {
    let mut provider = ScriptedProvider::new();
    provider.reject_load = Some(AdError::LoadFailure("sdk not initialised".into()));
    let (mut mgr, _clock, mut sink) = started(provider);

    mgr.ensure_loaded(&mut sink);
    assert_eq!(mgr.state(), StateId::Idle);
    assert_eq!(mgr.stats().load_failures, 1);
    assert!(sink.contains(&AppEvent::Failure(AdError::LoadFailure(
        "sdk not initialised".into()
    ))));

    // No automatic retry; the next call tries again.
    assert_eq!(mgr.provider().loads().len(), 1);
    mgr.ensure_loaded(&mut sink);
    assert_eq!(mgr.provider().loads().len(), 2);
    assert_eq!(mgr.state(), StateId::Loading);
}

#[test]
fn close_triggers_exactly_one_prefetch() {
    let (mut mgr, _clock, mut sink) = started(ScriptedProvider::new());
    load(&mut mgr, &mut sink, 1);
    mgr.show_if_eligible(&mut sink);
    mgr.handle_event(Event::Closed { handle: AdHandle(1) }, &mut sink);

    assert_eq!(
        mgr.provider().calls.last(),
        Some(&ProviderCall::Load(mgr.provider().last_load().unwrap()))
    );
    assert_eq!(mgr.provider().loads().len(), 2);
    assert_eq!(mgr.state(), StateId::Loading);
}

#[test]
fn show_error_releases_slot_and_prefetches() {
    let (mut mgr, _clock, mut sink) = started(ScriptedProvider::new());
    load(&mut mgr, &mut sink, 1);
    mgr.show_if_eligible(&mut sink);
    mgr.handle_event(
        Event::ShowFailed {
            handle: AdHandle(1),
            reason: "activity destroyed".into(),
        },
        &mut sink,
    );

    assert_eq!(mgr.stats().show_failures, 1);
    assert_eq!(mgr.state(), StateId::Loading);
    assert!(mgr.slot().handle().is_none());
    // The attempt still counts toward the cooldown.
    assert_eq!(mgr.last_shown_at(), Some(0));
}

#[test]
fn shutdown_unsubscribes_once() {
    let (mut mgr, _clock, mut sink) = started(ScriptedProvider::new());
    mgr.shutdown(&mut sink);
    mgr.shutdown(&mut sink);
    assert_eq!(mgr.source().unsubscribed, 1);
    assert_eq!(sink.count(|e| *e == AppEvent::Stopped), 1);
}

#[test]
fn shutdown_cancels_timers_and_notifies_provider() {
    let (mut mgr, clock, mut sink) = started(ScriptedProvider::new());
    assert_eq!(mgr.armed_timers(), 1, "first-run check armed on start");

    mgr.shutdown(&mut sink);
    assert_eq!(mgr.armed_timers(), 0);
    assert_eq!(mgr.provider().shutdowns, 1);

    mgr.shutdown(&mut sink);
    assert_eq!(mgr.provider().shutdowns, 1);
    clock.set(5000);
    mgr.pump(&mut sink);
    assert!(mgr.provider().calls.is_empty());
}

#[test]
fn watchdog_is_armed_only_while_presenting() {
    let (mut mgr, clock, mut sink) = started(ScriptedProvider::new());
    clock.set(1000);
    mgr.pump(&mut sink);
    assert_eq!(mgr.armed_timers(), 0, "first-run check consumed");

    load(&mut mgr, &mut sink, 1);
    mgr.show_if_eligible(&mut sink);
    assert_eq!(mgr.armed_timers(), 1);

    mgr.handle_event(Event::Closed { handle: AdHandle(1) }, &mut sink);
    assert_eq!(mgr.armed_timers(), 0);
}

#[test]
fn silent_presentation_is_released_by_watchdog() {
    let (mut mgr, clock, mut sink) = started(ScriptedProvider::new());
    load(&mut mgr, &mut sink, 1);
    mgr.show_if_eligible(&mut sink);

    clock.set(59_999);
    mgr.pump(&mut sink);
    assert!(mgr.is_showing());

    clock.set(60_000);
    mgr.pump(&mut sink);
    assert!(!mgr.is_showing());
    assert_eq!(mgr.state(), StateId::Loading, "released slot is refilled");
    assert_eq!(mgr.stats().show_failures, 1);
    assert!(sink.contains(&AppEvent::Failure(AdError::ShowFailure(
        "presentation timed out".into()
    ))));

    // The provider closing it afterwards is a late event.
    mgr.handle_event(Event::Closed { handle: AdHandle(1) }, &mut sink);
    assert_eq!(mgr.stats().closes, 0);
}

#[test]
fn config_update_reaches_provider_and_watchdog() {
    let (mut mgr, clock, mut sink) = started(ScriptedProvider::new());
    let config = appopen::config::AdConfig {
        presentation_watchdog_secs: 20,
        ..Default::default()
    };
    mgr.handle_command(AppCommand::UpdateConfig(config), &mut sink);

    load(&mut mgr, &mut sink, 1);
    mgr.show_if_eligible(&mut sink);
    clock.set(20_000);
    mgr.pump(&mut sink);
    assert!(!mgr.is_showing());
}
