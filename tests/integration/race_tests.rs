//! Late and out-of-order provider events, and transitions arriving from
//! several threads at once.

use std::thread;

use super::fakes::{ScriptedProvider, load, started, started_with};

use appopen::adapters::foreground::QueueForegroundSource;
use appopen::app::events::AppEvent;
use appopen::app::ports::AppLifecycle;
use appopen::events::Event;
use appopen::fsm::StateId;
use appopen::inventory::AdHandle;

#[test]
fn load_result_for_superseded_request_is_ignored() {
    let (mut mgr, _clock, mut sink) = started(ScriptedProvider::new());
    mgr.ensure_loaded(&mut sink);
    let first = mgr.provider().last_load().unwrap();
    mgr.handle_event(
        Event::LoadFailed {
            generation: first,
            reason: "timeout".into(),
        },
        &mut sink,
    );
    mgr.ensure_loaded(&mut sink);
    let second = mgr.provider().last_load().unwrap();
    assert_ne!(first, second);

    // The first request answers after all.
    mgr.handle_event(
        Event::Loaded {
            generation: first,
            handle: AdHandle(10),
        },
        &mut sink,
    );
    assert_eq!(mgr.state(), StateId::Loading);
    assert_eq!(mgr.stats().late_events_ignored, 1);
    assert!(sink.contains(&AppEvent::LateEventIgnored));

    mgr.handle_event(
        Event::Loaded {
            generation: second,
            handle: AdHandle(11),
        },
        &mut sink,
    );
    assert_eq!(mgr.slot().handle(), Some(AdHandle(11)));
}

#[test]
fn duplicate_loaded_keeps_first_ad() {
    let (mut mgr, _clock, mut sink) = started(ScriptedProvider::new());
    load(&mut mgr, &mut sink, 1);
    let generation = mgr.provider().last_load().unwrap();
    mgr.handle_event(
        Event::Loaded {
            generation,
            handle: AdHandle(2),
        },
        &mut sink,
    );
    assert_eq!(mgr.slot().handle(), Some(AdHandle(1)));
    assert_eq!(mgr.stats().late_events_ignored, 1);
}

#[test]
fn close_for_discarded_ad_is_ignored() {
    let (mut mgr, clock, mut sink) = started(ScriptedProvider::new());
    load(&mut mgr, &mut sink, 1);

    clock.set(5 * 60 * 60 * 1000);
    mgr.ensure_loaded(&mut sink);
    assert_eq!(mgr.stats().stale_discards, 1);
    assert!(sink.contains(&AppEvent::StaleDiscarded(AdHandle(1))));

    mgr.handle_event(Event::Closed { handle: AdHandle(1) }, &mut sink);
    assert_eq!(mgr.state(), StateId::Loading);
    assert_eq!(mgr.stats().closes, 0);
}

#[test]
fn show_error_for_other_handle_does_not_end_presentation() {
    let (mut mgr, _clock, mut sink) = started(ScriptedProvider::new());
    load(&mut mgr, &mut sink, 1);
    mgr.show_if_eligible(&mut sink);

    mgr.handle_event(
        Event::ShowFailed {
            handle: AdHandle(99),
            reason: "stray".into(),
        },
        &mut sink,
    );
    assert!(mgr.is_showing());
    assert_eq!(mgr.stats().show_failures, 0);
}

#[test]
fn concurrent_transitions_show_at_most_once() {
    let source = QueueForegroundSource::new();
    let notifier = source.notifier();
    let (mut mgr, _clock, mut sink) = started_with(ScriptedProvider::new(), source);
    load(&mut mgr, &mut sink, 1);

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let notifier = notifier.clone();
            thread::spawn(move || {
                for _ in 0..3 {
                    notifier.notify(AppLifecycle::Background);
                    notifier.notify(AppLifecycle::Active);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    mgr.pump(&mut sink);
    assert_eq!(mgr.provider().shows(), vec![AdHandle(1)]);
    assert!(mgr.is_showing());
}
