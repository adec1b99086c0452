use super::*;
use crate::widget::testing::{Call, FakeBackend};
use std::sync::mpsc::{self, Receiver};

fn adapter_with(backend: &FakeBackend) -> (PlayerAdapter, Receiver<WidgetEvent>) {
    let (tx, rx) = mpsc::channel();
    let adapter = PlayerAdapter::new(Arc::new(backend.clone()), Bootstrap::new(), tx);
    (adapter, rx)
}

/// Feed every queued event back into the adapter.
fn pump(adapter: &mut PlayerAdapter, rx: &Receiver<WidgetEvent>) -> Vec<AdapterEvent> {
    rx.try_iter()
        .filter_map(|ev| adapter.handle_event(ev))
        .collect()
}

fn make_ready(adapter: &mut PlayerAdapter) {
    let handle = adapter.handle_id().unwrap();
    assert_eq!(
        adapter.handle_event(WidgetEvent::Ready { handle }),
        Some(AdapterEvent::Ready)
    );
}

#[test]
fn volume_maps_to_rounded_percent() {
    assert_eq!(volume_percent(0.0), 0);
    assert_eq!(volume_percent(0.7), 70);
    assert_eq!(volume_percent(0.456), 46);
    assert_eq!(volume_percent(1.4), 100);
    assert_eq!(volume_percent(-0.2), 0);
    assert_eq!(volume_percent(f64::NAN), 0);
}

#[test]
fn commands_before_ready_are_dropped() {
    let backend = FakeBackend::new();
    let (mut adapter, _rx) = adapter_with(&backend);

    assert!(!adapter.command(PlayerCommand::Play));

    let handle = adapter.initialize("a.mp3").unwrap();
    assert!(adapter.is_live());
    assert!(!adapter.is_ready());
    assert!(!adapter.command(PlayerCommand::Play));
    assert!(adapter.sample().is_none());
    assert!(backend.calls().is_empty());

    make_ready(&mut adapter);
    assert!(adapter.command(PlayerCommand::Play));
    assert!(adapter.command(PlayerCommand::SetVolume(0.5)));
    assert!(adapter.command(PlayerCommand::SeekAbsolute(12.5)));
    assert_eq!(
        backend.calls(),
        vec![
            Call::Play(handle),
            Call::SetVolume(handle, 50),
            Call::SeekTo(handle, 12.5, true),
        ]
    );
}

#[test]
fn ready_is_reported_once() {
    let backend = FakeBackend::new();
    let (mut adapter, _rx) = adapter_with(&backend);
    let handle = adapter.initialize("a.mp3").unwrap();

    make_ready(&mut adapter);
    assert_eq!(adapter.handle_event(WidgetEvent::Ready { handle }), None);
    assert!(adapter.is_ready());
}

#[test]
fn reinitializing_same_media_keeps_widget() {
    let backend = FakeBackend::new();
    let (mut adapter, _rx) = adapter_with(&backend);

    let first = adapter.initialize("a.mp3").unwrap();
    assert_eq!(adapter.initialize("a.mp3"), Some(first));
    assert_eq!(backend.created().len(), 1);
    assert!(backend.calls().is_empty());
}

#[test]
fn new_media_destroys_previous_widget_and_ignores_its_events() {
    let backend = FakeBackend::new();
    let (mut adapter, _rx) = adapter_with(&backend);

    let old = adapter.initialize("a.mp3").unwrap();
    let new = adapter.initialize("b.mp3").unwrap();
    assert_ne!(old, new);
    assert_eq!(backend.calls(), vec![Call::Destroy(old)]);

    assert_eq!(adapter.handle_event(WidgetEvent::Ready { handle: old }), None);
    assert_eq!(
        adapter.handle_event(WidgetEvent::StateChange {
            handle: old,
            code: 1
        }),
        None
    );
    assert!(!adapter.is_ready());
}

#[test]
fn state_changes_are_mapped_and_unknown_codes_dropped() {
    let backend = FakeBackend::new();
    let (mut adapter, _rx) = adapter_with(&backend);
    let handle = adapter.initialize("a.mp3").unwrap();

    assert_eq!(
        adapter.handle_event(WidgetEvent::StateChange { handle, code: 0 }),
        Some(AdapterEvent::Lifecycle(StateCode::Ended))
    );
    assert_eq!(
        adapter.handle_event(WidgetEvent::StateChange { handle, code: 42 }),
        None
    );
}

#[test]
fn media_is_parked_until_api_ready() {
    let backend = FakeBackend::deferred();
    let (mut adapter, rx) = adapter_with(&backend);

    assert_eq!(adapter.initialize("a.mp3"), None);
    assert!(adapter.is_parked());
    assert!(!adapter.is_live());
    assert!(backend.created().is_empty());

    backend.fire_api_ready();
    assert!(pump(&mut adapter, &rx).is_empty());
    assert!(adapter.is_live());
    assert!(!adapter.is_parked());
    assert_eq!(backend.created().len(), 1);
    assert_eq!(backend.created()[0].1, "a.mp3");
}

#[test]
fn newer_media_replaces_parked_media() {
    let backend = FakeBackend::deferred();
    let (mut adapter, rx) = adapter_with(&backend);

    adapter.initialize("a.mp3");
    adapter.initialize("b.mp3");
    backend.fire_api_ready();
    pump(&mut adapter, &rx);

    let created = backend.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].1, "b.mp3");
    assert_eq!(backend.loads(), 1);
}

#[test]
fn destroy_then_api_ready_creates_nothing() {
    let backend = FakeBackend::deferred();
    let (mut adapter, rx) = adapter_with(&backend);

    adapter.initialize("a.mp3");
    adapter.destroy();
    backend.fire_api_ready();
    pump(&mut adapter, &rx);
    assert!(backend.created().is_empty());
}

#[test]
fn samples_read_the_ready_widget_clock() {
    let backend = FakeBackend::new();
    let (mut adapter, _rx) = adapter_with(&backend);
    adapter.initialize("a.mp3");
    make_ready(&mut adapter);

    backend.set_clock(12.0, 200.0);
    assert_eq!(
        adapter.sample(),
        Some(Sample {
            position: 12.0,
            duration: 200.0
        })
    );

    backend.set_failing_reads(true);
    assert_eq!(adapter.sample(), None);
}

#[test]
fn release_destroys_widget_and_unloads_api() {
    let backend = FakeBackend::new();
    let (mut adapter, _rx) = adapter_with(&backend);
    let handle = adapter.initialize("a.mp3").unwrap();

    adapter.release();
    assert_eq!(backend.calls(), vec![Call::Destroy(handle)]);
    assert_eq!(backend.unloads(), 1);
    assert!(!adapter.is_live());

    // Destroying again is a no-op.
    adapter.destroy();
    assert_eq!(backend.calls().len(), 1);
}
