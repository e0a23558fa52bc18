//! Integration tests: dirty tracking → batched flush → restore on boot.

use crate::mock_hw::{LogSink, MockHardware, MockStore};

use fogprop::app::events::AppEvent;
use fogprop::app::ports::{ActuatorPort, StoreError};
use fogprop::app::service::{AppService, FlushOutcome};
use fogprop::app::state::ActuatorKind;
use fogprop::config::SystemConfig;

fn fresh() -> (AppService, MockHardware, MockStore, LogSink) {
    (
        AppService::new(&SystemConfig::default()),
        MockHardware::new(),
        MockStore::new(),
        LogSink::new(),
    )
}

#[test]
fn change_is_flushed_once() {
    let (mut app, mut hw, mut store, mut sink) = fresh();
    app.turn_on(ActuatorKind::Fog, Some(75), &mut hw, &mut sink);
    assert!(app.is_dirty());

    assert_eq!(app.flush_if_dirty(&mut store, &mut sink), FlushOutcome::Flushed);
    assert!(!app.is_dirty());
    assert_eq!(store.record(), [Some(75), Some(75), Some(0), Some(0), Some(0), Some(0)]);
    assert_eq!(store.commits, 1);

    assert_eq!(app.flush_if_dirty(&mut store, &mut sink), FlushOutcome::Clean);
    assert_eq!(store.commits, 1);
}

#[test]
fn burst_of_changes_is_one_batch() {
    let (mut app, mut hw, mut store, mut sink) = fresh();
    for p in [10, 20, 30, 40] {
        app.turn_on(ActuatorKind::Pump, Some(p), &mut hw, &mut sink);
    }
    app.turn_off(ActuatorKind::Pump, &mut hw, &mut sink);

    app.flush_if_dirty(&mut store, &mut sink);
    assert_eq!(store.commits, 1);
    assert_eq!(store.record()[2], Some(0));
    assert_eq!(store.record()[3], Some(40));
}

#[test]
fn no_op_command_does_not_dirty() {
    let (mut app, mut hw, mut store, mut sink) = fresh();
    app.turn_off(ActuatorKind::Light, &mut hw, &mut sink);
    assert!(!app.is_dirty());
    assert_eq!(app.flush_if_dirty(&mut store, &mut sink), FlushOutcome::Clean);
    assert_eq!(store.writes, 0);
}

#[test]
fn failed_commit_stays_dirty_and_retries() {
    let (mut app, mut hw, mut store, mut sink) = fresh();
    app.turn_on(ActuatorKind::Light, Some(10), &mut hw, &mut sink);

    store.fail_commits = true;
    assert_eq!(
        app.flush_if_dirty(&mut store, &mut sink),
        FlushOutcome::Failed(StoreError::CommitFailed)
    );
    assert!(app.is_dirty());
    assert_eq!(app.intensity(ActuatorKind::Light), 10);
    assert!(sink.events.contains(&AppEvent::StoreFlushFailed(StoreError::CommitFailed)));

    store.fail_commits = false;
    assert_eq!(app.flush_if_dirty(&mut store, &mut sink), FlushOutcome::Flushed);
    assert_eq!(store.record()[4], Some(10));
}

#[test]
fn restore_reads_all_six_bytes() {
    let store = MockStore::with_record([75, 75, 0, 50, 30, 30]);
    let (mut hw, mut sink) = (MockHardware::new(), LogSink::new());
    let app = AppService::restore(&SystemConfig::default(), &store, &mut hw, &mut sink);

    assert_eq!(app.intensity(ActuatorKind::Fog), 75);
    assert_eq!(app.intensity(ActuatorKind::Pump), 0);
    assert_eq!(app.previous_intensity(ActuatorKind::Pump), 50);
    assert_eq!(app.intensity(ActuatorKind::Light), 30);
    assert!(!app.is_dirty());

    assert_eq!(hw.output(ActuatorKind::Fog), 75);
    assert_eq!(hw.output(ActuatorKind::Pump), 0);
    // Restored light fades in rather than snapping on.
    assert_eq!(hw.levels_of(ActuatorKind::Light).len(), 31);
    assert_eq!(hw.output(ActuatorKind::Light), 30);

    assert!(sink.events.contains(&AppEvent::Started {
        fog: 75,
        pump: 0,
        light: 30,
        from_store: true,
    }));
}

#[test]
fn restore_from_empty_store_is_all_off() {
    let store = MockStore::new();
    let (mut hw, mut sink) = (MockHardware::new(), LogSink::new());
    let app = AppService::restore(&SystemConfig::default(), &store, &mut hw, &mut sink);

    for kind in ActuatorKind::ALL {
        assert_eq!(app.intensity(kind), 0);
        assert_eq!(app.previous_intensity(kind), 0);
    }
    assert!(!app.is_any_active());
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::Started { from_store: false, .. })));
}

#[test]
fn restore_survives_an_unreadable_store() {
    let mut store = MockStore::with_record([50, 50, 50, 50, 50, 50]);
    store.unreadable = true;
    let (mut hw, mut sink) = (MockHardware::new(), LogSink::new());
    let app = AppService::restore(&SystemConfig::default(), &store, &mut hw, &mut sink);
    assert!(!app.is_any_active());
}

#[test]
fn restore_repairs_corrupt_bytes() {
    let store = MockStore::with_record([0xFF, 0xFF, 60, 10, 0, 200]);
    let (mut hw, mut sink) = (MockHardware::new(), LogSink::new());
    let mut app = AppService::restore(&SystemConfig::default(), &store, &mut hw, &mut sink);

    assert_eq!(app.intensity(ActuatorKind::Fog), 0);
    assert_eq!(app.previous_intensity(ActuatorKind::Fog), 0);
    assert_eq!(app.intensity(ActuatorKind::Pump), 60);
    assert_eq!(app.previous_intensity(ActuatorKind::Pump), 60);
    assert_eq!(app.previous_intensity(ActuatorKind::Light), 0);

    // The repaired pump record is written back on the next flush.
    assert!(app.is_dirty());
    let mut store = store;
    app.flush_if_dirty(&mut store, &mut sink);
    assert_eq!(store.record()[3], Some(60));
}

#[test]
fn state_survives_a_reboot() {
    let (mut app, mut hw, mut store, mut sink) = fresh();
    app.turn_on(ActuatorKind::Fog, Some(75), &mut hw, &mut sink);
    app.turn_on(ActuatorKind::Pump, Some(50), &mut hw, &mut sink);
    app.turn_off(ActuatorKind::Pump, &mut hw, &mut sink);
    app.flush_if_dirty(&mut store, &mut sink);

    let mut hw2 = MockHardware::new();
    let mut rebooted = AppService::restore(&SystemConfig::default(), &store, &mut hw2, &mut sink);
    assert_eq!(rebooted.intensity(ActuatorKind::Fog), 75);
    assert_eq!(rebooted.turn_on(ActuatorKind::Pump, None, &mut hw2, &mut sink), 50);
}
