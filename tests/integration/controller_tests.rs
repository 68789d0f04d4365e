//! BlinkController construction and command mutators.

use std::sync::Arc;

use blinkctl::app::events::AppEvent;
use blinkctl::config::BlinkConfig;
use blinkctl::ctrl::BlinkController;
use blinkctl::error::MapError;

use crate::mock_hw::{Call, CallLog, MockGpio, RecordingSink};

#[test]
fn mapped_controller_configures_pin_once() {
    let log = CallLog::default();
    let mut sink = RecordingSink::new();
    let ctrl = BlinkController::new(&mut MockGpio::new(&log), 4, 50, 20, &mut sink);

    assert!(ctrl.is_mapped());
    assert_eq!(ctrl.pin(), 4);
    assert!(!ctrl.is_asserted());
    assert_eq!(log.calls(), vec![Call::Map, Call::ConfigureOutput(4)]);
    assert_eq!(sink.events(), vec![AppEvent::GpioMapped { pin: 4 }]);
}

#[test]
fn map_failure_is_reported_once_and_never_configures() {
    let log = CallLog::default();
    let mut sink = RecordingSink::new();
    let ctrl = BlinkController::new(
        &mut MockGpio::failing(&log, MapError::Driver(-13)),
        4,
        50,
        20,
        &mut sink,
    );

    assert!(!ctrl.is_mapped());
    assert_eq!(log.calls(), vec![Call::Map]);
    assert_eq!(
        sink.events(),
        vec![AppEvent::GpioMapFailed(MapError::Driver(-13))]
    );
}

#[test]
fn unmapped_controller_still_accepts_commands() {
    let log = CallLog::default();
    let mut sink = RecordingSink::new();
    let ctrl = BlinkController::new(
        &mut MockGpio::failing(&log, MapError::NotPresent),
        4,
        50,
        20,
        &mut sink,
    );

    assert!(ctrl.set_on_time(75, &mut sink));
    assert!(ctrl.set_off_time(25, &mut sink));

    let snap = ctrl.snapshot();
    assert!(!snap.is_mapped);
    assert!(!snap.is_asserted);
    assert_eq!((snap.on_time_ms, snap.off_time_ms), (75, 25));
    // Commands never touch the line.
    assert_eq!(log.calls(), vec![Call::Map]);
}

#[test]
fn extreme_durations_accepted() {
    let log = CallLog::default();
    let mut sink = RecordingSink::new();
    let ctrl = BlinkController::new(&mut MockGpio::new(&log), 4, 50, 20, &mut sink);
    sink.clear();

    for v in [0, 1, u32::MAX] {
        assert!(ctrl.set_on_time(v, &mut sink));
        assert_eq!(ctrl.on_time_ms(), v);
        assert!(ctrl.set_off_time(v, &mut sink));
        assert_eq!(ctrl.off_time_ms(), v);
    }
    assert_eq!(sink.events().len(), 6);
    assert_eq!(sink.events()[4], AppEvent::OnTimeSet(u32::MAX));
}

#[test]
fn from_config_uses_every_field() {
    let log = CallLog::default();
    let cfg = BlinkConfig {
        out_pin: 12,
        on_time_ms: 250,
        off_time_ms: 750,
    };
    let ctrl = Arc::new(BlinkController::from_config(
        &mut MockGpio::new(&log),
        &cfg,
        &mut RecordingSink::new(),
    ));

    let snap = ctrl.snapshot();
    assert_eq!(snap.pin, 12);
    assert_eq!(snap.on_time_ms, 250);
    assert_eq!(snap.off_time_ms, 750);
    assert_eq!(log.calls(), vec![Call::Map, Call::ConfigureOutput(12)]);
}
