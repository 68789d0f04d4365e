//! BlinkWorker state machine against a recording delay.
//!
//! No test here sleeps: every suspend is recorded by `MockDelay`, and
//! "concurrent" commands are injected from its mid-suspend hook.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use blinkctl::app::events::AppEvent;
use blinkctl::ctrl::BlinkController;
use blinkctl::ctrl::worker::{BlinkPhase, BlinkWorker, UNMAPPED_IDLE_MS};
use blinkctl::error::MapError;

use crate::mock_hw::{Call, CallLog, MockDelay, MockGpio, RecordingSink};

fn mapped(log: &CallLog, on: u32, off: u32) -> Arc<BlinkController> {
    Arc::new(BlinkController::new(
        &mut MockGpio::new(log),
        4,
        on,
        off,
        &mut RecordingSink::new(),
    ))
}

// ── Mapping failure / idle degradation ────────────────────────

#[test]
fn unmapped_worker_only_idles() {
    let log = CallLog::default();
    let mut gpio = MockGpio::failing(&log, MapError::AccessDenied);
    let ctrl = Arc::new(BlinkController::new(
        &mut gpio,
        4,
        50,
        20,
        &mut RecordingSink::new(),
    ));
    let sink = RecordingSink::new();
    let mut worker = BlinkWorker::new(Arc::clone(&ctrl), gpio, MockDelay::new(&log), sink.clone());

    assert_eq!(worker.phase(), BlinkPhase::Unmapped);
    for _ in 0..5 {
        worker.run_cycle();
        assert!(!ctrl.is_asserted());
    }

    assert_eq!(worker.phase(), BlinkPhase::Unmapped);
    assert!(log.writes().is_empty());
    assert_eq!(log.sleeps(), vec![UNMAPPED_IDLE_MS; 5]);
    assert!(sink.events().is_empty());
}

#[test]
fn unmapped_worker_ignores_duration_commands() {
    let log = CallLog::default();
    let mut gpio = MockGpio::failing(&log, MapError::NotPresent);
    let ctrl = Arc::new(BlinkController::new(
        &mut gpio,
        4,
        50,
        20,
        &mut RecordingSink::new(),
    ));
    let cmd = Arc::clone(&ctrl);
    let delay = MockDelay::with_hook(&log, move |i, _| {
        cmd.set_on_time(i as u32, &mut RecordingSink::new());
    });
    let mut worker = BlinkWorker::new(ctrl, gpio, delay, RecordingSink::new());

    for _ in 0..3 {
        worker.run_cycle();
    }
    assert_eq!(log.sleeps(), vec![UNMAPPED_IDLE_MS; 3]);
    assert_eq!(log.calls().iter().filter(|c| **c == Call::Map).count(), 1);
}

// ── Mapped cycle ──────────────────────────────────────────────

#[test]
fn mapped_cycle_sequence_and_events() {
    let log = CallLog::default();
    let ctrl = mapped(&log, 50, 20);
    let sink = RecordingSink::new();
    let mut worker = BlinkWorker::new(
        Arc::clone(&ctrl),
        MockGpio::new(&log),
        MockDelay::new(&log),
        sink.clone(),
    );

    worker.run_cycle();

    assert_eq!(
        log.calls(),
        vec![
            Call::Map,
            Call::ConfigureOutput(4),
            Call::Set(4),
            Call::Sleep(50),
            Call::Clear(4),
            Call::Sleep(20),
        ]
    );
    assert_eq!(
        sink.events(),
        vec![
            AppEvent::PhaseOn { pin: 4, ms: 50 },
            AppEvent::PhaseOff { pin: 4, ms: 20 },
        ]
    );
}

#[test]
fn asserted_flag_tracks_phase_during_suspend() {
    let log = CallLog::default();
    let ctrl = mapped(&log, 50, 20);
    let probe = Arc::clone(&ctrl);
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_in_hook = Arc::clone(&seen);
    let delay = MockDelay::with_hook(&log, move |_, _| {
        seen_in_hook.lock().unwrap().push(probe.is_asserted());
    });
    let mut worker = BlinkWorker::new(ctrl, MockGpio::new(&log), delay, RecordingSink::new());

    for _ in 0..3 {
        worker.run_cycle();
    }
    assert_eq!(
        *seen.lock().unwrap(),
        vec![true, false, true, false, true, false]
    );
}

#[test]
fn writes_strictly_alternate() {
    let log = CallLog::default();
    let ctrl = mapped(&log, 1, 1);
    let mut worker = BlinkWorker::new(ctrl, MockGpio::new(&log), MockDelay::new(&log), RecordingSink::new());

    for _ in 0..10 {
        worker.step();
    }
    let writes = log.writes();
    assert_eq!(writes.len(), 10);
    for (i, w) in writes.iter().enumerate() {
        let expected = if i % 2 == 0 { Call::Set(4) } else { Call::Clear(4) };
        assert_eq!(*w, expected, "write {i}");
    }
}

// ── Phase-boundary application ────────────────────────────────

#[test]
fn update_during_on_phase_applies_at_next_phase() {
    let log = CallLog::default();
    let ctrl = mapped(&log, 50, 20);
    let cmd = Arc::clone(&ctrl);
    let delay = MockDelay::with_hook(&log, move |i, _| {
        // Arrives while the first On phase is suspended.
        if i == 0 {
            let mut sink = RecordingSink::new();
            cmd.set_on_time(500, &mut sink);
            cmd.set_off_time(7, &mut sink);
        }
    });
    let sink = RecordingSink::new();
    let mut worker = BlinkWorker::new(ctrl, MockGpio::new(&log), delay, sink.clone());

    worker.run_cycle();
    worker.run_cycle();

    // On(50) was already running; Off picks up 7, the next On picks up 500.
    assert_eq!(log.sleeps(), vec![50, 7, 500, 7]);
    assert_eq!(
        sink.events(),
        vec![
            AppEvent::PhaseOn { pin: 4, ms: 50 },
            AppEvent::PhaseOff { pin: 4, ms: 7 },
            AppEvent::PhaseOn { pin: 4, ms: 500 },
            AppEvent::PhaseOff { pin: 4, ms: 7 },
        ]
    );
}

#[test]
fn zero_durations_still_alternate() {
    let log = CallLog::default();
    let ctrl = mapped(&log, 0, 0);
    let mut worker = BlinkWorker::new(ctrl, MockGpio::new(&log), MockDelay::new(&log), RecordingSink::new());

    worker.run_cycle();
    assert_eq!(log.writes(), vec![Call::Set(4), Call::Clear(4)]);
    assert_eq!(log.sleeps(), vec![0, 0]);
}

// ── Stop ──────────────────────────────────────────────────────

#[test]
fn stop_observed_at_cycle_boundary_leaves_line_low() {
    let log = CallLog::default();
    let ctrl = mapped(&log, 5, 5);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_in_hook = Arc::clone(&stop);
    // Request stop in the middle of the second cycle's On phase.
    let delay = MockDelay::with_hook(&log, move |i, _| {
        if i == 2 {
            stop_in_hook.store(true, std::sync::atomic::Ordering::Release);
        }
    });
    let worker = BlinkWorker::new(Arc::clone(&ctrl), MockGpio::new(&log), delay, RecordingSink::new());

    worker.run(&stop);

    // The cycle in progress completes: two full cycles, then nothing.
    assert_eq!(log.writes(), vec![Call::Set(4), Call::Clear(4), Call::Set(4), Call::Clear(4)]);
    assert!(!ctrl.is_asserted());
}
