//! Real-thread timing: the worker sleeps for real while the test thread
//! acts as the command and status contexts.
//!
//! Lower bounds are exact (a phase never ends early); upper bounds are
//! loose to tolerate scheduler jitter on shared CI hosts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use blinkctl::app::events::AppEvent;
use blinkctl::config::ChildTaskConfig;
use blinkctl::ctrl::BlinkController;
use blinkctl::ctrl::worker::{self, BlinkWorker};
use blinkctl::drivers::delay::SysDelay;

use crate::mock_hw::{Call, CallLog, MockGpio, RecordingSink};

const SLACK: Duration = Duration::from_millis(250);

fn task() -> ChildTaskConfig {
    ChildTaskConfig {
        priority: 5,
        stack_kb: 64,
    }
}

#[test]
fn pin4_on50_off20_scenario() {
    let log = CallLog::default();
    let mut gpio = MockGpio::new(&log);
    let ctrl = Arc::new(BlinkController::new(
        &mut gpio,
        4,
        50,
        20,
        &mut RecordingSink::new(),
    ));
    let sink = RecordingSink::new();
    let stop = Arc::new(AtomicBool::new(false));

    let handle = BlinkWorker::new(Arc::clone(&ctrl), gpio, SysDelay::new(), sink.clone())
        .spawn(Arc::clone(&stop), &task())
        .unwrap();

    std::thread::sleep(Duration::from_millis(400));
    stop.store(true, Ordering::Release);
    handle.join().unwrap();

    let timed: Vec<_> = log
        .timed()
        .into_iter()
        .filter(|(_, c)| matches!(c, Call::Set(_) | Call::Clear(_)))
        .collect();
    assert!(timed.len() >= 4, "expected at least two cycles, got {timed:?}");
    assert_eq!(timed.len() % 2, 0, "worker must stop at a cycle boundary");

    for pair in timed.windows(2) {
        let ((t0, c0), (t1, _)) = (pair[0], pair[1]);
        let gap = t1 - t0;
        let min = match c0 {
            Call::Set(4) => Duration::from_millis(50),
            Call::Clear(4) => Duration::from_millis(20),
            other => panic!("unexpected write {other:?}"),
        };
        assert!(gap >= min, "{c0:?} lasted {gap:?}, expected at least {min:?}");
        assert!(gap < min + SLACK, "{c0:?} lasted {gap:?}");
    }
    for (i, (_, c)) in timed.iter().enumerate() {
        let expected = if i % 2 == 0 { Call::Set(4) } else { Call::Clear(4) };
        assert_eq!(*c, expected);
    }

    assert!(sink.contains(&AppEvent::PhaseOn { pin: 4, ms: 50 }));
    assert!(sink.contains(&AppEvent::PhaseOff { pin: 4, ms: 20 }));
    assert!(!ctrl.is_asserted());
}

#[test]
fn live_update_reaches_running_worker() {
    let log = CallLog::default();
    let mut gpio = MockGpio::new(&log);
    let mut cmd_sink = RecordingSink::new();
    let ctrl = Arc::new(BlinkController::new(&mut gpio, 4, 30, 30, &mut cmd_sink));
    let sink = RecordingSink::new();
    let stop = Arc::new(AtomicBool::new(false));

    let handle = BlinkWorker::new(Arc::clone(&ctrl), gpio, SysDelay::new(), sink.clone())
        .spawn(Arc::clone(&stop), &task())
        .unwrap();

    std::thread::sleep(Duration::from_millis(50));
    assert!(ctrl.set_on_time(5, &mut cmd_sink));

    let deadline = Instant::now() + Duration::from_secs(2);
    while !sink.contains(&AppEvent::PhaseOn { pin: 4, ms: 5 }) {
        assert!(Instant::now() < deadline, "update never observed");
        std::thread::sleep(Duration::from_millis(5));
    }

    stop.store(true, Ordering::Release);
    handle.join().unwrap();
}

#[test]
fn snapshots_never_disturb_worker() {
    let log = CallLog::default();
    let mut gpio = MockGpio::new(&log);
    let ctrl = Arc::new(BlinkController::new(
        &mut gpio,
        4,
        1,
        1,
        &mut RecordingSink::new(),
    ));
    let stop = Arc::new(AtomicBool::new(false));

    let handle = BlinkWorker::new(Arc::clone(&ctrl), gpio, SysDelay::new(), RecordingSink::new())
        .spawn(Arc::clone(&stop), &task())
        .unwrap();

    // Command context flips the on-duration while the status context reads.
    let commander = {
        let ctrl = Arc::clone(&ctrl);
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut sink = RecordingSink::new();
            let mut v = 1;
            while !stop.load(Ordering::Acquire) {
                v = if v == 1 { 2 } else { 1 };
                ctrl.set_on_time(v, &mut sink);
                sink.clear();
            }
        })
    };

    let start = Instant::now();
    let mut asserted_seen = false;
    while start.elapsed() < Duration::from_millis(200) {
        let snap = ctrl.snapshot();
        assert!(snap.is_mapped);
        assert_eq!(snap.pin, 4);
        assert!(snap.on_time_ms == 1 || snap.on_time_ms == 2);
        assert_eq!(snap.off_time_ms, 1);
        asserted_seen |= snap.is_asserted;
    }

    stop.store(true, Ordering::Release);
    handle.join().unwrap();
    commander.join().unwrap();

    assert!(asserted_seen, "status reader never observed the On phase");
    let writes = log.writes();
    assert!(writes.len() >= 4);
    for (i, w) in writes.iter().enumerate() {
        let expected = if i % 2 == 0 { Call::Set(4) } else { Call::Clear(4) };
        assert_eq!(*w, expected);
    }
}

#[test]
fn release_does_not_wait_out_long_phase() {
    let log = CallLog::default();
    let mut gpio = MockGpio::new(&log);
    let ctrl = Arc::new(BlinkController::new(
        &mut gpio,
        4,
        4000,
        20,
        &mut RecordingSink::new(),
    ));
    let stop = Arc::new(AtomicBool::new(false));

    let handle = BlinkWorker::new(Arc::clone(&ctrl), gpio, SysDelay::new(), RecordingSink::new())
        .spawn(Arc::clone(&stop), &task())
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    while !ctrl.is_asserted() {
        assert!(Instant::now() < deadline, "worker never entered the On phase");
        std::thread::sleep(Duration::from_millis(5));
    }

    let start = Instant::now();
    let exited = worker::release(handle, &stop, Duration::from_millis(100));

    assert!(!exited);
    assert!(start.elapsed() < Duration::from_secs(1), "release took {:?}", start.elapsed());
    assert!(stop.load(Ordering::Acquire));
}

#[test]
fn release_joins_worker_at_cycle_boundary() {
    let log = CallLog::default();
    let mut gpio = MockGpio::new(&log);
    let ctrl = Arc::new(BlinkController::new(
        &mut gpio,
        4,
        5,
        5,
        &mut RecordingSink::new(),
    ));
    let stop = Arc::new(AtomicBool::new(false));

    let handle = BlinkWorker::new(Arc::clone(&ctrl), gpio, SysDelay::new(), RecordingSink::new())
        .spawn(Arc::clone(&stop), &task())
        .unwrap();
    std::thread::sleep(Duration::from_millis(30));

    assert!(worker::release(handle, &stop, Duration::from_secs(2)));
    assert!(!ctrl.is_asserted());
    assert_eq!(log.writes().len() % 2, 0);
}
