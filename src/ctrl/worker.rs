//! Blink worker: the execution context that drives the output line.
//!
//! ```text
//!            ┌───────────── mapped ─────────────┐
//!            ▼                                  │
//!   ┌─────┐ set(pin), sleep on_time  ┌────┐     │
//!   │ Off │ ───────────────────────▶ │ On │ ────┘ clear(pin), sleep off_time
//!   └─────┘                          └────┘
//!
//!   ┌──────────┐
//!   │ Unmapped │ ── sleep 2000 ms ──▶ (itself, forever)
//!   └──────────┘
//! ```
//!
//! Each duration is read from the controller exactly once, at the start of
//! its phase, and that one value is both reported and slept on.  A command
//! arriving while the worker sleeps takes effect at the next phase.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort};
use crate::config::ChildTaskConfig;
use crate::drivers::task_pin::{Core, spawn_on_core};

use super::BlinkController;

/// Idle interval of a worker whose controller failed to map.
pub const UNMAPPED_IDLE_MS: u32 = 2000;

/// Default time teardown waits for the worker to reach a cycle boundary.
pub const STOP_GRACE: Duration = Duration::from_millis(250);

/// Thread name of the worker (null-terminated for ESP-IDF).
const WORKER_TASK_NAME: &str = "blink-ctrl\0";

/// Worker state.  `Unmapped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPhase {
    Unmapped,
    Off,
    On,
}

/// Drives a [`BlinkController`] through its on/off cycle.
pub struct BlinkWorker<G, D, S> {
    ctrl: Arc<BlinkController>,
    gpio: G,
    delay: D,
    sink: S,
    phase: BlinkPhase,
}

impl<G, D, S> BlinkWorker<G, D, S>
where
    G: GpioPort,
    D: DelayNs,
    S: EventSink,
{
    /// `gpio` must be the same port the controller was constructed with.
    pub fn new(ctrl: Arc<BlinkController>, gpio: G, delay: D, sink: S) -> Self {
        let phase = if ctrl.is_mapped() {
            BlinkPhase::Off
        } else {
            BlinkPhase::Unmapped
        };
        Self {
            ctrl,
            gpio,
            delay,
            sink,
            phase,
        }
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    /// Perform one transition and sleep for its duration.
    ///
    /// Returns the phase the worker is in while sleeping.
    pub fn step(&mut self) -> BlinkPhase {
        let pin = self.ctrl.pin();
        match self.phase {
            BlinkPhase::Unmapped => {
                self.delay.delay_ms(UNMAPPED_IDLE_MS);
            }
            BlinkPhase::Off => {
                let ms = self.ctrl.on_time_ms();
                self.gpio.set(pin);
                self.ctrl.mark_asserted(true);
                self.phase = BlinkPhase::On;
                self.sink.emit(&AppEvent::PhaseOn { pin, ms });
                self.delay.delay_ms(ms);
            }
            BlinkPhase::On => {
                let ms = self.ctrl.off_time_ms();
                self.gpio.clear(pin);
                self.ctrl.mark_asserted(false);
                self.phase = BlinkPhase::Off;
                self.sink.emit(&AppEvent::PhaseOff { pin, ms });
                self.delay.delay_ms(ms);
            }
        }
        self.phase
    }

    /// One full iteration: On then Off when mapped, one idle sleep otherwise.
    pub fn run_cycle(&mut self) {
        match self.phase {
            BlinkPhase::Unmapped => {
                self.step();
            }
            BlinkPhase::Off | BlinkPhase::On => {
                while self.step() != BlinkPhase::Off {}
            }
        }
    }

    /// Cycle until `stop` is observed at a cycle boundary.
    ///
    /// A phase in progress always runs to completion; the line is left
    /// deasserted on return.
    pub fn run(mut self, stop: &AtomicBool) {
        info!("Blink worker started in {:?}", self.phase);
        while !stop.load(Ordering::Acquire) {
            self.run_cycle();
        }
        if self.phase == BlinkPhase::On {
            self.gpio.clear(self.ctrl.pin());
            self.ctrl.mark_asserted(false);
            self.phase = BlinkPhase::Off;
        }
        debug!("Blink worker stopped");
    }
}

impl<G, D, S> BlinkWorker<G, D, S>
where
    G: GpioPort + Send + 'static,
    D: DelayNs + Send + 'static,
    S: EventSink + Send + 'static,
{
    /// Run the worker on its own thread, pinned to the application core.
    pub fn spawn(
        self,
        stop: Arc<AtomicBool>,
        task: &ChildTaskConfig,
    ) -> std::io::Result<JoinHandle<()>> {
        spawn_on_core(
            Core::App,
            task.priority,
            task.stack_kb,
            WORKER_TASK_NAME,
            move || self.run(&stop),
        )
    }
}

/// Ask a spawned worker to stop and wait up to `grace` for it to exit.
///
/// A worker suspended in a long phase is not waited for: its handle is
/// dropped and the thread ends with the process.  Returns `true` if the
/// worker exited within `grace`.
pub fn release(handle: JoinHandle<()>, stop: &AtomicBool, grace: Duration) -> bool {
    stop.store(true, Ordering::Release);
    let deadline = Instant::now() + grace;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!("Blink worker still mid-phase after {:?}, leaving it to process exit", grace);
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    if handle.join().is_err() {
        warn!("Blink worker panicked");
    }
    true
}
