//! Blink controller: the shared state of the output line and its timing.
//!
//! ```text
//!  command context ──set_on_time/set_off_time──▶ ┌──────────────────┐
//!                                                │  BlinkController  │ ◀──snapshot── status reporter
//!  worker context ◀──on/off_time_ms, asserted──▶ └──────────────────┘
//! ```
//!
//! One instance lives for the whole process and is shared by `Arc`
//! between the command-processing context and the [`worker::BlinkWorker`].
//! `pin` and `is_mapped` are fixed at construction; everything that
//! changes afterwards is an atomic, so neither side ever blocks the other
//! and the worker never holds a lock while it sleeps.

pub mod worker;

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort};
use crate::config::BlinkConfig;

/// Point-in-time copy of every controller field, for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub is_mapped: bool,
    pub is_asserted: bool,
    pub pin: u8,
    pub on_time_ms: u32,
    pub off_time_ms: u32,
}

/// Authoritative state of the blinking output line.
#[derive(Debug)]
pub struct BlinkController {
    pin: u8,
    is_mapped: bool,
    is_asserted: AtomicBool,
    on_time_ms: AtomicU32,
    off_time_ms: AtomicU32,
}

impl BlinkController {
    /// Map the GPIO peripheral and take ownership of `pin`.
    ///
    /// A mapping failure is not fatal: the controller comes up unmapped,
    /// never touches the line, and is never re-mapped.  Exactly one
    /// diagnostic event reports the outcome.
    pub fn new(
        gpio: &mut impl GpioPort,
        pin: u8,
        on_time_ms: u32,
        off_time_ms: u32,
        sink: &mut impl EventSink,
    ) -> Self {
        let is_mapped = match gpio.map() {
            Ok(()) => {
                gpio.configure_output(pin);
                info!("GPIO mapped, pin {} is output", pin);
                sink.emit(&AppEvent::GpioMapped { pin });
                true
            }
            Err(e) => {
                warn!("GPIO map failed ({}), running degraded", e);
                sink.emit(&AppEvent::GpioMapFailed(e));
                false
            }
        };

        Self {
            pin,
            is_mapped,
            is_asserted: AtomicBool::new(false),
            on_time_ms: AtomicU32::new(on_time_ms),
            off_time_ms: AtomicU32::new(off_time_ms),
        }
    }

    /// Construct from the startup configuration block.
    pub fn from_config(
        gpio: &mut impl GpioPort,
        cfg: &BlinkConfig,
        sink: &mut impl EventSink,
    ) -> Self {
        Self::new(gpio, cfg.out_pin, cfg.on_time_ms, cfg.off_time_ms, sink)
    }

    // ── Command mutators ──────────────────────────────────────

    /// Overwrite the on-duration.  Any value is accepted; always succeeds.
    pub fn set_on_time(&self, ms: u32, sink: &mut impl EventSink) -> bool {
        self.on_time_ms.store(ms, Ordering::Release);
        sink.emit(&AppEvent::OnTimeSet(ms));
        true
    }

    /// Overwrite the off-duration.  Any value is accepted; always succeeds.
    pub fn set_off_time(&self, ms: u32, sink: &mut impl EventSink) -> bool {
        self.off_time_ms.store(ms, Ordering::Release);
        sink.emit(&AppEvent::OffTimeSet(ms));
        true
    }

    /// Reset counters and status flags reported in housekeeping that do
    /// not change functional behaviour.  The controller currently owns none.
    pub fn reset_status(&self) {}

    // ── Queries ───────────────────────────────────────────────

    /// Read every field without blocking or mutating.
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            is_mapped: self.is_mapped,
            is_asserted: self.is_asserted.load(Ordering::Acquire),
            pin: self.pin,
            on_time_ms: self.on_time_ms.load(Ordering::Acquire),
            off_time_ms: self.off_time_ms.load(Ordering::Acquire),
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn is_mapped(&self) -> bool {
        self.is_mapped
    }

    pub fn is_asserted(&self) -> bool {
        self.is_asserted.load(Ordering::Acquire)
    }

    pub fn on_time_ms(&self) -> u32 {
        self.on_time_ms.load(Ordering::Acquire)
    }

    pub fn off_time_ms(&self) -> u32 {
        self.off_time_ms.load(Ordering::Acquire)
    }

    // ── Worker-only ───────────────────────────────────────────

    /// Record the electrical state of the line.  Only the worker calls this.
    pub(crate) fn mark_asserted(&self, asserted: bool) {
        debug_assert!(self.is_mapped || !asserted);
        self.is_asserted.store(asserted, Ordering::Release);
    }
}
