//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BlinkController / AppService (domain)
//! ```
//!
//! Driven adapters (GPIO, event sinks, telemetry links, clocks) implement
//! these traits.  The domain consumes them via generics, so the core never
//! touches hardware directly.
//!
//! Suspension is not a port of its own: the blink worker sleeps through
//! [`embedded_hal::delay::DelayNs`].

use crate::error::MapError;

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Access to the physical output line.
///
/// Once [`map`](GpioPort::map) has succeeded, the remaining calls are
/// treated as infallible; adapters log their own I/O failures.
pub trait GpioPort {
    /// Acquire the GPIO peripheral.  Called exactly once, at construction.
    fn map(&mut self) -> Result<(), MapError>;

    /// Configure `pin` as a push-pull output.
    fn configure_output(&mut self, pin: u8);

    /// Drive `pin` high.
    fn set(&mut self, pin: u8);

    /// Drive `pin` low.
    fn clear(&mut self, pin: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → ground link)
// ───────────────────────────────────────────────────────────────

/// Outbound link for encoded telemetry packets.
pub trait TelemetryPort {
    /// Send one complete packet.  Delivery is best-effort.
    fn transmit(&mut self, packet: &[u8]);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source used to timestamp telemetry.
pub trait TimePort {
    /// Microseconds since boot.
    fn uptime_us(&self) -> u64;
}
