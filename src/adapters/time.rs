//! ESP32 time adapter.
//!
//! Provides the monotonic clock used to timestamp telemetry.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side testing and simulation.

use crate::app::ports::TimePort;

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl TimePort for Esp32TimeAdapter {
    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time has no preconditions once the timer
        // service is running, which IDF guarantees before app_main.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since adapter construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}
