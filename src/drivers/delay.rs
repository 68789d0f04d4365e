//! Blocking delay used by the blink worker.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: delegates to the FreeRTOS tick delay (`vTaskDelay`), which
//! yields the core to other tasks while sleeping.
//! On host/test: `std::thread::sleep`.

use embedded_hal::delay::DelayNs;

#[derive(Debug, Default, Clone, Copy)]
pub struct SysDelay;

impl SysDelay {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl DelayNs for SysDelay {
    fn delay_ns(&mut self, ns: u32) {
        esp_idf_hal::delay::FreeRtos.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }
}

#[cfg(not(target_os = "espidf"))]
impl DelayNs for SysDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    // One sleep per phase, without the trait's default 4294 ms chunking.
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
