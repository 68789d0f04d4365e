//! GPIO adapters implementing [`GpioPort`].
//!
//! | Adapter      | Backend                                   |
//! |--------------|-------------------------------------------|
//! | `SimGpio`    | In-memory line levels (host simulation)   |
//! | `SysfsGpio`  | Linux `/sys/class/gpio` character files   |
//! | `EspGpio`    | ESP-IDF `gpio_*` driver (espidf only)     |
//! | `HalPinGpio` | Any `embedded_hal` `OutputPin`            |
//!
//! Only `map()` reports failure to the domain.  Once mapped, write
//! failures are logged and otherwise ignored.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use embedded_hal::digital::{Error as _, OutputPin};
use log::{debug, warn};

use crate::app::ports::GpioPort;
use crate::error::MapError;
use crate::pins::MAX_GPIO;

// ── Simulation ────────────────────────────────────────────────

/// In-memory GPIO bank.  Clones share the same line state, so a copy
/// kept by the caller observes what the worker drives.
#[derive(Debug, Clone)]
pub struct SimGpio {
    mappable: bool,
    outputs: Arc<AtomicU64>,
    levels: Arc<AtomicU64>,
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimGpio {
    pub fn new() -> Self {
        Self {
            mappable: true,
            outputs: Arc::new(AtomicU64::new(0)),
            levels: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A bank whose `map()` always fails.
    pub fn unmappable() -> Self {
        Self {
            mappable: false,
            ..Self::new()
        }
    }

    pub fn is_output(&self, pin: u8) -> bool {
        self.outputs.load(Ordering::Acquire) & bit(pin) != 0
    }

    pub fn level(&self, pin: u8) -> bool {
        self.levels.load(Ordering::Acquire) & bit(pin) != 0
    }
}

fn bit(pin: u8) -> u64 {
    1u64.checked_shl(u32::from(pin)).unwrap_or(0)
}

impl GpioPort for SimGpio {
    fn map(&mut self) -> Result<(), MapError> {
        if self.mappable {
            Ok(())
        } else {
            Err(MapError::NotPresent)
        }
    }

    fn configure_output(&mut self, pin: u8) {
        self.outputs.fetch_or(bit(pin), Ordering::AcqRel);
        self.levels.fetch_and(!bit(pin), Ordering::AcqRel);
    }

    fn set(&mut self, pin: u8) {
        self.levels.fetch_or(bit(pin), Ordering::AcqRel);
    }

    fn clear(&mut self, pin: u8) {
        self.levels.fetch_and(!bit(pin), Ordering::AcqRel);
    }
}

// ── Linux sysfs ───────────────────────────────────────────────

/// Drives a line through the legacy sysfs GPIO interface.
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: std::path::PathBuf,
}

impl SysfsGpio {
    /// `root` is normally `/sys/class/gpio`.
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pin_dir(&self, pin: u8) -> std::path::PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    fn write(&self, path: &std::path::Path, value: &str) {
        if let Err(e) = std::fs::write(path, value) {
            warn!("sysfs write {} <- {:?} failed: {}", path.display(), value, e);
        }
    }
}

impl GpioPort for SysfsGpio {
    fn map(&mut self) -> Result<(), MapError> {
        let export = self.root.join("export");
        let meta = std::fs::metadata(&export).map_err(|_| MapError::NotPresent)?;
        if meta.permissions().readonly() {
            return Err(MapError::AccessDenied);
        }
        std::fs::OpenOptions::new()
            .write(true)
            .open(&export)
            .map(drop)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => MapError::AccessDenied,
                std::io::ErrorKind::NotFound => MapError::NotPresent,
                _ => MapError::Driver(e.raw_os_error().unwrap_or(-1)),
            })
    }

    fn configure_output(&mut self, pin: u8) {
        let dir = self.pin_dir(pin);
        if !dir.exists() {
            self.write(&self.root.join("export"), &pin.to_string());
        }
        // "low" selects output direction with the line initially deasserted.
        self.write(&dir.join("direction"), "low");
        debug!("sysfs gpio{} configured as output", pin);
    }

    fn set(&mut self, pin: u8) {
        self.write(&self.pin_dir(pin).join("value"), "1");
    }

    fn clear(&mut self, pin: u8) {
        self.write(&self.pin_dir(pin).join("value"), "0");
    }
}

// ── ESP-IDF ───────────────────────────────────────────────────

/// Drives a line through the ESP-IDF GPIO driver.
#[cfg(target_os = "espidf")]
#[derive(Debug, Default)]
pub struct EspGpio;

#[cfg(target_os = "espidf")]
impl EspGpio {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl GpioPort for EspGpio {
    fn map(&mut self) -> Result<(), MapError> {
        // The GPIO matrix is always present on-chip; nothing to acquire.
        Ok(())
    }

    fn configure_output(&mut self, pin: u8) {
        use esp_idf_svc::sys::*;

        if pin >= MAX_GPIO {
            warn!("GPIO {} out of range, not configured", pin);
            return;
        }
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: cfg is fully initialised and pin is within the GPIO matrix.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            warn!("gpio_config({}) failed: {}", pin, ret);
            return;
        }
        // SAFETY: pin was configured as output above.
        unsafe { gpio_set_level(i32::from(pin), 0) };
    }

    fn set(&mut self, pin: u8) {
        // SAFETY: writes an already-configured output pin.
        unsafe { esp_idf_svc::sys::gpio_set_level(i32::from(pin), 1) };
    }

    fn clear(&mut self, pin: u8) {
        // SAFETY: writes an already-configured output pin.
        unsafe { esp_idf_svc::sys::gpio_set_level(i32::from(pin), 0) };
    }
}

// ── embedded-hal ──────────────────────────────────────────────

/// Wraps a single typed output pin.  The `pin` argument of every port
/// call is ignored; the wrapped pin is the line.
pub struct HalPinGpio<P> {
    pin: P,
}

impl<P: OutputPin> HalPinGpio<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: OutputPin> GpioPort for HalPinGpio<P> {
    fn map(&mut self) -> Result<(), MapError> {
        Ok(())
    }

    fn configure_output(&mut self, _pin: u8) {
        if let Err(e) = self.pin.set_low() {
            warn!("Output pin init failed: {:?}", e.kind());
        }
    }

    fn set(&mut self, _pin: u8) {
        if let Err(e) = self.pin.set_high() {
            warn!("Output pin set failed: {:?}", e.kind());
        }
    }

    fn clear(&mut self, _pin: u8) {
        if let Err(e) = self.pin.set_low() {
            warn!("Output pin clear failed: {:?}", e.kind());
        }
    }
}

/// Pin numbers the sysfs and ESP backends can address.
pub fn pin_in_range(pin: u8) -> bool {
    pin < MAX_GPIO
}
