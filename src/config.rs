//! Startup configuration.
//!
//! Consumed once at boot: message ids, housekeeping cadence, link
//! endpoints, station credentials, worker-task parameters and the
//! initial blink timing.
//! Loaded from a JSON document; any field left out takes its default.
//!
//! Blink durations are unbounded: any `u32` is accepted, including zero.

use serde::{Deserialize, Serialize};

use crate::adapters::wifi::validate_credentials;
use crate::error::{Error, Result};
use crate::pins;

/// Initial blink controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// GPIO number of the output line.
    pub out_pin: u8,
    /// Time (milliseconds) to keep the line asserted.
    pub on_time_ms: u32,
    /// Time (milliseconds) to keep the line deasserted.
    pub off_time_ms: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            out_pin: pins::BLINK_OUT_GPIO,
            on_time_ms: 1000,
            off_time_ms: 1000,
        }
    }
}

/// Blink worker thread parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildTaskConfig {
    /// FreeRTOS priority (ignored on host).
    pub priority: u8,
    /// Stack size in KiB.
    pub stack_kb: usize,
}

impl Default for ChildTaskConfig {
    fn default() -> Self {
        Self {
            priority: 5,
            stack_kb: 8,
        }
    }
}

/// WiFi station credentials (ESP32 target only).  An empty SSID leaves
/// the station unconfigured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub ssid: String,
    /// Empty for an open network.
    pub password: String,
}

/// Core application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // --- Message ids ---
    /// Ground command packets.
    pub cmd_mid: u16,
    /// Housekeeping request packets.
    pub send_hk_mid: u16,
    /// Outbound housekeeping telemetry packets.
    pub hk_tlm_mid: u16,

    // --- Timing ---
    /// Housekeeping request interval (milliseconds).
    pub hk_interval_ms: u32,

    // --- Links ---
    /// UDP port the command ingest listens on.
    pub cmd_udp_port: u16,
    /// `host:port` housekeeping packets are sent to.
    pub tlm_udp_addr: String,

    // --- Hardware ---
    /// Root of the Linux sysfs GPIO tree.  `None` runs the in-memory
    /// simulation backend on host builds.
    pub gpio_sysfs_root: Option<String>,

    pub wifi: WifiConfig,
    pub child: ChildTaskConfig,
    pub ctrl: BlinkConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cmd_mid: 0x19D0,
            send_hk_mid: 0x19D1,
            hk_tlm_mid: 0x09D0,

            hk_interval_ms: 4000,

            cmd_udp_port: 1234,
            tlm_udp_addr: "127.0.0.1:1235".into(),

            gpio_sysfs_root: None,

            wifi: WifiConfig::default(),
            child: ChildTaskConfig::default(),
            ctrl: BlinkConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a JSON document, then [`validate`](Self::validate) it.
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| Error::ConfigParse {
            line: e.line(),
            column: e.column(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Structural checks only.  Blink durations are never range-checked.
    pub fn validate(&self) -> Result<()> {
        if self.cmd_mid == self.send_hk_mid
            || self.cmd_mid == self.hk_tlm_mid
            || self.send_hk_mid == self.hk_tlm_mid
        {
            return Err(Error::Config("message ids must be distinct"));
        }
        if self.hk_interval_ms == 0 {
            return Err(Error::Config("hk_interval_ms must be non-zero"));
        }
        if self.child.stack_kb < 4 {
            return Err(Error::Config("child.stack_kb must be at least 4"));
        }
        if !self.wifi.ssid.is_empty() && validate_credentials(&self.wifi).is_err() {
            return Err(Error::Config("wifi credentials invalid"));
        }
        Ok(())
    }
}
