//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements     | Connects to                       |
//! |-------------|----------------|-----------------------------------|
//! | `gpio`      | GpioPort       | Sim bank, sysfs, ESP-IDF, e-hal   |
//! | `log_sink`  | EventSink      | Serial / stderr log output        |
//! | `time`      | TimePort       | ESP32 system timer / `Instant`    |
//! | `udp_link`  | TelemetryPort  | UDP ground link (in and out)      |
//! | `hk_timer`  | (none)         | Periodic housekeeping requests    |
//! | `wifi`      | (none)         | STA bring-up for the UDP links    |

pub mod gpio;
pub mod hk_timer;
pub mod log_sink;
pub mod time;
pub mod udp_link;
pub mod wifi;
