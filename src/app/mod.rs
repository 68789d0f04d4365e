//! Application core: command processing and status reporting, zero I/O.
//!
//! This module holds the command-processing side of the firmware: the
//! inbound command set, the diagnostic events the core emits, and the
//! [`service::AppService`] that routes packets to the blink controller.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
