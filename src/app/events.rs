//! Outbound diagnostic events and the housekeeping record.
//!
//! The controller, worker and [`AppService`](super::service::AppService)
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Every event carries a stable numeric id and a severity so a ground
//! system can filter them without parsing text.

use crate::error::{Error, MapError};

// ---------------------------------------------------------------------------
// Event ids
// ---------------------------------------------------------------------------

/// First id owned by the application service.
pub const APP_BASE_EID: u16 = 100;
/// First id owned by the blink controller.
pub const CTRL_BASE_EID: u16 = 110;
/// First id owned by the command router.
pub const ROUTER_BASE_EID: u16 = 120;

pub const APP_INIT_EID: u16 = APP_BASE_EID;
pub const APP_NOOP_EID: u16 = APP_BASE_EID + 1;
pub const APP_EXIT_EID: u16 = APP_BASE_EID + 2;
pub const APP_INVALID_MID_EID: u16 = APP_BASE_EID + 3;

pub const CTRL_CONSTRUCTOR_EID: u16 = CTRL_BASE_EID;
pub const CTRL_SET_ON_TIME_EID: u16 = CTRL_BASE_EID + 1;
pub const CTRL_SET_OFF_TIME_EID: u16 = CTRL_BASE_EID + 2;
pub const CTRL_CHILD_TASK_EID: u16 = CTRL_BASE_EID + 3;

pub const ROUTER_DISPATCH_EID: u16 = ROUTER_BASE_EID;

// ---------------------------------------------------------------------------
// Severity / version
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Information,
    Error,
    Critical,
}

/// Application version reported by the init and no-op events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    /// Version of this build, from the crate manifest.
    pub fn current() -> Self {
        Self {
            major: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            minor: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            patch: env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
        }
    }
}

impl core::fmt::Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service finished initialisation.
    Initialized(Version),
    /// A no-op command was received.
    NoOp(Version),
    /// The command-processing loop is exiting.
    Exiting,

    /// A packet arrived on a message id nobody subscribed to.
    InvalidMsgId(u16),
    /// A packet header could not be decoded far enough to read its id.
    MsgIdUnreadable(Error),

    /// The GPIO peripheral was mapped and the pin configured as output.
    GpioMapped { pin: u8 },
    /// Mapping failed; the controller runs degraded for the process lifetime.
    GpioMapFailed(MapError),
    /// On-duration overwritten by command.
    OnTimeSet(u32),
    /// Off-duration overwritten by command.
    OffTimeSet(u32),
    /// The worker asserted the line for `ms` milliseconds.
    PhaseOn { pin: u8, ms: u32 },
    /// The worker deasserted the line for `ms` milliseconds.
    PhaseOff { pin: u8, ms: u32 },

    /// The router rejected a command before or after reaching its handler.
    CommandRejected(Error),
}

impl AppEvent {
    /// Stable numeric event id.
    pub fn id(&self) -> u16 {
        match self {
            Self::Initialized(_) => APP_INIT_EID,
            Self::NoOp(_) => APP_NOOP_EID,
            Self::Exiting => APP_EXIT_EID,
            Self::InvalidMsgId(_) | Self::MsgIdUnreadable(_) => APP_INVALID_MID_EID,
            Self::GpioMapped { .. } | Self::GpioMapFailed(_) => CTRL_CONSTRUCTOR_EID,
            Self::OnTimeSet(_) => CTRL_SET_ON_TIME_EID,
            Self::OffTimeSet(_) => CTRL_SET_OFF_TIME_EID,
            Self::PhaseOn { .. } | Self::PhaseOff { .. } => CTRL_CHILD_TASK_EID,
            Self::CommandRejected(_) => ROUTER_DISPATCH_EID,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Exiting => Severity::Critical,
            Self::InvalidMsgId(_)
            | Self::MsgIdUnreadable(_)
            | Self::GpioMapFailed(_)
            | Self::CommandRejected(_) => Severity::Error,
            _ => Severity::Information,
        }
    }
}

impl core::fmt::Display for AppEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Initialized(v) => write!(f, "GPIO demo app initialized. Version {v}"),
            Self::NoOp(v) => write!(f, "No operation command received. Version {v}"),
            Self::Exiting => write!(f, "GPIO demo app terminating"),
            Self::InvalidMsgId(mid) => {
                write!(f, "Received invalid command packet, MID = 0x{mid:04X}")
            }
            Self::MsgIdUnreadable(e) => write!(f, "Couldn't retrieve message ID: {e}"),
            Self::GpioMapped { pin } => write!(f, "GPIO mapped, pin {pin} configured as output"),
            Self::GpioMapFailed(e) => write!(f, "GPIO map failed: {e}"),
            Self::OnTimeSet(ms) => write!(f, "GPIO on time set to {ms} milliseconds"),
            Self::OffTimeSet(ms) => write!(f, "GPIO off time set to {ms} milliseconds"),
            Self::PhaseOn { pin, ms } => write!(f, "GPIO pin {pin} on for {ms} milliseconds"),
            Self::PhaseOff { pin, ms } => write!(f, "GPIO pin {pin} off for {ms} milliseconds"),
            Self::CommandRejected(e) => write!(f, "Command rejected: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Housekeeping
// ---------------------------------------------------------------------------

/// Housekeeping telemetry payload, in wire field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HkPacket {
    pub valid_cmd_cnt: u16,
    pub invalid_cmd_cnt: u16,
    pub ctrl_is_mapped: u8,
    pub ctrl_out_pin: u8,
    pub ctrl_led_on: u8,
    /// Fill byte, always [`HkPacket::SPARE_FILL`].
    pub ctrl_spare: u8,
    pub ctrl_on_time: u32,
    pub ctrl_off_time: u32,
}

impl HkPacket {
    /// Encoded payload length.
    pub const LEN: usize = 16;

    /// Value reported in the spare byte.
    pub const SPARE_FILL: u8 = 5;

    /// Little-endian payload bytes.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..2].copy_from_slice(&self.valid_cmd_cnt.to_le_bytes());
        out[2..4].copy_from_slice(&self.invalid_cmd_cnt.to_le_bytes());
        out[4] = self.ctrl_is_mapped;
        out[5] = self.ctrl_out_pin;
        out[6] = self.ctrl_led_on;
        out[7] = self.ctrl_spare;
        out[8..12].copy_from_slice(&self.ctrl_on_time.to_le_bytes());
        out[12..16].copy_from_slice(&self.ctrl_off_time.to_le_bytes());
        out
    }
}
