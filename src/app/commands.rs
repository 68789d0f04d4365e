//! Inbound command set.
//!
//! Each command is identified by a function code and carries a
//! fixed-size payload.  Payload types implement [`CommandPayload`], which
//! declares the exact byte length the router validates before a handler
//! ever runs.

/// No operation; reports the application version.
pub const NOOP_CMD_FC: u8 = 0;
/// Reset command counters and controller status.
pub const RESET_CMD_FC: u8 = 1;
/// Overwrite the on-duration.
pub const SET_ON_TIME_CMD_FC: u8 = 2;
/// Overwrite the off-duration.
pub const SET_OFF_TIME_CMD_FC: u8 = 3;

/// A fixed-size command payload.
pub trait CommandPayload: Sized {
    /// Exact payload length in bytes.
    const LEN: usize;

    /// Decode from exactly [`LEN`](Self::LEN) bytes.  The router checks
    /// the length first, so implementations may index freely.
    fn decode(bytes: &[u8]) -> Self;
}

/// Payload of commands that carry no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoArgs;

impl CommandPayload for NoArgs {
    const LEN: usize = 0;

    fn decode(_bytes: &[u8]) -> Self {
        Self
    }
}

/// `SetOnTime` payload.  No limits placed on the commanded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOnTimeCmd {
    /// Time (milliseconds) to keep the line asserted.
    pub on_time_ms: u32,
}

impl CommandPayload for SetOnTimeCmd {
    const LEN: usize = 4;

    fn decode(bytes: &[u8]) -> Self {
        Self {
            on_time_ms: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }
}

/// `SetOffTime` payload.  No limits placed on the commanded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOffTimeCmd {
    /// Time (milliseconds) to keep the line deasserted.
    pub off_time_ms: u32,
}

impl CommandPayload for SetOffTimeCmd {
    const LEN: usize = 4;

    fn decode(bytes: &[u8]) -> Self {
        Self {
            off_time_ms: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }
}
