//! Unified error types for the blink controller firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! command-processing loop's error handling uniform.  All variants are
//! `Copy` so they can be carried inside diagnostic events without
//! allocation.
//!
//! None of these errors is fatal: the worst outcome is a controller that
//! stays unmapped and idles for the rest of the process.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No handler is registered for this function code.
    UnknownFunctionCode(u8),
    /// Payload length did not match the handler's declared length.
    MalformedPayload { fc: u8, expected: usize, actual: usize },
    /// A handler is already registered for this function code.
    FunctionCodeInUse(u8),
    /// Function code is outside the dispatch table.
    FunctionCodeOutOfRange(u8),
    /// The packet header could not be decoded.
    Packet(PacketError),
    /// Configuration is structurally invalid.
    Config(&'static str),
    /// Configuration text failed to parse.
    ConfigParse { line: usize, column: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFunctionCode(fc) => write!(f, "unknown function code {fc}"),
            Self::MalformedPayload {
                fc,
                expected,
                actual,
            } => write!(
                f,
                "function code {fc}: payload length {actual}, expected {expected}"
            ),
            Self::FunctionCodeInUse(fc) => write!(f, "function code {fc} already registered"),
            Self::FunctionCodeOutOfRange(fc) => write!(f, "function code {fc} out of range"),
            Self::Packet(e) => write!(f, "packet: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::ConfigParse { line, column } => {
                write!(f, "config: parse error at line {line}, column {column}")
            }
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Hardware mapping errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// The GPIO controller is not present on this platform.
    NotPresent,
    /// The process lacks permission to access the GPIO controller.
    AccessDenied,
    /// The platform driver returned an error code.
    Driver(i32),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPresent => write!(f, "GPIO controller not present"),
            Self::AccessDenied => write!(f, "access denied"),
            Self::Driver(rc) => write!(f, "driver error (rc={rc})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Packet decode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Fewer bytes than the fixed headers require.
    TooShort(usize),
    /// The header length field disagrees with the bytes received.
    LengthMismatch { declared: usize, actual: usize },
    /// Payload exceeds the fixed receive buffer.
    PayloadTooLarge(usize),
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(n) => write!(f, "too short ({n} bytes)"),
            Self::LengthMismatch { declared, actual } => {
                write!(f, "length field says {declared} bytes, got {actual}")
            }
            Self::PayloadTooLarge(n) => write!(f, "payload too large ({n} bytes)"),
        }
    }
}

impl From<PacketError> for Error {
    fn from(e: PacketError) -> Self {
        Self::Packet(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
