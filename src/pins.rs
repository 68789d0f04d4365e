//! GPIO pin assignments for the blink controller board.
//!
//! Single source of truth for board defaults.  The output pin can still be
//! overridden at startup through `AppConfig::ctrl.out_pin`.

// ---------------------------------------------------------------------------
// Blink output
// ---------------------------------------------------------------------------

/// Digital output driving the indicator LED (active HIGH).
pub const BLINK_OUT_GPIO: u8 = 4;

/// Exclusive upper bound of addressable GPIO numbers (ESP32-S3 matrix).
pub const MAX_GPIO: u8 = 48;
