//! Fuzz target: command packet decode and routing
//!
//! Drives arbitrary bytes through `decode_command` and then through the
//! full `AppService::process_packet` path.  Asserts that decoding never
//! panics, never yields a payload larger than the receive buffer, and
//! that every packet moves the command counters by at most one.
//!
//! cargo fuzz run fuzz_packet_decoder

#![no_main]

use std::sync::Arc;

use blinkctl::app::events::AppEvent;
use blinkctl::app::ports::{EventSink, GpioPort, TelemetryPort, TimePort};
use blinkctl::app::service::AppService;
use blinkctl::cmd::codec::{self, MAX_PAYLOAD_LEN};
use blinkctl::config::AppConfig;
use blinkctl::ctrl::BlinkController;
use blinkctl::error::MapError;
use libfuzzer_sys::fuzz_target;

struct NullGpio;

impl GpioPort for NullGpio {
    fn map(&mut self) -> Result<(), MapError> {
        Ok(())
    }
    fn configure_output(&mut self, _pin: u8) {}
    fn set(&mut self, _pin: u8) {}
    fn clear(&mut self, _pin: u8) {}
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

struct NullTlm;

impl TelemetryPort for NullTlm {
    fn transmit(&mut self, packet: &[u8]) {
        assert!(packet.len() <= codec::MAX_PACKET_LEN);
    }
}

struct Clock;

impl TimePort for Clock {
    fn uptime_us(&self) -> u64 {
        0
    }
}

fuzz_target!(|data: &[u8]| {
    if let Ok(msg) = codec::decode_command(data) {
        assert!(msg.payload.len() <= MAX_PAYLOAD_LEN);
        assert!(msg.fc < 0x80);
    }

    let ctrl = Arc::new(BlinkController::new(&mut NullGpio, 4, 50, 20, &mut NullSink));
    let Ok(mut app) = AppService::new(AppConfig::default(), ctrl, NullSink) else {
        return;
    };
    app.process_packet(data, &mut NullTlm, &Clock);

    let total = u32::from(app.valid_count()) + u32::from(app.invalid_count());
    assert!(total <= 1);
});
