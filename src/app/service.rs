//! Application service, the command-processing context.
//!
//! [`AppService`] owns the command router and the event sink, and shares
//! the [`BlinkController`] with the blink worker.  Every inbound packet
//! is routed by message id; telemetry and time flow through port traits
//! injected at call sites, so the service is testable with mock adapters.
//!
//! ```text
//!  CommandPipe ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │        AppService         │
//!    TimePort ──▶  │  MID routing · Router ·   │ ──▶ TelemetryPort
//!                  │  Housekeeping             │
//!                  └─────────────┬────────────┘
//!                                │ set_on_time / set_off_time
//!                                ▼
//!                         BlinkController ◀── BlinkWorker
//! ```

use std::sync::Arc;

use log::{error, info, warn};

use crate::cmd::codec::{self, MissionTime};
use crate::cmd::pipe::{CommandPipe, PipeMsg};
use crate::cmd::router::CommandRouter;
use crate::config::AppConfig;
use crate::ctrl::BlinkController;
use crate::error::Result;

use super::commands::{
    NOOP_CMD_FC, NoArgs, RESET_CMD_FC, SET_OFF_TIME_CMD_FC, SET_ON_TIME_CMD_FC, SetOffTimeCmd,
    SetOnTimeCmd,
};
use super::events::{AppEvent, HkPacket, Version};
use super::ports::{EventSink, TelemetryPort, TimePort};

/// State the command handlers operate on.
pub struct AppState {
    ctrl: Arc<BlinkController>,
    /// Set by the reset handler; applied once dispatch has counted it.
    reset_pending: bool,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService<S: EventSink> {
    config: AppConfig,
    state: AppState,
    router: CommandRouter<AppState, S>,
    sink: S,
    hk_seq: u16,
}

impl<S: EventSink + 'static> AppService<S> {
    /// Register the command set and announce initialisation.
    pub fn new(config: AppConfig, ctrl: Arc<BlinkController>, mut sink: S) -> Result<Self> {
        let mut router = CommandRouter::new();

        router.register::<NoArgs, _>(NOOP_CMD_FC, |_: &mut AppState, sink: &mut S, _| {
            sink.emit(&AppEvent::NoOp(Version::current()));
            true
        })?;
        router.register::<NoArgs, _>(RESET_CMD_FC, |st: &mut AppState, _: &mut S, _| {
            st.reset_pending = true;
            true
        })?;
        router.register::<SetOnTimeCmd, _>(
            SET_ON_TIME_CMD_FC,
            |st: &mut AppState, sink: &mut S, cmd: SetOnTimeCmd| {
                st.ctrl.set_on_time(cmd.on_time_ms, sink)
            },
        )?;
        router.register::<SetOffTimeCmd, _>(
            SET_OFF_TIME_CMD_FC,
            |st: &mut AppState, sink: &mut S, cmd: SetOffTimeCmd| {
                st.ctrl.set_off_time(cmd.off_time_ms, sink)
            },
        )?;

        let version = Version::current();
        info!(
            "AppService up: cmd=0x{:04X} hk_req=0x{:04X} hk_tlm=0x{:04X} v{}",
            config.cmd_mid, config.send_hk_mid, config.hk_tlm_mid, version
        );
        sink.emit(&AppEvent::Initialized(version));

        Ok(Self {
            config,
            state: AppState {
                ctrl,
                reset_pending: false,
            },
            router,
            sink,
            hk_seq: 0,
        })
    }

    // ── Packet routing ────────────────────────────────────────

    /// Route one raw packet by message id.
    pub fn process_packet(
        &mut self,
        bytes: &[u8],
        tlm: &mut impl TelemetryPort,
        clock: &impl TimePort,
    ) {
        let mid = match codec::peek_mid(bytes) {
            Ok(mid) => mid,
            Err(e) => {
                error!("Couldn't read message id: {}", e);
                self.sink.emit(&AppEvent::MsgIdUnreadable(e.into()));
                return;
            }
        };

        if mid == self.config.cmd_mid {
            self.process_command(bytes);
        } else if mid == self.config.send_hk_mid {
            self.send_housekeeping(tlm, clock);
        } else {
            warn!("Invalid message id 0x{:04X}", mid);
            self.router.count_invalid();
            self.sink.emit(&AppEvent::InvalidMsgId(mid));
        }
    }

    fn process_command(&mut self, bytes: &[u8]) {
        let msg = match codec::decode_command(bytes) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Command packet rejected: {}", e);
                self.router.count_invalid();
                self.sink.emit(&AppEvent::CommandRejected(e.into()));
                return;
            }
        };

        self.router
            .dispatch(&mut self.state, &mut self.sink, msg.fc, &msg.payload);

        if core::mem::take(&mut self.state.reset_pending) {
            info!("Reset command: counters cleared");
            self.router.reset_status();
            self.state.ctrl.reset_status();
        }
    }

    /// Block on `pipe`, processing packets until a shutdown request.
    pub fn run(
        &mut self,
        pipe: &CommandPipe,
        tlm: &mut impl TelemetryPort,
        clock: &impl TimePort,
    ) {
        loop {
            match pipe.receive() {
                PipeMsg::Packet(bytes) => self.process_packet(&bytes, tlm, clock),
                PipeMsg::Shutdown => break,
            }
        }
        info!("AppService command loop exiting");
        self.sink.emit(&AppEvent::Exiting);
    }

    // ── Housekeeping ──────────────────────────────────────────

    /// Snapshot the controller and command counters.
    pub fn build_housekeeping(&self) -> HkPacket {
        let snap = self.state.ctrl.snapshot();
        HkPacket {
            valid_cmd_cnt: self.router.valid_count(),
            invalid_cmd_cnt: self.router.invalid_count(),
            ctrl_is_mapped: u8::from(snap.is_mapped),
            ctrl_out_pin: snap.pin,
            ctrl_led_on: u8::from(snap.is_asserted),
            ctrl_spare: HkPacket::SPARE_FILL,
            ctrl_on_time: snap.on_time_ms,
            ctrl_off_time: snap.off_time_ms,
        }
    }

    /// Timestamp, encode and transmit one housekeeping packet.
    pub fn send_housekeeping(&mut self, tlm: &mut impl TelemetryPort, clock: &impl TimePort) {
        let hk = self.build_housekeeping();
        let time = MissionTime::from_uptime_us(clock.uptime_us());
        match codec::encode_telemetry(self.config.hk_tlm_mid, self.hk_seq, time, &hk.to_bytes()) {
            Some(pkt) => {
                self.hk_seq = self.hk_seq.wrapping_add(1);
                tlm.transmit(&pkt);
            }
            None => error!("Housekeeping packet did not fit the telemetry buffer"),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn valid_count(&self) -> u16 {
        self.router.valid_count()
    }

    pub fn invalid_count(&self) -> u16 {
        self.router.invalid_count()
    }

    pub fn controller(&self) -> &Arc<BlinkController> {
        &self.state.ctrl
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
