//! UDP ground link.
//!
//! ```text
//!  ground ──UDP──▶ UdpCommandIngest ──▶ CommandPipe ──▶ AppService
//!  ground ◀──UDP── UdpTelemetry ◀───────────────────────┘
//! ```
//!
//! Each datagram carries exactly one packet.  The ingest thread runs on
//! the protocol core and never touches the controller directly.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::TelemetryPort;
use crate::cmd::codec::MAX_PACKET_LEN;
use crate::cmd::pipe::CommandPipe;
use crate::drivers::task_pin::{Core, spawn_on_core};

/// How often the ingest loop wakes to check its stop flag.
const RECV_POLL: Duration = Duration::from_millis(200);

const INGEST_TASK_NAME: &str = "cmd-ingest\0";
const INGEST_PRIORITY: u8 = 4;
const INGEST_STACK_KB: usize = 6;

// ── Inbound ───────────────────────────────────────────────────

pub struct UdpCommandIngest {
    socket: UdpSocket,
}

impl UdpCommandIngest {
    /// Listen on all interfaces.  Port 0 picks an ephemeral port.
    pub fn bind(port: u16) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], port)))?;
        socket.set_read_timeout(Some(RECV_POLL))?;
        info!("Command ingest listening on {}", socket.local_addr()?);
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive at most one datagram and forward it to `pipe`.
    ///
    /// Returns `false` on timeout.
    pub fn poll(&self, pipe: &CommandPipe) -> bool {
        // One spare byte so an oversize datagram is detected, not truncated.
        let mut buf = [0u8; MAX_PACKET_LEN + 1];
        match self.socket.recv_from(&mut buf) {
            Ok((n, from)) => {
                debug!("{} byte packet from {}", n, from);
                pipe.send(&buf[..n]);
                true
            }
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                false
            }
            Err(e) => {
                warn!("Command ingest recv failed: {}", e);
                false
            }
        }
    }

    /// Forward datagrams until `stop` is set.
    pub fn spawn(
        self,
        pipe: Arc<CommandPipe>,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<()>> {
        spawn_on_core(
            Core::Pro,
            INGEST_PRIORITY,
            INGEST_STACK_KB,
            INGEST_TASK_NAME,
            move || {
                while !stop.load(Ordering::Acquire) {
                    self.poll(&pipe);
                }
                debug!("Command ingest stopped");
            },
        )
    }
}

// ── Outbound ──────────────────────────────────────────────────

/// Best-effort telemetry sender.
pub struct UdpTelemetry {
    socket: UdpSocket,
}

impl UdpTelemetry {
    /// `dest` is a `host:port` string.
    pub fn connect(dest: impl ToSocketAddrs) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))?;
        socket.connect(dest)?;
        info!("Telemetry output to {}", socket.peer_addr()?);
        Ok(Self { socket })
    }
}

impl TelemetryPort for UdpTelemetry {
    fn transmit(&mut self, packet: &[u8]) {
        if let Err(e) = self.socket.send(packet) {
            warn!("Telemetry send failed: {}", e);
        }
    }
}
