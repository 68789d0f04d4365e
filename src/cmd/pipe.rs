//! Command pipe: bounded queue feeding the command-processing context.
//!
//! ```text
//! ┌─────────────┐                    ┌──────────────────┐
//! │ UDP ingest  │──┐                 │                  │
//! └─────────────┘  │  PipeMsg (≤10)  │   AppService     │
//! ┌─────────────┐  ├───────────────▶│   ::run()        │
//! │ HK schedule │──┘                 │  (blocks here)   │
//! └─────────────┘                    └──────────────────┘
//! ```
//!
//! Producers never block: a full pipe drops the packet.  The consumer
//! blocks until the next packet or a shutdown request.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::warn;

use super::codec::MAX_PACKET_LEN;

/// Pipe depth, in packets.
pub const CMD_PIPE_DEPTH: usize = 10;

/// Raw packet buffer as carried on the pipe.
pub type PacketBuf = Vec<u8, MAX_PACKET_LEN>;

/// One item on the pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeMsg {
    Packet(PacketBuf),
    /// Ask the consumer to leave its loop.
    Shutdown,
}

pub struct CommandPipe {
    chan: Channel<CriticalSectionRawMutex, PipeMsg, CMD_PIPE_DEPTH>,
}

impl Default for CommandPipe {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandPipe {
    pub const fn new() -> Self {
        Self {
            chan: Channel::new(),
        }
    }

    /// Enqueue a raw packet.  Returns `false` if it was dropped because
    /// the pipe is full or the packet exceeds [`MAX_PACKET_LEN`].
    pub fn send(&self, bytes: &[u8]) -> bool {
        let Ok(buf) = PacketBuf::from_slice(bytes) else {
            warn!("Command pipe: {} byte packet too large, dropped", bytes.len());
            return false;
        };
        self.try_send(PipeMsg::Packet(buf))
    }

    pub fn try_send(&self, msg: PipeMsg) -> bool {
        match self.chan.try_send(msg) {
            Ok(()) => true,
            Err(_) => {
                warn!("Command pipe full, message dropped");
                false
            }
        }
    }

    /// Ask the consumer to stop.  Waits for room so the request is not lost.
    pub fn shutdown(&self) {
        futures_lite::future::block_on(self.chan.send(PipeMsg::Shutdown));
    }

    /// Block until the next message arrives.
    pub fn receive(&self) -> PipeMsg {
        futures_lite::future::block_on(self.chan.receive())
    }

    pub fn try_receive(&self) -> Option<PipeMsg> {
        self.chan.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.chan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chan.is_empty()
    }
}
