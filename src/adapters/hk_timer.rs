//! Housekeeping request timer.
//!
//! Pushes a send-housekeeping packet onto the [`CommandPipe`] every
//! `hk_interval_ms`, so the status reporter runs in the command context
//! on the same path a ground request would take.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::cmd::codec;
use crate::cmd::pipe::CommandPipe;
use crate::drivers::task_pin::{Core, spawn_on_core};

/// Longest single sleep, so a stop request is seen promptly.
const STOP_POLL: Duration = Duration::from_millis(100);

const HK_TASK_NAME: &str = "hk-timer\0";
const HK_PRIORITY: u8 = 3;
const HK_STACK_KB: usize = 4;

pub struct HkTimer {
    mid: u16,
    interval: Duration,
    seq: u16,
}

impl HkTimer {
    pub fn new(send_hk_mid: u16, interval_ms: u32) -> Self {
        Self {
            mid: send_hk_mid,
            interval: Duration::from_millis(u64::from(interval_ms)),
            seq: 0,
        }
    }

    /// Enqueue one housekeeping request.
    pub fn fire(&mut self, pipe: &CommandPipe) -> bool {
        let Some(pkt) = codec::encode_command(self.mid, self.seq, 0, &[]) else {
            error!("Housekeeping request did not encode");
            return false;
        };
        self.seq = self.seq.wrapping_add(1);
        pipe.send(&pkt)
    }

    /// Fire every interval until `stop` is set.
    pub fn spawn(
        mut self,
        pipe: Arc<CommandPipe>,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<()>> {
        spawn_on_core(Core::Pro, HK_PRIORITY, HK_STACK_KB, HK_TASK_NAME, move || {
            let mut next = Instant::now() + self.interval;
            while !stop.load(Ordering::Acquire) {
                let now = Instant::now();
                if now >= next {
                    self.fire(&pipe);
                    next += self.interval;
                } else {
                    std::thread::sleep((next - now).min(STOP_POLL));
                }
            }
            debug!("Housekeeping timer stopped");
        })
    }
}
