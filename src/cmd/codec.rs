//! Packet codec.
//!
//! Wire format (CCSDS space packet, header fields big-endian):
//! ```text
//! ┌───────────┬──────────┬──────────┬─────────────────────┬─────────────┐
//! │ Stream ID │ Sequence │ Length   │ Secondary header    │ Payload     │
//! │ u16 (MID) │ u16      │ u16      │ cmd: fc u8, cksum u8│ N bytes, LE │
//! │           │          │ total-7  │ tlm: sec u32, sub u16│            │
//! └───────────┴──────────┴──────────┴─────────────────────┴─────────────┘
//! ```
//!
//! The message id is read before anything else so that a packet with a
//! valid primary header but an unexpected id can still be reported by id.

use heapless::Vec;

use crate::error::PacketError;

/// Primary header size.
pub const PRIMARY_HDR_LEN: usize = 6;
/// Command secondary header size (function code + checksum).
pub const CMD_SEC_HDR_LEN: usize = 2;
/// Telemetry secondary header size (seconds + subseconds).
pub const TLM_SEC_HDR_LEN: usize = 6;

/// Largest command payload accepted.
pub const MAX_PAYLOAD_LEN: usize = 64;
/// Largest packet the pipe and links carry.
pub const MAX_PACKET_LEN: usize = PRIMARY_HDR_LEN + TLM_SEC_HDR_LEN + MAX_PAYLOAD_LEN;

/// Sequence flags for an unsegmented packet.
const SEQ_FLAGS_STANDALONE: u16 = 0b11 << 14;
const SEQ_COUNT_MASK: u16 = 0x3FFF;
const FC_MASK: u8 = 0x7F;

/// A decoded command packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub mid: u16,
    pub seq: u16,
    pub fc: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

/// Timestamp carried in a telemetry secondary header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissionTime {
    pub seconds: u32,
    /// 1/65536 of a second.
    pub subseconds: u16,
}

impl MissionTime {
    pub fn from_uptime_us(us: u64) -> Self {
        let seconds = (us / 1_000_000) as u32;
        let subseconds = ((us % 1_000_000) * 65_536 / 1_000_000) as u16;
        Self {
            seconds,
            subseconds,
        }
    }
}

/// Read only the message id.
pub fn peek_mid(bytes: &[u8]) -> Result<u16, PacketError> {
    if bytes.len() < PRIMARY_HDR_LEN {
        return Err(PacketError::TooShort(bytes.len()));
    }
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Decode a complete command packet.
pub fn decode_command(bytes: &[u8]) -> Result<Message, PacketError> {
    let mid = peek_mid(bytes)?;
    if bytes.len() < PRIMARY_HDR_LEN + CMD_SEC_HDR_LEN {
        return Err(PacketError::TooShort(bytes.len()));
    }

    let declared = usize::from(u16::from_be_bytes([bytes[4], bytes[5]])) + 7;
    if declared != bytes.len() {
        return Err(PacketError::LengthMismatch {
            declared,
            actual: bytes.len(),
        });
    }

    let body = &bytes[PRIMARY_HDR_LEN + CMD_SEC_HDR_LEN..];
    let payload = Vec::from_slice(body).map_err(|()| PacketError::PayloadTooLarge(body.len()))?;

    Ok(Message {
        mid,
        seq: u16::from_be_bytes([bytes[2], bytes[3]]) & SEQ_COUNT_MASK,
        fc: bytes[PRIMARY_HDR_LEN] & FC_MASK,
        payload,
    })
}

/// Encode a command packet (used by the housekeeping scheduler and tests).
///
/// Returns `None` if the payload exceeds [`MAX_PAYLOAD_LEN`].
pub fn encode_command(mid: u16, seq: u16, fc: u8, payload: &[u8]) -> Option<Vec<u8, MAX_PACKET_LEN>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return None;
    }
    let mut out = Vec::new();
    write_primary(&mut out, mid, seq, CMD_SEC_HDR_LEN + payload.len())?;
    out.push(fc & FC_MASK).ok()?;
    out.push(0).ok()?;
    out.extend_from_slice(payload).ok()?;

    let cksum_idx = PRIMARY_HDR_LEN + 1;
    out[cksum_idx] = 0xFF ^ out.iter().fold(0u8, |acc, b| acc ^ b);
    Some(out)
}

/// Encode a telemetry packet with a time secondary header.
pub fn encode_telemetry(
    mid: u16,
    seq: u16,
    time: MissionTime,
    payload: &[u8],
) -> Option<Vec<u8, MAX_PACKET_LEN>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return None;
    }
    let mut out = Vec::new();
    write_primary(&mut out, mid, seq, TLM_SEC_HDR_LEN + payload.len())?;
    out.extend_from_slice(&time.seconds.to_be_bytes()).ok()?;
    out.extend_from_slice(&time.subseconds.to_be_bytes()).ok()?;
    out.extend_from_slice(payload).ok()?;
    Some(out)
}

fn write_primary(out: &mut Vec<u8, MAX_PACKET_LEN>, mid: u16, seq: u16, after_primary: usize) -> Option<()> {
    let length = (after_primary - 1) as u16;
    out.extend_from_slice(&mid.to_be_bytes()).ok()?;
    out.extend_from_slice(&(SEQ_FLAGS_STANDALONE | (seq & SEQ_COUNT_MASK)).to_be_bytes())
        .ok()?;
    out.extend_from_slice(&length.to_be_bytes()).ok()?;
    Some(())
}
