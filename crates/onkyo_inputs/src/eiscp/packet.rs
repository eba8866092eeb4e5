//! ISCP packet envelope.
//!
//! Every EISCP message travels in a 16 byte header followed by the message
//! body:
//!
//! ```text
//! "ISCP" | header size (u32 BE) | data size (u32 BE) | version | 3 reserved
//! ```

use super::EiscpError;
use super::Result;

pub const MAGIC: [u8; 4] = *b"ISCP";
pub const HEADER_SIZE: usize = 16;
pub const VERSION: u8 = 0x01;

/// Headers may be extended, but never by more than a few bytes.
pub const MAX_HEADER_SIZE: usize = HEADER_SIZE + 64;

/// Receivers never send bodies anywhere near this large.
pub const MAX_DATA_SIZE: usize = 64 * 1024;

/// Wrap a message body in an ISCP header.
pub fn encode(body: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(HEADER_SIZE + body.len());
    packet.extend_from_slice(&MAGIC);
    packet.extend_from_slice(&(HEADER_SIZE as u32).to_be_bytes());
    packet.extend_from_slice(&(body.len() as u32).to_be_bytes());
    packet.push(VERSION);
    packet.extend_from_slice(&[0, 0, 0]);
    packet.extend_from_slice(body);
    packet
}

/// Take one complete packet off the front of `buf`, returning its body.
///
/// Returns `Ok(None)` while the buffer holds only part of a packet. Bytes
/// are removed from `buf` only when a whole packet is returned.
pub fn decode(buf: &mut Vec<u8>) -> Result<Option<Vec<u8>>> {
    if buf.len() < HEADER_SIZE {
        return Ok(None);
    }

    let magic = [buf[0], buf[1], buf[2], buf[3]];
    if magic != MAGIC {
        return Err(EiscpError::BadMagic(magic));
    }

    let header_size = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    if !(HEADER_SIZE..=MAX_HEADER_SIZE).contains(&header_size) {
        return Err(EiscpError::BadHeaderSize(header_size));
    }

    let data_size = u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;
    if data_size > MAX_DATA_SIZE {
        return Err(EiscpError::PacketTooLarge(data_size));
    }

    let total = header_size + data_size;
    if buf.len() < total {
        return Ok(None);
    }

    let body = buf[header_size..total].to_vec();
    buf.drain(..total);
    Ok(Some(body))
}
