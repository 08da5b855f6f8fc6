//! Length-prefixed frame codec
//!
//! Each frame is a big-endian `u32` payload length followed by the
//! bincode encoding of a [`Message`].

use super::{Message, TransportError, TransportResult};
use bytes::{Buf, BufMut, BytesMut};

/// Size of the length prefix
pub const HEADER_LEN: usize = 4;

/// Largest accepted payload (1 GiB)
pub const MAX_FRAME_LEN: usize = 1 << 30;

/// Append one encoded frame to `buf`
pub fn encode(message: &Message, buf: &mut BytesMut) -> TransportResult<()> {
    let payload = bincode::serialize(message)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge(payload.len()));
    }

    buf.reserve(HEADER_LEN + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.extend_from_slice(&payload);
    Ok(())
}

/// Take one complete frame off the front of `buf`.
///
/// Returns `Ok(None)` and leaves `buf` untouched when more data is needed.
pub fn decode(buf: &mut BytesMut) -> TransportResult<Option<Message>> {
    if buf.len() < HEADER_LEN {
        return Ok(None);
    }

    let mut header = &buf[..HEADER_LEN];
    let len = header.get_u32() as usize;
    if len > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge(len));
    }

    if buf.len() < HEADER_LEN + len {
        buf.reserve(HEADER_LEN + len - buf.len());
        return Ok(None);
    }

    buf.advance(HEADER_LEN);
    let payload = buf.split_to(len);
    let message = bincode::deserialize(&payload)?;
    Ok(Some(message))
}
