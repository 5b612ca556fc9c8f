//! Length-prefixed framing for envelopes on a byte stream
//!
//! Every envelope travels as:
//! ```text
//! [ 4 bytes: body length (u32, big-endian) ][ N bytes: protobuf Envelope ]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::Message;
use thiserror::Error;

use crate::Envelope;

/// Largest frame body accepted in either direction (64 KiB)
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

const PREFIX_LEN: usize = 4;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Frame too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),

    #[error("Invalid frame length prefix: {0}")]
    InvalidLength(u32),

    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Protobuf encode error: {0}")]
    Encode(#[from] prost::EncodeError),
}

/// Encode an envelope into a single length-prefixed frame
pub fn encode_frame(envelope: &Envelope) -> Result<Bytes, CodecError> {
    let body_len = envelope.encoded_len();
    if body_len > MAX_FRAME_SIZE as usize {
        return Err(CodecError::FrameTooLarge(body_len));
    }

    let mut buf = BytesMut::with_capacity(PREFIX_LEN + body_len);
    buf.put_u32(body_len as u32);
    envelope.encode(&mut buf)?;
    Ok(buf.freeze())
}

/// Accumulates stream bytes and splits them into envelopes
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Append bytes read from the stream
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to take the next complete envelope.
    ///
    /// Returns `Ok(None)` while the buffered frame is incomplete; the partial
    /// bytes stay buffered. Call repeatedly to drain every complete frame.
    /// A `Decode` error has already consumed its frame, so decoding can
    /// continue; `InvalidLength` means the stream is no longer aligned.
    pub fn decode_next(&mut self) -> Result<Option<Envelope>, CodecError> {
        if self.buffer.len() < PREFIX_LEN {
            return Ok(None);
        }

        let body_len = u32::from_be_bytes([
            self.buffer[0],
            self.buffer[1],
            self.buffer[2],
            self.buffer[3],
        ]);
        if body_len > MAX_FRAME_SIZE {
            return Err(CodecError::InvalidLength(body_len));
        }

        let frame_len = PREFIX_LEN + body_len as usize;
        if self.buffer.len() < frame_len {
            return Ok(None);
        }

        self.buffer.advance(PREFIX_LEN);
        let body = self.buffer.split_to(body_len as usize);
        Ok(Some(Envelope::decode(body)?))
    }

    /// Number of bytes waiting for the rest of their frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
