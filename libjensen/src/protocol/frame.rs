// libjensen/src/protocol/frame.rs

//! The `Packet` type and whole-frame encode and decode.

use crate::constants::{
    JENSEN_CHECKSUM_LEN, JENSEN_HEADER_LEN, JENSEN_MAGIC, JENSEN_MAX_BODY_LEN, JENSEN_MIN_FRAME_LEN,
};
use crate::error::FrameError;
use crate::protocol::checksum::{frame_checksum, verify};
use crate::{Error, Result};

/// Jensen wire frame.
/// Format: [Magic(2)] [Command(2)] [Sequence(4)] [BodyLen(4)] [Body(n)] [Checksum(1)]
/// Magic: 0x12 0x34, all integers big-endian, checksum covers every
/// preceding byte of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Command id; replies echo the request's.
    pub command: u16,
    /// Sequence id; replies echo the request's.
    pub sequence: u32,
    /// Payload between header and checksum.
    pub body: Vec<u8>,
}

impl Packet {
    /// Build a packet. Nothing is validated until [`Packet::encode`].
    pub fn new(command: u16, sequence: u32, body: Vec<u8>) -> Self {
        Self {
            command,
            sequence,
            body,
        }
    }

    /// Total encoded length of this packet on the wire.
    pub fn frame_len(&self) -> usize {
        JENSEN_HEADER_LEN + self.body.len() + JENSEN_CHECKSUM_LEN
    }

    /// Encode into a full wire frame.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.body.len() > JENSEN_MAX_BODY_LEN {
            return Err(Error::InvalidLength {
                expected: JENSEN_MAX_BODY_LEN,
                actual: self.body.len(),
            });
        }

        let mut out = Vec::with_capacity(self.frame_len());
        out.extend_from_slice(&JENSEN_MAGIC);
        out.extend_from_slice(&self.command.to_be_bytes());
        out.extend_from_slice(&self.sequence.to_be_bytes());
        out.extend_from_slice(&(self.body.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.body);
        out.push(frame_checksum(&out));
        Ok(out)
    }

    /// Decode exactly one frame. The slice must contain the whole frame and
    /// nothing else.
    pub fn decode(frame: &[u8]) -> std::result::Result<Packet, FrameError> {
        if frame.len() < JENSEN_MAGIC.len() {
            return Err(FrameError::TruncatedBody {
                expected: JENSEN_MIN_FRAME_LEN,
                actual: frame.len(),
            });
        }
        check_magic(frame)?;

        if frame.len() < JENSEN_MIN_FRAME_LEN {
            return Err(FrameError::TruncatedBody {
                expected: JENSEN_MIN_FRAME_LEN,
                actual: frame.len(),
            });
        }

        let total = declared_frame_len(frame)?;
        if frame.len() < total {
            return Err(FrameError::TruncatedBody {
                expected: total,
                actual: frame.len(),
            });
        }

        let packet = verify_and_split(&frame[..total])?;
        if frame.len() > total {
            return Err(FrameError::TrailingBytes {
                extra: frame.len() - total,
            });
        }
        Ok(packet)
    }

    /// Try to decode a frame at the start of `buf`, which may hold a partial
    /// frame or several frames back to back.
    ///
    /// Returns `Ok(None)` when more bytes are needed, or the packet and the
    /// number of bytes it occupied.
    pub fn decode_prefix(buf: &[u8]) -> std::result::Result<Option<(Packet, usize)>, FrameError> {
        if buf.len() < JENSEN_MAGIC.len() {
            return match buf.first() {
                None => Ok(None),
                Some(&b) if b == JENSEN_MAGIC[0] => Ok(None),
                Some(&b) => Err(FrameError::InvalidMagic { actual: [b, 0] }),
            };
        }
        check_magic(buf)?;

        if buf.len() < JENSEN_HEADER_LEN {
            return Ok(None);
        }

        let total = declared_frame_len(buf)?;
        if buf.len() < total {
            return Ok(None);
        }

        let packet = verify_and_split(&buf[..total])?;
        Ok(Some((packet, total)))
    }
}

fn check_magic(buf: &[u8]) -> std::result::Result<(), FrameError> {
    if buf[0] != JENSEN_MAGIC[0] || buf[1] != JENSEN_MAGIC[1] {
        return Err(FrameError::InvalidMagic {
            actual: [buf[0], buf[1]],
        });
    }
    Ok(())
}

// Caller guarantees at least a full header is present.
fn declared_frame_len(header: &[u8]) -> std::result::Result<usize, FrameError> {
    let body_len = u32::from_be_bytes([header[8], header[9], header[10], header[11]]) as usize;
    if body_len > JENSEN_MAX_BODY_LEN {
        return Err(FrameError::Oversized {
            declared: body_len,
            limit: JENSEN_MAX_BODY_LEN,
        });
    }
    Ok(JENSEN_HEADER_LEN + body_len + JENSEN_CHECKSUM_LEN)
}

// `frame` is exactly one frame long.
fn verify_and_split(frame: &[u8]) -> std::result::Result<Packet, FrameError> {
    let checksum_idx = frame.len() - JENSEN_CHECKSUM_LEN;
    let actual = frame[checksum_idx];
    if !verify(&frame[..checksum_idx], actual) {
        return Err(FrameError::ChecksumMismatch {
            expected: frame_checksum(&frame[..checksum_idx]),
            actual,
        });
    }

    let command = u16::from_be_bytes([frame[2], frame[3]]);
    let sequence = u32::from_be_bytes([frame[4], frame[5], frame[6], frame[7]]);
    let body = frame[JENSEN_HEADER_LEN..checksum_idx].to_vec();
    Ok(Packet {
        command,
        sequence,
        body,
    })
}
