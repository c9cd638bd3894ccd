// libjensen/src/protocol/stream.rs

//! Receive-side frame accumulation and byte-level resynchronization.
//!
//! A bulk IN read may end in the middle of a frame, or start in the middle
//! of an earlier response. `FrameBuffer` collects reads, hands out complete
//! frames, and on a framing error drops bytes from the front until the next
//! magic sequence so decoding can continue.
//!
//! A leftover header fragment at the front looks like the start of a long
//! frame and would otherwise hold the buffer until its declared length
//! arrives. While the front frame is incomplete, every scan also checks the
//! later magic positions; the first one that holds a complete, valid frame
//! wins and the bytes before it are discarded.

use crate::constants::JENSEN_MAGIC;
use crate::error::FrameError;
use crate::protocol::frame::Packet;

/// Outcome of a single scan over the buffered bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// A complete, checksum-valid frame was removed from the buffer.
    Frame(Packet),
    /// More bytes are required.
    Incomplete,
    /// The front of the buffer was not a valid frame; `discarded` bytes were
    /// dropped while searching for the next magic sequence.
    Corrupt { error: FrameError, discarded: usize },
}

/// Accumulates inbound bytes and splits them into frames.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    // Later magic offsets whose frames are still incomplete.
    candidates: Vec<usize>,
    // Offsets below this have been searched for magic.
    searched: usize,
}

impl FrameBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes from a bulk read.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes buffered but not yet returned as frames.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop everything buffered, returning how many bytes were discarded.
    pub fn clear(&mut self) -> usize {
        let n = self.buf.len();
        self.consume(n);
        n
    }

    /// Attempt to take one frame off the front of the buffer.
    pub fn scan(&mut self) -> Scan {
        match Packet::decode_prefix(&self.buf) {
            Ok(Some((packet, used))) => {
                self.consume(used);
                Scan::Frame(packet)
            }
            Ok(None) => match self.later_frame() {
                Some(offset) => {
                    self.consume(offset);
                    Scan::Corrupt {
                        error: FrameError::Superseded { offset },
                        discarded: offset,
                    }
                }
                None => Scan::Incomplete,
            },
            Err(error) => {
                let discarded = self.resync();
                Scan::Corrupt { error, discarded }
            }
        }
    }

    /// Discard bytes one at a time from the front until the buffer starts
    /// with the magic sequence (or with a lone first magic byte at the very
    /// end, which may be completed by the next read).
    pub fn resync(&mut self) -> usize {
        if self.buf.is_empty() {
            return 0;
        }
        let mut skip = 1;
        while skip < self.buf.len() {
            let rest = &self.buf[skip..];
            if rest[0] == JENSEN_MAGIC[0] && (rest.len() == 1 || rest[1] == JENSEN_MAGIC[1]) {
                break;
            }
            skip += 1;
        }
        self.consume(skip);
        skip
    }

    fn consume(&mut self, n: usize) {
        self.buf.drain(..n);
        self.candidates.clear();
        self.searched = 0;
    }

    // Offset of the first magic past the front that starts a complete,
    // valid frame. Candidates that turn out corrupt are forgotten.
    fn later_frame(&mut self) -> Option<usize> {
        let from = self.searched.max(1);
        let to = self.buf.len().saturating_sub(1);
        for i in from..to {
            if self.buf[i] == JENSEN_MAGIC[0] && self.buf[i + 1] == JENSEN_MAGIC[1] {
                self.candidates.push(i);
            }
        }
        self.searched = from.max(to);

        let buf = &self.buf;
        let mut found = None;
        self.candidates.retain(|&at| {
            if found.is_some() {
                return true;
            }
            match Packet::decode_prefix(&buf[at..]) {
                Ok(Some(_)) => {
                    found = Some(at);
                    true
                }
                Ok(None) => true,
                Err(_) => false,
            }
        });
        found
    }
}
