// libjensen/src/transfer/session.rs

//! Per-download bookkeeping: progress, chunk validation and the resync budget.

use log::warn;

use crate::protocol::Packet;
use crate::{Error, Result};

/// Bookkeeping for one streamed transfer. Lives exactly as long as the
/// transfer holds the wire.
#[derive(Debug, Clone)]
pub struct TransferSession {
    /// File being transferred.
    pub filename: String,
    /// Size announced by the file list.
    pub expected_size: u64,
    /// Bytes accepted so far.
    pub bytes_received: u64,
    /// Sequence of the request that started the stream.
    pub request_sequence: u32,
    /// Sequence of the last accepted chunk.
    pub last_chunk_sequence: u32,
    /// Corrupt frames skipped so far.
    pub resync_attempts: u32,
    max_resync_attempts: u32,
}

/// How a data packet relates to the transfer.
#[derive(Debug, PartialEq, Eq)]
pub enum ChunkCheck {
    /// Next chunk of this stream; hand it on.
    Accept,
    /// Out of order; skipped and counted as a resync round.
    Skip,
}

impl TransferSession {
    /// Session with nothing received yet.
    pub fn new(filename: impl Into<String>, expected_size: u64, request_sequence: u32, max_resync_attempts: u32) -> Self {
        Self {
            filename: filename.into(),
            expected_size,
            bytes_received: 0,
            request_sequence,
            last_chunk_sequence: request_sequence,
            resync_attempts: 0,
            max_resync_attempts,
        }
    }

    /// All expected bytes received.
    pub fn is_complete(&self) -> bool {
        self.bytes_received == self.expected_size
    }

    /// Bytes still to come.
    pub fn remaining(&self) -> u64 {
        self.expected_size - self.bytes_received
    }

    /// Count one resync round; fails the transfer once the budget is spent.
    pub fn resync(&mut self, reason: &str) -> Result<()> {
        self.resync_attempts += 1;
        warn!(
            "{}: resync {}/{} at {} of {} bytes: {}",
            self.filename,
            self.resync_attempts,
            self.max_resync_attempts,
            self.bytes_received,
            self.expected_size,
            reason
        );
        if self.resync_attempts > self.max_resync_attempts {
            return Err(Error::TransferCorrupted(format!(
                "{}: gave up after {} resync rounds ({})",
                self.filename, self.max_resync_attempts, reason
            )));
        }
        Ok(())
    }

    /// Validate a data packet before its body is delivered.
    pub fn check(&mut self, packet: &Packet) -> Result<ChunkCheck> {
        // Sequence ids wrap, so "older" is judged by wrapping distance.
        if packet.sequence.wrapping_sub(self.last_chunk_sequence) > u32::MAX / 2 {
            self.resync(&format!(
                "chunk seq {} behind {}",
                packet.sequence, self.last_chunk_sequence
            ))?;
            return Ok(ChunkCheck::Skip);
        }

        let len = packet.body.len() as u64;
        if len == 0 {
            return Err(Error::TransferCorrupted(format!(
                "{}: device ended the transfer at {} of {} bytes",
                self.filename, self.bytes_received, self.expected_size
            )));
        }
        if len > self.remaining() {
            return Err(Error::TransferCorrupted(format!(
                "{}: chunk of {} bytes overshoots {} remaining",
                self.filename,
                len,
                self.remaining()
            )));
        }
        Ok(ChunkCheck::Accept)
    }

    /// Account for an accepted chunk.
    pub fn record(&mut self, packet: &Packet) {
        self.last_chunk_sequence = packet.sequence;
        self.bytes_received += packet.body.len() as u64;
    }
}
