// libjensen/src/dispatcher/mod.rs

//! Command dispatcher.
//!
//! Owns the attached transport, the receive buffer and the sequence
//! counter behind a FIFO lock. Holding an [`Exchange`] is holding the wire:
//! single commands take it for one round trip, streamed transfers for every
//! packet of the transfer.

pub mod lock;
pub mod sequence;

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, trace, warn};

pub use lock::{FifoGuard, FifoMutex};
pub use sequence::SequenceCounter;

use crate::constants::{
    DEFAULT_COMMAND_RESYNC_LIMIT, DEFAULT_READ_CHUNK, DEFAULT_WRITE_CHUNK, JENSEN_HEADER_LEN,
};
use crate::error::FrameError;
use crate::protocol::{FrameBuffer, Packet, Scan};
use crate::transport::Transport;
use crate::types::{CommandId, ConnectionState};
use crate::utils::Deadline;
#[cfg(feature = "diagnostics")]
use crate::utils::hex_preview;
use crate::{Error, Result};

// Upper bound of one read_bulk call inside a longer wait.
const READ_SLICE: Duration = Duration::from_millis(100);
// How many abandoned sequence ids are remembered.
const ABANDONED_MEMORY: usize = 8;
const FLUSH_READ_MS: u64 = 20;
const FLUSH_MAX_READS: usize = 16;

/// Wire-level limits of a [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Bytes requested per bulk IN read.
    pub read_chunk: usize,
    /// Largest single bulk OUT write; bigger frames are split.
    pub write_chunk: usize,
    /// Framing errors tolerated while waiting for one reply.
    pub max_resync: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            read_chunk: DEFAULT_READ_CHUNK,
            write_chunk: DEFAULT_WRITE_CHUNK,
            max_resync: DEFAULT_COMMAND_RESYNC_LIMIT,
        }
    }
}

/// What the read loop produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A frame for a live request.
    Packet(Packet),
    /// A framing error; the buffer has already been resynchronized past it.
    Corrupt { error: FrameError, discarded: usize },
}

#[derive(Default)]
struct Channel {
    transport: Option<Box<dyn Transport>>,
    buffer: FrameBuffer,
    sequence: SequenceCounter,
    // Request whose reply has not been fully consumed yet.
    pending: Option<u32>,
    // Requests given up on; stray packets carrying these ids are dropped.
    abandoned: VecDeque<u32>,
}

impl Channel {
    fn abandon(&mut self, sequence: u32) {
        if !self.abandoned.contains(&sequence) {
            self.abandoned.push_back(sequence);
            if self.abandoned.len() > ABANDONED_MEMORY {
                self.abandoned.pop_front();
            }
        }
    }

    fn is_abandoned(&self, sequence: u32) -> bool {
        self.abandoned.contains(&sequence)
    }

    fn transport(&mut self) -> Result<&mut Box<dyn Transport>> {
        self.transport
            .as_mut()
            .ok_or(Error::NotConnected(ConnectionState::Disconnected))
    }
}

/// Serializes access to one transport and matches replies to requests.
pub struct Dispatcher {
    channel: FifoMutex<Channel>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Dispatcher with no transport attached.
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            channel: FifoMutex::new(Channel::default()),
            config,
        }
    }

    /// Install a freshly opened transport, closing any previous one.
    pub fn attach(&self, transport: Box<dyn Transport>) {
        let mut ch = self.channel.lock();
        if let Some(mut old) = ch.transport.replace(transport) {
            let _ = old.close();
        }
        ch.buffer.clear();
        ch.pending = None;
        ch.abandoned.clear();
    }

    /// Close and drop the transport. Waits for the current holder of the
    /// wire to finish.
    pub fn detach(&self) {
        let mut ch = self.channel.lock();
        if let Some(mut t) = ch.transport.take() {
            if let Err(e) = t.close() {
                warn!("closing transport failed: {}", e);
            }
        }
        ch.buffer.clear();
        ch.pending = None;
    }

    /// Take the wire. Blocks behind earlier callers.
    pub fn begin(&self) -> Result<Exchange<'_>> {
        let mut ch = self.channel.lock();
        ch.transport()?;
        Ok(Exchange {
            ch,
            config: self.config,
        })
    }

    /// One request, one reply.
    pub fn request(&self, command: CommandId, body: &[u8], timeout_ms: u64) -> Result<Packet> {
        self.begin()?.request(command, body, timeout_ms)
    }

    /// Set the most recently issued sequence id.
    pub fn force_sequence(&self, last: u32) {
        self.channel.lock().sequence.force(last);
    }
}

/// Exclusive use of the wire. Dropping it before the reply of the last
/// request was consumed marks that request abandoned, so its late packets
/// are discarded instead of being taken for the next reply.
pub struct Exchange<'a> {
    ch: FifoGuard<'a, Channel>,
    config: DispatcherConfig,
}

impl Exchange<'_> {
    /// Write a request and return its sequence id.
    pub fn send_request(&mut self, command: CommandId, body: &[u8], timeout_ms: u64) -> Result<u32> {
        self.send_request_with_progress(command, body, timeout_ms, &mut |_, _| {})
    }

    /// Write a request, reporting `(body_bytes_written, body_len)` after
    /// each bulk write.
    pub fn send_request_with_progress(
        &mut self,
        command: CommandId,
        body: &[u8],
        timeout_ms: u64,
        on_progress: &mut dyn FnMut(u64, u64),
    ) -> Result<u32> {
        let ch = &mut *self.ch;
        if let Some(prev) = ch.pending.take() {
            ch.abandon(prev);
        }
        let sequence = ch.sequence.next();
        let frame = Packet::new(command.as_u16(), sequence, body.to_vec()).encode()?;
        debug!("-> {} seq={} body={}B", command, sequence, body.len());
        #[cfg(feature = "diagnostics")]
        trace!("-> {}", hex_preview(&frame, 64));

        ch.pending = Some(sequence);
        let transport = ch.transport()?;
        let total = body.len() as u64;
        let mut written = 0usize;
        for piece in frame.chunks(self.config.write_chunk.max(1)) {
            transport.write_bulk(piece, timeout_ms)?;
            written += piece.len();
            if total > 0 {
                let sent = (written.saturating_sub(JENSEN_HEADER_LEN) as u64).min(total);
                on_progress(sent, total);
            }
        }
        Ok(sequence)
    }

    /// Read until a frame or a framing error is available. Packets of
    /// abandoned requests are skipped.
    pub fn read_inbound(&mut self, command: u16, deadline: Deadline) -> Result<Inbound> {
        let read_chunk = self.config.read_chunk;
        let ch = &mut *self.ch;
        loop {
            match ch.buffer.scan() {
                Scan::Frame(packet) => {
                    if ch.is_abandoned(packet.sequence) {
                        debug!(
                            "dropping stale packet cmd={} seq={} ({}B)",
                            packet.command,
                            packet.sequence,
                            packet.body.len()
                        );
                        continue;
                    }
                    trace!(
                        "<- cmd={} seq={} body={}B",
                        packet.command,
                        packet.sequence,
                        packet.body.len()
                    );
                    return Ok(Inbound::Packet(packet));
                }
                Scan::Corrupt { error, discarded } => {
                    return Ok(Inbound::Corrupt { error, discarded });
                }
                Scan::Incomplete => {}
            }

            let Some(remaining) = deadline.remaining() else {
                return Err(Error::ResponseTimeout {
                    command,
                    timeout_ms: deadline.timeout_ms(),
                });
            };
            let slice_ms = (remaining.min(READ_SLICE).as_millis() as u64).max(1);
            match ch.transport()?.read_bulk(read_chunk, slice_ms) {
                Ok(bytes) => {
                    #[cfg(feature = "diagnostics")]
                    trace!("<< {}", hex_preview(&bytes, 64));
                    ch.buffer.extend(&bytes);
                }
                Err(Error::Timeout) => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Wait for the reply to `sequence`. Framing noise is resynchronized up
    /// to the configured limit; a reply with another sequence id or command
    /// means client and device disagree and is returned as an error.
    pub fn next_packet(&mut self, sequence: u32, command: CommandId, timeout_ms: u64) -> Result<Packet> {
        let deadline = Deadline::after_ms(timeout_ms);
        let mut resyncs = 0u32;
        loop {
            match self.read_inbound(command.as_u16(), deadline)? {
                Inbound::Packet(p) => {
                    if p.sequence != sequence {
                        return Err(Error::SequenceMismatch {
                            expected: sequence,
                            actual: p.sequence,
                        });
                    }
                    if p.command != command.as_u16() {
                        return Err(Error::UnexpectedCommandId {
                            expected: command.as_u16(),
                            actual: p.command,
                        });
                    }
                    return Ok(p);
                }
                Inbound::Corrupt { error, discarded } => {
                    resyncs += 1;
                    warn!("{}: {} ({} bytes skipped)", command, error, discarded);
                    if resyncs > self.config.max_resync {
                        return Err(Error::ProtocolDesync(format!(
                            "no valid reply to {} after {} resync rounds",
                            command, self.config.max_resync
                        )));
                    }
                }
            }
        }
    }

    /// The reply to the last request has been consumed completely.
    pub fn finish(&mut self) {
        self.ch.pending = None;
    }

    /// Send a request and wait for its single reply.
    pub fn request(&mut self, command: CommandId, body: &[u8], timeout_ms: u64) -> Result<Packet> {
        let sequence = self.send_request(command, body, timeout_ms)?;
        let packet = self.next_packet(sequence, command, timeout_ms)?;
        self.finish();
        Ok(packet)
    }

    /// Endpoint reset: clear halts on both endpoints and throw away
    /// everything buffered on either side. Returns the bytes discarded.
    pub fn reset_link(&mut self) -> Result<usize> {
        let read_chunk = self.config.read_chunk;
        let ch = &mut *self.ch;
        if let Some(seq) = ch.pending.take() {
            ch.abandon(seq);
        }
        let mut flushed = ch.buffer.clear();

        let transport = ch.transport()?;
        let (bulk_in, bulk_out) = (transport.in_endpoint(), transport.out_endpoint());
        transport.clear_halt(bulk_in)?;
        transport.clear_halt(bulk_out)?;

        for _ in 0..FLUSH_MAX_READS {
            match transport.read_bulk(read_chunk, FLUSH_READ_MS) {
                Ok(bytes) if bytes.is_empty() => break,
                Ok(bytes) => flushed += bytes.len(),
                Err(Error::Timeout) => break,
                Err(e) => return Err(e),
            }
        }
        if flushed > 0 {
            debug!("link reset discarded {} bytes", flushed);
        }
        Ok(flushed)
    }
}

impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        if let Some(seq) = self.ch.pending.take() {
            debug!("abandoning seq={}", seq);
            self.ch.abandon(seq);
        }
    }
}
