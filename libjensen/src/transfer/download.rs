// libjensen/src/transfer/download.rs

//! Streamed file reads: full downloads and partial block reads.

use log::{debug, info};

use crate::dispatcher::{Dispatcher, Inbound};
use crate::protocol::Request;
use crate::transfer::cancel::CancellationToken;
use crate::transfer::session::{ChunkCheck, TransferSession};
use crate::utils::Deadline;
use crate::{Error, Result};

/// Definitive result of a download that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Every expected byte arrived.
    Completed {
        /// Bytes delivered to the chunk callback.
        bytes_received: u64,
    },
    /// Stopped at a chunk boundary because the token was cancelled. Data
    /// already handed to the chunk callback stays with the caller.
    Cancelled {
        /// Bytes delivered before the cancel was seen.
        bytes_received: u64,
    },
}

impl DownloadOutcome {
    /// Bytes delivered to the chunk callback.
    pub fn bytes_received(&self) -> u64 {
        match self {
            Self::Completed { bytes_received } | Self::Cancelled { bytes_received } => *bytes_received,
        }
    }

    /// True if every expected byte arrived.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Timeouts and limits for one streamed read.
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    /// Longest wait for the next data packet.
    pub packet_timeout_ms: u64,
    /// Corrupt frames tolerated before giving up.
    pub resync_attempts: u32,
}

/// Download `filename` (TransferFile, command 5), handing every chunk to
/// `on_chunk` as it arrives.
pub fn download_file(
    dispatcher: &Dispatcher,
    filename: &str,
    expected_size: u64,
    options: StreamOptions,
    cancel: &CancellationToken,
    on_chunk: &mut dyn FnMut(&[u8]),
) -> Result<DownloadOutcome> {
    let request = Request::TransferFile {
        filename: filename.to_string(),
    };
    stream(
        dispatcher,
        &request,
        filename,
        expected_size,
        options,
        cancel,
        on_chunk,
    )
}

/// Read the first `length` bytes of `filename` (GetFileBlock, command 13).
pub fn read_file_block(
    dispatcher: &Dispatcher,
    filename: &str,
    length: u32,
    options: StreamOptions,
    cancel: &CancellationToken,
    on_chunk: &mut dyn FnMut(&[u8]),
) -> Result<DownloadOutcome> {
    let request = Request::GetFileBlock {
        filename: filename.to_string(),
        length,
    };
    stream(
        dispatcher,
        &request,
        filename,
        length as u64,
        options,
        cancel,
        on_chunk,
    )
}

fn stream(
    dispatcher: &Dispatcher,
    request: &Request,
    filename: &str,
    expected_size: u64,
    options: StreamOptions,
    cancel: &CancellationToken,
    on_chunk: &mut dyn FnMut(&[u8]),
) -> Result<DownloadOutcome> {
    let command = request.command_id();
    let body = request.encode()?;
    if expected_size == 0 {
        return Ok(DownloadOutcome::Completed { bytes_received: 0 });
    }
    if cancel.is_cancelled() {
        return Ok(DownloadOutcome::Cancelled { bytes_received: 0 });
    }

    let mut ex = dispatcher.begin()?;
    let sequence = ex.send_request(command, &body, options.packet_timeout_ms)?;
    let mut session = TransferSession::new(filename, expected_size, sequence, options.resync_attempts);
    info!("{}: receiving {} bytes (seq={})", filename, expected_size, sequence);

    loop {
        if session.is_complete() {
            ex.finish();
            debug!("{}: complete", filename);
            return Ok(DownloadOutcome::Completed {
                bytes_received: session.bytes_received,
            });
        }
        if cancel.is_cancelled() {
            // Dropping the exchange marks the sequence abandoned, so the
            // rest of the stream is discarded by whoever reads next.
            info!(
                "{}: cancelled at {} of {} bytes",
                filename, session.bytes_received, expected_size
            );
            return Ok(DownloadOutcome::Cancelled {
                bytes_received: session.bytes_received,
            });
        }

        let deadline = Deadline::after_ms(options.packet_timeout_ms);
        match ex.read_inbound(command.as_u16(), deadline)? {
            Inbound::Corrupt { error, .. } => session.resync(&error.to_string())?,
            Inbound::Packet(packet) => {
                if packet.command != command.as_u16() {
                    return Err(Error::UnexpectedCommandId {
                        expected: command.as_u16(),
                        actual: packet.command,
                    });
                }
                if session.check(&packet)? == ChunkCheck::Accept {
                    on_chunk(&packet.body);
                    session.record(&packet);
                }
            }
        }
    }
}
