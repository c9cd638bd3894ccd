// libjensen/src/transfer/list.rs

//! File listing: count first, then the streamed list.

use log::{debug, warn};

use crate::dispatcher::{Dispatcher, Inbound};
use crate::protocol::Request;
use crate::protocol::responses::{FileListParser, decode_file_count};
use crate::types::{CommandId, FileEntry};
use crate::utils::Deadline;
use crate::{Error, Result};

/// Fetch the complete file list.
///
/// The count is asked first (an empty device gets no GetFileList at all);
/// then list packets are read until the announced number of entries has
/// arrived or the device sends an empty packet. Both requests run under one
/// exchange so nothing can slip in between.
pub fn list_files(
    dispatcher: &Dispatcher,
    device_id: &str,
    timeout_ms: u64,
    resync_attempts: u32,
) -> Result<Vec<FileEntry>> {
    let mut ex = dispatcher.begin()?;

    let count_request = Request::GetFileCount;
    let reply = ex.request(count_request.command_id(), &count_request.encode()?, timeout_ms)?;
    let count = decode_file_count(&reply.body)?;
    debug!("device reports {} files", count);
    if count == 0 {
        return Ok(Vec::new());
    }

    let list_request = Request::GetFileList;
    let sequence = ex.send_request(list_request.command_id(), &list_request.encode()?, timeout_ms)?;
    let mut parser = FileListParser::new(device_id);
    let mut last_sequence = sequence;
    let mut resyncs = 0u32;

    loop {
        let target = parser.announced_total().unwrap_or(count) as usize;
        if parser.len() >= target {
            break;
        }

        let deadline = Deadline::after_ms(timeout_ms);
        let packet = match ex.read_inbound(CommandId::GetFileList.as_u16(), deadline)? {
            Inbound::Packet(p) => p,
            Inbound::Corrupt { error, .. } => {
                resyncs += 1;
                warn!("file list: {} (resync {}/{})", error, resyncs, resync_attempts);
                if resyncs > resync_attempts {
                    return Err(Error::TransferCorrupted(format!(
                        "file list: gave up after {} resync rounds",
                        resync_attempts
                    )));
                }
                continue;
            }
        };

        if packet.command != CommandId::GetFileList.as_u16() {
            return Err(Error::UnexpectedCommandId {
                expected: CommandId::GetFileList.as_u16(),
                actual: packet.command,
            });
        }
        if packet.sequence.wrapping_sub(last_sequence) > u32::MAX / 2 {
            return Err(Error::SequenceMismatch {
                expected: last_sequence,
                actual: packet.sequence,
            });
        }
        last_sequence = packet.sequence;

        if packet.body.is_empty() {
            break;
        }
        parser.feed(&packet.body)?;
    }
    ex.finish();

    if parser.pending_bytes() > 0 {
        warn!(
            "file list ended with {} unparsed bytes",
            parser.pending_bytes()
        );
    }
    Ok(parser.into_entries())
}
