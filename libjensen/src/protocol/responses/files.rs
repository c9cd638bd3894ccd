// libjensen/src/protocol/responses/files.rs

//! File count and the streamed file-list format.

use crate::constants::FILE_LIST_HEADER;
use crate::protocol::parser;
use crate::types::{FileEntry, RecordingFormat, parse_filename_timestamp};
use crate::utils::bytes_to_hex;
use crate::Result;

/// Decode GetFileCount response body (command 6). Older firmware answers
/// with an empty body when there are no files.
pub fn decode_file_count(data: &[u8]) -> Result<u32> {
    if data.is_empty() {
        return Ok(0);
    }
    parser::be_u32_at(data, 0)
}

// format(1) + name_len(3)
const ENTRY_PREFIX_LEN: usize = 4;
// length(4) + reserved(6) + signature(16)
const ENTRY_SUFFIX_LEN: usize = 4 + 6 + 16;

/// Incremental parser for the GetFileList stream.
///
/// Bodies of successive response packets are fed in order; an entry may
/// straddle two packets, so unparsed bytes are kept until the rest arrives.
#[derive(Debug)]
pub struct FileListParser {
    device_id: String,
    pending: Vec<u8>,
    header_seen: bool,
    announced_total: Option<u32>,
    entries: Vec<FileEntry>,
}

impl FileListParser {
    /// Parser stamping every entry with `device_id`.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            pending: Vec::new(),
            header_seen: false,
            announced_total: None,
            entries: Vec::new(),
        }
    }

    /// Entry count announced by the list header, if the device sent one.
    pub fn announced_total(&self) -> Option<u32> {
        self.announced_total
    }

    /// Entries parsed so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True until the first entry is complete.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes received that do not yet form a whole entry.
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }

    /// Append one packet body and parse every entry it completes.
    pub fn feed(&mut self, body: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(body);

        if !self.header_seen {
            if self.pending.len() < FILE_LIST_HEADER.len() + 4
                && FILE_LIST_HEADER.starts_with(&self.pending[..self.pending.len().min(2)])
            {
                // Could still be a header; wait for more bytes.
                return Ok(());
            }
            self.header_seen = true;
            if self.pending.starts_with(&FILE_LIST_HEADER) {
                self.announced_total = Some(parser::be_u32_at(&self.pending, 2)?);
                self.pending.drain(..6);
            }
        }

        let mut offset = 0;
        while let Some((entry, used)) = self.parse_entry(&self.pending[offset..])? {
            self.entries.push(entry);
            offset += used;
        }
        self.pending.drain(..offset);
        Ok(())
    }

    fn parse_entry(&self, data: &[u8]) -> Result<Option<(FileEntry, usize)>> {
        if data.len() < ENTRY_PREFIX_LEN {
            return Ok(None);
        }
        let format_version = data[0];
        let name_len = parser::be_u24_at(data, 1)? as usize;
        let total = ENTRY_PREFIX_LEN + name_len + ENTRY_SUFFIX_LEN;
        if data.len() < total {
            return Ok(None);
        }

        let name_bytes = parser::slice_at(data, ENTRY_PREFIX_LEN, name_len)?;
        let filename = String::from_utf8_lossy(name_bytes)
            .trim_end_matches('\0')
            .to_string();
        let suffix = ENTRY_PREFIX_LEN + name_len;
        let size_bytes = parser::be_u32_at(data, suffix)? as u64;
        let signature = bytes_to_hex(parser::slice_at(data, suffix + 10, 16)?);

        let entry = FileEntry {
            duration_seconds: RecordingFormat::from_version(format_version)
                .duration_seconds(size_bytes),
            date_created: parse_filename_timestamp(&filename),
            filename,
            size_bytes,
            device_id: self.device_id.clone(),
            format_version,
            signature,
        };
        Ok(Some((entry, total)))
    }

    /// The parsed entries, in device order.
    pub fn into_entries(self) -> Vec<FileEntry> {
        self.entries
    }
}

/// Encode one file-list entry. Used by tests and the mock device to produce
/// realistic list streams.
pub fn encode_file_entry(format_version: u8, filename: &str, size: u32, signature: [u8; 16]) -> Vec<u8> {
    let name = filename.as_bytes();
    let mut out = Vec::with_capacity(ENTRY_PREFIX_LEN + name.len() + ENTRY_SUFFIX_LEN);
    out.push(format_version);
    out.extend_from_slice(&(name.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(name);
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(&[0u8; 6]);
    out.extend_from_slice(&signature);
    out
}

/// Encode the optional list header announcing `total` entries.
pub fn encode_file_list_header(total: u32) -> Vec<u8> {
    let mut out = FILE_LIST_HEADER.to_vec();
    out.extend_from_slice(&total.to_be_bytes());
    out
}
