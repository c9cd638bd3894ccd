// libjensen/src/protocol/commands/files.rs

//! Filename-carrying request bodies.

use crate::{Error, Result};

/// Encode a bare filename body, used by TransferFile (5) and DeleteFile (7).
/// Device filenames are plain ASCII.
pub fn encode_filename(filename: &str) -> Result<Vec<u8>> {
    if filename.is_empty() {
        return Err(Error::InvalidArgument("empty filename".into()));
    }
    if !filename.is_ascii() {
        return Err(Error::InvalidArgument(format!(
            "filename is not ASCII: {filename:?}"
        )));
    }
    Ok(filename.as_bytes().to_vec())
}

/// Encode GetFileBlock body (command 13)
/// Layout: length(4, BE) + filename(n)
pub fn encode_file_block(filename: &str, length: u32) -> Result<Vec<u8>> {
    let name = encode_filename(filename)?;
    let mut buf = Vec::with_capacity(4 + name.len());
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&name);
    Ok(buf)
}
