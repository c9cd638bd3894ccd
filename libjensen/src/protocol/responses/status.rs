// libjensen/src/protocol/responses/status.rs

//! Single result-byte replies.

use crate::protocol::parser;
use crate::types::FirmwareUpgradeStatus;
use crate::Result;

/// Outcome of DeleteFile (command 7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Result code 0.
    Deleted,
    /// Result code 1.
    NotFound,
    /// Any other code.
    Failed(u8),
}

impl DeleteOutcome {
    /// Classify a DeleteFile result code.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Deleted,
            1 => Self::NotFound,
            other => Self::Failed(other),
        }
    }
}

/// Decode DeleteFile response body (command 7)
pub fn decode_delete(data: &[u8]) -> Result<DeleteOutcome> {
    Ok(DeleteOutcome::from_code(parser::byte_at(data, 0)?))
}

/// Decode RequestFirmwareUpgrade response body (command 8)
pub fn decode_firmware_status(data: &[u8]) -> Result<FirmwareUpgradeStatus> {
    Ok(FirmwareUpgradeStatus::from_code(parser::byte_at(data, 0)?))
}
