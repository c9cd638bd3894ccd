// libjensen/src/protocol/responses/storage.rs

use crate::protocol::parser;
use crate::types::StorageInfo;
use crate::Result;

const MIB: u64 = 1024 * 1024;

/// Decode GetCardInfo response body (command 16)
/// Layout: used_mib(4) + capacity_mib(4) + status(4), all BE.
pub fn decode_card_info(data: &[u8]) -> Result<StorageInfo> {
    parser::ensure_len(data, 12)?;
    let used = parser::be_u32_at(data, 0)? as u64 * MIB;
    let total = parser::be_u32_at(data, 4)? as u64 * MIB;
    let status = parser::be_u32_at(data, 8)?;
    Ok(StorageInfo::new(total, used, status))
}
