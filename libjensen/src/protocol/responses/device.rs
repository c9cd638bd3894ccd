// libjensen/src/protocol/responses/device.rs

//! Device identity, clock and recording state replies.

use chrono::NaiveDateTime;

use crate::constants::SERIAL_MAX_LEN;
use crate::protocol::parser;
use crate::types::DeviceInfo;
use crate::{Error, Result};

/// Decode GetDeviceInfo response body (command 1)
/// Layout: reserved(1) + major(1) + minor(1) + patch(1) + serial(<=16, ASCII)
///
/// The four version bytes also form the big-endian build number. The serial
/// ends at the first byte that is zero or has the high bit set.
pub fn decode_device_info(data: &[u8]) -> Result<DeviceInfo> {
    parser::ensure_len(data, 4)?;

    let version_number = parser::be_u32_at(data, 0)?;
    let version_code = data[1..4]
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(".");

    let serial_end = data.len().min(4 + SERIAL_MAX_LEN);
    let serial_number = data[4..serial_end]
        .iter()
        .take_while(|&&b| b > 0 && b < 0x80)
        .map(|&b| char::from(b))
        .collect();

    Ok(DeviceInfo {
        version_code,
        version_number,
        serial_number,
    })
}

/// Decode GetDeviceTime response body (command 2)
/// Layout: 7 bytes BCD YYYYMMDDhhmmss. All zeros means the clock was never set.
pub fn decode_device_time(data: &[u8]) -> Result<Option<NaiveDateTime>> {
    let raw = parser::slice_at(data, 0, 7)?;
    if raw.iter().all(|&b| b == 0) {
        return Ok(None);
    }
    let digits = parser::from_bcd(raw)?;
    NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M%S")
        .map(Some)
        .map_err(|e| Error::InvalidArgument(format!("device time {digits}: {e}")))
}

/// Decode GetRecordingFile response body (command 18). An empty body means
/// nothing is being recorded.
pub fn decode_recording_file(data: &[u8]) -> Option<String> {
    let name = String::from_utf8_lossy(data);
    let name = name.trim_end_matches('\0');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
