// libjensen/src/protocol/commands/device.rs

use chrono::NaiveDateTime;

use crate::Result;
use crate::protocol::parser;

/// Encode SetDeviceTime body (command 3)
/// Layout: 7 bytes BCD, YYYYMMDDhhmmss
pub fn encode_set_device_time(time: NaiveDateTime) -> Result<Vec<u8>> {
    let digits = time.format("%Y%m%d%H%M%S").to_string();
    parser::to_bcd(&digits)
}
