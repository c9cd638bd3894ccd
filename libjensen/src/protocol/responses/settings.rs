// libjensen/src/protocol/responses/settings.rs

use crate::protocol::commands::settings::SETTING_ON;
use crate::protocol::parser;
use crate::types::DeviceSettings;
use crate::Result;

/// Decode GetSettings response body (command 11)
/// Layout: four BE u32 slots: auto_record, auto_play, notification, bluetooth_tone.
/// A slot reads as enabled only when it holds 1.
pub fn decode_settings(data: &[u8]) -> Result<DeviceSettings> {
    parser::ensure_len(data, 16)?;
    let on = |idx: usize| -> Result<bool> { Ok(parser::be_u32_at(data, idx * 4)? == SETTING_ON) };
    Ok(DeviceSettings {
        auto_record: on(0)?,
        auto_play: on(1)?,
        notification: on(2)?,
        bluetooth_tone: on(3)?,
    })
}
