// libjensen/src/protocol/commands/settings.rs

use crate::types::SettingsPatch;

/// Slot value meaning "leave unchanged"
pub const SETTING_KEEP: u32 = 0;
/// Slot value for "enabled"
pub const SETTING_ON: u32 = 1;
/// Slot value for "disabled"
pub const SETTING_OFF: u32 = 2;

fn slot(value: Option<bool>) -> u32 {
    match value {
        None => SETTING_KEEP,
        Some(true) => SETTING_ON,
        Some(false) => SETTING_OFF,
    }
}

/// Encode SetSettings body (command 12)
/// Layout: four BE u32 slots: auto_record, auto_play, notification, bluetooth_tone
pub fn encode_set_settings(patch: &SettingsPatch) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    for v in [
        patch.auto_record,
        patch.auto_play,
        patch.notification,
        patch.bluetooth_tone,
    ] {
        buf.extend_from_slice(&slot(v).to_be_bytes());
    }
    buf
}
