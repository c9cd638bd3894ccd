// libjensen/src/protocol/commands/firmware.rs

/// Encode RequestFirmwareUpgrade body (command 8)
/// Layout: target_version(4, BE) + file_length(4, BE)
///
/// This is the layout accepted by shipping firmware. The running version is
/// never part of the body.
pub fn encode_request_firmware_upgrade(target_version: u32, file_length: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8);
    buf.extend_from_slice(&target_version.to_be_bytes());
    buf.extend_from_slice(&file_length.to_be_bytes());
    buf
}
