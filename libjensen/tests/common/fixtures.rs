// fixtures.rs: commonly used frames and device setups

use libjensen::protocol::Packet;
use libjensen::test_support::{SimulatedDevice, pattern};

/// GetDeviceInfo request with sequence id 1, as sent on the wire.
pub const DEVICE_INFO_REQUEST_SEQ1: &str = "123400010000000100000000b8";

pub fn device_info_request_frame() -> Vec<u8> {
    hex::decode(DEVICE_INFO_REQUEST_SEQ1).unwrap()
}

/// Firmware 6.2.5, serial ABC123.
pub fn device_info_reply_body() -> Vec<u8> {
    hex::decode("00060205414243313233000000000000000000000000").unwrap()
}

pub fn device_info_reply_frame(sequence: u32) -> Vec<u8> {
    frame(1, sequence, device_info_reply_body())
}

pub fn frame(command: u16, sequence: u32, body: Vec<u8>) -> Vec<u8> {
    Packet::new(command, sequence, body).encode().unwrap()
}

/// A frame whose checksum byte is wrong.
pub fn corrupt_frame(command: u16, sequence: u32, body: Vec<u8>) -> Vec<u8> {
    let mut f = frame(command, sequence, body);
    if let Some(last) = f.last_mut() {
        *last = last.wrapping_add(1);
    }
    f
}

pub const REC_A: &str = "20250512-143015-Rec01.hda";
pub const REC_B: &str = "2025May13-090000-Rec02.hda";
pub const REC_C: &str = "notes.wav";

/// Simulated recorder with three files of different sizes.
pub fn recorder_with_files() -> SimulatedDevice {
    SimulatedDevice::new("ABC123")
        .with_file(REC_A, pattern(96_044))
        .with_file(REC_B, pattern(48_022))
        .with_file(REC_C, pattern(1_000))
}
