// libjensen/src/protocol/checksum.rs

//! Zero-sum frame checksum.

/// Compute the frame checksum: 0x100 - (sum(bytes) & 0xff).
///
/// Summed together with the checksum byte, a valid frame adds up to zero,
/// so any single-byte change in the covered region is detected.
pub fn frame_checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0u8.wrapping_sub(sum)
}

/// Verify that `bytes` followed by `checksum` sums to zero.
pub fn verify(bytes: &[u8], checksum: u8) -> bool {
    frame_checksum(bytes) == checksum
}
