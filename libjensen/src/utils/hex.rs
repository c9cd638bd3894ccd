// libjensen/src/utils/hex.rs

//! Hex formatting for signatures and packet dumps.

use std::fmt::Write;

/// Lowercase hex without separators: `&[0xde, 0xad]` -> `"dead"`.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(&mut s, "{:02x}", b);
    }
    s
}

/// Space separated hex of at most `limit` bytes, noting how many were left
/// out. Keeps trace lines readable when a packet carries a file chunk.
pub fn hex_preview(bytes: &[u8], limit: usize) -> String {
    let shown = &bytes[..bytes.len().min(limit)];
    let mut s = String::with_capacity(shown.len() * 3 + 16);
    for (i, b) in shown.iter().enumerate() {
        if i != 0 {
            s.push(' ');
        }
        let _ = write!(&mut s, "{:02x}", b);
    }
    if bytes.len() > limit {
        let _ = write!(&mut s, " .. (+{} bytes)", bytes.len() - limit);
    }
    s
}
