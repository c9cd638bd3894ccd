// libjensen/src/protocol/parser.rs

//! Bounds-checked readers for response bodies, and BCD conversion.

use crate::{Error, Result};

/// Ensure the slice has at least `min` bytes.
pub fn ensure_len(data: &[u8], min: usize) -> Result<()> {
    if data.len() < min {
        return Err(Error::InvalidLength {
            expected: min,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Read a big-endian u32 at given index, with bounds checking.
pub fn be_u32_at(data: &[u8], idx: usize) -> Result<u32> {
    ensure_len(data, idx + 4)?;
    Ok(u32::from_be_bytes([
        data[idx],
        data[idx + 1],
        data[idx + 2],
        data[idx + 3],
    ]))
}

/// Read a big-endian 24-bit unsigned integer at given index.
pub fn be_u24_at(data: &[u8], idx: usize) -> Result<u32> {
    ensure_len(data, idx + 3)?;
    Ok(u32::from_be_bytes([0, data[idx], data[idx + 1], data[idx + 2]]))
}

/// Return a subslice with bounds checking.
pub fn slice_at(data: &[u8], idx: usize, len: usize) -> Result<&[u8]> {
    ensure_len(data, idx + len)?;
    Ok(&data[idx..idx + len])
}

/// Read a single byte at `idx` with bounds checking.
pub fn byte_at(data: &[u8], idx: usize) -> Result<u8> {
    ensure_len(data, idx + 1)?;
    Ok(data[idx])
}

/// Pack a decimal digit string ("20250512143015") into BCD bytes, two
/// digits per byte. The string must have an even number of ASCII digits.
pub fn to_bcd(digits: &str) -> Result<Vec<u8>> {
    let bytes = digits.as_bytes();
    if bytes.len() % 2 != 0 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(Error::InvalidArgument(format!(
            "not an even-length digit string: {digits:?}"
        )));
    }
    Ok(bytes
        .chunks(2)
        .map(|pair| ((pair[0] - b'0') << 4) | (pair[1] - b'0'))
        .collect())
}

/// Unpack BCD bytes into their decimal digit string. Nibbles above 9 are
/// rejected.
pub fn from_bcd(data: &[u8]) -> Result<String> {
    let mut s = String::with_capacity(data.len() * 2);
    for &b in data {
        for nibble in [b >> 4, b & 0x0f] {
            if nibble > 9 {
                return Err(Error::InvalidArgument(format!("invalid BCD byte {b:#04x}")));
            }
            s.push(char::from(b'0' + nibble));
        }
    }
    Ok(s)
}

/// Interpret a device result byte: 0 is success, anything else is returned
/// as `CommandRejected`.
pub fn expect_success(command: u16, data: &[u8]) -> Result<()> {
    let code = byte_at(data, 0)?;
    if code != 0 {
        return Err(Error::CommandRejected { command, code });
    }
    Ok(())
}
