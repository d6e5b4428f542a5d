//! # MQTT Serialization Utilities
//!
//! Helper functions for the two variable-size field encodings MQTT uses: the
//! remaining-length integer of the fixed header and length-prefixed strings.

use heapless::Vec;

use crate::error::EncodeError;

/// Largest value that fits into a four byte remaining-length field.
pub const MAX_REMAINING_LENGTH: u32 = (1 << 28) - 1;

/// Encodes `n` as a remaining-length field.
///
/// Seven bits per byte, least significant group first, with the continuation
/// bit (`0x80`) set on every byte except the last.
pub fn encode_remaining_length(mut n: u32) -> Result<Vec<u8, 4>, EncodeError> {
    if n > MAX_REMAINING_LENGTH {
        return Err(EncodeError::TooLong);
    }

    let mut out = Vec::new();
    loop {
        let mut encoded_byte = (n % 128) as u8;
        n /= 128;
        if n > 0 {
            encoded_byte |= 128;
        }
        out.push(encoded_byte).map_err(|_| EncodeError::TooLong)?;
        if n == 0 {
            break;
        }
    }
    Ok(out)
}

/// Decodes a remaining-length field from the start of `buf`.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_remaining_length(buf: &[u8]) -> Result<(u32, usize), EncodeError> {
    let mut multiplier = 1u32;
    let mut value = 0u32;
    for (i, &encoded_byte) in buf.iter().enumerate().take(4) {
        value += u32::from(encoded_byte & 127) * multiplier;
        if (encoded_byte & 128) == 0 {
            return Ok((value, i + 1));
        }
        multiplier *= 128;
    }
    Err(EncodeError::Malformed)
}

/// Writes `s` with its two-byte big-endian length prefix into `buf`.
///
/// Returns the number of bytes written.
pub fn encode_string(buf: &mut [u8], s: &[u8]) -> Result<usize, EncodeError> {
    let len = u16::try_from(s.len()).map_err(|_| EncodeError::TooLong)?;
    let required_space = 2 + s.len();
    let slice = buf
        .get_mut(0..required_space)
        .ok_or(EncodeError::BufferTooSmall)?;

    slice[0..2].copy_from_slice(&len.to_be_bytes());
    slice[2..].copy_from_slice(s);
    Ok(required_space)
}

/// Number of bytes `encode_string` produces for `s`.
pub(crate) fn encoded_string_len(s: &[u8]) -> usize {
    2 + s.len()
}
