//! Codec Module
//!
//! Primitive wire encodings shared by the streams.
//!
//! ## Wire Format
//!
//! ### Variable-length unsigned integer
//! ```text
//! ┌─────────────┬─────────────┬─────┬─────────────┐
//! │1│ bits 0..7 │1│ bits 7..14│ ... │0│ last group│
//! └─────────────┴─────────────┴─────┴─────────────┘
//! ```
//! 7 payload bits per byte, least-significant group first, high bit set on
//! every byte except the last. A `u64` takes at most 10 bytes.
//!
//! ### String
//! ```text
//! ┌──────────────────┬──────────────────────────────┐
//! │ varint(byte len) │        UTF-8 bytes           │
//! └──────────────────┴──────────────────────────────┘
//! ```
//!
//! ### Fixed width integers
//! Big-endian, 4 bytes for `u32` and 8 bytes for `u64`.

mod input;
mod output;

pub use input::DataInput;
pub use output::DataOutput;

use crate::error::Result;

/// Longest encoding of a `u32` varint
pub const MAX_VAR_U32_LEN: usize = 5;

/// Longest encoding of a `u64` varint
pub const MAX_VAR_U64_LEN: usize = 10;

// =============================================================================
// Varint Encoding/Decoding
// =============================================================================

/// Encode a varint into `buf`, returning the number of bytes used
pub fn encode_var_u64_into(mut value: u64, buf: &mut [u8; MAX_VAR_U64_LEN]) -> usize {
    let mut pos = 0;
    while value >= 0x80 {
        buf[pos] = (value as u8 & 0x7f) | 0x80;
        value >>= 7;
        pos += 1;
    }
    buf[pos] = value as u8;
    pos + 1
}

/// Encode a varint to bytes
pub fn encode_var_u64(value: u64) -> Vec<u8> {
    let mut buf = [0u8; MAX_VAR_U64_LEN];
    let len = encode_var_u64_into(value, &mut buf);
    buf[..len].to_vec()
}

/// Number of bytes `encode_var_u64(value)` produces
pub fn var_u64_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decode a varint from the front of `bytes`
///
/// Returns the value and the number of bytes consumed
pub fn decode_var_u64(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut src = bytes;
    let value = src.read_var_u64()?;
    Ok((value, bytes.len() - src.len()))
}

// =============================================================================
// String Encoding/Decoding
// =============================================================================

/// Encode a string as varint byte length followed by UTF-8 bytes
pub fn encode_string(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(string_len(s));
    out.extend_from_slice(&encode_var_u64(s.len() as u64));
    out.extend_from_slice(s.as_bytes());
    out
}

/// Number of bytes `encode_string(s)` produces
pub fn string_len(s: &str) -> usize {
    var_u64_len(s.len() as u64) + s.len()
}

/// Decode a length-prefixed string from the front of `bytes`
///
/// Returns the string and the number of bytes consumed
pub fn decode_string(bytes: &[u8]) -> Result<(String, usize)> {
    let mut src = bytes;
    let value = src.read_string()?;
    Ok((value, bytes.len() - src.len()))
}
