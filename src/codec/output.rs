//! Data output
//!
//! Encoding side of the primitive encodings.

use crate::error::Result;

use super::{encode_var_u64_into, MAX_VAR_U64_LEN};

/// A sequential sink of bytes
///
/// Implementors supply raw byte writes; every primitive encoding is provided
/// on top of them.
pub trait DataOutput {
    /// Write a single byte
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Write all of `data`
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Write a big-endian `u32`
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a big-endian `u64`
    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a varint (at most 5 bytes)
    fn write_var_u32(&mut self, value: u32) -> Result<()> {
        self.write_var_u64(u64::from(value))
    }

    /// Write a varint (at most 10 bytes)
    fn write_var_u64(&mut self, value: u64) -> Result<()> {
        let mut buf = [0u8; MAX_VAR_U64_LEN];
        let len = encode_var_u64_into(value, &mut buf);
        self.write_bytes(&buf[..len])
    }

    /// Write a varint byte length followed by the UTF-8 bytes of `s`
    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_var_u64(s.len() as u64)?;
        self.write_bytes(s.as_bytes())
    }
}

impl DataOutput for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.push(byte);
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.extend_from_slice(data);
        Ok(())
    }
}
