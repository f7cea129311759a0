//! Data input
//!
//! Decoding side of the primitive encodings.

use crate::error::{BlockDirError, Result};

/// A sequential source of bytes that knows how many bytes it has left
///
/// Implementors supply the raw byte access; every primitive decoding is
/// provided on top of it.
pub trait DataInput {
    /// Read a single byte
    fn read_byte(&mut self) -> Result<u8>;

    /// Fill `buf` completely, or fail with `EndOfFile` without consuming
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Bytes left before the end of the input
    fn remaining(&self) -> u64;

    /// Read exactly `n` bytes
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let remaining = self.remaining();
        if n as u64 > remaining {
            return Err(BlockDirError::EndOfFile {
                requested: n as u64,
                remaining,
            });
        }
        let mut buf = vec![0u8; n];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Read a big-endian `u32`
    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_into(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a big-endian `u64`
    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_into(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Read a varint that must fit in 32 bits
    fn read_var_u32(&mut self) -> Result<u32> {
        read_var(self, 32).map(|v| v as u32)
    }

    /// Read a varint that must fit in 64 bits
    fn read_var_u64(&mut self) -> Result<u64> {
        read_var(self, 64)
    }

    /// Read a varint length prefix followed by that many UTF-8 bytes
    fn read_string(&mut self) -> Result<String> {
        let len = self.read_var_u64()?;
        let remaining = self.remaining();
        if len > remaining {
            return Err(BlockDirError::MalformedEncoding(format!(
                "string declares {} bytes but only {} remain",
                len, remaining
            )));
        }
        let bytes = self.read_bytes(len as usize)?;
        String::from_utf8(bytes).map_err(|e| {
            BlockDirError::MalformedEncoding(format!("string is not valid UTF-8: {}", e))
        })
    }
}

/// Decode a varint of at most `width` bits
fn read_var<I: DataInput + ?Sized>(input: &mut I, width: u32) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;

    while shift < width {
        let byte = match input.read_byte() {
            Ok(b) => b,
            Err(BlockDirError::EndOfFile { .. }) if shift > 0 => {
                return Err(BlockDirError::MalformedEncoding(format!(
                    "varint truncated after {} bytes",
                    shift / 7
                )));
            }
            Err(e) => return Err(e),
        };

        let payload = u64::from(byte & 0x7f);
        let room = width - shift;
        if room < 7 && payload >> room != 0 {
            return Err(BlockDirError::MalformedEncoding(format!(
                "varint overflows {} bits",
                width
            )));
        }
        value |= payload << shift;

        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }

    Err(BlockDirError::MalformedEncoding(format!(
        "varint does not terminate within {} bits",
        width
    )))
}

impl<'a> DataInput for &'a [u8] {
    fn read_byte(&mut self) -> Result<u8> {
        let slice: &'a [u8] = *self;
        match slice.split_first() {
            Some((&byte, rest)) => {
                *self = rest;
                Ok(byte)
            }
            None => Err(BlockDirError::EndOfFile {
                requested: 1,
                remaining: 0,
            }),
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let slice: &'a [u8] = *self;
        if buf.len() > slice.len() {
            return Err(BlockDirError::EndOfFile {
                requested: buf.len() as u64,
                remaining: slice.len() as u64,
            });
        }
        let (head, rest) = slice.split_at(buf.len());
        buf.copy_from_slice(head);
        *self = rest;
        Ok(())
    }

    fn remaining(&self) -> u64 {
        self.len() as u64
    }
}
