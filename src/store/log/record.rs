//! Log record definitions
//!
//! Defines the structure and framing of individual log records.

use serde::{Deserialize, Serialize};

use crate::error::{BlockDirError, Result};

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A store mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Create or overwrite a cell
    Put {
        table: String,
        row: Vec<u8>,
        column: Vec<u8>,
        value: Vec<u8>,
    },

    /// Remove a cell
    Delete {
        table: String,
        row: Vec<u8>,
        column: Vec<u8>,
    },

    /// Remove every cell of a row
    DeleteRow { table: String, row: Vec<u8> },
}

/// A single framed record in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The mutation to apply
    pub mutation: Mutation,
}

impl LogRecord {
    pub fn new(lsn: u64, mutation: Mutation) -> Self {
        Self { lsn, mutation }
    }

    /// Frame the record: header followed by the bincode payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        Self::frame(self.lsn, &self.mutation)
    }

    /// Frame a mutation under the given LSN
    pub fn frame(lsn: u64, mutation: &Mutation) -> Result<Vec<u8>> {
        let payload = bincode::serialize(mutation)?;
        let len = u32::try_from(payload.len()).map_err(|_| {
            BlockDirError::Serialization(format!(
                "log record payload of {} bytes is too large",
                payload.len()
            ))
        })?;
        let crc = crc32fast::hash(&payload);

        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
        buf.extend_from_slice(&lsn.to_le_bytes());
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode one record from the front of `bytes`
    ///
    /// Returns:
    /// - `Ok(Some((record, consumed)))`: a complete, valid record
    /// - `Ok(None)`: `bytes` ends before the record does (torn write)
    /// - `Err(LogCorruption)`: checksum mismatch or undecodable payload
    pub fn decode(bytes: &[u8]) -> Result<Option<(Self, usize)>> {
        if bytes.len() < HEADER_SIZE {
            return Ok(None);
        }

        let mut lsn = [0u8; 8];
        lsn.copy_from_slice(&bytes[0..8]);
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&bytes[8..12]);
        let mut len = [0u8; 4];
        len.copy_from_slice(&bytes[12..16]);

        let lsn = u64::from_le_bytes(lsn);
        let crc = u32::from_le_bytes(crc);
        let len = u32::from_le_bytes(len) as usize;

        let end = HEADER_SIZE + len;
        if bytes.len() < end {
            return Ok(None);
        }

        let payload = &bytes[HEADER_SIZE..end];
        let actual = crc32fast::hash(payload);
        if actual != crc {
            return Err(BlockDirError::LogCorruption(format!(
                "record {} checksum mismatch: stored {:08x}, computed {:08x}",
                lsn, crc, actual
            )));
        }

        let mutation: Mutation = bincode::deserialize(payload).map_err(|e| {
            BlockDirError::LogCorruption(format!("record {} payload undecodable: {}", lsn, e))
        })?;

        Ok(Some((Self { lsn, mutation }, end)))
    }
}
