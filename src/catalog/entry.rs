//! Catalog entry definitions

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::blocks::block_count;
use crate::error::Result;

/// Metadata for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name (unique within the directory)
    pub name: String,

    /// Exact payload length in bytes (never block-padded)
    pub length: u64,

    /// Last modification time (unix millis)
    pub last_modified: u64,

    /// Block size fixed when the file was created
    pub block_size: u32,
}

impl FileEntry {
    /// A fresh, empty entry
    pub fn new(name: impl Into<String>, block_size: u32, now: u64) -> Self {
        Self {
            name: name.into(),
            length: 0,
            last_modified: now,
            block_size,
        }
    }

    /// Number of blocks the content occupies
    pub fn block_count(&self) -> u64 {
        block_count(self.length, self.block_size)
    }

    pub fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(bincode::serialize(self)?))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
