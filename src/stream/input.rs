//! Index Input
//!
//! Sequential reader that reassembles a file from its blocks on demand.

use std::io::{self, SeekFrom};

use bytes::Bytes;

use crate::blocks::{block_len, BlockCursor, BlockStore};
use crate::catalog::FileEntry;
use crate::codec::DataInput;
use crate::error::{BlockDirError, Result};

/// Sequential reader for one file
///
/// The length is snapshotted when the reader is opened; bytes a writer
/// publishes afterwards are not visible through this reader.
///
/// Cloning yields an independent cursor over the same snapshot.
#[derive(Clone)]
pub struct IndexInput<'a> {
    name: String,
    blocks: &'a BlockStore,
    block_size: u32,
    length: u64,
    cursor: BlockCursor,
    /// Most recently loaded block
    current: Option<(u64, Bytes)>,
    closed: bool,
}

impl<'a> IndexInput<'a> {
    pub(crate) fn open(entry: FileEntry, blocks: &'a BlockStore) -> Result<Self> {
        if entry.block_size == 0 {
            return Err(BlockDirError::MalformedEncoding(format!(
                "catalog entry for {} has a zero block size",
                entry.name
            )));
        }

        Ok(Self {
            name: entry.name,
            blocks,
            block_size: entry.block_size,
            length: entry.length,
            cursor: BlockCursor::new(entry.block_size),
            current: None,
            closed: false,
        })
    }

    /// Name of the file being read
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total file length as of opening (not the bytes remaining)
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Position the next byte is read from
    pub fn file_pointer(&self) -> u64 {
        self.cursor.position()
    }

    /// Move the cursor to `position`, which may equal the length
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.ensure_open()?;
        if position > self.length {
            return Err(BlockDirError::EndOfFile {
                requested: position - self.cursor.position(),
                remaining: self.remaining(),
            });
        }
        self.cursor.seek(position);
        Ok(())
    }

    /// Release the cursor; later calls are no-ops
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.current = None;
            tracing::trace!("Closed input {}", self.name);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(BlockDirError::StreamClosed);
        }
        Ok(())
    }

    /// Get block `index`, loading it if it is not the current one
    fn block(&mut self, index: u64) -> Result<Bytes> {
        if let Some((loaded, block)) = &self.current {
            if *loaded == index {
                return Ok(block.clone());
            }
        }

        let expected = block_len(self.length, self.block_size, index);
        let block = self.blocks.get_block(&self.name, index)?;
        if block.len() < expected {
            return Err(BlockDirError::TruncatedBlock {
                name: self.name.clone(),
                index,
                expected,
                actual: block.len(),
            });
        }

        self.current = Some((index, block.clone()));
        Ok(block)
    }

    /// Copy `buf.len()` bytes across as many blocks as needed
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let offset = self.cursor.block_offset();
            let take = (buf.len() - filled).min(self.cursor.block_remaining());
            let block = self.block(self.cursor.block_index())?;

            buf[filled..filled + take].copy_from_slice(&block[offset..offset + take]);
            self.cursor.advance(take);
            filled += take;
        }
        Ok(())
    }
}

impl DataInput for IndexInput<'_> {
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_into(&mut byte)?;
        Ok(byte[0])
    }

    /// Fill `buf`; on any failure the cursor is left where it was
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure_open()?;

        let remaining = self.remaining();
        if buf.len() as u64 > remaining {
            return Err(BlockDirError::EndOfFile {
                requested: buf.len() as u64,
                remaining,
            });
        }

        let start = self.cursor.position();
        if let Err(e) = self.fill(buf) {
            self.cursor.seek(start);
            return Err(e);
        }
        Ok(())
    }

    fn remaining(&self) -> u64 {
        self.length.saturating_sub(self.cursor.position())
    }
}

impl io::Read for IndexInput<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = (buf.len() as u64).min(self.remaining()) as usize;
        self.read_into(&mut buf[..n])?;
        Ok(n)
    }
}

impl io::Seek for IndexInput<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::End(delta) => self.length.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.cursor.position().checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek position out of range")
        })?;

        IndexInput::seek(self, target)?;
        Ok(target)
    }
}
