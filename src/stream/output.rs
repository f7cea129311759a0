//! Index Output
//!
//! Sequential writer that turns a byte stream into blocks.

use std::io;

use bytes::{Bytes, BytesMut};

use crate::blocks::{BlockCursor, BlockStore};
use crate::catalog::Catalog;
use crate::codec::DataOutput;
use crate::error::{BlockDirError, Result};

/// Sequential writer for one file
///
/// ## State
/// - `cursor`: total bytes written; also names the block being filled
/// - `buffer`: bytes of the block being filled, always shorter than a block
///   (`buffer.len() == cursor.block_offset()`)
///
/// Full blocks go to the block store as soon as they fill up. `flush` also
/// stores the partial block and publishes the length to the catalog; later
/// writes keep filling that same block and overwrite it once it is full.
pub struct IndexOutput<'a> {
    name: String,
    blocks: &'a BlockStore,
    catalog: &'a Catalog,
    cursor: BlockCursor,
    buffer: BytesMut,
    /// Bytes written since the last flush
    pending: bool,
    closed: bool,
}

impl<'a> IndexOutput<'a> {
    pub(crate) fn new(
        name: &str,
        block_size: u32,
        blocks: &'a BlockStore,
        catalog: &'a Catalog,
    ) -> Self {
        Self {
            name: name.to_string(),
            blocks,
            catalog,
            cursor: BlockCursor::new(block_size),
            buffer: BytesMut::with_capacity(block_size as usize),
            pending: false,
            closed: false,
        }
    }

    /// Name of the file being written
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total bytes written so far, flushed or not
    pub fn length(&self) -> u64 {
        self.cursor.position()
    }

    /// Position the next byte is written at (always the end of the file)
    pub fn file_pointer(&self) -> u64 {
        self.cursor.position()
    }

    /// Store the partial block and publish the current length
    ///
    /// The stream stays open. If the file was deleted while this stream was
    /// writing, the blocks it stored are removed, the stream is closed and
    /// `FileNotFound` is returned.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;

        if !self.catalog.exists(&self.name)? {
            return Err(self.discard());
        }

        if !self.buffer.is_empty() {
            self.blocks.put_block(
                &self.name,
                self.cursor.block_index(),
                Bytes::copy_from_slice(&self.buffer),
            )?;
        }
        match self
            .catalog
            .update_after_write(&self.name, self.cursor.position())
        {
            Ok(()) => {}
            // Deleted between the check and the update
            Err(BlockDirError::FileNotFound(_)) => return Err(self.discard()),
            Err(e) => return Err(e),
        }
        self.pending = false;
        Ok(())
    }

    /// Drop the blocks of a file deleted under this stream and close it
    fn discard(&mut self) -> BlockDirError {
        tracing::warn!(
            "Output {} was deleted while open, discarding {} bytes",
            self.name,
            self.length()
        );
        if let Err(e) = self.blocks.delete_blocks(&self.name) {
            tracing::warn!("Failed to remove blocks of deleted file {}: {}", self.name, e);
        }
        self.buffer.clear();
        self.pending = false;
        self.closed = true;
        BlockDirError::FileNotFound(self.name.clone())
    }

    /// Flush and close; later calls are no-ops
    ///
    /// If the flush fails the stream stays open so the caller may retry,
    /// unless the file was deleted under it.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.closed = true;
        tracing::debug!("Closed output {} at {} bytes", self.name, self.length());
        Ok(())
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
}

impl DataOutput for IndexOutput<'_> {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write_bytes(&[byte])
    }

    /// Append `data`, storing every block it completes
    ///
    /// On a store failure the bytes of the failing block are not counted,
    /// everything before them is.
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let mut written = 0;
        self.append_chunks(data, &mut written)
    }
}

impl IndexOutput<'_> {
    /// Append `data` block by block, adding each accepted chunk to `written`
    fn append_chunks(&mut self, data: &[u8], written: &mut usize) -> Result<()> {
        self.ensure_open()?;

        let mut rest = data;
        while !rest.is_empty() {
            let take = rest.len().min(self.cursor.block_remaining());
            let (chunk, tail) = rest.split_at(take);

            if take == self.cursor.block_remaining() {
                let mut block = BytesMut::with_capacity(self.cursor.block_size());
                block.extend_from_slice(&self.buffer);
                block.extend_from_slice(chunk);
                self.blocks
                    .put_block(&self.name, self.cursor.block_index(), block.freeze())?;
                self.buffer.clear();
            } else {
                self.buffer.extend_from_slice(chunk);
            }

            self.cursor.advance(take);
            self.pending = true;
            *written += take;
            rest = tail;
        }
        Ok(())
    }
}

impl io::Write for IndexOutput<'_> {
    /// Reports the bytes accepted before a failure as a short write; the
    /// error surfaces on the next call.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        match self.append_chunks(buf, &mut written) {
            Ok(()) => Ok(written),
            Err(_) if written > 0 => Ok(written),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        IndexOutput::flush(self).map_err(Into::into)
    }
}

impl Drop for IndexOutput<'_> {
    fn drop(&mut self) {
        if self.closed || !self.pending {
            return;
        }
        if let Err(e) = self.close() {
            tracing::warn!("Failed to close output {} on drop: {}", self.name, e);
        }
    }
}
