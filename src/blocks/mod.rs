//! Blocks Module
//!
//! Fixed-capacity chunks of file content stored in the column store.
//!
//! ## Layout
//! ```text
//! file bytes:  [ block 0 ........ ][ block 1 ........ ][ block 2 .. ]
//!              0            block_size          2*block_size      length
//!
//! store:       table "{keyspace}.{cf}.blocks"
//!              row    = file name
//!              column = block index as 8 big-endian bytes
//!              value  = block bytes (block_size, last block may be shorter)
//! ```
//!
//! ## Responsibilities
//! - Store and fetch blocks by (file name, index)
//! - Enforce the block size limit on writes
//! - Keep the optional LRU cache coherent with the store, including
//!   under concurrent readers and writers

mod cache;
mod cursor;

pub use cache::{BlockCache, BlockKey};
pub use cursor::{block_count, block_len, BlockCursor};

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{BlockDirError, Result};
use crate::store::ColumnStore;

/// Stores file content as blocks
pub struct BlockStore {
    /// Backing column store
    store: Arc<dyn ColumnStore>,

    /// Table holding the block rows
    table: String,

    /// Largest block accepted by `put_block`
    block_size: usize,

    /// Read cache (None when disabled)
    cache: Option<BlockCache>,
}

impl BlockStore {
    /// Create a block store over `table`
    ///
    /// A `cache_size` of 0 disables the cache.
    pub fn new(
        store: Arc<dyn ColumnStore>,
        table: impl Into<String>,
        block_size: u32,
        cache_size: usize,
    ) -> Self {
        Self {
            store,
            table: table.into(),
            block_size: block_size as usize,
            cache: BlockCache::new(cache_size),
        }
    }

    /// Get a block
    ///
    /// A block that was never written comes back empty; whether that means
    /// "past the end" is for the caller to decide from the catalog length.
    pub fn get_block(&self, name: &str, index: u64) -> Result<Bytes> {
        let ticket = match &self.cache {
            Some(cache) => {
                if let Some(block) = cache.get(name, index) {
                    tracing::trace!("Block cache hit: {}[{}]", name, index);
                    return Ok(block);
                }
                Some(cache.generation())
            }
            None => None,
        };

        let block = self
            .store
            .get(&self.table, name.as_bytes(), &Self::column(index))?
            .unwrap_or_default();
        tracing::trace!("Fetched block {}[{}] ({} bytes)", name, index, block.len());

        if let (Some(cache), Some(ticket)) = (&self.cache, ticket) {
            if !block.is_empty() && !cache.insert_if_current(name, index, block.clone(), ticket) {
                tracing::trace!("Skipped caching {}[{}]: written while fetching", name, index);
            }
        }
        Ok(block)
    }

    /// Create or overwrite a block
    ///
    /// Blocks larger than the block size are rejected with `InvalidBlockSize`.
    pub fn put_block(&self, name: &str, index: u64, block: Bytes) -> Result<()> {
        if block.len() > self.block_size {
            return Err(BlockDirError::InvalidBlockSize {
                size: block.len(),
                max: self.block_size,
            });
        }

        tracing::trace!("Storing block {}[{}] ({} bytes)", name, index, block.len());
        let result = self
            .store
            .put(&self.table, name.as_bytes(), &Self::column(index), block);

        // After the store call, so a fill that raced with it is rejected
        if let Some(cache) = &self.cache {
            cache.invalidate(name, index);
        }
        result
    }

    /// Remove every block of a file (no-op if it has none)
    pub fn delete_blocks(&self, name: &str) -> Result<()> {
        let result = self.store.delete_row(&self.table, name.as_bytes());

        if let Some(cache) = &self.cache {
            let dropped = cache.invalidate_file(name);
            if dropped > 0 {
                tracing::trace!("Dropped {} cached blocks of {}", dropped, name);
            }
        }
        result
    }

    /// Number of blocks stored for a file
    pub fn block_count(&self, name: &str) -> Result<usize> {
        self.store.column_count(&self.table, name.as_bytes())
    }

    /// Largest block accepted by `put_block`
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks currently cached (0 when caching is disabled)
    pub fn cached_blocks(&self) -> usize {
        self.cache.as_ref().map(BlockCache::len).unwrap_or(0)
    }

    /// Drop every cached block
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Column name for a block index (sorts in index order)
    fn column(index: u64) -> [u8; 8] {
        index.to_be_bytes()
    }
}
