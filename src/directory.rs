//! Directory Module
//!
//! The file-system-like entry point that composes catalog, block store and
//! streams.
//!
//! ## Responsibilities
//! - Expose list/create/open/delete/exists/length/modified/touch
//! - Keep catalog entries and block rows in step on create and delete
//! - Hand out streams bound to one file each

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::blocks::BlockStore;
use crate::catalog::{Catalog, SystemTimeSource, TimeSource};
use crate::config::Config;
use crate::error::{BlockDirError, Result};
use crate::store::{ColumnStore, MemoryStore};
use crate::stream::{IndexInput, IndexOutput};

/// A directory of named files stored as blocks in a column store
///
/// ## Sharing Model
/// - The catalog and block store are shared by every stream the directory
///   hands out; streams borrow them for their lifetime
/// - All methods take `&self`; the store provides per-key atomicity and the
///   directory adds no locking of its own
/// - Callers must not write the same file name from two streams at once
pub struct BlockDirectory {
    /// Directory configuration
    config: Config,

    /// Backing column store (shared with catalog and block store)
    store: Arc<dyn ColumnStore>,

    /// File metadata
    catalog: Catalog,

    /// File content
    blocks: BlockStore,

    /// Set once by `close()`
    closed: AtomicBool,
}

impl BlockDirectory {
    /// Open a directory over the given store
    pub fn open(config: Config, store: Arc<dyn ColumnStore>) -> Result<Self> {
        Self::open_with_clock(config, store, Arc::new(SystemTimeSource))
    }

    /// Open a directory backed by a fresh in-memory store
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::open(config, Arc::new(MemoryStore::new()))
    }

    /// Open a directory with an explicit time source for modification times
    pub fn open_with_clock(
        config: Config,
        store: Arc<dyn ColumnStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        config.validate()?;

        let catalog = Catalog::new(Arc::clone(&store), config.catalog_table(), clock);
        let blocks = BlockStore::new(
            Arc::clone(&store),
            config.blocks_table(),
            config.block_size,
            config.cache_size,
        );

        tracing::debug!(
            "Opened directory {}.{} (block_size={}, cache_size={})",
            config.keyspace,
            config.column_family,
            config.block_size,
            config.cache_size
        );

        Ok(Self {
            config,
            store,
            catalog,
            blocks,
            closed: AtomicBool::new(false),
        })
    }

    // =========================================================================
    // File Operations
    // =========================================================================

    /// Names of every file in the directory
    pub fn list_all(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        self.catalog.list()
    }

    /// Whether a file exists
    ///
    /// Store failures are returned as errors, never as `false`.
    pub fn file_exists(&self, name: &str) -> Result<bool> {
        self.ensure_open()?;
        self.catalog.exists(name)
    }

    /// Exact length of a file in bytes
    pub fn file_length(&self, name: &str) -> Result<u64> {
        self.ensure_open()?;
        self.catalog.length(name)
    }

    /// Last modification time of a file (unix millis)
    pub fn file_modified(&self, name: &str) -> Result<u64> {
        self.ensure_open()?;
        self.catalog.modified(name)
    }

    /// Set a file's modification time to now
    pub fn touch_file(&self, name: &str) -> Result<()> {
        self.ensure_open()?;
        self.catalog.touch(name)
    }

    /// Delete a file and all of its blocks
    pub fn delete_file(&self, name: &str) -> Result<()> {
        self.ensure_open()?;
        self.catalog.delete(name)?;
        self.blocks.delete_blocks(name)
    }

    /// Create a file for writing, truncating any existing content
    ///
    /// Steps:
    /// 1. Delete all blocks stored under the name
    /// 2. Reset the catalog entry to length 0, modified now
    /// 3. Return a writer positioned at byte 0
    pub fn create_output(&self, name: &str) -> Result<IndexOutput<'_>> {
        self.ensure_open()?;
        self.blocks.delete_blocks(name)?;
        self.catalog.create(name, self.config.block_size)?;
        Ok(IndexOutput::new(
            name,
            self.config.block_size,
            &self.blocks,
            &self.catalog,
        ))
    }

    /// Open a file for reading from byte 0
    pub fn open_input(&self, name: &str) -> Result<IndexInput<'_>> {
        self.ensure_open()?;
        let entry = self.catalog.entry(name)?;
        IndexInput::open(entry, &self.blocks)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Make every prior mutation durable in the store
    pub fn sync(&self) -> Result<()> {
        self.ensure_open()?;
        self.store.sync()
    }

    /// Release the block cache and sync the store; later calls are no-ops
    ///
    /// Every other operation fails with `DirectoryClosed` afterwards.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.blocks.clear_cache();
        self.store.sync()?;
        tracing::debug!(
            "Closed directory {}.{}",
            self.config.keyspace,
            self.config.column_family
        );
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(BlockDirError::DirectoryClosed);
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the metadata catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get the block store
    pub fn block_store(&self) -> &BlockStore {
        &self.blocks
    }
}
