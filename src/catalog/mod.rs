//! Catalog Module
//!
//! Per-file metadata: length, modification time and block size.
//!
//! ## Responsibilities
//! - Single source of truth for which files exist
//! - Track exact length and last-modified time per file
//! - Change only on create, flush/close, touch and delete
//!
//! ## Storage
//! ```text
//! table "{keyspace}.{cf}.catalog"
//!   row "segments_1"  ──► column "entry" ──► bincode(FileEntry)
//!   row "_0.cfs"      ──► column "entry" ──► bincode(FileEntry)
//! ```

mod clock;
mod entry;

pub use clock::{SystemTimeSource, TimeSource};
pub use entry::FileEntry;

use std::sync::Arc;

use crate::error::{BlockDirError, Result};
use crate::store::ColumnStore;

/// Column holding the serialized entry
const ENTRY_COLUMN: &[u8] = b"entry";

/// Metadata catalog
///
/// Entries are read from the store on every call; the catalog keeps no copy
/// of its own, so every handle over the same table sees the same state.
pub struct Catalog {
    store: Arc<dyn ColumnStore>,
    table: String,
    clock: Arc<dyn TimeSource>,
}

impl Catalog {
    /// Create a catalog over `table`
    pub fn new(
        store: Arc<dyn ColumnStore>,
        table: impl Into<String>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            table: table.into(),
            clock,
        }
    }

    /// Names of every file, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        self.store
            .rows(&self.table)?
            .into_iter()
            .map(|row| {
                String::from_utf8(row).map_err(|e| {
                    BlockDirError::MalformedEncoding(format!("file name is not UTF-8: {}", e))
                })
            })
            .collect()
    }

    /// Whether a file exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .store
            .get(&self.table, name.as_bytes(), ENTRY_COLUMN)?
            .is_some())
    }

    /// Get the full entry for a file
    pub fn entry(&self, name: &str) -> Result<FileEntry> {
        match self.store.get(&self.table, name.as_bytes(), ENTRY_COLUMN)? {
            Some(bytes) => FileEntry::decode(&bytes),
            None => Err(BlockDirError::FileNotFound(name.to_string())),
        }
    }

    /// Exact length of a file in bytes
    pub fn length(&self, name: &str) -> Result<u64> {
        Ok(self.entry(name)?.length)
    }

    /// Last modification time of a file (unix millis)
    pub fn modified(&self, name: &str) -> Result<u64> {
        Ok(self.entry(name)?.last_modified)
    }

    /// Set the modification time to now, leaving length untouched
    pub fn touch(&self, name: &str) -> Result<()> {
        let mut entry = self.entry(name)?;
        entry.last_modified = self.clock.now_millis();
        self.save(&entry)?;
        tracing::debug!("Touched {} at {}", name, entry.last_modified);
        Ok(())
    }

    /// Insert an empty entry, replacing any existing one
    ///
    /// Returns the replaced entry; the caller owns deleting its blocks.
    pub fn create(&self, name: &str, block_size: u32) -> Result<Option<FileEntry>> {
        let previous = match self.entry(name) {
            Ok(entry) => Some(entry),
            Err(BlockDirError::FileNotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let entry = FileEntry::new(name, block_size, self.clock.now_millis());
        self.save(&entry)?;

        tracing::debug!(
            "Created {} (block_size={}, replaced={})",
            name,
            block_size,
            previous.is_some()
        );
        Ok(previous)
    }

    /// Record the length reached by a writer and stamp the time
    pub fn update_after_write(&self, name: &str, new_length: u64) -> Result<()> {
        let mut entry = self.entry(name)?;
        entry.length = new_length;
        entry.last_modified = self.clock.now_millis();
        self.save(&entry)
    }

    /// Remove an entry, returning it
    pub fn delete(&self, name: &str) -> Result<FileEntry> {
        let entry = self.entry(name)?;
        self.store
            .delete(&self.table, name.as_bytes(), ENTRY_COLUMN)?;
        tracing::debug!("Deleted {} ({} bytes)", name, entry.length);
        Ok(entry)
    }

    fn save(&self, entry: &FileEntry) -> Result<()> {
        self.store.put(
            &self.table,
            entry.name.as_bytes(),
            ENTRY_COLUMN,
            entry.encode()?,
        )
    }
}
