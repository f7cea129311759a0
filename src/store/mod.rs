//! Store Module
//!
//! The column store the directory persists into.
//!
//! ## Data Model
//! ```text
//! table ──► row key ──► column name ──► value
//!
//! "{keyspace}.{cf}.catalog"   file name ──► "entry"            ──► FileEntry
//! "{keyspace}.{cf}.blocks"    file name ──► block index (u64 BE) ──► block bytes
//! ```
//!
//! ## Implementations
//! - `MemoryStore`: BTreeMap behind a RwLock, nothing survives the process
//! - `FileStore`: MemoryStore replayed from and appended to a mutation log

mod memory;
mod file;
pub mod log;

pub use memory::MemoryStore;
pub use file::FileStore;

use bytes::Bytes;

use crate::error::Result;

/// Abstract interface for the remote column store.
///
/// Every call addresses a single cell or row and is atomic on its own;
/// nothing spans more than one key. All methods take `&self` so one handle
/// can be shared by the catalog, the block store and every open stream.
pub trait ColumnStore: Send + Sync {
    /// Get a cell value
    fn get(&self, table: &str, row: &[u8], column: &[u8]) -> Result<Option<Bytes>>;

    /// Create or overwrite a cell
    fn put(&self, table: &str, row: &[u8], column: &[u8], value: Bytes) -> Result<()>;

    /// Remove a cell (no-op if absent)
    fn delete(&self, table: &str, row: &[u8], column: &[u8]) -> Result<()>;

    /// Remove every cell of a row (no-op if absent)
    fn delete_row(&self, table: &str, row: &[u8]) -> Result<()>;

    /// Keys of every non-empty row in a table, sorted
    fn rows(&self, table: &str) -> Result<Vec<Vec<u8>>>;

    /// Every cell of a row, sorted by column name
    fn columns(&self, table: &str, row: &[u8]) -> Result<Vec<(Vec<u8>, Bytes)>>;

    /// Number of cells in a row
    ///
    /// The default fetches every value; stores that can count without
    /// copying should override it.
    fn column_count(&self, table: &str, row: &[u8]) -> Result<usize> {
        Ok(self.columns(table, row)?.len())
    }

    /// Make prior mutations durable
    fn sync(&self) -> Result<()> {
        Ok(())
    }
}
