//! Configuration for blockdir
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{BlockDirError, Result};

/// Largest block size a directory accepts (16 MiB)
pub const MAX_BLOCK_SIZE: u32 = 16 * 1024 * 1024;

/// Main configuration for a block directory
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Addressing
    // -------------------------------------------------------------------------
    /// Keyspace (namespace) the directory lives in
    pub keyspace: String,

    /// Column family (directory identifier) within the keyspace
    pub column_family: String,

    // -------------------------------------------------------------------------
    // Block Layout
    // -------------------------------------------------------------------------
    /// Size of every block except possibly the last one of a file (in bytes)
    pub block_size: u32,

    /// Number of blocks kept in the read cache (0 disables caching)
    pub cache_size: usize,

    // -------------------------------------------------------------------------
    // File Store Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the file-backed store
    /// Internal structure:
    ///   {data_dir}/
    ///     └── store.log        (mutation log)
    pub data_dir: PathBuf,

    /// Sync strategy: how often to fsync the mutation log
    pub sync_strategy: SyncStrategy,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every mutation (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced mutations (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keyspace: "blockdir".to_string(),
            column_family: "index".to_string(),
            block_size: 16 * 1024, // 16 KB
            cache_size: 64,
            data_dir: PathBuf::from("./blockdir_data"),
            sync_strategy: SyncStrategy::EveryNEntries { count: 100 },
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the settings a directory cannot run with
    pub fn validate(&self) -> Result<()> {
        validate_identifier("keyspace", &self.keyspace)?;
        validate_identifier("column family", &self.column_family)?;
        if self.block_size == 0 {
            return Err(BlockDirError::Config("block size must be positive".to_string()));
        }
        if self.block_size > MAX_BLOCK_SIZE {
            return Err(BlockDirError::Config(format!(
                "block size {} exceeds maximum of {}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }
        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(BlockDirError::Config(
                "sync interval must be at least one entry".to_string(),
            ));
        }
        Ok(())
    }

    /// Table holding one catalog row per file
    pub fn catalog_table(&self) -> String {
        format!("{}.{}.catalog", self.keyspace, self.column_family)
    }

    /// Table holding one block row per file
    pub fn blocks_table(&self) -> String {
        format!("{}.{}.blocks", self.keyspace, self.column_family)
    }
}

/// Keyspace and column family names become the `.`-separated parts of table
/// names, so they are limited to ASCII letters, digits and `_`.
fn validate_identifier(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(BlockDirError::Config(format!("{} must not be empty", what)));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(BlockDirError::Config(format!(
            "{} {:?} contains invalid character {:?}",
            what, value, c
        )));
    }
    Ok(())
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the keyspace
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.config.keyspace = keyspace.into();
        self
    }

    /// Set the column family
    pub fn column_family(mut self, column_family: impl Into<String>) -> Self {
        self.config.column_family = column_family.into();
        self
    }

    /// Set the block size (in bytes)
    pub fn block_size(mut self, size: u32) -> Self {
        self.config.block_size = size;
        self
    }

    /// Set the block cache capacity (in blocks, 0 disables caching)
    pub fn cache_size(mut self, blocks: usize) -> Self {
        self.config.cache_size = blocks;
        self
    }

    /// Set the data directory used by the file-backed store
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the log sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
