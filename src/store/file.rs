//! File-backed column store
//!
//! A `MemoryStore` that is rebuilt from, and appended to, a mutation log.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::config::{Config, SyncStrategy};
use crate::error::Result;

use super::log::{LogReplay, LogWriter, Mutation, ReplayStats};
use super::{ColumnStore, MemoryStore};

/// Durable column store kept in a single log file
///
/// ## Concurrency:
/// - Mutations hold the `log` mutex while they append and apply, so the log
///   order is the order in which changes become visible
/// - Reads only touch `memory` and never wait on the log
pub struct FileStore {
    /// Directory holding the log
    data_dir: PathBuf,

    /// Current state
    memory: MemoryStore,

    /// Append handle for the log (exclusive access needed)
    log: Mutex<LogWriter>,

    /// Sync strategy (reused when compaction reopens the log)
    sync_strategy: SyncStrategy,

    /// What the replay on open found
    replay_stats: ReplayStats,
}

impl FileStore {
    const LOG_FILENAME: &'static str = "store.log";
    const COMPACT_FILENAME: &'static str = "store.log.compact";

    /// Open or create a store under `config.data_dir`
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_path(&config.data_dir, config.sync_strategy)
    }

    /// Open or create a store in the given directory
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Replay the log into memory (truncating a torn tail)
    /// 3. Continue appending after the last valid record
    pub fn open_path(data_dir: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let log_path = data_dir.join(Self::LOG_FILENAME);

        let (records, replay_stats) = LogReplay::replay(&log_path)?;
        let memory = MemoryStore::new();
        for record in records {
            memory.apply(record.mutation);
        }

        tracing::debug!(
            "Replayed {} log records from {} (last_lsn={}, truncated={} bytes)",
            replay_stats.records_applied,
            log_path.display(),
            replay_stats.last_lsn,
            replay_stats.bytes_truncated
        );

        let log = LogWriter::open(&log_path, sync_strategy, replay_stats.last_lsn + 1)?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            memory,
            log: Mutex::new(log),
            sync_strategy,
            replay_stats,
        })
    }

    /// Rewrite the log as one record per live cell
    ///
    /// The snapshot is written to a side file, synced, then renamed over the
    /// log, so a crash mid-compaction leaves the old log intact.
    pub fn compact(&self) -> Result<()> {
        let mut log = self.log.lock();

        let log_path = self.log_path();
        let compact_path = self.data_dir.join(Self::COMPACT_FILENAME);
        if compact_path.exists() {
            fs::remove_file(&compact_path)?;
        }

        let snapshot = self.memory.snapshot();
        let cells = snapshot.len();
        let next_lsn = {
            let mut writer = LogWriter::open(
                &compact_path,
                SyncStrategy::EveryNEntries { count: usize::MAX },
                1,
            )?;
            for mutation in &snapshot {
                writer.append(mutation)?;
            }
            writer.sync()?;
            writer.next_lsn()
        };

        fs::rename(&compact_path, &log_path)?;
        *log = LogWriter::open(&log_path, self.sync_strategy, next_lsn)?;

        tracing::debug!("Compacted {} to {} cells", log_path.display(), cells);
        Ok(())
    }

    /// Stats from the replay performed on open
    pub fn replay_stats(&self) -> &ReplayStats {
        &self.replay_stats
    }

    /// Path of the mutation log
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(Self::LOG_FILENAME)
    }

    /// Total number of live cells
    pub fn cell_count(&self) -> usize {
        self.memory.cell_count()
    }

    /// Log a mutation, then apply it
    fn commit(&self, mutation: Mutation) -> Result<()> {
        let mut log = self.log.lock();
        log.append(&mutation)?;
        self.memory.apply(mutation);
        Ok(())
    }
}

impl ColumnStore for FileStore {
    fn get(&self, table: &str, row: &[u8], column: &[u8]) -> Result<Option<Bytes>> {
        self.memory.get(table, row, column)
    }

    fn put(&self, table: &str, row: &[u8], column: &[u8], value: Bytes) -> Result<()> {
        self.commit(Mutation::Put {
            table: table.to_string(),
            row: row.to_vec(),
            column: column.to_vec(),
            value: value.to_vec(),
        })
    }

    fn delete(&self, table: &str, row: &[u8], column: &[u8]) -> Result<()> {
        self.commit(Mutation::Delete {
            table: table.to_string(),
            row: row.to_vec(),
            column: column.to_vec(),
        })
    }

    fn delete_row(&self, table: &str, row: &[u8]) -> Result<()> {
        self.commit(Mutation::DeleteRow {
            table: table.to_string(),
            row: row.to_vec(),
        })
    }

    fn rows(&self, table: &str) -> Result<Vec<Vec<u8>>> {
        self.memory.rows(table)
    }

    fn columns(&self, table: &str, row: &[u8]) -> Result<Vec<(Vec<u8>, Bytes)>> {
        self.memory.columns(table, row)
    }

    fn column_count(&self, table: &str, row: &[u8]) -> Result<usize> {
        self.memory.column_count(table, row)
    }

    fn sync(&self) -> Result<()> {
        self.log.lock().sync()
    }
}
