//! Log Replay
//!
//! Rebuilds store state after a restart by reading the log back.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::{BlockDirError, Result};

use super::LogRecord;

/// Reads a log back into records
pub struct LogReplay;

/// Result of a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of records successfully read
    pub records_applied: u64,

    /// Last valid LSN (0 if the log is empty)
    pub last_lsn: u64,

    /// Bytes cut from the end of the log (torn or corrupt tail)
    pub bytes_truncated: u64,
}

impl ReplayStats {
    /// Whether replay had to cut anything off
    pub fn was_truncated(&self) -> bool {
        self.bytes_truncated > 0
    }
}

impl LogReplay {
    /// Replay a log file
    ///
    /// This will:
    /// 1. Read records in order until the end of the file
    /// 2. Stop at the first torn or corrupt record
    /// 3. Truncate the file to the last valid record
    /// 4. Return all valid records in order
    ///
    /// A missing file replays as empty.
    pub fn replay(path: &Path) -> Result<(Vec<LogRecord>, ReplayStats)> {
        if !path.exists() {
            return Ok((Vec::new(), ReplayStats::default()));
        }

        let (records, stats, valid_len) = Self::scan(&fs::read(path)?)?;

        if stats.was_truncated() {
            tracing::warn!(
                "Truncating {} bytes of torn or corrupt log tail from {}",
                stats.bytes_truncated,
                path.display()
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len)?;
            file.sync_all()?;
        }

        Ok((records, stats))
    }

    /// Verify a log file without modifying it
    pub fn verify(path: &Path) -> Result<ReplayStats> {
        let (_, stats, _) = Self::scan(&fs::read(path)?)?;
        Ok(stats)
    }

    /// Parse records, returning them with stats and the valid prefix length
    fn scan(data: &[u8]) -> Result<(Vec<LogRecord>, ReplayStats, u64)> {
        let mut records = Vec::new();
        let mut stats = ReplayStats::default();
        let mut pos = 0usize;

        while pos < data.len() {
            match LogRecord::decode(&data[pos..]) {
                Ok(Some((record, consumed))) => {
                    if record.lsn <= stats.last_lsn {
                        tracing::warn!(
                            "Log record {} does not follow {}, stopping replay",
                            record.lsn,
                            stats.last_lsn
                        );
                        break;
                    }
                    stats.last_lsn = record.lsn;
                    stats.records_applied += 1;
                    records.push(record);
                    pos += consumed;
                }
                Ok(None) => break,
                Err(BlockDirError::LogCorruption(reason)) => {
                    tracing::warn!("Stopping log replay at offset {}: {}", pos, reason);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        stats.bytes_truncated = (data.len() - pos) as u64;
        Ok((records, stats, pos as u64))
    }
}
