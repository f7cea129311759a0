//! Log Writer
//!
//! Handles appending records to the log file.
//!
//! A failed append is cut back off the file, so the log never holds a
//! record the caller was told did not happen. If that cleanup fails too the
//! writer refuses further appends.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{BlockDirError, Result};

use super::{LogRecord, Mutation};

/// Appends records to the log file
pub struct LogWriter {
    /// Log file path
    path: PathBuf,
    /// Buffered writer, flushed to the OS after every append
    writer: BufWriter<File>,
    /// File length after the last complete record
    offset: u64,
    /// LSN the next appended record receives
    next_lsn: u64,
    /// When to fsync
    sync_strategy: SyncStrategy,
    /// Records appended since the last fsync
    unsynced: usize,
    /// Set when a failed append could not be rolled back
    poisoned: bool,
}

impl LogWriter {
    /// Open or create a log file for appending
    ///
    /// `next_lsn` continues the sequence found by replay (1 for a new log).
    pub fn open(path: &Path, sync_strategy: SyncStrategy, next_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let offset = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            offset,
            next_lsn: next_lsn.max(1),
            sync_strategy,
            unsynced: 0,
            poisoned: false,
        })
    }

    /// Append a mutation, returning the LSN it was logged under
    ///
    /// On error nothing of the record is left in the file.
    pub fn append(&mut self, mutation: &Mutation) -> Result<u64> {
        self.ensure_usable()?;

        let lsn = self.next_lsn;
        let bytes = LogRecord::frame(lsn, mutation)?;

        if let Err(e) = self.write_record(&bytes) {
            self.roll_back();
            return Err(e);
        }
        self.offset += bytes.len() as u64;
        self.next_lsn += 1;
        Ok(lsn)
    }

    fn write_record(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;

        let unsynced = self.unsynced + 1;
        let due = match self.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => unsynced >= count,
        };
        if due {
            self.sync()?;
        } else {
            self.unsynced = unsynced;
        }
        Ok(())
    }

    /// Drop buffered bytes of a failed record and truncate to the last good one
    fn roll_back(&mut self) {
        let reopened = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .and_then(|file| file.set_len(self.offset).map(|()| file));

        match reopened {
            Ok(file) => {
                let failed = std::mem::replace(&mut self.writer, BufWriter::new(file));
                // into_parts hands back the buffer instead of flushing it on drop
                let (_, _unwritten) = failed.into_parts();
                tracing::warn!(
                    "Rolled back failed log append at offset {} in {:?}",
                    self.offset,
                    self.path
                );
            }
            Err(e) => {
                self.poisoned = true;
                tracing::error!(
                    "Could not roll back failed log append in {:?}: {}",
                    self.path,
                    e
                );
            }
        }
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.poisoned {
            return Err(BlockDirError::Store(format!(
                "log writer for {:?} failed and could not recover",
                self.path
            )));
        }
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.ensure_usable()?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Get the LSN the next record receives
    pub fn next_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
