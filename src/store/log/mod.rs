//! Mutation Log Module
//!
//! Durability for the file-backed store through append-only logging.
//!
//! ## Responsibilities
//! - Append every store mutation before it is applied in memory
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Replay on open, cutting off a torn or corrupt tail
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! All header fields are little-endian; the CRC covers `Data`, which is the
//! bincode encoding of a `Mutation`.

mod record;
mod writer;
mod recovery;

pub use record::{LogRecord, Mutation, HEADER_SIZE};
pub use writer::LogWriter;
pub use recovery::{LogReplay, ReplayStats};
