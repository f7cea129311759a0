//! Error types for blockdir
//!
//! Provides a unified error type for all operations.

use std::io;

use thiserror::Error;

/// Result type alias using BlockDirError
pub type Result<T> = std::result::Result<T, BlockDirError>;

/// Unified error type for blockdir operations
#[derive(Debug, Error)]
pub enum BlockDirError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Catalog Errors
    // -------------------------------------------------------------------------
    #[error("File not found: {0}")]
    FileNotFound(String),

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Block Errors
    // -------------------------------------------------------------------------
    #[error("Invalid block size: {size} bytes exceeds the {max} byte limit")]
    InvalidBlockSize { size: usize, max: usize },

    #[error("Block {index} of {name} holds {actual} bytes, expected {expected}")]
    TruncatedBlock {
        name: String,
        index: u64,
        expected: usize,
        actual: usize,
    },

    // -------------------------------------------------------------------------
    // Stream Errors
    // -------------------------------------------------------------------------
    #[error("Stream is closed")]
    StreamClosed,

    #[error("End of file: requested {requested} bytes, {remaining} remaining")]
    EndOfFile { requested: u64, remaining: u64 },

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(String),

    #[error("Log corruption detected: {0}")]
    LogCorruption(String),

    #[error("Directory is closed")]
    DirectoryClosed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for BlockDirError {
    fn from(e: bincode::Error) -> Self {
        BlockDirError::Serialization(e.to_string())
    }
}

/// Lets the streams speak `std::io::{Read, Write, Seek}`.
impl From<BlockDirError> for io::Error {
    fn from(e: BlockDirError) -> Self {
        let kind = match &e {
            BlockDirError::FileNotFound(_) => io::ErrorKind::NotFound,
            BlockDirError::EndOfFile { .. } => io::ErrorKind::UnexpectedEof,
            BlockDirError::MalformedEncoding(_)
            | BlockDirError::TruncatedBlock { .. }
            | BlockDirError::LogCorruption(_) => io::ErrorKind::InvalidData,
            BlockDirError::InvalidBlockSize { .. } | BlockDirError::Config(_) => {
                io::ErrorKind::InvalidInput
            }
            _ => io::ErrorKind::Other,
        };
        match e {
            BlockDirError::Io(inner) => inner,
            other => io::Error::new(kind, other),
        }
    }
}
