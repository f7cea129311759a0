//! # blockdir
//!
//! A virtual directory of named files whose content lives as fixed-size
//! blocks in a column store:
//! - Directory operations: list, create, open, delete, exists, length,
//!   modified, touch
//! - Byte-exact sequential writers and readers that cross block edges
//! - Metadata catalog kept separately from block content
//! - Optional LRU cache of recently read blocks
//! - Pluggable store: in-memory, or a local file with a mutation log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     BlockDirectory                           │
//! │      list / create_output / open_input / delete / touch      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │ IndexOutput │          │  IndexInput  │
//!   │  (writer)   │          │   (reader)   │
//!   └──────┬──────┘          └──────┬───────┘
//!          │                        │
//!          ├────────────┬───────────┘
//!          ▼            ▼
//!   ┌─────────────┐ ┌─────────────┐
//!   │   Catalog   │ │ BlockStore  │──► BlockCache (LRU)
//!   │ (metadata)  │ │  (content)  │
//!   └──────┬──────┘ └──────┬──────┘
//!          └───────┬───────┘
//!                  ▼
//!          ┌──────────────┐
//!          │ ColumnStore  │  MemoryStore | FileStore
//!          └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod store;
pub mod blocks;
pub mod catalog;
pub mod stream;
pub mod directory;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BlockDirError, Result};
pub use config::{Config, SyncStrategy};
pub use codec::{DataInput, DataOutput};
pub use directory::BlockDirectory;
pub use store::{ColumnStore, FileStore, MemoryStore};
pub use stream::{IndexInput, IndexOutput};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of blockdir
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
