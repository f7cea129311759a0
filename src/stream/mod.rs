//! Stream Module
//!
//! Per-file sequential writers and readers.
//!
//! ## Lifecycle
//! ```text
//! IndexOutput:  Open ──write*/flush*──► close() ──► Closed   (writes fail: StreamClosed)
//! IndexInput:   Open ──read*/seek*───► close() ──► Closed   (reads fail: StreamClosed)
//! ```
//!
//! Streams borrow the directory's catalog and block store; they never own
//! catalog entries. Concurrent streams on different files are independent.
//! On the same file the last flush wins, and a reader keeps the length it
//! saw when it was opened.

mod input;
mod output;

pub use input::IndexInput;
pub use output::IndexOutput;
