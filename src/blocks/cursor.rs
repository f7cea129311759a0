//! Block cursor
//!
//! Pure arithmetic for mapping file offsets onto fixed-size blocks.

/// Number of blocks needed to hold `length` bytes
#[inline]
pub fn block_count(length: u64, block_size: u32) -> u64 {
    length.div_ceil(u64::from(block_size))
}

/// Number of bytes block `index` holds in a file of `length` bytes
///
/// Every block is full except possibly the last; blocks past the end hold 0.
#[inline]
pub fn block_len(length: u64, block_size: u32, index: u64) -> usize {
    let block_size = u64::from(block_size);
    let start = index.saturating_mul(block_size);
    length.saturating_sub(start).min(block_size) as usize
}

/// A byte position within a file split into `block_size` blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCursor {
    block_size: u64,
    position: u64,
}

impl BlockCursor {
    /// Cursor at the start of a file
    pub fn new(block_size: u32) -> Self {
        Self::at(block_size, 0)
    }

    /// Cursor at an arbitrary byte position
    pub fn at(block_size: u32, position: u64) -> Self {
        debug_assert!(block_size > 0, "block size must be positive");
        Self {
            block_size: u64::from(block_size),
            position,
        }
    }

    /// Absolute byte position
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Block size this cursor was built with
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size as usize
    }

    /// Index of the block the next byte belongs to
    #[inline]
    pub fn block_index(&self) -> u64 {
        self.position / self.block_size
    }

    /// Offset of the next byte within its block
    #[inline]
    pub fn block_offset(&self) -> usize {
        (self.position % self.block_size) as usize
    }

    /// Bytes left in the current block, always at least 1
    #[inline]
    pub fn block_remaining(&self) -> usize {
        self.block_size() - self.block_offset()
    }

    /// Byte position where block `index` starts
    #[inline]
    pub fn block_start(&self, index: u64) -> u64 {
        index * self.block_size
    }

    /// Move forward by `n` bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.position += n as u64;
    }

    /// Jump to an absolute position
    #[inline]
    pub fn seek(&mut self, position: u64) {
        self.position = position;
    }
}
