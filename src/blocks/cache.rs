//! Block Cache
//!
//! Bounded LRU of recently read blocks, keyed by (file name, block index).
//!
//! ## Fill Protocol
//! ```text
//! reader:  ticket = generation() ─► store.get ─► insert_if_current(ticket)
//! writer:                 store.put / delete ─► invalidate (generation += 1)
//! ```
//! A fill is dropped when any invalidation happened between taking the
//! ticket and inserting, so a block read before a write can never be cached
//! after it.

use std::num::NonZeroUsize;

use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;

/// Cache key for one block of one file
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockKey {
    pub name: String,
    pub index: u64,
}

impl BlockKey {
    pub fn new(name: &str, index: u64) -> Self {
        Self {
            name: name.to_string(),
            index,
        }
    }
}

/// Cached blocks plus the invalidation counter they are checked against
struct CacheState {
    blocks: LruCache<BlockKey, Bytes>,
    generation: u64,
}

/// Read-through block cache
///
/// Purely a latency layer: a hit always equals what the store holds.
pub struct BlockCache {
    state: Mutex<CacheState>,
}

impl BlockCache {
    /// Create a cache holding at most `capacity` blocks
    ///
    /// Returns `None` for a zero capacity (caching disabled).
    pub fn new(capacity: usize) -> Option<Self> {
        let cap = NonZeroUsize::new(capacity)?;
        Some(Self {
            state: Mutex::new(CacheState {
                blocks: LruCache::new(cap),
                generation: 0,
            }),
        })
    }

    /// Look up a block, marking it most recently used
    pub fn get(&self, name: &str, index: u64) -> Option<Bytes> {
        self.state
            .lock()
            .blocks
            .get(&BlockKey::new(name, index))
            .cloned()
    }

    /// Ticket to take before reading a block from the store
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Insert a block read under `ticket`, unless an invalidation happened since
    ///
    /// Returns whether the block was cached.
    pub fn insert_if_current(&self, name: &str, index: u64, block: Bytes, ticket: u64) -> bool {
        let mut state = self.state.lock();
        if state.generation != ticket {
            return false;
        }
        state.blocks.put(BlockKey::new(name, index), block);
        true
    }

    /// Insert a block unconditionally, evicting the least recently used one if full
    pub fn insert(&self, name: &str, index: u64, block: Bytes) {
        self.state.lock().blocks.put(BlockKey::new(name, index), block);
    }

    /// Drop one block
    pub fn invalidate(&self, name: &str, index: u64) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.blocks.pop(&BlockKey::new(name, index));
    }

    /// Drop every block of a file, returning how many were cached
    pub fn invalidate_file(&self, name: &str) -> usize {
        let mut state = self.state.lock();
        state.generation += 1;
        let keys: Vec<BlockKey> = state
            .blocks
            .iter()
            .filter(|(k, _)| k.name == name)
            .map(|(k, _)| k.clone())
            .collect();

        for key in &keys {
            state.blocks.pop(key);
        }
        keys.len()
    }

    /// Drop everything
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.blocks.clear();
    }

    /// Number of cached blocks
    pub fn len(&self) -> usize {
        self.state.lock().blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached blocks
    pub fn capacity(&self) -> usize {
        self.state.lock().blocks.cap().get()
    }
}
