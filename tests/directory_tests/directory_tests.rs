//! Tests for BlockDirectory
//!
//! These tests verify:
//! - Listing, existence, length and modification time of files
//! - Touch and delete semantics, FileNotFound on absent names
//! - String round trips for every subset and ordering of sample strings
//! - Create truncates existing content
//! - Store failures surface as errors, never as "not found"
//! - Directory close and independent directories on one store
//! - Config validation, including table-name safe identifiers

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use blockdir::catalog::TimeSource;
use blockdir::config::MAX_BLOCK_SIZE;
use blockdir::{
    BlockDirError, BlockDirectory, ColumnStore, Config, DataInput, DataOutput, MemoryStore,
    Result, SyncStrategy,
};
use bytes::Bytes;

// =============================================================================
// Helper Functions
// =============================================================================

const SAMPLE_FILE: &str = "sampleFile";
const SAMPLE_STRINGS: [&str; 3] = ["0123", "0123456789", "0123456789A"];

fn config(block_size: u32, cache_size: usize) -> Config {
    Config::builder()
        .keyspace("lucene1")
        .column_family("index")
        .block_size(block_size)
        .cache_size(cache_size)
        .build()
}

/// Directory with an empty sample file, block size 10
fn setup() -> BlockDirectory {
    let dir = BlockDirectory::in_memory(config(10, 10)).unwrap();
    dir.create_output(SAMPLE_FILE).unwrap().close().unwrap();
    dir
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

fn encoded_len(strings: &[&str]) -> u64 {
    strings.iter().map(|s| s.len() as u64 + 1).sum()
}

/// Recreate the sample file holding `strings`, checking the lengths it reports
fn write_strings(dir: &BlockDirectory, strings: &[&str]) {
    if dir.file_exists(SAMPLE_FILE).unwrap() {
        dir.delete_file(SAMPLE_FILE).unwrap();
    }

    let mut out = dir.create_output(SAMPLE_FILE).unwrap();
    for s in strings {
        out.write_string(s).unwrap();
    }
    out.flush().unwrap();

    let expected = encoded_len(strings);
    assert_eq!(out.length(), expected);
    assert_eq!(dir.file_length(SAMPLE_FILE).unwrap(), expected);
}

fn read_strings(dir: &BlockDirectory, strings: &[&str]) {
    let mut input = dir.open_input(SAMPLE_FILE).unwrap();
    for s in strings {
        assert_eq!(input.read_string().unwrap(), *s);
    }
    assert_eq!(input.length(), encoded_len(strings));
    assert_eq!(input.remaining(), 0);
}

fn permutations<'a>(items: &[&'a str]) -> Vec<Vec<&'a str>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

struct ManualClock(AtomicU64);

impl TimeSource for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Store whose reads always fail
struct UnreachableStore;

impl ColumnStore for UnreachableStore {
    fn get(&self, _: &str, _: &[u8], _: &[u8]) -> Result<Option<Bytes>> {
        Err(BlockDirError::Store("connection refused".to_string()))
    }

    fn put(&self, _: &str, _: &[u8], _: &[u8], _: Bytes) -> Result<()> {
        Err(BlockDirError::Store("connection refused".to_string()))
    }

    fn delete(&self, _: &str, _: &[u8], _: &[u8]) -> Result<()> {
        Err(BlockDirError::Store("connection refused".to_string()))
    }

    fn delete_row(&self, _: &str, _: &[u8]) -> Result<()> {
        Err(BlockDirError::Store("connection refused".to_string()))
    }

    fn rows(&self, _: &str) -> Result<Vec<Vec<u8>>> {
        Err(BlockDirError::Store("connection refused".to_string()))
    }

    fn columns(&self, _: &str, _: &[u8]) -> Result<Vec<(Vec<u8>, Bytes)>> {
        Err(BlockDirError::Store("connection refused".to_string()))
    }
}

// =============================================================================
// Metadata Tests
// =============================================================================

#[test]
fn test_list_all() {
    let dir = setup();

    assert_eq!(dir.list_all().unwrap(), vec![SAMPLE_FILE]);
}

#[test]
fn test_file_exists() {
    let dir = setup();

    assert!(dir.file_exists(SAMPLE_FILE).unwrap());
    assert!(!dir.file_exists("dummyFile").unwrap());
}

#[test]
fn test_file_modified() {
    let dir = setup();

    let modified = dir.file_modified(SAMPLE_FILE).unwrap();

    assert!(now_millis().abs_diff(modified) < 10_000);
}

#[test]
fn test_file_length() {
    let dir = setup();

    assert_eq!(dir.file_length(SAMPLE_FILE).unwrap(), 0);
}

#[test]
fn test_touch_file() {
    let dir = setup();
    let before = dir.file_modified(SAMPLE_FILE).unwrap();

    thread::sleep(Duration::from_millis(20));
    dir.touch_file(SAMPLE_FILE).unwrap();

    assert!(dir.file_modified(SAMPLE_FILE).unwrap() > before);
}

#[test]
fn test_touch_file_with_clock() {
    let clock = Arc::new(ManualClock(AtomicU64::new(10_000)));
    let dir =
        BlockDirectory::open_with_clock(config(10, 0), Arc::new(MemoryStore::new()), clock.clone())
            .unwrap();
    let mut out = dir.create_output("f").unwrap();
    out.write_bytes(b"content").unwrap();
    out.close().unwrap();

    clock.0.fetch_add(3_000, Ordering::SeqCst);
    dir.touch_file("f").unwrap();

    assert_eq!(dir.file_modified("f").unwrap(), 13_000);
    assert_eq!(dir.file_length("f").unwrap(), 7);
    assert_eq!(dir.open_input("f").unwrap().read_bytes(7).unwrap(), b"content");
}

#[test]
fn test_create_many_files() {
    let dir = setup();

    for i in 0..10 {
        let name = format!("{}_{}", SAMPLE_FILE, i);
        dir.create_output(&name).unwrap().close().unwrap();
        assert_eq!(dir.file_length(&name).unwrap(), 0);
    }

    assert_eq!(dir.list_all().unwrap().len(), 11);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_file() {
    let dir = setup();

    dir.delete_file(SAMPLE_FILE).unwrap();

    assert!(!dir.file_exists(SAMPLE_FILE).unwrap());
    assert!(dir.list_all().unwrap().is_empty());
}

#[test]
fn test_deleted_file_is_not_found_everywhere() {
    let dir = setup();
    dir.delete_file(SAMPLE_FILE).unwrap();

    assert!(matches!(
        dir.file_length(SAMPLE_FILE),
        Err(BlockDirError::FileNotFound(_))
    ));
    assert!(matches!(
        dir.file_modified(SAMPLE_FILE),
        Err(BlockDirError::FileNotFound(_))
    ));
    assert!(matches!(
        dir.touch_file(SAMPLE_FILE),
        Err(BlockDirError::FileNotFound(_))
    ));
    assert!(matches!(
        dir.open_input(SAMPLE_FILE),
        Err(BlockDirError::FileNotFound(_))
    ));
    assert!(matches!(
        dir.delete_file(SAMPLE_FILE),
        Err(BlockDirError::FileNotFound(_))
    ));
}

#[test]
fn test_delete_removes_blocks() {
    let dir = setup();
    write_strings(&dir, &SAMPLE_STRINGS);
    assert!(dir.block_store().block_count(SAMPLE_FILE).unwrap() > 0);

    dir.delete_file(SAMPLE_FILE).unwrap();

    assert_eq!(dir.block_store().block_count(SAMPLE_FILE).unwrap(), 0);
}

#[test]
fn test_listing_after_mixed_create_and_delete() {
    let dir = BlockDirectory::in_memory(config(10, 4)).unwrap();
    for name in ["a", "b", "c", "b"] {
        dir.create_output(name).unwrap().close().unwrap();
    }
    dir.delete_file("b").unwrap();

    let names = dir.list_all().unwrap();

    assert_eq!(names, vec!["a", "c"]);
    for name in &names {
        assert!(dir.file_exists(name).unwrap());
    }
}

// =============================================================================
// Read / Write Tests
// =============================================================================

#[test]
fn test_write_read_single_strings() {
    let dir = setup();

    for s in SAMPLE_STRINGS {
        write_strings(&dir, &[s]);
        read_strings(&dir, &[s]);
    }
}

#[test]
fn test_write_read_pairs() {
    let dir = setup();

    for i in 0..SAMPLE_STRINGS.len() {
        for j in 0..SAMPLE_STRINGS.len() {
            if i == j {
                continue;
            }
            let pair = [SAMPLE_STRINGS[i], SAMPLE_STRINGS[j]];
            write_strings(&dir, &pair);
            read_strings(&dir, &pair);
        }
    }
}

#[test]
fn test_write_read_permutations() {
    let dir = setup();

    let orderings = permutations(&SAMPLE_STRINGS);
    assert_eq!(orderings.len(), 6);

    for ordering in orderings {
        write_strings(&dir, &ordering);
        read_strings(&dir, &ordering);
    }
}

#[test]
fn test_write_read_without_cache() {
    let dir = BlockDirectory::in_memory(config(10, 0)).unwrap();

    for ordering in permutations(&SAMPLE_STRINGS) {
        write_strings(&dir, &ordering);
        read_strings(&dir, &ordering);
    }
    assert_eq!(dir.block_store().cached_blocks(), 0);
}

#[test]
fn test_sample_file_block_layout() {
    let dir = setup();

    let mut out = dir.create_output(SAMPLE_FILE).unwrap();
    out.write_string("0123456789A").unwrap();
    out.close().unwrap();

    let blocks = dir.block_store();
    assert_eq!(dir.file_length(SAMPLE_FILE).unwrap(), 12);
    assert_eq!(blocks.block_count(SAMPLE_FILE).unwrap(), 2);
    assert_eq!(blocks.get_block(SAMPLE_FILE, 0).unwrap().len(), 10);
    assert_eq!(blocks.get_block(SAMPLE_FILE, 1).unwrap().len(), 2);
    assert_eq!(
        blocks.get_block(SAMPLE_FILE, 0).unwrap(),
        &b"\x0b012345678"[..]
    );

    let mut input = dir.open_input(SAMPLE_FILE).unwrap();
    assert_eq!(input.read_string().unwrap(), "0123456789A");
}

#[test]
fn test_create_truncates_existing_file() {
    let dir = setup();
    write_strings(&dir, &SAMPLE_STRINGS);

    let mut out = dir.create_output(SAMPLE_FILE).unwrap();

    assert_eq!(dir.file_length(SAMPLE_FILE).unwrap(), 0);
    assert_eq!(dir.block_store().block_count(SAMPLE_FILE).unwrap(), 0);
    assert!(matches!(
        dir.open_input(SAMPLE_FILE).unwrap().read_byte(),
        Err(BlockDirError::EndOfFile { .. })
    ));

    out.write_string("x").unwrap();
    out.close().unwrap();
    read_strings(&dir, &["x"]);
}

#[test]
fn test_concurrent_writers_on_distinct_files() {
    let dir = BlockDirectory::in_memory(config(16, 32)).unwrap();

    thread::scope(|s| {
        for t in 0..4u8 {
            let dir = &dir;
            s.spawn(move || {
                let name = format!("file_{}", t);
                let mut out = dir.create_output(&name).unwrap();
                out.write_bytes(&vec![t; 1_000]).unwrap();
                out.close().unwrap();
            });
        }
    });

    for t in 0..4u8 {
        let name = format!("file_{}", t);
        let mut input = dir.open_input(&name).unwrap();
        assert_eq!(input.read_bytes(1_000).unwrap(), vec![t; 1_000]);
    }
}

// =============================================================================
// Error Propagation Tests
// =============================================================================

#[test]
fn test_file_exists_propagates_store_failure() {
    let dir = BlockDirectory::open(config(10, 0), Arc::new(UnreachableStore)).unwrap();

    assert!(matches!(
        dir.file_exists(SAMPLE_FILE),
        Err(BlockDirError::Store(_))
    ));
    assert!(matches!(dir.list_all(), Err(BlockDirError::Store(_))));
}

#[test]
fn test_invalid_config_rejected() {
    let result = BlockDirectory::in_memory(config(0, 0));

    assert!(matches!(result, Err(BlockDirError::Config(_))));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let dir = setup();

    dir.close().unwrap();
    dir.close().unwrap();

    assert!(dir.is_closed());
    assert!(matches!(
        dir.list_all(),
        Err(BlockDirError::DirectoryClosed)
    ));
    assert!(matches!(
        dir.create_output("f"),
        Err(BlockDirError::DirectoryClosed)
    ));
    assert!(matches!(
        dir.open_input(SAMPLE_FILE),
        Err(BlockDirError::DirectoryClosed)
    ));
}

#[test]
fn test_directories_on_one_store_are_isolated() {
    let store = Arc::new(MemoryStore::new());
    let first = BlockDirectory::open(config(10, 4), store.clone()).unwrap();
    let second_config = Config::builder()
        .keyspace("lucene1")
        .column_family("other")
        .block_size(10)
        .build();
    let second = BlockDirectory::open(second_config, store.clone()).unwrap();

    let mut out = first.create_output(SAMPLE_FILE).unwrap();
    out.write_string("first").unwrap();
    out.close().unwrap();

    assert!(!second.file_exists(SAMPLE_FILE).unwrap());
    assert!(second.list_all().unwrap().is_empty());

    // A second handle over the same tables sees the same files
    let again = BlockDirectory::open(config(10, 4), store).unwrap();
    assert_eq!(again.file_length(SAMPLE_FILE).unwrap(), 6);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_config_defaults_validate() {
    let config = Config::default();

    config.validate().unwrap();
    assert_eq!(config.block_size, 16 * 1024);
    assert_eq!(config.catalog_table(), "blockdir.index.catalog");
    assert_eq!(config.blocks_table(), "blockdir.index.blocks");
}

#[test]
fn test_config_rejects_unusable_settings() {
    let too_large = Config::builder().block_size(MAX_BLOCK_SIZE + 1).build();
    let no_keyspace = Config::builder().keyspace("").build();
    let no_column_family = Config::builder().column_family("").build();
    let never_sync = Config::builder()
        .sync_strategy(SyncStrategy::EveryNEntries { count: 0 })
        .build();

    for config in [too_large, no_keyspace, no_column_family, never_sync] {
        assert!(matches!(config.validate(), Err(BlockDirError::Config(_))));
    }
    Config::builder()
        .block_size(MAX_BLOCK_SIZE)
        .build()
        .validate()
        .unwrap();
}

#[test]
fn test_config_rejects_names_that_would_share_tables() {
    // "a.b" + "c" and "a" + "b.c" would both map to "a.b.c.blocks"
    let dotted_keyspace = Config::builder().keyspace("a.b").column_family("c").build();
    let dotted_family = Config::builder().keyspace("a").column_family("b.c").build();
    let spaced = Config::builder().keyspace("my index").build();

    for config in [dotted_keyspace, dotted_family, spaced] {
        assert!(matches!(config.validate(), Err(BlockDirError::Config(_))));
    }
    Config::builder()
        .keyspace("Lucene_9")
        .column_family("seg_00")
        .build()
        .validate()
        .unwrap();
}

#[test]
fn test_open_rejects_dotted_keyspace() {
    let config = Config::builder().keyspace("a.b").column_family("c").build();

    let result = BlockDirectory::in_memory(config);

    assert!(matches!(result, Err(BlockDirError::Config(_))));
}
