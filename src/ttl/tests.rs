//! Tests for the TTL store.

use super::*;
use crate::engine::{
    CompactionFilter, CompactionStats, KeyRange, MemoryEngine, StorageEngine, WriteBatch,
};
use crate::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const T0: u64 = 1_700_000_000;

fn manual_store(ttl: u64) -> (TtlStore, MemoryEngine, ManualClock) {
    let clock = ManualClock::new(T0);
    let engine = MemoryEngine::new();
    let options = Options::default().with_clock(clock.clone());
    let store = TtlStore::with_engine(engine.clone(), Ttl::from_secs(ttl), options);
    (store, engine, clock)
}

/// Engine wrapper that counts how many times it is dropped.
struct DropCounting {
    inner: MemoryEngine,
    drops: Arc<AtomicUsize>,
}

impl Drop for DropCounting {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl StorageEngine for DropCounting {
    fn name(&self) -> &'static str {
        "drop-counting"
    }

    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> anyhow::Result<()> {
        self.inner.put(key, value)
    }

    fn delete(&self, key: &[u8]) -> anyhow::Result<bool> {
        self.inner.delete(key)
    }

    fn write_batch(&self, batch: &WriteBatch) -> anyhow::Result<()> {
        self.inner.write_batch(batch)
    }

    fn scan(&self, range: &KeyRange) -> anyhow::Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.inner.scan(range)
    }

    fn register_compaction_filter(&self, filter: Arc<dyn CompactionFilter>) {
        self.inner.register_compaction_filter(filter);
    }

    fn compact_range(&self, range: &KeyRange) -> anyhow::Result<CompactionStats> {
        self.inner.compact_range(range)
    }
}

fn counting_store() -> (TtlStore, Arc<AtomicUsize>) {
    let drops = Arc::new(AtomicUsize::new(0));
    let engine = DropCounting {
        inner: MemoryEngine::new(),
        drops: Arc::clone(&drops),
    };
    let store = TtlStore::with_engine(engine, Ttl::from_secs(60), Options::default());
    (store, drops)
}

// ==================== Read/write ====================

#[test]
fn test_put_and_get() {
    let (store, _, _) = manual_store(2);

    store.put(b"key1", b"val1").unwrap();
    assert_eq!(store.get(b"key1").unwrap(), Some(b"val1".to_vec()));
}

#[test]
fn test_get_nonexistent_key() {
    let (store, _, _) = manual_store(2);

    assert_eq!(store.get(b"missing").unwrap(), None);
    assert_eq!(store.lookup(b"missing").unwrap(), Lookup::Missing);
}

#[test]
fn test_empty_value_round_trips() {
    let (store, engine, _) = manual_store(2);

    store.put(b"empty", b"").unwrap();
    assert_eq!(store.get(b"empty").unwrap(), Some(Vec::new()));
    assert_eq!(engine.get(b"empty").unwrap().unwrap().len(), codec::TIMESTAMP_LEN);
}

#[test]
fn test_record_at_ttl_boundary_is_live() {
    let (store, _, clock) = manual_store(2);
    store.put(b"key1", b"val1").unwrap();

    clock.advance(Duration::from_secs(2));
    assert_eq!(store.get(b"key1").unwrap(), Some(b"val1".to_vec()));

    clock.advance(Duration::from_secs(1));
    assert_eq!(store.get(b"key1").unwrap(), None);
    assert_eq!(
        store.lookup(b"key1").unwrap(),
        Lookup::Expired { created_at: T0 }
    );
}

#[test]
fn test_overwrite_restarts_ttl() {
    let (store, _, clock) = manual_store(2);
    store.put(b"key1", b"old").unwrap();

    clock.advance(Duration::from_secs(2));
    store.put(b"key1", b"new").unwrap();

    clock.advance(Duration::from_secs(2));
    assert_eq!(store.get(b"key1").unwrap(), Some(b"new".to_vec()));
}

#[test]
fn test_disabled_ttl_never_expires() {
    let (store, _, clock) = manual_store(0);
    store.put(b"key1", b"val1").unwrap();

    clock.advance(Duration::from_secs(365 * 24 * 3600));
    assert_eq!(store.get(b"key1").unwrap(), Some(b"val1".to_vec()));

    let stats = store.compact(&KeyRange::all()).unwrap();
    assert_eq!(stats.dropped, 0);
    assert_eq!(store.get(b"key1").unwrap(), Some(b"val1".to_vec()));
}

#[test]
fn test_clock_going_backwards_does_not_expire_early() {
    let (store, _, clock) = manual_store(2);
    store.put(b"key1", b"val1").unwrap();

    // Writes made while the clock is behind are stamped with the open time
    clock.set(T0 - 100);
    store.put(b"key2", b"val2").unwrap();
    assert_eq!(store.lookup(b"key2").unwrap().created_at(), Some(T0));

    clock.set(T0 + 2);
    assert!(store.lookup(b"key1").unwrap().is_live());
    assert!(store.lookup(b"key2").unwrap().is_live());
}

#[test]
fn test_delete() {
    let (store, _, clock) = manual_store(2);
    store.put(b"key1", b"val1").unwrap();
    store.put(b"key2", b"val2").unwrap();

    assert!(store.delete(b"key1").unwrap());
    assert!(!store.delete(b"key1").unwrap());
    assert_eq!(store.get(b"key1").unwrap(), None);

    // Expired but not yet compacted records can still be deleted
    clock.advance(Duration::from_secs(10));
    assert!(store.delete(b"key2").unwrap());
}

#[test]
fn test_batch_write_stamps_every_put() {
    let (store, _, clock) = manual_store(2);
    store.put(b"gone", b"x").unwrap();
    clock.advance(Duration::from_secs(1));

    let mut batch = WriteBatch::new();
    batch.put("a", "1").put("b", "2").delete("gone");
    store.write(batch).unwrap();

    assert_eq!(store.lookup(b"a").unwrap().created_at(), Some(T0 + 1));
    assert_eq!(store.lookup(b"b").unwrap().created_at(), Some(T0 + 1));
    assert_eq!(store.lookup(b"gone").unwrap(), Lookup::Missing);
}

#[test]
fn test_scan_skips_expired_records() {
    let (store, _, clock) = manual_store(2);
    store.put(b"user:1", b"old").unwrap();
    clock.advance(Duration::from_secs(2));
    store.put(b"user:2", b"new").unwrap();
    store.put(b"other", b"x").unwrap();
    clock.advance(Duration::from_secs(1));

    let live = store.scan(&KeyRange::prefix(b"user:")).unwrap();
    assert_eq!(live, vec![(b"user:2".to_vec(), b"new".to_vec())]);

    let all = store.scan(&KeyRange::all()).unwrap();
    assert_eq!(all.len(), 2);
}

// ==================== Corruption ====================

#[test]
fn test_short_record_is_read_error() {
    let (store, engine, _) = manual_store(2);
    engine.put(b"bad", b"abc").unwrap();

    let err = store.get(b"bad").unwrap_err();
    assert!(err.is_read_error());
    assert!(err.is_corrupt());
}

#[test]
fn test_short_record_is_read_error_with_ttl_disabled() {
    let (store, engine, _) = manual_store(0);
    engine.put(b"bad", b"").unwrap();

    assert!(store.get(b"bad").unwrap_err().is_corrupt());
}

#[test]
fn test_scan_reports_corrupt_record() {
    let (store, engine, _) = manual_store(2);
    store.put(b"a", b"ok").unwrap();
    engine.put(b"b", b"short").unwrap();

    assert!(store.scan(&KeyRange::all()).unwrap_err().is_corrupt());
}

#[test]
fn test_compaction_keeps_corrupt_record() {
    let (store, engine, clock) = manual_store(2);
    engine.put(b"bad", b"abc").unwrap();
    clock.advance(Duration::from_secs(10));

    store.compact(&KeyRange::all()).unwrap();
    assert_eq!(engine.get(b"bad").unwrap(), Some(b"abc".to_vec()));
}

// ==================== Compaction ====================

#[test]
fn test_compaction_drops_expired_records() {
    let (store, engine, clock) = manual_store(2);
    store.put(b"key1", b"val1").unwrap();

    clock.advance(Duration::from_secs(3));
    assert!(matches!(
        store.lookup(b"key1").unwrap(),
        Lookup::Expired { .. }
    ));

    let stats = store.compact(&KeyRange::all()).unwrap();
    assert_eq!(stats.examined, 1);
    assert_eq!(stats.dropped, 1);
    assert_eq!(store.lookup(b"key1").unwrap(), Lookup::Missing);
    assert!(engine.is_empty());
}

#[test]
fn test_compaction_preserves_live_records_bit_for_bit() {
    let (store, engine, clock) = manual_store(2);
    store.put(b"old", b"v1").unwrap();
    clock.advance(Duration::from_secs(2));
    store.put(b"young", b"v2").unwrap();
    clock.advance(Duration::from_secs(1));

    let before = engine.get(b"young").unwrap();
    let stats = store.compact(&KeyRange::all()).unwrap();

    assert_eq!(stats.dropped, 1);
    assert_eq!(engine.get(b"young").unwrap(), before);
    assert_eq!(
        store.lookup(b"young").unwrap(),
        Lookup::Live {
            value: b"v2".to_vec(),
            created_at: T0 + 2,
        }
    );
}

#[test]
fn test_compaction_respects_range() {
    let (store, engine, clock) = manual_store(1);
    store.put(b"a", b"1").unwrap();
    store.put(b"m", b"2").unwrap();
    store.put(b"z", b"3").unwrap();
    clock.advance(Duration::from_secs(5));

    let range = KeyRange::new(Some(b"a".as_slice()), Some(b"m".as_slice()));
    let stats = store.compact(&range).unwrap();

    assert_eq!(stats.dropped, 2);
    assert_eq!(engine.len(), 1);
    assert!(engine.get(b"z").unwrap().is_some());
}

#[test]
fn test_compaction_of_empty_store() {
    let (store, _, _) = manual_store(2);

    let stats = store.compact(&KeyRange::all()).unwrap();
    assert_eq!(stats.examined, 0);
    assert_eq!(stats.dropped, 0);
}

// ==================== Lifecycle ====================

#[test]
fn test_close_is_idempotent() {
    let (store, drops) = counting_store();

    store.close();
    store.close();
    assert!(store.is_closed());
    assert_eq!(drops.load(Ordering::SeqCst), 1);

    drop(store);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drop_releases_engine() {
    let (store, drops) = counting_store();
    store.put(b"k", b"v").unwrap();

    drop(store);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_operations_after_close_fail() {
    let (store, _, _) = manual_store(2);
    store.put(b"key1", b"val1").unwrap();
    store.close();

    assert!(store.put(b"k", b"v").unwrap_err().is_closed_handle());
    assert!(store.get(b"key1").unwrap_err().is_closed_handle());
    assert!(store.lookup(b"key1").unwrap_err().is_closed_handle());
    assert!(store.delete(b"key1").unwrap_err().is_closed_handle());
    assert!(store.scan(&KeyRange::all()).unwrap_err().is_closed_handle());
    assert!(
        store
            .compact(&KeyRange::all())
            .unwrap_err()
            .is_closed_handle()
    );

    let mut batch = WriteBatch::new();
    batch.put("a", "1");
    assert!(store.write(batch).unwrap_err().is_closed_handle());
    assert!(store.write(WriteBatch::new()).unwrap_err().is_closed_handle());
}

// ==================== Concurrency ====================

#[test]
fn test_concurrent_put_and_get() {
    let store = Arc::new(TtlStore::memory(Ttl::from_secs(60)));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100 {
                    let key = format!("t{t}:k{i}");
                    let value = format!("v{i}");
                    store.put(key.as_bytes(), value.as_bytes()).unwrap();
                    assert_eq!(store.get(key.as_bytes()).unwrap(), Some(value.into_bytes()));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.scan(&KeyRange::all()).unwrap().len(), 800);
}

#[test]
fn test_operations_racing_close() {
    let store = Arc::new(TtlStore::memory(Ttl::from_secs(60)));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..500 {
                    let key = format!("t{t}:k{i}");
                    match store.put(key.as_bytes(), b"v") {
                        Ok(()) => {},
                        Err(err) => assert!(err.is_closed_handle()),
                    }
                    match store.get(key.as_bytes()) {
                        Ok(_) => {},
                        Err(err) => assert!(err.is_closed_handle()),
                    }
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(5));
    store.close();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(store.is_closed());
}

// ==================== Redb-backed ====================

#[test]
fn test_open_put_get_on_disk() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ttl.redb");
    let store = TtlStore::open(Options::default(), Ttl::from_secs(60), &path).unwrap();

    store.put(b"key1", b"val1").unwrap();
    assert_eq!(store.get(b"key1").unwrap(), Some(b"val1".to_vec()));
    assert_eq!(store.path(), Some(path.as_path()));
}

#[test]
fn test_reopen_keeps_data_and_timestamps() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ttl.redb");
    let clock = ManualClock::new(T0);
    let options = Options::default().with_clock(clock.clone());

    let store = TtlStore::open(options.clone(), Ttl::from_secs(2), &path).unwrap();
    store.put(b"key1", b"val1").unwrap();
    store.close();

    clock.advance(Duration::from_secs(3));
    let store = TtlStore::open(options, Ttl::from_secs(2), &path).unwrap();
    assert_eq!(
        store.lookup(b"key1").unwrap(),
        Lookup::Expired { created_at: T0 }
    );

    store.compact(&KeyRange::all()).unwrap();
    assert_eq!(store.lookup(b"key1").unwrap(), Lookup::Missing);
}

#[test]
fn test_open_missing_without_create_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("missing.redb");
    let options = Options::default().create_if_missing(false);

    let err = TtlStore::open(options, Ttl::from_secs(2), &path).unwrap_err();
    assert!(matches!(err, Error::Open { .. }));
    assert!(!path.exists());
}

#[test]
fn test_open_same_path_twice_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ttl.redb");
    let _store = TtlStore::open(Options::default(), Ttl::from_secs(2), &path).unwrap();

    let err = TtlStore::open(Options::default(), Ttl::from_secs(2), &path).unwrap_err();
    assert!(matches!(err, Error::Open { .. }));
}

#[test]
fn test_reopen_after_close_succeeds() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ttl.redb");

    let store = TtlStore::open(Options::default(), Ttl::from_secs(60), &path).unwrap();
    store.close();
    let store = TtlStore::open(Options::default(), Ttl::from_secs(60), &path).unwrap();
    assert!(!store.is_closed());
}

// ==================== Async ====================

#[tokio::test]
async fn test_async_operations() {
    let store = Arc::new(TtlStore::memory(Ttl::from_secs(60)));

    store
        .put_async(b"key1".to_vec(), b"val1".to_vec())
        .await
        .unwrap();
    assert_eq!(
        store.get_async(b"key1".to_vec()).await.unwrap(),
        Some(b"val1".to_vec())
    );
    assert!(store.lookup_async(b"key1".to_vec()).await.unwrap().is_live());

    let stats = store.compact_async(KeyRange::all()).await.unwrap();
    assert_eq!(stats.dropped, 0);

    assert!(store.delete_async(b"key1".to_vec()).await.unwrap());
    assert_eq!(store.get_async(b"key1".to_vec()).await.unwrap(), None);
}

#[tokio::test]
async fn test_async_after_close_is_closed_handle() {
    let store = Arc::new(TtlStore::memory(Ttl::from_secs(60)));
    store.close();

    let err = store.get_async(b"k".to_vec()).await.unwrap_err();
    assert!(err.is_closed_handle());
}
