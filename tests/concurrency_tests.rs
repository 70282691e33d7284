use rand::RngCore;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

use tallymap::counter_engine::{CounterStore, FieldSchema, Geometry};

const KEY_LENGTH: usize = 12;

fn open_store(dir: &tempfile::TempDir) -> CounterStore {
    let geometry = Geometry {
        key_length: KEY_LENGTH,
        max_value_length: 16,
        item_max_count: 1024,
        max_search_depth: 8,
    };
    let schema = FieldSchema::new(
        &["clicks".to_string(), "views".to_string()],
        &["c".to_string(), "v".to_string()],
    )
    .unwrap();
    CounterStore::open(&dir.path().join("counters.tbl"), geometry, schema)
        .expect("Failed to open counter store")
}

fn random_key() -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    rand::rng().fill_bytes(&mut key);
    key
}

#[test]
fn parallel_increments_are_not_lost() {
    let dir = tempdir().unwrap();
    let store = Arc::new(open_store(&dir));
    let key = random_key();
    store.put(&key, &[0, 0]).unwrap();

    const THREADS: usize = 8;
    const PER_THREAD: usize = 200;

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    store.increment(&key, 0, 1).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let totals = store.snapshot(&key, false).unwrap();
    assert_eq!(totals["clicks"], (THREADS * PER_THREAD) as i64);
}

#[test]
fn readers_always_observe_a_consistent_slot() {
    let dir = tempdir().unwrap();
    let store = Arc::new(open_store(&dir));
    let key = random_key();
    store.put(&key, &[0, 0]).unwrap();

    const PER_WRITER: usize = 300;

    // every writer bumps clicks before views, so clicks >= views holds at
    // every consistent point in time
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..PER_WRITER {
                    store.increment(&key, 0, 1).unwrap();
                    store.increment(&key, 1, 1).unwrap();
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..PER_WRITER {
                    let totals = store.snapshot(&key, false).unwrap();
                    assert!(totals["clicks"] >= totals["views"]);
                    assert_eq!(totals["Total"], totals["clicks"] + totals["views"]);
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    let totals = store.snapshot(&key, false).unwrap();
    assert_eq!(totals["clicks"], 4 * PER_WRITER as i64);
    assert_eq!(totals["views"], 4 * PER_WRITER as i64);
}

#[test]
fn parallel_writers_on_distinct_keys_do_not_interfere() {
    let dir = tempdir().unwrap();
    let store = Arc::new(open_store(&dir));

    let keys: Vec<[u8; KEY_LENGTH]> = (0..8).map(|_| random_key()).collect();
    for key in &keys {
        store.put(key, &[0, 0]).unwrap();
    }

    let handles: Vec<_> = keys
        .iter()
        .map(|&key| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..100 {
                    store.increment(&key, 1, 2).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for key in &keys {
        let totals = store.snapshot(key, false).unwrap();
        assert_eq!(totals["views"], 200);
    }
}
