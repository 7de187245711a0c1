//! Fuzz target for store operation sequences.
//!
//! Drives an in-memory store with a manual clock and checks every read
//! against a simple model: a value is visible iff it was written no more
//! than `ttl` seconds ago and not deleted or compacted away since.
//!
//! Run with: `cargo +nightly fuzz run fuzz_store_ops`

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;
use std::time::Duration;
use ttlkv::engine::MemoryEngine;
use ttlkv::{KeyRange, ManualClock, Options, Ttl, TtlStore};

#[derive(Arbitrary, Debug)]
enum Op {
    Put { key: u8, value: Vec<u8> },
    Get { key: u8 },
    Delete { key: u8 },
    Advance { secs: u8 },
    Compact,
}

#[derive(Arbitrary, Debug)]
struct Input {
    ttl: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let clock = ManualClock::new(1_000_000);
    let options = Options::default().with_clock(clock.clone());
    let ttl = u64::from(input.ttl);
    let store = TtlStore::with_engine(MemoryEngine::new(), Ttl::from_secs(ttl), options);

    let mut now = 1_000_000u64;
    let mut model: BTreeMap<u8, (Vec<u8>, u64)> = BTreeMap::new();
    let live = |created: u64, now: u64| ttl == 0 || now - created <= ttl;

    for op in input.ops {
        match op {
            Op::Put { key, value } => {
                store.put(&[key], &value).unwrap();
                model.insert(key, (value, now));
            },
            Op::Get { key } => {
                let expected = model
                    .get(&key)
                    .filter(|(_, created)| live(*created, now))
                    .map(|(value, _)| value.clone());
                assert_eq!(store.get(&[key]).unwrap(), expected);
            },
            Op::Delete { key } => {
                let removed = store.delete(&[key]).unwrap();
                assert_eq!(removed, model.remove(&key).is_some());
            },
            Op::Advance { secs } => {
                clock.advance(Duration::from_secs(u64::from(secs)));
                now += u64::from(secs);
            },
            Op::Compact => {
                store.compact(&KeyRange::all()).unwrap();
                model.retain(|_, (_, created)| live(*created, now));
            },
        }
    }
});
