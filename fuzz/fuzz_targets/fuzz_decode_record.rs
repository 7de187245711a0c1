//! Fuzz target for stamped record decoding.
//!
//! Checks that:
//! 1. No input causes a panic
//! 2. Inputs shorter than the timestamp prefix are rejected
//! 3. Decoding then re-encoding reproduces the input exactly
//!
//! Run with: `cargo +nightly fuzz run fuzz_decode_record`

#![no_main]

use libfuzzer_sys::fuzz_target;
use ttlkv::ttl::codec::{self, TIMESTAMP_LEN};

fuzz_target!(|data: &[u8]| {
    match codec::decode(data) {
        Ok(record) => {
            assert!(data.len() >= TIMESTAMP_LEN);
            assert_eq!(codec::encode(record.value, record.created_at), data);
            assert_eq!(codec::created_at(data), Ok(record.created_at));
        },
        Err(_) => assert!(data.len() < TIMESTAMP_LEN),
    }
});
