//! Fuzz target for ttlkv.toml parsing.
//!
//! Checks that:
//! 1. No input causes a panic
//! 2. Malformed TOML is gracefully rejected
//! 3. Anything that parses can be validated without panicking
//!
//! Run with: `cargo +nightly fuzz run fuzz_config_parsing`

#![no_main]

use libfuzzer_sys::fuzz_target;
use ttlkv::config::Config;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(config) = toml::from_str::<Config>(text) {
        let _ = config.validate();
        let _ = config.ttl();
        let _ = config.compaction_interval();
    }
});
