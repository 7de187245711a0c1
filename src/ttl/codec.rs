//! Stamped record encoding.
//!
//! A stamped record is the physical value stored in the engine:
//!
//! ```text
//! +------------------------------+------------------+
//! | created_at: u64 big-endian   | raw value bytes  |
//! | (8 bytes, unix seconds)      | (any length)     |
//! +------------------------------+------------------+
//! ```
//!
//! The prefix width is part of the on-disk contract. Reading it never
//! requires touching the value bytes.

use crate::error::CorruptRecord;

/// Width of the creation timestamp prefix in bytes.
pub const TIMESTAMP_LEN: usize = 8;

/// A decoded view over a stamped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampedRecord<'a> {
    /// Creation time in seconds since the Unix epoch.
    pub created_at: u64,
    /// The caller's value, without the timestamp.
    pub value: &'a [u8],
}

/// Prepends `now` to `value`.
pub fn encode(value: &[u8], now: u64) -> Vec<u8> {
    let mut stamped = Vec::with_capacity(TIMESTAMP_LEN + value.len());
    stamped.extend_from_slice(&now.to_be_bytes());
    stamped.extend_from_slice(value);
    stamped
}

/// Splits a stamped record into its timestamp and value.
///
/// # Errors
///
/// Returns [`CorruptRecord::TooShort`] if `stamped` cannot hold the prefix.
pub fn decode(stamped: &[u8]) -> Result<StampedRecord<'_>, CorruptRecord> {
    let (prefix, value) = stamped
        .split_first_chunk::<TIMESTAMP_LEN>()
        .ok_or(CorruptRecord::TooShort { len: stamped.len() })?;

    Ok(StampedRecord {
        created_at: u64::from_be_bytes(*prefix),
        value,
    })
}

/// Reads only the creation timestamp of a stamped record.
///
/// # Errors
///
/// Returns [`CorruptRecord::TooShort`] if `stamped` cannot hold the prefix.
pub fn created_at(stamped: &[u8]) -> Result<u64, CorruptRecord> {
    decode(stamped).map(|record| record.created_at)
}
