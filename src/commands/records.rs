//! Record commands.
//!
//! - `ttlkv put <KEY> <VALUE>` - Store a value, stamped with the current time
//! - `ttlkv get <KEY>` - Print a live value
//! - `ttlkv inspect <KEY>` - Show whether a key is live, expired or missing
//! - `ttlkv delete <KEY>` - Remove a key
//! - `ttlkv scan` - List live records

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::json;

use super::display_bytes;
use ttlkv::{KeyRange, Lookup, TtlStore};

/// Execute `put`.
pub fn put(store: &TtlStore, key: &str, value: &str) -> Result<()> {
    store.put(key.as_bytes(), value.as_bytes())?;
    println!("Stored {key}");
    Ok(())
}

/// Execute `get`.
///
/// Fails when the key is missing or expired.
pub fn get(store: &TtlStore, key: &str, as_hex: bool) -> Result<()> {
    let Some(value) = store.get(key.as_bytes())? else {
        anyhow::bail!("Key not found: {key}");
    };

    if as_hex {
        println!("{}", hex::encode(&value));
    } else {
        println!("{}", display_bytes(&value));
    }
    Ok(())
}

/// Execute `inspect`.
pub fn inspect(store: &TtlStore, key: &str) -> Result<()> {
    let lookup = store.lookup(key.as_bytes())?;
    let ttl = store.ttl();

    match &lookup {
        Lookup::Live { value, created_at } => {
            println!("Key:      {key}");
            println!("State:    live");
            println!("Value:    {}", display_bytes(value));
            println!("Created:  {}", format_time(*created_at));
            match ttl.as_secs() {
                Some(secs) => {
                    println!(
                        "Expires:  after {}",
                        format_time(created_at.saturating_add(secs))
                    );
                },
                None => println!("Expires:  never"),
            }
        },
        Lookup::Expired { created_at } => {
            println!("Key:      {key}");
            println!("State:    expired (awaiting compaction)");
            println!("Created:  {}", format_time(*created_at));
            println!("TTL:      {ttl}");
        },
        Lookup::Missing => {
            println!("Key:      {key}");
            println!("State:    missing");
        },
    }
    Ok(())
}

/// Execute `delete`.
pub fn delete(store: &TtlStore, key: &str) -> Result<()> {
    if store.delete(key.as_bytes())? {
        println!("Deleted {key}");
    } else {
        println!("Key not found: {key}");
    }
    Ok(())
}

/// Execute `scan`.
pub fn scan(store: &TtlStore, prefix: Option<&str>, as_json: bool) -> Result<()> {
    let range = match prefix {
        Some(prefix) => KeyRange::prefix(prefix.as_bytes()),
        None => KeyRange::all(),
    };
    let records = store.scan(&range)?;

    if as_json {
        let entries: Vec<_> = records
            .iter()
            .map(|(key, value)| {
                json!({
                    "key": display_bytes(key),
                    "value": display_bytes(value),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (key, value) in &records {
        println!("{}\t{}", display_bytes(key), display_bytes(value));
    }
    if records.is_empty() {
        println!("No live records");
    }
    Ok(())
}

fn format_time(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(|| format!("{secs} (out of range)"), |t| t.to_rfc3339())
}
