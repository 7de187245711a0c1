//! ttlkv command-line interface.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ttlkv")]
#[command(about = "Key-value store with time-to-live expiry", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding store.path
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// TTL in seconds, overriding store.ttl_secs (0 disables expiry)
    #[arg(long, global = true)]
    ttl: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a value
    Put { key: String, value: String },

    /// Print a live value
    Get {
        key: String,

        /// Print the value as hex
        #[arg(long)]
        hex: bool,
    },

    /// Show whether a key is live, expired or missing
    Inspect { key: String },

    /// Delete a key
    Delete { key: String },

    /// List live records
    Scan {
        /// Only keys starting with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop expired records in a key range (both ends inclusive)
    Compact {
        #[arg(long)]
        begin: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },

    /// Run background compaction until Ctrl-C
    Maintain,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref(), cli.path, cli.ttl)?;
    commands::init_logging(&config.logging);
    commands::validate_config(&config)?;

    let store = commands::open_store(&config)?;

    match cli.command {
        Command::Put { key, value } => commands::records::put(&store, &key, &value)?,
        Command::Get { key, hex } => commands::records::get(&store, &key, hex)?,
        Command::Inspect { key } => commands::records::inspect(&store, &key)?,
        Command::Delete { key } => commands::records::delete(&store, &key)?,
        Command::Scan { prefix, json } => {
            commands::records::scan(&store, prefix.as_deref(), json)?;
        },
        Command::Compact { begin, end } => {
            commands::compact::compact(&store, begin.as_deref(), end.as_deref())?;
        },
        Command::Maintain => {
            commands::compact::maintain(store, config.compaction_interval()).await?;
            return Ok(());
        },
    }

    store.close();
    Ok(())
}
