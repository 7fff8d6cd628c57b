//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tx-watcher")]
#[command(about = "Wait for marketplace transactions and decode their events", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, env = "TX_WATCHER_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Transactions API address (overrides the config file)
    #[arg(short, long, env = "API_ADDRESS")]
    pub api: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll a transaction until it settles and print its decoded events
    Watch {
        /// Transaction hash
        hash: String,

        /// Event names to decode (all known events when omitted)
        #[arg(short, long = "event")]
        events: Vec<String>,

        /// Timeout in seconds (overrides the config file)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Abort on errors that retrying cannot fix
        #[arg(long)]
        fail_fast: bool,
    },

    /// Decode the events of a saved transaction JSON document
    Decode {
        /// Path to the JSON file
        file: PathBuf,

        /// Event names to decode (all known events when omitted)
        #[arg(short, long = "event")]
        events: Vec<String>,
    },

    /// List the known event schemas
    Events,
}
