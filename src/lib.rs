//! Marketplace Transaction Watcher Library
//!
//! Waits for submitted marketplace and lottery transactions to settle and
//! decodes the contract events they emitted.
//!
//! # Features
//!
//! - Static registry of the known contract event schemas
//! - Topic/data decoding of raw event logs (addresses, u64, biguint, strings, u8, booleans)
//! - Transaction confirmation polling with a fixed cadence, an overall deadline and cancellation
//! - Call data building for contract calls and NFT transfers
//!
//! # Example
//!
//! ```rust,no_run
//! use tx_watcher::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = HttpTransactionSource::new(
//!         "https://devnet-api.multiversx.com",
//!         Duration::from_secs(10),
//!     )?;
//!     let poller = TransactionPoller::new(source);
//!
//!     let events = poller
//!         .poll("8f0c...e1", &[registry::definition("auction_token_event").unwrap()])
//!         .await?;
//!
//!     if let Some(auction_id) = find_u64(&events, "auction_token_event", "auction_id") {
//!         println!("Created auction {}", auction_id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod call_data;
pub mod config;
pub mod decoder;
pub mod error;
pub mod poller;
pub mod registry;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use address::Address;
pub use call_data::CallData;
pub use config::{ApiConfig, Config, PollerConfig, ServiceConfig};
pub use decoder::{decode_event, decode_transaction_events, decode_value};
pub use error::{FetchError, Result, TxWatcherError};
pub use poller::{PollOptions, TransactionPoller};
pub use source::{HttpTransactionSource, TransactionSource};
pub use types::{
    find_u64, DecodedEvent, DecodedValue, EventDefinition, EventFieldDefinition, FieldType,
    RawEvent, TransactionLogs, TransactionResponse, TransactionStatus,
};

pub use tokio_util::sync::CancellationToken;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::address::Address;
    pub use crate::call_data::CallData;
    pub use crate::decoder::{decode_event, decode_transaction_events};
    pub use crate::error::{FetchError, Result, TxWatcherError};
    pub use crate::poller::{PollOptions, TransactionPoller};
    pub use crate::registry;
    pub use crate::source::{HttpTransactionSource, TransactionSource};
    pub use crate::types::{find_u64, DecodedEvent, DecodedValue, EventDefinition, RawEvent};
    pub use tokio_util::sync::CancellationToken;
}
