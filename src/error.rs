//! Error types for the transaction watcher library

use std::time::Duration;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, TxWatcherError>;

/// Main error type for the library
#[derive(Debug, Error)]
pub enum TxWatcherError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The chain reported a terminal failure for the transaction
    #[error("Transaction {hash} failed with status '{status}'")]
    TransactionFailed { hash: String, status: String },

    /// No terminal status was observed before the deadline
    #[error("Transaction {hash} not resolved within {timeout:?} ({attempts} attempts)")]
    Timeout {
        hash: String,
        timeout: Duration,
        attempts: u32,
    },

    /// The poll was cancelled by the caller
    #[error("Polling of transaction {hash} was cancelled")]
    Cancelled { hash: String },

    /// A permanent fetch error aborted the poll
    #[error("Fetching transaction {hash} failed: {source}")]
    Fetch {
        hash: String,
        #[source]
        source: FetchError,
    },

    /// Address encoding error
    #[error("Address error: {0}")]
    Address(String),

    /// Value decoding error
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Unknown event name
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

/// Failure of a single fetch attempt against the transactions API
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport level failure (connect, timeout, request building)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body was not a transaction document
    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),

    /// The transaction URL could not be built
    #[error("invalid transaction URL: {0}")]
    Url(String),
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    ///
    /// 404 counts as transient: the API answers it until the transaction
    /// reaches the index.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(e) => !e.is_builder(),
            FetchError::Status { status, .. } => {
                matches!(*status, 404 | 408 | 429) || *status >= 500
            }
            FetchError::Body(_) | FetchError::Url(_) => false,
        }
    }
}
