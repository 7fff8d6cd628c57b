//! Transaction confirmation polling

use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollerConfig;
use crate::decoder::decode_transaction_events;
use crate::error::{Result, TxWatcherError};
use crate::source::TransactionSource;
use crate::types::{DecodedEvent, EventDefinition, TransactionStatus};

/// Default delay between two status fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default overall wait for a terminal status
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Polling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
    pub fail_fast_on_permanent: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
            fail_fast_on_permanent: false,
        }
    }
}

impl From<&PollerConfig> for PollOptions {
    fn from(config: &PollerConfig) -> Self {
        Self {
            interval: config.interval(),
            timeout: config.timeout(),
            fail_fast_on_permanent: config.fail_fast_on_permanent,
        }
    }
}

/// Waits for a transaction to settle and decodes the events it emitted.
///
/// One call polls one transaction; attempts run strictly one after the other.
pub struct TransactionPoller<S> {
    source: S,
    options: PollOptions,
}

impl<S: TransactionSource> TransactionPoller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: PollOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PollOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Poll until the transaction succeeds, fails or the timeout elapses
    pub async fn poll(&self, hash: &str, definitions: &[&EventDefinition]) -> Result<Vec<DecodedEvent>> {
        self.poll_with_cancel(hash, definitions, &CancellationToken::new()).await
    }

    /// Same as [`poll`](Self::poll), aborting with `Cancelled` once `cancel` fires
    pub async fn poll_with_cancel(
        &self,
        hash: &str,
        definitions: &[&EventDefinition],
        cancel: &CancellationToken,
    ) -> Result<Vec<DecodedEvent>> {
        let deadline = Instant::now().checked_add(self.options.timeout).ok_or_else(|| {
            TxWatcherError::Configuration(format!("poll timeout {:?} is out of range", self.options.timeout))
        })?;
        let mut ticker = interval(self.options.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts: u32 = 0;

        info!(
            "Polling transaction {} (interval {:?}, timeout {:?})",
            hash, self.options.interval, self.options.timeout
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel.cancelled() => return Err(self.cancelled(hash, attempts)),
            }

            if Instant::now() >= deadline {
                return Err(self.timed_out(hash, attempts));
            }

            // An attempt still in flight at the deadline is abandoned
            attempts += 1;
            let fetched = tokio::select! {
                fetched = self.source.fetch_transaction(hash) => fetched,
                _ = tokio::time::sleep_until(deadline) => return Err(self.timed_out(hash, attempts)),
                _ = cancel.cancelled() => return Err(self.cancelled(hash, attempts)),
            };

            match fetched {
                Ok(response) => match response.status {
                    TransactionStatus::Success => {
                        let events = decode_transaction_events(&response, definitions);
                        info!(
                            "Transaction {} succeeded after {} attempts, {} events decoded",
                            hash,
                            attempts,
                            events.len()
                        );
                        return Ok(events);
                    }
                    status if status.is_failure() => {
                        warn!("Transaction {} failed with status {}", hash, status);
                        return Err(TxWatcherError::TransactionFailed {
                            hash: hash.to_string(),
                            status: status.to_string(),
                        });
                    }
                    status => {
                        debug!("Transaction {} is {} (attempt {})", hash, status, attempts);
                    }
                },
                Err(e) if self.options.fail_fast_on_permanent && !e.is_transient() => {
                    warn!("Giving up on transaction {}: {}", hash, e);
                    return Err(TxWatcherError::Fetch {
                        hash: hash.to_string(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!("Fetching transaction {} failed (attempt {}), retrying: {}", hash, attempts, e);
                }
            }
        }
    }

    fn timed_out(&self, hash: &str, attempts: u32) -> TxWatcherError {
        warn!("Transaction {} still unresolved after {} attempts", hash, attempts);
        TxWatcherError::Timeout {
            hash: hash.to_string(),
            timeout: self.options.timeout,
            attempts,
        }
    }

    fn cancelled(&self, hash: &str, attempts: u32) -> TxWatcherError {
        info!("Polling of transaction {} cancelled after {} attempts", hash, attempts);
        TxWatcherError::Cancelled {
            hash: hash.to_string(),
        }
    }
}
