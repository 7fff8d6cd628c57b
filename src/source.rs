//! Transactions API access

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{FetchError, Result, TxWatcherError};
use crate::types::TransactionResponse;

/// Anything that can report the current state of a transaction
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_transaction(&self, hash: &str) -> std::result::Result<TransactionResponse, FetchError>;
}

#[async_trait]
impl<T: TransactionSource + ?Sized> TransactionSource for Arc<T> {
    async fn fetch_transaction(&self, hash: &str) -> std::result::Result<TransactionResponse, FetchError> {
        (**self).fetch_transaction(hash).await
    }
}

/// Block explorer REST API client
#[derive(Debug, Clone)]
pub struct HttpTransactionSource {
    client: Client,
    api_address: String,
}

impl HttpTransactionSource {
    /// Create a client for `api_address` with a per-request timeout
    pub fn new(api_address: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TxWatcherError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_address: api_address.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.address, Duration::from_secs(config.request_timeout_secs))
    }

    pub fn api_address(&self) -> &str {
        &self.api_address
    }

    /// `{apiAddress}/transactions/{hash}`, with `hash` escaped as a single path segment
    pub fn transaction_url(&self, hash: &str) -> std::result::Result<reqwest::Url, FetchError> {
        let base = format!("{}/transactions", self.api_address);
        let mut url = reqwest::Url::parse(&base).map_err(|e| FetchError::Url(format!("{}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Url(format!("{}: cannot append a path segment", base)))?
            .push(hash);
        Ok(url)
    }
}

#[async_trait]
impl TransactionSource for HttpTransactionSource {
    async fn fetch_transaction(&self, hash: &str) -> std::result::Result<TransactionResponse, FetchError> {
        let url = self.transaction_url(hash)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
