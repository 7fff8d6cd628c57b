use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, TxWatcherError};

/// Upper bound accepted for `poller.timeout_secs` (one week)
pub const MAX_POLL_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub poller: PollerConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base address of the transactions REST API
    pub address: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    pub interval_ms: u64,
    pub timeout_secs: u64,
    /// Abort on errors that retrying cannot fix instead of waiting for the timeout
    pub fail_fast_on_permanent: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: "https://devnet-api.multiversx.com".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            timeout_secs: 60,
            fail_fast_on_permanent: false,
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(TxWatcherError::Configuration(
                "poller.interval_ms must be positive".to_string(),
            ));
        }
        if self.timeout_secs > MAX_POLL_TIMEOUT_SECS {
            return Err(TxWatcherError::Configuration(format!(
                "poller.timeout_secs {} exceeds the maximum of {}",
                self.timeout_secs, MAX_POLL_TIMEOUT_SECS
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load `config.toml` from the working directory (optional) overlaid with
    /// `TX_WATCHER__*` environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let api = ApiConfig::default();
        let poller = PollerConfig::default();

        let config_builder = config::Config::builder()
            // Built-in defaults
            .set_default("api.address", api.address)
            .and_then(|b| b.set_default("api.request_timeout_secs", api.request_timeout_secs))
            .and_then(|b| b.set_default("poller.interval_ms", poller.interval_ms))
            .and_then(|b| b.set_default("poller.timeout_secs", poller.timeout_secs))
            .and_then(|b| b.set_default("poller.fail_fast_on_permanent", poller.fail_fast_on_permanent))
            .and_then(|b| b.set_default("service.log_level", "info"))
            .map_err(config_error)?
            // Config file, if present
            .add_source(config::File::from(path).required(false))
            // Environment variables, e.g. TX_WATCHER__API__ADDRESS
            .add_source(config::Environment::with_prefix("TX_WATCHER").separator("__"))
            .build()
            .map_err(config_error)?;

        let config: Config = config_builder.try_deserialize().map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api.address.trim().is_empty() {
            return Err(TxWatcherError::Configuration("api.address is empty".to_string()));
        }
        self.poller.validate()
    }
}

fn config_error(e: config::ConfigError) -> TxWatcherError {
    TxWatcherError::Configuration(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load_from(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.poller.interval(), Duration::from_secs(2));
        assert_eq!(config.poller.timeout(), Duration::from_secs(60));
        assert!(!config.poller.fail_fast_on_permanent);
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("tx-watcher-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[api]\naddress = \"http://127.0.0.1:3001\"\n[poller]\ntimeout_secs = 4").unwrap();
        drop(file);

        let config = Config::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.api.address, "http://127.0.0.1:3001");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.poller.timeout(), Duration::from_secs(4));
        assert_eq!(config.poller.interval_ms, 2000);
    }

    #[test]
    fn test_timeout_bounds() {
        let mut poller = PollerConfig::default();
        poller.timeout_secs = MAX_POLL_TIMEOUT_SECS;
        assert!(poller.validate().is_ok());

        poller.timeout_secs = u64::MAX;
        assert!(matches!(poller.validate(), Err(TxWatcherError::Configuration(_))));

        poller.timeout_secs = 60;
        poller.interval_ms = 0;
        assert!(poller.validate().is_err());
    }

    #[test]
    fn test_oversized_timeout_in_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("tx-watcher-timeout-{}.toml", std::process::id()));
        std::fs::write(&path, "[poller]\ntimeout_secs = 999999999999\n").unwrap();

        let result = Config::load_from(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(TxWatcherError::Configuration(_))));
    }
}
