//! Runtime configuration from environment variables

use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::error::TrackerError;
use std::env;

/// Runtime settings for the monitor
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL
    pub database_url: String,

    /// Quote currency for price fetches, e.g. "usd"
    pub vs_currency: String,

    /// Default snapshot window used by the shell
    pub history_limit: usize,
}

impl Config {
    /// Builds a config from the environment, falling back to defaults
    ///
    /// Recognized variables: `MONITOR_DATABASE_URL`, `MONITOR_VS_CURRENCY`,
    /// `MONITOR_HISTORY_LIMIT`.
    pub fn from_env() -> Result<Self, TrackerError> {
        let database_url = env::var("MONITOR_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/crypto_monitor.db".to_string());

        let vs_currency = env::var("MONITOR_VS_CURRENCY")
            .unwrap_or_else(|_| "usd".to_string())
            .to_lowercase();

        let history_limit = match env::var("MONITOR_HISTORY_LIMIT") {
            Ok(raw) => raw.parse::<usize>().map_err(|_| {
                TrackerError::validation(format!("Invalid MONITOR_HISTORY_LIMIT: {}", raw))
            })?,
            Err(_) => DEFAULT_HISTORY_LIMIT,
        };

        Ok(Self {
            database_url,
            vs_currency,
            history_limit,
        })
    }
}
