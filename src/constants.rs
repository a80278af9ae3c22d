//! Constants for the crypto monitoring system
//!
//! All compile-time knobs are centralized here; runtime settings
//! (database URL, quote currency) live in [`crate::config`].

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API endpoint for simple price queries
pub const COINGECKO_SIMPLE_PRICE_ENDPOINT: &str = "/simple/price";

/// CoinGecko API endpoint for the full coin catalog
pub const COINGECKO_COINS_LIST_ENDPOINT: &str = "/coins/list";

/// HTTP request timeout when fetching a price (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout when fetching the coin catalog (in seconds).
/// The catalog response is large, so it gets a longer budget.
pub const CATALOG_TIMEOUT_SECS: u64 = 15;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "crypto-monitor/0.1.0";

/// Minimum window size for a market summary
pub const MIN_SUMMARY_SAMPLES: usize = 2;

/// Minimum window size for trend analysis
pub const MIN_TREND_SAMPLES: usize = 4;

/// Coefficient-of-variation ceiling for the Low volatility bucket
pub const VOLATILITY_LOW_MAX: f64 = 0.01;

/// Coefficient-of-variation ceiling for the Medium volatility bucket
pub const VOLATILITY_MEDIUM_MAX: f64 = 0.05;

/// Normalized-slope threshold for a strong trend (either direction)
pub const TREND_STRONG_THRESHOLD: f64 = 0.5;

/// Normalized-slope threshold for a mild trend (either direction)
pub const TREND_MILD_THRESHOLD: f64 = 0.1;

/// Weight of the absolute net change percentage in the momentum score
pub const MOMENTUM_CHANGE_WEIGHT: f64 = 0.5;

/// Weight of the absolute normalized slope in the momentum score
pub const MOMENTUM_SLOPE_WEIGHT: f64 = 20.0;

/// Momentum scores are clamped to [0, MOMENTUM_MAX]
pub const MOMENTUM_MAX: f64 = 10.0;

/// Longest symbol accepted by the catalog quality filter
pub const MAX_SYMBOL_LEN: usize = 10;

/// Symbols containing any of these characters are rejected by the
/// catalog quality filter (derivative/bridged listings)
pub const SYMBOL_SEPARATORS: &[char] = &['.', '-', '_'];

/// Catalog entries whose name contains any of these substrings are
/// rejected (pegged/wrapped/staked derivatives, generic "token" spam)
pub const NAME_DENYLIST: &[&str] = &["peg", "wrapped", "token", "staked"];

/// Default number of search results returned to the shell
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Default snapshot window when the caller does not specify one
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
