//! Types for the crypto monitoring system

use crate::constants::{
    TREND_MILD_THRESHOLD, TREND_STRONG_THRESHOLD, VOLATILITY_LOW_MAX, VOLATILITY_MEDIUM_MAX,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Major assets with well-known identifiers
///
/// Serves as the fixed priority table for coin search: a query that
/// exactly matches one of these (by symbol or upstream id) never hits
/// the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    /// Bitcoin
    BTC,
    /// Ethereum
    ETH,
    /// Solana
    SOL,
    /// XRP
    XRP,
    /// BNB
    BNB,
    /// Cardano
    ADA,
    /// Dogecoin
    DOGE,
    /// USD Coin
    USDC,
    /// Tether
    USDT,
}

impl Asset {
    /// Get the asset symbol (lowercase, the normalized form used throughout)
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::BTC => "btc",
            Asset::ETH => "eth",
            Asset::SOL => "sol",
            Asset::XRP => "xrp",
            Asset::BNB => "bnb",
            Asset::ADA => "ada",
            Asset::DOGE => "doge",
            Asset::USDC => "usdc",
            Asset::USDT => "usdt",
        }
    }

    /// Get the CoinGecko ID for this asset
    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Asset::BTC => "bitcoin",
            Asset::ETH => "ethereum",
            Asset::SOL => "solana",
            Asset::XRP => "ripple",
            Asset::BNB => "binancecoin",
            Asset::ADA => "cardano",
            Asset::DOGE => "dogecoin",
            Asset::USDC => "usd-coin",
            Asset::USDT => "tether",
        }
    }

    /// Get the display name for this asset
    pub fn display_name(&self) -> &'static str {
        match self {
            Asset::BTC => "Bitcoin",
            Asset::ETH => "Ethereum",
            Asset::SOL => "Solana",
            Asset::XRP => "XRP",
            Asset::BNB => "BNB",
            Asset::ADA => "Cardano",
            Asset::DOGE => "Dogecoin",
            Asset::USDC => "USD Coin",
            Asset::USDT => "Tether",
        }
    }

    /// Get all priority assets
    pub fn all() -> &'static [Asset] {
        &[
            Asset::BTC,
            Asset::ETH,
            Asset::SOL,
            Asset::XRP,
            Asset::BNB,
            Asset::ADA,
            Asset::DOGE,
            Asset::USDC,
            Asset::USDT,
        ]
    }

    /// Look up a priority asset by exact symbol or CoinGecko id match
    ///
    /// The query must already be lowercased.
    pub fn from_query(query: &str) -> Option<Asset> {
        Asset::all()
            .iter()
            .copied()
            .find(|a| a.symbol() == query || a.coingecko_id() == query)
    }

    /// Render this asset as a catalog listing
    pub fn listing(&self) -> CoinListing {
        CoinListing {
            id: self.coingecko_id().to_string(),
            symbol: self.symbol().to_string(),
            name: self.display_name().to_string(),
        }
    }
}

/// One entry of the upstream coin catalog (`[{id, symbol, name}]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinListing {
    /// Upstream identifier, e.g. "bitcoin"
    pub id: String,
    /// Ticker symbol, e.g. "btc"
    pub symbol: String,
    /// Human-readable name, e.g. "Bitcoin"
    pub name: String,
}

/// A tracked asset record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedAsset {
    /// Upstream identifier (primary key), e.g. "bitcoin"
    pub asset_id: String,

    /// Lowercase ticker symbol
    pub symbol: String,

    /// Display name
    pub name: String,

    /// Whether the asset participates in active-only listings
    pub is_active: bool,

    /// When tracking started
    pub added_at: DateTime<Utc>,
}

/// One timestamped price observation for an asset
///
/// Immutable once created; snapshots are append-only and removed only
/// by an explicit purge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// The asset this observation belongs to
    pub asset_id: String,

    /// Observed price (non-negative)
    pub price: f64,

    /// When the observation was taken
    pub recorded_at: DateTime<Utc>,
}

impl PriceSnapshot {
    /// Create a snapshot timestamped now
    pub fn new(asset_id: impl Into<String>, price: f64) -> Self {
        Self {
            asset_id: asset_id.into(),
            price,
            recorded_at: Utc::now(),
        }
    }

    /// Create a snapshot with an explicit timestamp
    pub fn at(asset_id: impl Into<String>, price: f64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            asset_id: asset_id.into(),
            price,
            recorded_at,
        }
    }
}

/// Descriptive statistics over a snapshot window (derived, not persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalytics {
    pub asset_id: String,
    /// Number of snapshots in the window
    pub samples: usize,
    /// Price of the oldest snapshot in the window
    pub open: f64,
    /// Price of the newest snapshot in the window
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub average: f64,
    /// Net change from open to close, in percent (0 when open is 0)
    pub change_pct: f64,
}

/// Trend bucket derived from the normalized regression slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    StrongUptrend,
    Uptrend,
    Sideways,
    Downtrend,
    StrongDowntrend,
}

impl TrendLabel {
    /// Bucket a normalized slope (slope / mean price, times 100)
    pub fn classify(normalized_slope: f64) -> Self {
        if normalized_slope > TREND_STRONG_THRESHOLD {
            TrendLabel::StrongUptrend
        } else if normalized_slope > TREND_MILD_THRESHOLD {
            TrendLabel::Uptrend
        } else if normalized_slope < -TREND_STRONG_THRESHOLD {
            TrendLabel::StrongDowntrend
        } else if normalized_slope < -TREND_MILD_THRESHOLD {
            TrendLabel::Downtrend
        } else {
            TrendLabel::Sideways
        }
    }
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrendLabel::StrongUptrend => "Strong Uptrend",
            TrendLabel::Uptrend => "Uptrend",
            TrendLabel::Sideways => "Sideways",
            TrendLabel::Downtrend => "Downtrend",
            TrendLabel::StrongDowntrend => "Strong Downtrend",
        };
        write!(f, "{}", label)
    }
}

/// Volatility bucket derived from the coefficient of variation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityLabel {
    Low,
    Medium,
    High,
}

impl VolatilityLabel {
    /// Bucket a coefficient of variation (population std dev / mean)
    pub fn classify(cv: f64) -> Self {
        if cv < VOLATILITY_LOW_MAX {
            VolatilityLabel::Low
        } else if cv < VOLATILITY_MEDIUM_MAX {
            VolatilityLabel::Medium
        } else {
            VolatilityLabel::High
        }
    }
}

impl std::fmt::Display for VolatilityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VolatilityLabel::Low => "Low",
            VolatilityLabel::Medium => "Medium",
            VolatilityLabel::High => "High",
        };
        write!(f, "{}", label)
    }
}

/// Trend/volatility/momentum summary over a snapshot window (derived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub asset_id: String,
    /// Number of snapshots in the window
    pub samples: usize,
    pub trend: TrendLabel,
    pub volatility: VolatilityLabel,
    /// Bounded momentum score in [0, 10]
    pub momentum: f64,
    /// Net change from open to close, in percent
    pub change_pct: f64,
}

/// Outcome of a fail-safe batch recording run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Snapshots that were fetched and persisted successfully
    pub snapshots: Vec<PriceSnapshot>,

    /// Total number of assets the batch attempted
    pub attempted: usize,
}

impl BatchReport {
    /// Number of assets that recorded successfully
    pub fn succeeded(&self) -> usize {
        self.snapshots.len()
    }

    /// True when every attempted asset recorded a snapshot
    pub fn is_complete(&self) -> bool {
        self.succeeded() == self.attempted
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} recorded", self.succeeded(), self.attempted)
    }
}
