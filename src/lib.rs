//! # Crypto Monitoring System
//!
//! Polls a public price-quote API for a set of tracked assets, persists
//! snapshots in SQLite, and derives descriptive statistics (trend,
//! volatility, momentum) over recorded windows.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use crypto_monitor::{AssetTracker, CoinGeckoProvider, Database, SnapshotStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite://data/crypto_monitor.db").await?;
//! let provider = Arc::new(CoinGeckoProvider::new()?);
//! let tracker = AssetTracker::new(provider, SnapshotStore::new(&db), "usd");
//!
//! tracker.add_asset("bitcoin", Some("Bitcoin"), Some("btc")).await?;
//! let report = tracker.record_all_tracked().await?;
//! println!("{}", report);
//!
//! let analysis = tracker.trend_analysis("bitcoin", 20).await?;
//! println!("trend={} momentum={:.1}", analysis.trend, analysis.momentum);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Shell (menu loop)
//!     ↓
//! AssetTracker (CRUD, batch recording, analytics, search)
//!     ↓                     ↓
//! PriceProvider        SnapshotStore
//! (CoinGecko)          (SQLite via sqlx)
//! ```
//!
//! All I/O is sequential: each action runs to completion before the
//! next, and the only long-lived shared state is the database pool.

pub mod analytics;
pub mod config;
pub mod constants;
pub mod error;
pub mod provider;
pub mod providers;
pub mod shell;
pub mod store;
pub mod tracker;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ProviderError, TrackerError};
pub use provider::PriceProvider;
pub use providers::CoinGeckoProvider;
pub use store::{Database, SnapshotStore};
pub use tracker::AssetTracker;
pub use types::{
    Asset, BatchReport, CoinListing, MarketAnalytics, PriceSnapshot, TrackedAsset, TrendAnalysis,
    TrendLabel, VolatilityLabel,
};
