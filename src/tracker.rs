//! Asset tracking service
//!
//! Coordinates which assets are tracked (CRUD), snapshot recording
//! (single and fail-safe batch), window analytics, and coin search.

use crate::{
    analytics,
    constants::{MAX_SYMBOL_LEN, NAME_DENYLIST, SYMBOL_SEPARATORS},
    error::TrackerError,
    provider::PriceProvider,
    store::SnapshotStore,
    types::{
        Asset, BatchReport, CoinListing, MarketAnalytics, PriceSnapshot, TrackedAsset,
        TrendAnalysis,
    },
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// High-level service over a price provider and the snapshot store
pub struct AssetTracker {
    provider: Arc<dyn PriceProvider>,
    store: SnapshotStore,
    vs_currency: String,
}

impl AssetTracker {
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        store: SnapshotStore,
        vs_currency: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            vs_currency: vs_currency.into(),
        }
    }

    /// Returns the name of the current provider
    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    // =========================
    // Tracked asset CRUD
    // =========================

    /// Starts tracking an asset
    ///
    /// `name` and `symbol` default to `asset_id` when omitted; the symbol
    /// is lowercased. Fails with `AlreadyExists` on a duplicate id.
    pub async fn add_asset(
        &self,
        asset_id: &str,
        name: Option<&str>,
        symbol: Option<&str>,
    ) -> Result<TrackedAsset, TrackerError> {
        if self.store.get_asset(asset_id).await?.is_some() {
            return Err(TrackerError::already_exists(asset_id));
        }

        let asset = TrackedAsset {
            asset_id: asset_id.to_string(),
            symbol: symbol.unwrap_or(asset_id).to_lowercase(),
            name: name.unwrap_or(asset_id).to_string(),
            is_active: true,
            added_at: Utc::now(),
        };
        self.store.insert_asset(&asset).await?;

        info!(asset_id, "Started tracking asset");

        Ok(asset)
    }

    /// Returns tracked assets, optionally restricted to active ones
    pub async fn list_assets(&self, active_only: bool) -> Result<Vec<TrackedAsset>, TrackerError> {
        self.store.list_assets(active_only).await
    }

    /// Activates or deactivates a tracked asset
    pub async fn set_active(
        &self,
        asset_id: &str,
        active: bool,
    ) -> Result<TrackedAsset, TrackerError> {
        let affected = self.store.set_active(asset_id, active).await?;
        if affected == 0 {
            return Err(TrackerError::not_found(asset_id));
        }

        self.store
            .get_asset(asset_id)
            .await?
            .ok_or_else(|| TrackerError::not_found(asset_id))
    }

    /// Stops tracking an asset, optionally purging its snapshot history
    ///
    /// Returns (assets deleted, snapshots deleted).
    pub async fn remove_asset(
        &self,
        asset_id: &str,
        purge_history: bool,
    ) -> Result<(u64, u64), TrackerError> {
        let assets_deleted = self.store.delete_asset(asset_id).await?;
        if assets_deleted == 0 {
            return Err(TrackerError::not_found(asset_id));
        }

        let snapshots_deleted = if purge_history {
            self.store.delete_snapshots(asset_id).await?
        } else {
            0
        };

        info!(asset_id, snapshots_deleted, "Stopped tracking asset");

        Ok((assets_deleted, snapshots_deleted))
    }

    // =========================
    // Snapshot recording
    // =========================

    /// Fetches the live price for one asset and persists a snapshot
    ///
    /// A negative or non-finite price is rejected before it reaches the
    /// store; snapshots are append-only, so a bad row would fail every
    /// later read of the asset's history.
    pub async fn record_snapshot(&self, asset_id: &str) -> Result<PriceSnapshot, TrackerError> {
        let price = self
            .provider
            .fetch_price(asset_id, &self.vs_currency)
            .await?;

        if !price.is_finite() || price < 0.0 {
            return Err(TrackerError::validation(format!(
                "provider returned invalid price {} for '{}'",
                price, asset_id
            )));
        }

        let snapshot = PriceSnapshot::new(asset_id, price);
        self.store.insert_snapshot(&snapshot).await?;

        Ok(snapshot)
    }

    /// Records a snapshot for every tracked asset, active or not
    ///
    /// A fetch or store failure for one asset is logged and skipped; the
    /// batch always runs to completion. The report carries the snapshots
    /// that succeeded against the total attempted.
    pub async fn record_all_tracked(&self) -> Result<BatchReport, TrackerError> {
        let assets = self.store.list_assets(false).await?;
        let attempted = assets.len();
        let mut snapshots = Vec::with_capacity(attempted);

        for asset in assets {
            match self.record_snapshot(&asset.asset_id).await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    warn!(asset_id = %asset.asset_id, error = %e, "Snapshot failed, continuing batch");
                }
            }
        }

        let report = BatchReport {
            snapshots,
            attempted,
        };
        info!(succeeded = report.succeeded(), attempted, "Batch recording finished");

        Ok(report)
    }

    /// Returns the last `limit` snapshots for an asset, newest first
    pub async fn history(
        &self,
        asset_id: &str,
        limit: usize,
    ) -> Result<Vec<PriceSnapshot>, TrackerError> {
        self.store.history(asset_id, limit).await
    }

    /// Returns the most recent snapshot, if any
    pub async fn latest(&self, asset_id: &str) -> Result<Option<PriceSnapshot>, TrackerError> {
        self.store.latest(asset_id).await
    }

    /// Percentage change over the last `lookback` snapshots
    ///
    /// `None` when fewer than 2 snapshots exist or the oldest price is 0.
    pub async fn change_pct(
        &self,
        asset_id: &str,
        lookback: usize,
    ) -> Result<Option<f64>, TrackerError> {
        let window = self.store.history(asset_id, lookback).await?;
        if window.len() < 2 {
            return Ok(None);
        }

        let close = window[0].price;
        let open = window[window.len() - 1].price;
        if open == 0.0 {
            return Ok(None);
        }

        Ok(Some((close - open) / open * 100.0))
    }

    // =========================
    // Analytics
    // =========================

    /// Market summary over the `limit` most recent snapshots
    pub async fn market_analytics(
        &self,
        asset_id: &str,
        limit: usize,
    ) -> Result<MarketAnalytics, TrackerError> {
        let window = self.store.history(asset_id, limit).await?;
        analytics::market_analytics(asset_id, &window)
    }

    /// Trend/volatility/momentum over the `limit` most recent snapshots
    pub async fn trend_analysis(
        &self,
        asset_id: &str,
        limit: usize,
    ) -> Result<TrendAnalysis, TrackerError> {
        let window = self.store.history(asset_id, limit).await?;
        analytics::trend_analysis(asset_id, &window)
    }

    // =========================
    // Coin search
    // =========================

    /// Searches for coins matching `query`
    ///
    /// The priority table of major assets is checked first on an exact
    /// symbol or id match; only a miss falls through to the remote
    /// catalog, where quality filters drop derivative listings before
    /// exact matching on id, symbol or name. Collection stops at `limit`.
    pub async fn search_coins(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CoinListing>, TrackerError> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        if let Some(asset) = Asset::from_query(&query) {
            return Ok(vec![asset.listing()]);
        }

        let catalog = self.provider.fetch_catalog().await?;
        let mut matches = Vec::new();

        for coin in catalog {
            if !passes_quality_filters(&coin) {
                continue;
            }
            let symbol = coin.symbol.to_lowercase();
            let name = coin.name.to_lowercase();
            if coin.id == query || symbol == query || name == query {
                matches.push(coin);
                if matches.len() >= limit {
                    break;
                }
            }
        }

        Ok(matches)
    }

    /// Closes the underlying store connection
    pub async fn close(&self) {
        self.store.close().await;
    }
}

/// Rejects derivative/spam catalog entries
///
/// A listing fails when its symbol carries a separator character or is
/// over `MAX_SYMBOL_LEN` chars, or its name contains a denylisted
/// substring (peg/wrapped/token/staked).
fn passes_quality_filters(coin: &CoinListing) -> bool {
    let symbol = coin.symbol.to_lowercase();
    if symbol.chars().count() > MAX_SYMBOL_LEN || symbol.contains(SYMBOL_SEPARATORS) {
        return false;
    }

    let name = coin.name.to_lowercase();
    !NAME_DENYLIST.iter().any(|deny| name.contains(deny))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockPriceProvider;
    use crate::store::Database;

    fn catalog() -> Vec<CoinListing> {
        vec![
            listing("bitcoin", "btc", "Bitcoin"),
            listing("ethereum", "eth", "Ethereum"),
            listing("ripple", "xrp", "XRP"),
            listing("spam-coin-peg", "spam.x", "SpamCoin"),
            listing("monero", "xmr", "Monero"),
        ]
    }

    fn listing(id: &str, symbol: &str, name: &str) -> CoinListing {
        CoinListing {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }

    async fn test_tracker() -> (Arc<MockPriceProvider>, AssetTracker) {
        let provider = Arc::new(MockPriceProvider::new());
        provider.set_catalog(catalog());

        let db = Database::connect_in_memory().await.unwrap();
        let tracker = AssetTracker::new(provider.clone(), SnapshotStore::new(&db), "usd");
        (provider, tracker)
    }

    #[tokio::test]
    async fn duplicate_add_fails_typed() {
        let (_, tracker) = test_tracker().await;
        tracker
            .add_asset("bitcoin", Some("Bitcoin"), Some("BTC"))
            .await
            .unwrap();

        let err = tracker.add_asset("bitcoin", None, None).await.unwrap_err();
        assert!(matches!(err, TrackerError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn add_defaults_and_lowercases_symbol() {
        let (_, tracker) = test_tracker().await;
        let asset = tracker
            .add_asset("dogecoin", None, Some("DOGE"))
            .await
            .unwrap();

        assert_eq!(asset.symbol, "doge");
        assert_eq!(asset.name, "dogecoin");
        assert!(asset.is_active);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_asset_fail() {
        let (_, tracker) = test_tracker().await;

        let err = tracker.set_active("missing", false).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { .. }));

        let err = tracker.remove_asset("missing", true).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn remove_asset_reports_cascade_counts() {
        let (provider, tracker) = test_tracker().await;
        provider.set_price("bitcoin", 65000.0);

        tracker.add_asset("bitcoin", None, None).await.unwrap();
        tracker.record_snapshot("bitcoin").await.unwrap();
        tracker.record_snapshot("bitcoin").await.unwrap();

        let (assets, snapshots) = tracker.remove_asset("bitcoin", true).await.unwrap();
        assert_eq!(assets, 1);
        assert_eq!(snapshots, 2);
        assert!(tracker.latest("bitcoin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_recording_survives_individual_failures() {
        let (provider, tracker) = test_tracker().await;
        provider.set_price("bitcoin", 65000.0);
        provider.set_failure("ethereum", "API failed for ethereum");

        tracker.add_asset("bitcoin", None, None).await.unwrap();
        tracker.add_asset("ethereum", None, None).await.unwrap();

        let report = tracker.record_all_tracked().await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded(), 1);
        assert!(!report.is_complete());
        assert_eq!(report.snapshots[0].asset_id, "bitcoin");
        assert_eq!(report.snapshots[0].price, 65000.0);
        // Both assets must have been attempted
        assert_eq!(provider.price_calls(), 2);
    }

    #[tokio::test]
    async fn batch_recording_includes_inactive_assets() {
        let (provider, tracker) = test_tracker().await;
        provider.set_price("bitcoin", 65000.0);
        provider.set_price("ethereum", 3000.0);

        tracker.add_asset("bitcoin", None, None).await.unwrap();
        tracker.add_asset("ethereum", None, None).await.unwrap();
        tracker.set_active("ethereum", false).await.unwrap();

        let report = tracker.record_all_tracked().await.unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded(), 2);
    }

    #[tokio::test]
    async fn negative_fetched_price_is_rejected_before_persisting() {
        let (provider, tracker) = test_tracker().await;
        provider.set_price("bitcoin", -5.0);

        let err = tracker.record_snapshot("bitcoin").await.unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));

        // The bad price never reached the store; reads stay healthy
        assert!(tracker.history("bitcoin", 10).await.unwrap().is_empty());
        assert!(tracker.latest("bitcoin").await.unwrap().is_none());

        // The asset recovers as soon as the provider does
        provider.set_price("bitcoin", 65000.0);
        let snapshot = tracker.record_snapshot("bitcoin").await.unwrap();
        assert_eq!(snapshot.price, 65000.0);
    }

    #[tokio::test]
    async fn change_pct_needs_two_samples() {
        let (provider, tracker) = test_tracker().await;
        provider.set_price("bitcoin", 100.0);

        assert!(tracker.change_pct("bitcoin", 2).await.unwrap().is_none());

        tracker.record_snapshot("bitcoin").await.unwrap();
        provider.set_price("bitcoin", 110.0);
        tracker.record_snapshot("bitcoin").await.unwrap();

        let change = tracker.change_pct("bitcoin", 2).await.unwrap().unwrap();
        assert!((change - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn analytics_flow_over_recorded_snapshots() {
        let (provider, tracker) = test_tracker().await;
        tracker.add_asset("bitcoin", None, None).await.unwrap();

        // Oldest to newest: 100, 105, 95, 110
        for price in [100.0, 105.0, 95.0, 110.0] {
            provider.set_price("bitcoin", price);
            tracker.record_snapshot("bitcoin").await.unwrap();
        }

        let summary = tracker.market_analytics("bitcoin", 10).await.unwrap();
        assert_eq!(summary.open, 100.0);
        assert_eq!(summary.close, 110.0);
        assert!((summary.change_pct - 10.0).abs() < 1e-9);

        let analysis = tracker.trend_analysis("bitcoin", 10).await.unwrap();
        assert_eq!(analysis.samples, 4);
        assert!(analysis.momentum >= 0.0 && analysis.momentum <= 10.0);
    }

    #[tokio::test]
    async fn trend_analysis_under_four_samples_fails() {
        let (provider, tracker) = test_tracker().await;
        provider.set_price("bitcoin", 100.0);
        for _ in 0..3 {
            tracker.record_snapshot("bitcoin").await.unwrap();
        }

        let err = tracker.trend_analysis("bitcoin", 10).await.unwrap_err();
        assert!(matches!(err, TrackerError::InsufficientData { .. }));
    }

    #[tokio::test]
    async fn search_filters_spam_listings() {
        let (_, tracker) = test_tracker().await;
        // Symbol carries a separator and the name matches the denylist
        let results = tracker.search_coins("spam", 10).await.unwrap();
        assert!(results.is_empty());

        let results = tracker.search_coins("spamcoin", 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_priority_table_skips_the_catalog() {
        let (provider, tracker) = test_tracker().await;
        // Empty the catalog: a priority hit must not need it
        provider.set_catalog(Vec::new());

        let results = tracker.search_coins("BTC", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "bitcoin");

        let results = tracker.search_coins("ripple", 10).await.unwrap();
        assert_eq!(results[0].symbol, "xrp");
    }

    #[tokio::test]
    async fn search_falls_back_to_catalog_matching() {
        let (_, tracker) = test_tracker().await;

        let results = tracker.search_coins("xmr", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "monero");

        let results = tracker.search_coins("Monero", 10).await.unwrap();
        assert_eq!(results.len(), 1);

        assert!(tracker.search_coins("", 10).await.unwrap().is_empty());
        assert!(tracker.search_coins("nothing-here", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn symbol_length_filter_counts_characters_not_bytes() {
        let (provider, tracker) = test_tracker().await;
        // Ten two-byte characters: 20 bytes, but within the length limit
        provider.set_catalog(vec![listing("athena-coin", "αβγδεζηθικ", "Athena")]);

        let results = tracker.search_coins("athena-coin", 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn search_stops_collecting_at_limit() {
        let (provider, tracker) = test_tracker().await;
        provider.set_catalog(vec![
            listing("gamma-one", "gam", "Gamma One"),
            listing("gamma-two", "gam", "Gamma Two"),
            listing("gamma-three", "gam", "Gamma Three"),
        ]);

        let results = tracker.search_coins("gam", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "gamma-one");
        assert_eq!(results[1].id, "gamma-two");

        let results = tracker.search_coins("gam", 10).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn symbol_map_is_derived_from_catalog() {
        let (provider, _) = test_tracker().await;
        let mapping = provider.supported_coins().await.unwrap();
        assert_eq!(mapping.get("btc"), Some(&"bitcoin".to_string()));
        assert_eq!(mapping.get("xmr"), Some(&"monero".to_string()));
    }
}
