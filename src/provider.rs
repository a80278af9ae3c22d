//! Provider abstraction for fetching prices and the coin catalog

use crate::{error::ProviderError, types::CoinListing};
use async_trait::async_trait;
use std::collections::HashMap;

/// Trait for price providers
///
/// Implementations fetch spot prices and the coin catalog from an
/// external source (CoinGecko, or a scripted mock in tests).
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetches the current price for a single asset
    ///
    /// # Arguments
    /// * `asset_id` - The provider-internal id, e.g. "bitcoin"
    /// * `vs_currency` - The quote currency, e.g. "usd"
    ///
    /// # Returns
    /// The price, or an error on network/parse failure or when the
    /// response lacks the id/currency key.
    async fn fetch_price(&self, asset_id: &str, vs_currency: &str) -> Result<f64, ProviderError>;

    /// Fetches the full coin catalog (`[{id, symbol, name}]`)
    async fn fetch_catalog(&self) -> Result<Vec<CoinListing>, ProviderError>;

    /// Returns a symbol -> id mapping derived from the catalog
    ///
    /// Symbols are lowercased; entries without an id or symbol are skipped.
    async fn supported_coins(&self) -> Result<HashMap<String, String>, ProviderError> {
        let catalog = self.fetch_catalog().await?;
        let mut mapping = HashMap::with_capacity(catalog.len());
        for coin in catalog {
            if coin.id.is_empty() || coin.symbol.is_empty() {
                continue;
            }
            mapping.insert(coin.symbol.to_lowercase(), coin.id);
        }
        Ok(mapping)
    }

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}
