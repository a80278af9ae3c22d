//! CoinGecko price provider implementation

use crate::{
    constants::{
        CATALOG_TIMEOUT_SECS, COINGECKO_API_URL, COINGECKO_COINS_LIST_ENDPOINT,
        COINGECKO_SIMPLE_PRICE_ENDPOINT, REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    error::ProviderError,
    provider::PriceProvider,
    types::CoinListing,
};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Simple-price response shape: `{id: {currency: number}}`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

/// CoinGecko price provider
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(COINGECKO_API_URL)
    }

    /// Creates a provider against a custom base URL (test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Builds the simple-price URL for a single asset
    fn price_url(&self, asset_id: &str, vs_currency: &str) -> String {
        format!(
            "{}{}?ids={}&vs_currencies={}",
            self.base_url, COINGECKO_SIMPLE_PRICE_ENDPOINT, asset_id, vs_currency
        )
    }

    /// Maps a non-success status into a provider error
    async fn status_error(response: reqwest::Response) -> ProviderError {
        if response.status().as_u16() == 429 {
            return ProviderError::RateLimited;
        }
        ProviderError::Api(format!(
            "HTTP {}: {}",
            response.status(),
            response.text().await.unwrap_or_default()
        ))
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    async fn fetch_price(&self, asset_id: &str, vs_currency: &str) -> Result<f64, ProviderError> {
        let url = self.price_url(asset_id, vs_currency);
        tracing::debug!(%url, "Fetching price from CoinGecko");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::Network)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body = response.text().await.map_err(ProviderError::Network)?;
        let parsed: SimplePriceResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!(
                "Failed to parse CoinGecko price response: {}. Response: {}",
                e, body
            ))
        })?;

        parsed
            .get(asset_id)
            .and_then(|quotes| quotes.get(vs_currency))
            .copied()
            .ok_or_else(|| ProviderError::missing_price(asset_id, vs_currency))
    }

    async fn fetch_catalog(&self) -> Result<Vec<CoinListing>, ProviderError> {
        let url = format!("{}{}", self.base_url, COINGECKO_COINS_LIST_ENDPOINT);
        tracing::debug!(%url, "Fetching coin catalog from CoinGecko");

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(CATALOG_TIMEOUT_SECS))
            .send()
            .await
            .map_err(ProviderError::Network)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let catalog: Vec<CoinListing> = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(format!(
                "Failed to parse CoinGecko catalog: {}",
                e
            )))?;

        tracing::debug!(count = catalog.len(), "Fetched coin catalog");

        Ok(catalog)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}
