//! Error types for the crypto monitoring system

use thiserror::Error;

/// Errors that can occur when fetching data from a price provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response parsed but did not contain the requested price
    #[error("Price not found for id='{asset_id}', currency='{vs_currency}'")]
    MissingPrice {
        asset_id: String,
        vs_currency: String,
    },

    /// Provider API returned a non-success status
    #[error("Provider API error: {0}")]
    Api(String),
}

impl ProviderError {
    /// Creates a MissingPrice error
    pub fn missing_price(asset_id: &str, vs_currency: &str) -> Self {
        Self::MissingPrice {
            asset_id: asset_id.to_string(),
            vs_currency: vs_currency.to_string(),
        }
    }

    /// Creates an InvalidResponse error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// Errors surfaced by the tracking service and its persistence layer
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No tracked asset with the given id
    #[error("Tracked asset '{asset_id}' not found")]
    NotFound { asset_id: String },

    /// An asset with the given id is already tracked
    #[error("Asset '{asset_id}' is already tracked")]
    AlreadyExists { asset_id: String },

    /// Analytics window is below the minimum sample count
    #[error("Insufficient data for '{asset_id}': need {required} samples, have {actual}")]
    InsufficientData {
        asset_id: String,
        required: usize,
        actual: usize,
    },

    /// A persisted record failed validation on read
    #[error("Validation error: {0}")]
    Validation(String),

    /// Price source failure
    #[error("Upstream error: {0}")]
    Upstream(#[from] ProviderError),

    /// Database failure
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Filesystem failure while preparing the store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Creates a NotFound error
    pub fn not_found(asset_id: &str) -> Self {
        Self::NotFound {
            asset_id: asset_id.to_string(),
        }
    }

    /// Creates an AlreadyExists error
    pub fn already_exists(asset_id: &str) -> Self {
        Self::AlreadyExists {
            asset_id: asset_id.to_string(),
        }
    }

    /// Creates an InsufficientData error
    pub fn insufficient_data(asset_id: &str, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            asset_id: asset_id.to_string(),
            required,
            actual,
        }
    }

    /// Creates a Validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
