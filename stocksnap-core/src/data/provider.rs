//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over data sources (Alpha Vantage, offline
//! JSON files, synthetic sample data) so the pipeline can swap implementations
//! and tests can run without a network.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Granularity, RawTimeSeriesPayload, Symbol};

/// Structured error types for provider operations.
///
/// These are designed to be displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("{provider} returned HTTP {status}")]
    HttpStatus { provider: &'static str, status: u16 },

    #[error("hard stop: provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("no offline data for symbol '{symbol}' (expected {})", .path.display())]
    NoOfflineData { symbol: String, path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: Symbol,
    pub granularity: Granularity,
    /// Key under which `payload` holds the time series.
    pub time_series_key: String,
    pub payload: RawTimeSeriesPayload,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    AlphaVantage,
    File,
    Sample,
}

impl DataSource {
    pub fn label(self) -> &'static str {
        match self {
            DataSource::AlphaVantage => "Alpha Vantage",
            DataSource::File => "offline file",
            DataSource::Sample => "sample data",
        }
    }
}

/// Trait for price-data providers.
///
/// Implementations return the provider's raw payload; normalization happens
/// above this trait.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the raw time series for `symbol` at `granularity`.
    fn fetch(&self, symbol: &Symbol, granularity: Granularity) -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: PriceProvider + ?Sized> PriceProvider for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, symbol: &Symbol, granularity: Granularity) -> Result<FetchResult, DataError> {
        (**self).fetch(symbol, granularity)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}
