//! Price data providers: Alpha Vantage over HTTP, offline JSON files, and
//! synthetic sample data, behind the [`PriceProvider`] trait.

pub mod alpha_vantage;
pub mod circuit_breaker;
pub mod file;
pub(crate) mod http;
pub mod provider;
pub mod sample;

pub use alpha_vantage::AlphaVantageProvider;
pub use circuit_breaker::CircuitBreaker;
pub use file::FileProvider;
pub use provider::{DataError, DataSource, FetchResult, PriceProvider};
pub use sample::SampleProvider;
