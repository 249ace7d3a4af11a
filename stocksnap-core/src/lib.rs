//! StockSnap Core — price-series windowing, providers, insights, configuration.
//!
//! This crate contains everything the dashboard and CLI share:
//! - Domain types (symbols, price records and series, window selectors)
//! - The TimeSeriesWindower: payload normalization and lookback windowing
//! - Price providers (Alpha Vantage, offline files, synthetic samples) behind
//!   a circuit breaker
//! - News headlines and IP geolocation
//! - Sector performance and daily gainers
//! - The `MarketDataService` pipeline tying them together

pub mod chart;
pub mod config;
pub mod data;
pub mod domain;
pub mod geo;
pub mod insights;
pub mod news;
pub mod pipeline;
pub mod timeseries;

pub use pipeline::{GainersReport, MarketDataService, MarketSnapshot, PipelineError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed to the TUI worker thread are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::PriceRecord>();
        require_sync::<domain::PriceRecord>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::Symbol>();
        require_sync::<domain::Symbol>();
        require_send::<domain::RawTimeSeriesPayload>();
        require_sync::<domain::RawTimeSeriesPayload>();

        // Pipeline outputs
        require_send::<MarketSnapshot>();
        require_sync::<MarketSnapshot>();
        require_send::<PipelineError>();
        require_send::<news::NewsArticle>();
        require_send::<geo::GeoLocation>();
        require_send::<insights::DailyChange>();

        // Providers
        require_send::<data::AlphaVantageProvider>();
        require_sync::<data::AlphaVantageProvider>();
        require_send::<data::SampleProvider>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<news::NewsApiProvider>();
        require_send::<geo::IpInfoLocator>();
        require_send::<MarketDataService<Box<dyn data::PriceProvider>>>();
    }

    /// Providers are usable as trait objects behind the service.
    #[test]
    fn boxed_provider_drives_service() {
        let provider: Box<dyn data::PriceProvider> = Box::new(data::SampleProvider::new(
            chrono::NaiveDate::from_ymd_opt(2024, 6, 14)
                .unwrap()
                .and_hms_opt(16, 0, 0)
                .unwrap(),
        ));
        let service = MarketDataService::new(provider);
        assert_eq!(service.provider().name(), "sample");
        assert!(service.provider().is_available());
    }
}
