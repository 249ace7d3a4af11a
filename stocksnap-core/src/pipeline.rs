//! Market data pipeline: symbol → fetch → normalize → window → chart.
//!
//! One fetch, one normalize and one window per request. Nothing is cached;
//! every snapshot owns its series.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::chart::LineChart;
use crate::data::{DataError, DataSource, PriceProvider};
use crate::domain::{Granularity, PriceSeries, Symbol, SymbolError, WindowSelector};
use crate::insights::{top_gainers, ChangeError, ChangeRange, DailyChange};
use crate::timeseries::{self, NormalizeError, WindowError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Change(#[from] ChangeError),
}

impl PipelineError {
    /// One-line message suitable for a status bar.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Symbol(_) => "Select a valid stock symbol.".into(),
            PipelineError::Normalize(NormalizeError::NoData { .. }) => {
                "No data available for the selected symbol and time frame.".into()
            }
            PipelineError::Normalize(NormalizeError::MalformedRecord { .. }) => {
                "Unexpected data structure returned by the API.".into()
            }
            PipelineError::Normalize(NormalizeError::Parse { .. }) => {
                "Error parsing data from API.".into()
            }
            PipelineError::Window(WindowError::InsufficientHistory { .. }) => {
                "Time period not available for selected symbol.".into()
            }
            PipelineError::Window(WindowError::CutoffOutOfRange { .. }) => {
                "Selected time period is out of range.".into()
            }
            PipelineError::Data(DataError::SymbolNotFound { symbol }) => {
                format!("Symbol {symbol} was not found.")
            }
            PipelineError::Data(e) => format!("Failed to fetch data: {e}"),
            PipelineError::Change(e) => format!("Cannot compute daily change: {e}"),
        }
    }
}

/// Everything needed to render one market-data view.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub symbol: Symbol,
    pub selector: WindowSelector,
    pub granularity: Granularity,
    pub source: DataSource,
    /// Windowed series, ascending.
    pub series: PriceSeries,
    pub chart: LineChart,
    /// Records in the normalized series before windowing.
    pub fetched_records: usize,
}

/// Per-symbol daily changes plus the symbols that could not be computed.
#[derive(Debug, Default)]
pub struct GainersReport {
    pub changes: Vec<DailyChange>,
    pub failures: Vec<(String, PipelineError)>,
}

impl GainersReport {
    pub fn top(&self, range: ChangeRange, n: usize) -> Vec<DailyChange> {
        top_gainers(&self.changes, range, n)
    }
}

pub struct MarketDataService<P> {
    provider: P,
}

impl<P: PriceProvider> MarketDataService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch and normalize the full series for `symbol` at `granularity`.
    pub fn load_series(
        &self,
        symbol: &Symbol,
        granularity: Granularity,
    ) -> Result<(PriceSeries, DataSource), PipelineError> {
        let fetched = self.provider.fetch(symbol, granularity)?;
        let series = timeseries::normalize(&fetched.payload, &fetched.time_series_key)?;
        info!(
            %symbol,
            %granularity,
            provider = self.provider.name(),
            records = series.len(),
            "normalized series"
        );
        Ok((series, fetched.source))
    }

    /// Build the market-data view for `symbol` over `selector`.
    pub fn snapshot(
        &self,
        symbol: &str,
        selector: WindowSelector,
        now: NaiveDateTime,
    ) -> Result<MarketSnapshot, PipelineError> {
        let symbol = Symbol::parse(symbol)?;
        let granularity = selector.default_granularity();
        let (full, source) = self.load_series(&symbol, granularity)?;

        let cutoff = timeseries::cutoff(selector, now)?;
        let series = timeseries::window(&full, selector, now)?;
        let chart = LineChart::from_series(&symbol, selector, &series, cutoff, now);

        Ok(MarketSnapshot {
            symbol,
            selector,
            granularity,
            source,
            fetched_records: full.len(),
            series,
            chart,
        })
    }

    /// Latest close-to-close change for one symbol from its daily series.
    pub fn daily_change(&self, symbol: &Symbol) -> Result<DailyChange, PipelineError> {
        let (series, _) = self.load_series(symbol, Granularity::Daily)?;
        Ok(DailyChange::from_series(symbol.clone(), &series)?)
    }

    /// Daily changes for each symbol. Failures are collected per symbol;
    /// once the provider reports itself unavailable the rest are skipped.
    pub fn daily_changes<S: AsRef<str>>(&self, symbols: &[S]) -> GainersReport {
        let mut report = GainersReport::default();

        for raw in symbols {
            let raw = raw.as_ref();
            if !self.provider.is_available() {
                warn!(symbol = raw, "provider unavailable, skipping");
                report.failures.push((
                    raw.to_string(),
                    PipelineError::Data(DataError::CircuitBreakerTripped),
                ));
                continue;
            }

            let result = Symbol::parse(raw)
                .map_err(PipelineError::from)
                .and_then(|symbol| self.daily_change(&symbol));
            match result {
                Ok(change) => report.changes.push(change),
                Err(e) => {
                    warn!(symbol = raw, error = %e, "daily change failed");
                    report.failures.push((raw.to_string(), e));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FetchResult, SampleProvider};
    use crate::domain::RawTimeSeriesPayload;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 14)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    /// Serves one fixed payload and counts fetches.
    struct StaticProvider {
        body: serde_json::Value,
        calls: AtomicUsize,
    }

    impl PriceProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch(&self, symbol: &Symbol, granularity: Granularity) -> Result<FetchResult, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchResult {
                symbol: symbol.clone(),
                granularity,
                time_series_key: "Time Series (Daily)".into(),
                payload: RawTimeSeriesPayload::new(self.body.clone()),
                source: DataSource::File,
            })
        }
    }

    #[test]
    fn invalid_symbol_never_fetches() {
        let provider = StaticProvider {
            body: json!({}),
            calls: AtomicUsize::new(0),
        };
        let service = MarketDataService::new(provider);
        let err = service
            .snapshot("  ", WindowSelector::OneMonth, now())
            .unwrap_err();
        assert_eq!(err.user_message(), "Select a valid stock symbol.");
        assert_eq!(service.provider().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn snapshot_fetches_once_and_windows() {
        let provider = StaticProvider {
            body: json!({
                "Time Series (Daily)": {
                    "2024-06-13": {"1. open": "1", "2. high": "2", "3. low": "1", "4. close": "2", "5. volume": "10"},
                    "2024-04-01": {"1. open": "1", "2. high": "2", "3. low": "1", "4. close": "1", "5. volume": "10"}
                }
            }),
            calls: AtomicUsize::new(0),
        };
        let service = MarketDataService::new(provider);
        let snapshot = service
            .snapshot("aapl", WindowSelector::OneMonth, now())
            .unwrap();
        assert_eq!(snapshot.symbol.as_str(), "AAPL");
        assert_eq!(snapshot.granularity, Granularity::Daily);
        assert_eq!(snapshot.fetched_records, 2);
        assert_eq!(snapshot.series.len(), 1);
        assert_eq!(snapshot.chart.points.len(), 1);
        assert_eq!(
            snapshot.chart.title,
            "AAPL Closing Price from May 14, 2024 to June 14, 2024"
        );
        assert_eq!(service.provider().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn errors_map_to_user_messages() {
        let provider = StaticProvider {
            body: json!({"Meta Data": {}}),
            calls: AtomicUsize::new(0),
        };
        let service = MarketDataService::new(provider);
        let err = service
            .snapshot("AAPL", WindowSelector::OneMonth, now())
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "No data available for the selected symbol and time frame."
        );
    }

    #[test]
    fn sample_data_supports_every_window() {
        let service = MarketDataService::new(SampleProvider::new(now()));
        for selector in WindowSelector::ALL {
            let snapshot = service.snapshot("MSFT", selector, now()).unwrap();
            assert!(!snapshot.series.is_empty(), "{selector} window is empty");
            assert_eq!(snapshot.source, DataSource::Sample);
        }
    }

    #[test]
    fn daily_changes_collect_per_symbol_failures() {
        let service = MarketDataService::new(SampleProvider::new(now()));
        let report = service.daily_changes(&["AAPL", "not a symbol", "TSLA"]);
        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "not a symbol");
        assert!(matches!(report.failures[0].1, PipelineError::Symbol(_)));
    }
}
