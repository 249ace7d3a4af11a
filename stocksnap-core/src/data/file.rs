//! Offline provider reading saved Alpha Vantage responses from disk.
//!
//! Layout: `<dir>/<SYMBOL>_<granularity>.json`, e.g. `AAPL_daily.json`.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::alpha_vantage::time_series_key;
use super::provider::{DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::{Granularity, RawTimeSeriesPayload, Symbol};

pub struct FileProvider {
    dir: PathBuf,
    intraday_interval: String,
}

impl FileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            intraday_interval: "5min".into(),
        }
    }

    /// Intraday files are keyed by their bar interval (`Time Series (5min)`).
    pub fn with_intraday_interval(mut self, interval: impl Into<String>) -> Self {
        self.intraday_interval = interval.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &Symbol, granularity: Granularity) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", symbol, granularity.file_stem()))
    }
}

impl PriceProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self, symbol: &Symbol, granularity: Granularity) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol, granularity);
        if !path.exists() {
            return Err(DataError::NoOfflineData {
                symbol: symbol.to_string(),
                path,
            });
        }

        debug!(path = %path.display(), "reading offline payload");
        let content = std::fs::read_to_string(&path)?;
        let payload = RawTimeSeriesPayload::from_json_str(&content).map_err(|e| {
            DataError::ResponseFormatChanged(format!("{}: {e}", path.display()))
        })?;

        Ok(FetchResult {
            symbol: symbol.clone(),
            granularity,
            time_series_key: time_series_key(granularity, &self.intraday_interval),
            payload,
            source: DataSource::File,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}
