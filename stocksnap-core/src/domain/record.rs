//! PriceRecord — one OHLCV row of a normalized series.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV record for a single symbol at a single instant.
///
/// Timestamps are naive exchange-local times exactly as the provider reports
/// them; daily and coarser records sit at midnight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceRecord {
    /// Basic OHLCV sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    /// Close-to-close percentage change from `previous` to this record.
    ///
    /// `None` when the previous close is zero.
    pub fn change_pct_from(&self, previous: &PriceRecord) -> Option<f64> {
        if previous.close == 0.0 {
            return None;
        }
        Some((self.close - previous.close) / previous.close * 100.0)
    }
}
