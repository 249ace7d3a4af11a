//! Daily gainers: close-to-close change over the two most recent records.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{PriceSeries, Symbol};

pub const DEFAULT_GAINER_SYMBOLS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyChange {
    pub symbol: Symbol,
    pub close: f64,
    pub previous_close: f64,
    pub change_pct: f64,
    pub as_of: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChangeError {
    #[error("need at least two records, got {count}")]
    TooFewRecords { count: usize },

    #[error("previous close is zero")]
    ZeroPreviousClose,
}

impl DailyChange {
    /// `(latest − previous) / previous × 100` over the last two records.
    pub fn from_series(symbol: Symbol, series: &PriceSeries) -> Result<Self, ChangeError> {
        let records = series.records();
        let [.., previous, latest] = records else {
            return Err(ChangeError::TooFewRecords {
                count: records.len(),
            });
        };
        let change_pct = latest
            .change_pct_from(previous)
            .ok_or(ChangeError::ZeroPreviousClose)?;
        Ok(Self {
            symbol,
            close: latest.close,
            previous_close: previous.close,
            change_pct,
            as_of: latest.timestamp,
        })
    }
}

/// Inclusive percentage-change filter, adjustable in whole steps within
/// [`ChangeRange::SLIDER_MIN`]..=[`ChangeRange::SLIDER_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChangeRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ChangeRange {
    fn default() -> Self {
        Self { min: 0.0, max: 5.0 }
    }
}

impl ChangeRange {
    pub const SLIDER_MIN: f64 = -10.0;
    pub const SLIDER_MAX: f64 = 10.0;
    pub const STEP: f64 = 1.0;

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, change_pct: f64) -> bool {
        (self.min..=self.max).contains(&change_pct)
    }

    /// Move the lower bound by `steps`, staying within the slider and below `max`.
    pub fn shift_min(&mut self, steps: i32) {
        let next = self.min + f64::from(steps) * Self::STEP;
        self.min = next.max(Self::SLIDER_MIN).min(self.max);
    }

    /// Move the upper bound by `steps`, staying within the slider and above `min`.
    pub fn shift_max(&mut self, steps: i32) {
        let next = self.max + f64::from(steps) * Self::STEP;
        self.max = next.min(Self::SLIDER_MAX).max(self.min);
    }
}

/// Changes within `range`, largest gain first, at most `n`.
pub fn top_gainers(changes: &[DailyChange], range: ChangeRange, n: usize) -> Vec<DailyChange> {
    let mut filtered: Vec<DailyChange> = changes
        .iter()
        .filter(|c| range.contains(c.change_pct))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));
    filtered.truncate(n);
    filtered
}
