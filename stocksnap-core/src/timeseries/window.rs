//! Lookback windowing.
//!
//! Month arithmetic is calendar-aware: subtracting a month from the 31st
//! lands on the last valid day of the target month. Years are twelve months.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::debug;

use crate::domain::{PriceSeries, WindowSelector};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("{selector} window needs history back to {cutoff}, series starts at {}",
        .earliest.map(|e| e.to_string()).unwrap_or_else(|| "(empty)".into()))]
    InsufficientHistory {
        selector: WindowSelector,
        cutoff: NaiveDateTime,
        earliest: Option<NaiveDateTime>,
    },

    #[error("{selector} cutoff is out of calendar range for {now}")]
    CutoffOutOfRange {
        selector: WindowSelector,
        now: NaiveDateTime,
    },
}

/// The earliest instant included by `selector`, or `None` when the window
/// is unbounded (Latest, AllTime).
pub fn cutoff(
    selector: WindowSelector,
    now: NaiveDateTime,
) -> Result<Option<NaiveDateTime>, WindowError> {
    let out_of_range = || WindowError::CutoffOutOfRange { selector, now };
    let months_back = |n: u32| {
        now.checked_sub_months(Months::new(n))
            .map(Some)
            .ok_or_else(out_of_range)
    };

    match selector {
        WindowSelector::Latest | WindowSelector::AllTime => Ok(None),
        WindowSelector::OneMonth => months_back(1),
        WindowSelector::SixMonths => months_back(6),
        WindowSelector::Ytd => NaiveDate::from_ymd_opt(now.year(), 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Some)
            .ok_or_else(out_of_range),
        WindowSelector::OneYear => months_back(12),
        WindowSelector::FiveYears => months_back(5 * 12),
        WindowSelector::TenYears => months_back(10 * 12),
    }
}

/// Records of `series` with `timestamp >= cutoff(selector, now)`.
///
/// Only FiveYears and TenYears refuse a series that starts after the cutoff;
/// every other selector returns whatever subset matches, possibly empty.
pub fn window(
    series: &PriceSeries,
    selector: WindowSelector,
    now: NaiveDateTime,
) -> Result<PriceSeries, WindowError> {
    let Some(cutoff) = cutoff(selector, now)? else {
        return Ok(series.clone());
    };

    if selector.requires_full_history() {
        match series.earliest() {
            Some(earliest) if earliest <= cutoff => {}
            earliest => {
                return Err(WindowError::InsufficientHistory {
                    selector,
                    cutoff,
                    earliest,
                })
            }
        }
    }

    let windowed = series.since(cutoff);
    debug!(
        %selector,
        %cutoff,
        kept = windowed.len(),
        total = series.len(),
        "windowed series"
    );
    Ok(windowed)
}
