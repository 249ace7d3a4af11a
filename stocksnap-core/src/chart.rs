//! Line-chart shaping for windowed series.
//!
//! Renderers receive `(timestamp, close)` points plus a title; they never see
//! the selector or cutoff logic.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::{PriceSeries, Symbol, WindowSelector};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

const LONG_DATE: &str = "%B %d, %Y";

/// Chart title for a windowed series.
///
/// - Latest: the session date of the first record
/// - AllTime: from the first record to `now`
/// - everything else: from the cutoff to `now`
pub fn chart_title(
    symbol: &Symbol,
    selector: WindowSelector,
    series: &PriceSeries,
    cutoff: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> String {
    let base = format!("{symbol} Closing Price");
    match selector {
        WindowSelector::Latest => match series.earliest() {
            Some(first) => format!("{base} for {}", first.format("%A %B %d, %Y")),
            None => base,
        },
        _ => match cutoff.or_else(|| series.earliest()) {
            Some(start) => format!(
                "{base} from {} to {}",
                start.format(LONG_DATE),
                now.format(LONG_DATE)
            ),
            None => base,
        },
    }
}

impl LineChart {
    pub fn from_series(
        symbol: &Symbol,
        selector: WindowSelector,
        series: &PriceSeries,
        cutoff: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            title: chart_title(symbol, selector, series, cutoff, now),
            points: series.close_points(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unix-second x range of the points.
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.0;
        let last = self.points.last()?.0;
        Some((
            first.and_utc().timestamp() as f64,
            last.and_utc().timestamp() as f64,
        ))
    }

    /// Close range padded by 5% on each side (at least 1.0 overall).
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        let (lo, hi) = self.points.iter().fold(None, |acc, &(_, y)| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((f64::min(lo, y), f64::max(hi, y))),
        })?;
        let pad = ((hi - lo) * 0.05).max(0.5);
        Some((lo - pad, hi + pad))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceRecord;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn series(points: &[(NaiveDateTime, f64)]) -> PriceSeries {
        PriceSeries::from_records(
            points
                .iter()
                .map(|&(timestamp, close)| PriceRecord {
                    timestamp,
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 0.0,
                })
                .collect(),
        )
        .unwrap()
    }

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    #[test]
    fn latest_title_uses_first_record_day() {
        let s = series(&[(at(2024, 3, 1), 1.0), (at(2024, 3, 1) + chrono::Duration::minutes(5), 2.0)]);
        let title = chart_title(&aapl(), WindowSelector::Latest, &s, None, at(2024, 3, 2));
        assert_eq!(title, "AAPL Closing Price for Friday March 01, 2024");
    }

    #[test]
    fn windowed_title_spans_cutoff_to_now() {
        let s = series(&[(at(2024, 5, 10), 1.0)]);
        let title = chart_title(
            &aapl(),
            WindowSelector::OneMonth,
            &s,
            Some(at(2024, 5, 1)),
            at(2024, 6, 1),
        );
        assert_eq!(title, "AAPL Closing Price from May 01, 2024 to June 01, 2024");
    }

    #[test]
    fn all_time_title_starts_at_first_record() {
        let s = series(&[(at(1999, 11, 30), 1.0), (at(2024, 5, 31), 2.0)]);
        let title = chart_title(&aapl(), WindowSelector::AllTime, &s, None, at(2024, 6, 1));
        assert_eq!(
            title,
            "AAPL Closing Price from November 30, 1999 to June 01, 2024"
        );
    }

    #[test]
    fn chart_points_follow_series_order() {
        let s = series(&[(at(2024, 1, 9), 10.0), (at(2024, 1, 10), 11.0)]);
        let chart = LineChart::from_series(&aapl(), WindowSelector::AllTime, &s, None, at(2024, 2, 1));
        assert_eq!(chart.points, vec![(at(2024, 1, 9), 10.0), (at(2024, 1, 10), 11.0)]);
        let (lo, hi) = chart.y_bounds().unwrap();
        assert!(lo < 10.0 && hi > 11.0);
        let (x0, x1) = chart.x_bounds().unwrap();
        assert_eq!(x1 - x0, 86_400.0);
    }

    #[test]
    fn empty_chart_has_no_bounds() {
        let chart = LineChart::from_series(&aapl(), WindowSelector::Ytd, &PriceSeries::new(), None, at(2024, 2, 1));
        assert!(chart.is_empty());
        assert!(chart.y_bounds().is_none());
        assert!(chart.x_bounds().is_none());
        assert_eq!(chart.title, "AAPL Closing Price");
    }
}
