//! Synthetic sample data.
//!
//! Produces deterministic random-walk payloads in the same shape Alpha
//! Vantage returns (numbered fields, newest first, `Meta Data` block), so the
//! dashboard and CLI work without an API key and tests run offline.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

use super::alpha_vantage::time_series_key;
use super::provider::{DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::{Granularity, RawTimeSeriesPayload, Symbol};

const INTRADAY_INTERVAL: &str = "5min";
const INTRADAY_BARS: usize = 78;
const DAILY_BARS: usize = 100;
const WEEKLY_BARS: usize = 520;
const MONTHLY_BARS: usize = 240;

/// Provider serving synthetic series that end at a fixed anchor instant.
pub struct SampleProvider {
    anchor: NaiveDateTime,
    seed: u64,
}

impl SampleProvider {
    pub fn new(anchor: NaiveDateTime) -> Self {
        Self { anchor, seed: 42 }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl PriceProvider for SampleProvider {
    fn name(&self) -> &str {
        "sample"
    }

    fn fetch(&self, symbol: &Symbol, granularity: Granularity) -> Result<FetchResult, DataError> {
        Ok(FetchResult {
            symbol: symbol.clone(),
            granularity,
            time_series_key: time_series_key(granularity, INTRADAY_INTERVAL),
            payload: synthetic_payload(symbol, granularity, self.anchor, self.seed),
            source: DataSource::Sample,
        })
    }
}

fn previous_weekday(date: NaiveDate) -> Option<NaiveDate> {
    let mut d = date;
    while matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
        d = d.pred_opt()?;
    }
    Some(d)
}

/// Timestamps for `granularity`, newest first, ending at or before `end`.
fn timestamps(granularity: Granularity, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let Some(last_session) = previous_weekday(end.date()) else {
        return Vec::new();
    };
    let midnight = |d: NaiveDate| d.and_time(NaiveTime::MIN);

    match granularity {
        Granularity::Intraday => {
            let session_close = NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN);
            // A session still open at `end` has not closed yet; use the one before.
            let session = if last_session.and_time(session_close) > end {
                last_session.pred_opt().and_then(previous_weekday)
            } else {
                Some(last_session)
            };
            let Some(session) = session else {
                return Vec::new();
            };
            let close = session.and_time(session_close);
            (0..INTRADAY_BARS as i64)
                .map(|i| close - chrono::Duration::minutes(5 * i))
                .collect()
        }
        Granularity::Daily => {
            let mut out = Vec::with_capacity(DAILY_BARS);
            let mut day = Some(last_session);
            while let Some(d) = day {
                if out.len() == DAILY_BARS {
                    break;
                }
                out.push(midnight(d));
                day = d.pred_opt().and_then(previous_weekday);
            }
            out
        }
        Granularity::Weekly => {
            let mut friday = Some(last_session);
            while let Some(d) = friday.filter(|d| d.weekday() != Weekday::Fri) {
                friday = d.pred_opt();
            }
            let mut out = Vec::with_capacity(WEEKLY_BARS);
            while let Some(d) = friday {
                if out.len() == WEEKLY_BARS {
                    break;
                }
                out.push(midnight(d));
                friday = d.checked_sub_days(Days::new(7));
            }
            out
        }
        Granularity::Monthly => {
            let mut out = Vec::with_capacity(MONTHLY_BARS);
            let mut month_end = Some(last_session);
            while let Some(d) = month_end {
                if out.len() == MONTHLY_BARS {
                    break;
                }
                out.push(midnight(d));
                month_end = d.with_day(1).and_then(|first| first.pred_opt());
            }
            out
        }
    }
}

fn symbol_seed(symbol: &Symbol, seed: u64) -> u64 {
    symbol
        .as_str()
        .bytes()
        .fold(seed, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
}

/// Build a synthetic Alpha Vantage-shaped payload for `symbol`.
pub fn synthetic_payload(
    symbol: &Symbol,
    granularity: Granularity,
    end: NaiveDateTime,
    seed: u64,
) -> RawTimeSeriesPayload {
    let mut rng = StdRng::seed_from_u64(symbol_seed(symbol, seed));
    let stamps = timestamps(granularity, end);
    let volatility = match granularity {
        Granularity::Intraday => 0.002,
        Granularity::Daily => 0.015,
        Granularity::Weekly => 0.03,
        Granularity::Monthly => 0.06,
    };
    let format = match granularity {
        Granularity::Intraday => "%Y-%m-%d %H:%M:%S",
        _ => "%Y-%m-%d",
    };

    // Walk oldest to newest, then emit newest first like the real API.
    let mut close: f64 = rng.gen_range(20.0..400.0);
    let mut rows = Vec::with_capacity(stamps.len());
    for ts in stamps.iter().rev() {
        let open = close;
        let r: f64 = 0.0005 + volatility * rng.gen_range(-1.0..1.0);
        close = (open * (1.0 + r)).max(1.0);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..volatility / 2.0));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..volatility / 2.0));
        let volume: f64 = rng.gen_range(100_000.0..5_000_000.0);
        rows.push((
            ts.format(format).to_string(),
            json!({
                "1. open": format!("{open:.4}"),
                "2. high": format!("{high:.4}"),
                "3. low": format!("{low:.4}"),
                "4. close": format!("{close:.4}"),
                "5. volume": format!("{volume:.0}"),
            }),
        ));
    }

    let series: Map<String, Value> = rows.into_iter().rev().collect();
    let last_refreshed = stamps
        .first()
        .map(|t| t.format(format).to_string())
        .unwrap_or_default();

    let mut body = Map::new();
    body.insert(
        "Meta Data".into(),
        json!({
            "1. Information": format!("{} Prices (sample data)", granularity.label()),
            "2. Symbol": symbol.as_str(),
            "3. Last Refreshed": last_refreshed,
        }),
    );
    body.insert(
        time_series_key(granularity, INTRADAY_INTERVAL),
        Value::Object(series),
    );
    RawTimeSeriesPayload::new(Value::Object(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::normalize;

    fn anchor() -> NaiveDateTime {
        // Sunday
        NaiveDate::from_ymd_opt(2024, 6, 16)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    #[test]
    fn payloads_are_deterministic() {
        let a = synthetic_payload(&aapl(), Granularity::Daily, anchor(), 7);
        let b = synthetic_payload(&aapl(), Granularity::Daily, anchor(), 7);
        assert_eq!(a, b);

        let msft = Symbol::parse("MSFT").unwrap();
        let other = synthetic_payload(&msft, Granularity::Daily, anchor(), 7);
        assert_ne!(a, other);
    }

    #[test]
    fn sample_payloads_normalize() {
        let provider = SampleProvider::new(anchor());
        for granularity in [
            Granularity::Intraday,
            Granularity::Daily,
            Granularity::Weekly,
            Granularity::Monthly,
        ] {
            let fetched = provider.fetch(&aapl(), granularity).unwrap();
            let series = normalize(&fetched.payload, &fetched.time_series_key).unwrap();
            assert!(!series.is_empty());
            assert!(series.latest().unwrap() <= anchor());
            assert!(series.iter().all(|r| r.is_sane()), "{granularity} produced insane bars");
        }
    }

    #[test]
    fn daily_sample_skips_weekends() {
        let payload = synthetic_payload(&aapl(), Granularity::Daily, anchor(), 1);
        let series = normalize(&payload, "Time Series (Daily)").unwrap();
        assert_eq!(series.len(), DAILY_BARS);
        assert!(series
            .iter()
            .all(|r| !matches!(r.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
        assert_eq!(
            series.latest().unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
        );
    }

    #[test]
    fn intraday_sample_covers_one_session() {
        let payload = synthetic_payload(&aapl(), Granularity::Intraday, anchor(), 1);
        let series = normalize(&payload, "Time Series (5min)").unwrap();
        assert_eq!(series.len(), INTRADAY_BARS);
        assert_eq!(
            series.earliest().unwrap().time(),
            NaiveTime::from_hms_opt(9, 35, 0).unwrap()
        );
    }

    #[test]
    fn intraday_sample_never_runs_past_the_anchor() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
        let session_close = |d: NaiveDate| d.and_hms_opt(16, 0, 0).unwrap();

        let morning = monday.and_hms_opt(10, 0, 0).unwrap();
        let provider = SampleProvider::new(morning);
        let fetched = provider.fetch(&aapl(), Granularity::Intraday).unwrap();
        let series = normalize(&fetched.payload, &fetched.time_series_key).unwrap();
        assert_eq!(
            series.latest().unwrap(),
            session_close(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap())
        );

        let evening = monday.and_hms_opt(17, 30, 0).unwrap();
        let payload = synthetic_payload(&aapl(), Granularity::Intraday, evening, 1);
        let series = normalize(&payload, "Time Series (5min)").unwrap();
        assert_eq!(series.latest().unwrap(), session_close(monday));
    }

    #[test]
    fn monthly_sample_covers_ten_years() {
        let payload = synthetic_payload(&aapl(), Granularity::Monthly, anchor(), 1);
        let series = normalize(&payload, "Monthly Time Series").unwrap();
        assert_eq!(series.len(), MONTHLY_BARS);
        let ten_years_back = NaiveDate::from_ymd_opt(2014, 6, 16)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert!(series.earliest().unwrap() < ten_years_back);
    }
}
