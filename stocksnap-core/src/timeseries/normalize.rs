//! Payload normalization.
//!
//! A payload holds, under a granularity-specific key, an object mapping
//! timestamp strings to five OHLCV fields. Field names may be bare (`open`)
//! or numbered the way Alpha Vantage sends them (`1. open`); values may be
//! string-encoded or plain JSON numbers.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::domain::{PriceRecord, PriceSeries, RawTimeSeriesPayload};

const FIELD_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("no data under '{key}'")]
    NoData { key: String },

    #[error("malformed record at '{timestamp}': {reason}")]
    MalformedRecord { timestamp: String, reason: String },

    #[error("cannot parse {field} '{value}' at '{timestamp}'")]
    Parse {
        timestamp: String,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        let name = match key.split_once(". ") {
            Some((n, rest)) if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) => rest,
            _ => key,
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Field::Open),
            "high" => Some(Field::High),
            "low" => Some(Field::Low),
            "close" => Some(Field::Close),
            "volume" => Some(Field::Volume),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Parse a provider timestamp: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or
/// `YYYY-MM-DD HH:MM:SS`. Dates land at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn malformed(timestamp: &str, reason: impl Into<String>) -> NormalizeError {
    NormalizeError::MalformedRecord {
        timestamp: timestamp.to_string(),
        reason: reason.into(),
    }
}

fn parse_record(timestamp: &str, raw: &Value) -> Result<PriceRecord, NormalizeError> {
    let fields: &Map<String, Value> = raw
        .as_object()
        .ok_or_else(|| malformed(timestamp, "record is not an object"))?;

    if fields.len() != FIELD_COUNT {
        return Err(malformed(
            timestamp,
            format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        ));
    }

    let mut slots: [Option<&Value>; FIELD_COUNT] = [None; FIELD_COUNT];
    for (key, value) in fields {
        let field = Field::from_key(key)
            .ok_or_else(|| malformed(timestamp, format!("unexpected field '{key}'")))?;
        if slots[field.slot()].replace(value).is_some() {
            return Err(malformed(
                timestamp,
                format!("duplicate {} field", field.name()),
            ));
        }
    }

    let instant = parse_timestamp(timestamp).ok_or_else(|| NormalizeError::Parse {
        timestamp: timestamp.to_string(),
        field: "timestamp",
        value: timestamp.to_string(),
    })?;

    let mut values = [0.0_f64; FIELD_COUNT];
    for field in [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
    ] {
        // Five distinct fields were counted above, so every slot is filled.
        let raw_value = slots[field.slot()]
            .ok_or_else(|| malformed(timestamp, format!("missing {} field", field.name())))?;
        values[field.slot()] = parse_number(raw_value).ok_or_else(|| NormalizeError::Parse {
            timestamp: timestamp.to_string(),
            field: field.name(),
            value: match raw_value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })?;
    }

    Ok(PriceRecord {
        timestamp: instant,
        open: values[Field::Open.slot()],
        high: values[Field::High.slot()],
        low: values[Field::Low.slot()],
        close: values[Field::Close.slot()],
        volume: values[Field::Volume.slot()],
    })
}

/// Parse the series stored under `time_series_key` into an ascending
/// [`PriceSeries`].
///
/// Sorting is stable; if two entries resolve to the same instant the one
/// that came first in the payload is kept.
pub fn normalize(
    payload: &RawTimeSeriesPayload,
    time_series_key: &str,
) -> Result<PriceSeries, NormalizeError> {
    let entries = payload
        .as_value()
        .get(time_series_key)
        .and_then(Value::as_object)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| NormalizeError::NoData {
            key: time_series_key.to_string(),
        })?;

    let mut records = entries
        .iter()
        .map(|(timestamp, raw)| parse_record(timestamp, raw))
        .collect::<Result<Vec<_>, _>>()?;

    records.sort_by_key(|r| r.timestamp);
    let parsed = records.len();
    records.dedup_by_key(|r| r.timestamp);
    if records.len() != parsed {
        debug!(
            dropped = parsed - records.len(),
            "dropped records with duplicate timestamps"
        );
    }

    Ok(PriceSeries::from_sorted_unchecked(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &str = "Time Series (Daily)";

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn ohlcv(close: &str) -> Value {
        json!({"open": "10", "high": "12", "low": "9", "close": close, "volume": "100"})
    }

    #[test]
    fn sorts_ascending() {
        let payload = RawTimeSeriesPayload::new(json!({
            KEY: {
                "2024-01-10": ohlcv("11"),
                "2024-01-09": ohlcv("10"),
            }
        }));
        let series = normalize(&payload, KEY).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].timestamp, day(2024, 1, 9));
        assert_eq!(series.records()[0].close, 10.0);
        assert_eq!(series.records()[1].timestamp, day(2024, 1, 10));
        assert_eq!(series.records()[1].close, 11.0);
    }

    #[test]
    fn numbered_field_names_match_bare_names() {
        let bare = RawTimeSeriesPayload::new(json!({ KEY: { "2024-01-09": ohlcv("10") } }));
        let numbered = RawTimeSeriesPayload::new(json!({
            KEY: {
                "2024-01-09": {
                    "1. open": "10", "2. high": "12", "3. low": "9",
                    "4. close": "10", "5. volume": "100"
                }
            }
        }));
        assert_eq!(
            normalize(&bare, KEY).unwrap(),
            normalize(&numbered, KEY).unwrap()
        );
    }

    #[test]
    fn accepts_json_numbers_and_intraday_timestamps() {
        let payload = RawTimeSeriesPayload::new(json!({
            "Time Series (5min)": {
                "2024-03-01 15:55:00": {"open": 1.5, "high": 2, "low": 1, "close": 1.75, "volume": 300},
                "2024-03-01 16:00": ohlcv("1.8"),
            }
        }));
        let series = normalize(&payload, "Time Series (5min)").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].close, 1.75);
        assert_eq!(
            series.latest(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(16, 0, 0)
        );
    }

    #[test]
    fn missing_key_is_no_data() {
        let payload = RawTimeSeriesPayload::new(json!({"Meta Data": {}}));
        assert!(matches!(
            normalize(&payload, KEY),
            Err(NormalizeError::NoData { .. })
        ));
    }

    #[test]
    fn empty_payload_is_no_data() {
        for value in [json!({}), json!(null), json!({ KEY: {} }), json!({ KEY: [] })] {
            let payload = RawTimeSeriesPayload::new(value);
            assert!(matches!(
                normalize(&payload, KEY),
                Err(NormalizeError::NoData { .. })
            ));
        }
    }

    #[test]
    fn four_or_six_fields_is_malformed() {
        let four = RawTimeSeriesPayload::new(json!({
            KEY: { "2024-01-09": {"open": "1", "high": "1", "low": "1", "close": "1"} }
        }));
        let six = RawTimeSeriesPayload::new(json!({
            KEY: { "2024-01-09": {
                "open": "1", "high": "1", "low": "1", "close": "1",
                "volume": "1", "adjusted close": "1"
            } }
        }));
        for payload in [four, six] {
            assert!(matches!(
                normalize(&payload, KEY),
                Err(NormalizeError::MalformedRecord { .. })
            ));
        }
    }

    #[test]
    fn unknown_or_duplicate_fields_are_malformed() {
        let unknown = RawTimeSeriesPayload::new(json!({
            KEY: { "2024-01-09": {"open": "1", "high": "1", "low": "1", "close": "1", "vwap": "1"} }
        }));
        let duplicate = RawTimeSeriesPayload::new(json!({
            KEY: { "2024-01-09": {"open": "1", "1. open": "1", "low": "1", "close": "1", "volume": "1"} }
        }));
        for payload in [unknown, duplicate] {
            assert!(matches!(
                normalize(&payload, KEY),
                Err(NormalizeError::MalformedRecord { .. })
            ));
        }
    }

    #[test]
    fn bad_timestamp_is_parse_error() {
        let payload = RawTimeSeriesPayload::new(json!({ KEY: { "yesterday": ohlcv("1") } }));
        assert!(matches!(
            normalize(&payload, KEY),
            Err(NormalizeError::Parse { field: "timestamp", .. })
        ));
    }

    #[test]
    fn bad_number_is_parse_error() {
        for bad in ["abc", "NaN", "inf", ""] {
            let payload = RawTimeSeriesPayload::new(json!({ KEY: { "2024-01-09": ohlcv(bad) } }));
            assert!(
                matches!(
                    normalize(&payload, KEY),
                    Err(NormalizeError::Parse { field: "close", .. })
                ),
                "value {bad:?} should fail to parse"
            );
        }
    }

    #[test]
    fn duplicate_instants_keep_first_in_payload_order() {
        let payload = RawTimeSeriesPayload::new(json!({
            KEY: {
                "2024-01-09": ohlcv("10"),
                "2024-01-09 00:00:00": ohlcv("99"),
            }
        }));
        let series = normalize(&payload, KEY).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.records()[0].close, 10.0);
    }

    #[test]
    fn payload_is_not_mutated() {
        let payload = RawTimeSeriesPayload::new(json!({
            KEY: { "2024-01-10": ohlcv("11"), "2024-01-09": ohlcv("10") }
        }));
        let before = payload.clone();
        let first = normalize(&payload, KEY).unwrap();
        let second = normalize(&payload, KEY).unwrap();
        assert_eq!(first, second);
        assert_eq!(payload, before);
    }
}
