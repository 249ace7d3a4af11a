//! Raw provider response, kept opaque until normalization.

use serde_json::Value;

/// The full JSON body returned by a price-data provider.
///
/// The time series itself sits under a granularity-specific key, e.g.
/// `"Time Series (Daily)"`, mapping timestamp strings to five string-encoded
/// OHLCV fields. Object key order is preserved as received.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTimeSeriesPayload(Value);

impl RawTimeSeriesPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Top-level keys, in payload order.
    pub fn keys(&self) -> Vec<&str> {
        self.0
            .as_object()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<Value> for RawTimeSeriesPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
