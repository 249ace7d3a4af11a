//! Alpha Vantage price provider.
//!
//! Fetches TIME_SERIES_{INTRADAY,DAILY,WEEKLY,MONTHLY} payloads from the
//! `query` endpoint. Handles in-body error messages (Alpha Vantage answers
//! most failures with HTTP 200), retries with exponential backoff, and the
//! circuit breaker.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::circuit_breaker::CircuitBreaker;
use super::http::{build_client, transport_error};
use super::provider::{DataError, DataSource, FetchResult, PriceProvider};
use crate::config::AlphaVantageConfig;
use crate::domain::{Granularity, RawTimeSeriesPayload, Symbol};

const PROVIDER: &str = "alpha_vantage";

/// `function` query parameter for a granularity.
pub fn function_name(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Intraday => "TIME_SERIES_INTRADAY",
        Granularity::Daily => "TIME_SERIES_DAILY",
        Granularity::Weekly => "TIME_SERIES_WEEKLY",
        Granularity::Monthly => "TIME_SERIES_MONTHLY",
    }
}

/// Key under which the response holds the time series.
pub fn time_series_key(granularity: Granularity, intraday_interval: &str) -> String {
    match granularity {
        Granularity::Intraday => format!("Time Series ({intraday_interval})"),
        Granularity::Daily => "Time Series (Daily)".into(),
        Granularity::Weekly => "Weekly Time Series".into(),
        Granularity::Monthly => "Monthly Time Series".into(),
    }
}

fn mentions_api_key(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("apikey") || lower.contains("api key") || lower.contains("premium")
}

/// Inspect a 200 response body for Alpha Vantage's in-band errors.
fn classify_body(symbol: &Symbol, body: &Value) -> Result<(), DataError> {
    if let Some(message) = body.get("Error Message").and_then(Value::as_str) {
        if mentions_api_key(message) {
            return Err(DataError::AuthenticationRequired(message.to_string()));
        }
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }

    if let Some(message) = ["Note", "Information"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
    {
        // Exhausted free-tier quota and premium-only endpoints share these keys.
        let lower = message.to_ascii_lowercase();
        if lower.contains("premium") || lower.contains("invalid api") {
            return Err(DataError::AuthenticationRequired(message.to_string()));
        }
        return Err(DataError::RateLimited(message.to_string()));
    }

    if !body.is_object() {
        return Err(DataError::ResponseFormatChanged(
            "response body is not a JSON object".into(),
        ));
    }
    Ok(())
}

/// Alpha Vantage price provider.
pub struct AlphaVantageProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    api_key: SecretString,
    base_url: String,
    intraday_interval: String,
    output_size: String,
    max_retries: u32,
    base_delay: Duration,
}

impl AlphaVantageProvider {
    pub fn new(
        config: &AlphaVantageConfig,
        api_key: SecretString,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        Ok(Self {
            client: build_client(config.timeout())?,
            circuit_breaker,
            api_key,
            base_url: config.base_url.clone(),
            intraday_interval: config.intraday_interval.clone(),
            output_size: config.output_size.clone(),
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
        })
    }

    /// Query parameters for a request, without the API key.
    fn query_params(&self, symbol: &Symbol, granularity: Granularity) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("function", function_name(granularity).to_string()),
            ("symbol", symbol.to_string()),
        ];
        match granularity {
            Granularity::Intraday => {
                params.push(("interval", self.intraday_interval.clone()));
                params.push(("outputsize", self.output_size.clone()));
            }
            Granularity::Daily => params.push(("outputsize", self.output_size.clone())),
            Granularity::Weekly | Granularity::Monthly => {}
        }
        params
    }

    fn fetch_with_retry(
        &self,
        symbol: &Symbol,
        granularity: Granularity,
    ) -> Result<Value, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let params = self.query_params(symbol, granularity);
        debug!(url = %self.base_url, ?params, "alpha vantage request");
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.base_delay, attempt);
                warn!(%symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying alpha vantage request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let request = self
                .client
                .get(&self.base_url)
                .query(&params)
                .query(&[("apikey", self.api_key.expose_secret())]);

            match request.send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        self.circuit_breaker.trip();
                        return Err(DataError::AuthenticationRequired(format!(
                            "Alpha Vantage rejected the API key (HTTP {status})"
                        )));
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::RateLimited(format!("HTTP {status}")));
                        continue;
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        let err = DataError::HttpStatus {
                            provider: PROVIDER,
                            status: status.as_u16(),
                        };
                        if status.is_server_error() {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }

                    let body: Value = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {}",
                            e.without_url()
                        ))
                    })?;

                    match classify_body(symbol, &body) {
                        Ok(()) => {
                            self.circuit_breaker.record_success();
                            return Ok(body);
                        }
                        Err(DataError::RateLimited(message)) => {
                            warn!(%symbol, %message, "alpha vantage rate limit");
                            self.circuit_breaker.record_failure();
                            last_error = Some(DataError::RateLimited(message));
                            continue;
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(transport_error(e));
                        continue;
                    }
                    return Err(transport_error(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// Delay before retry `attempt` (1-based): `base · 2^(attempt − 1)`, saturating.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

impl PriceProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch(&self, symbol: &Symbol, granularity: Granularity) -> Result<FetchResult, DataError> {
        let body = self.fetch_with_retry(symbol, granularity)?;
        let time_series_key = time_series_key(granularity, &self.intraday_interval);
        info!(%symbol, %granularity, "fetched alpha vantage series");
        Ok(FetchResult {
            symbol: symbol.clone(),
            granularity,
            time_series_key,
            payload: RawTimeSeriesPayload::new(body),
            source: DataSource::AlphaVantage,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
