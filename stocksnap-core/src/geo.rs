//! IP geolocation via ipinfo.io.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::GeoConfig;
use crate::data::http::{build_client, transport_error};
use crate::data::DataError;

const DEFAULT_LOC: &str = "0,0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// "City, Region, Country" when the service reports it.
    pub place: Option<String>,
}

pub trait GeoLocator: Send + Sync {
    fn locate(&self) -> Result<GeoLocation, DataError>;
}

/// Parse an ipinfo `loc` string (`"lat,lon"`).
pub fn parse_loc(loc: &str) -> Result<(f64, f64), DataError> {
    let bad = || DataError::ResponseFormatChanged(format!("unparsable loc '{loc}'"));
    let (lat, lon) = loc.split_once(',').ok_or_else(bad)?;
    let lat: f64 = lat.trim().parse().map_err(|_| bad())?;
    let lon: f64 = lon.trim().parse().map_err(|_| bad())?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(bad());
    }
    Ok((lat, lon))
}

/// Build a location from an ipinfo response body.
pub fn location_from_body(body: &Value) -> Result<GeoLocation, DataError> {
    let loc = body.get("loc").and_then(Value::as_str).unwrap_or(DEFAULT_LOC);
    let (latitude, longitude) = parse_loc(loc)?;

    let parts: Vec<&str> = ["city", "region", "country"]
        .iter()
        .filter_map(|k| body.get(*k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .collect();
    let place = (!parts.is_empty()).then(|| parts.join(", "));

    Ok(GeoLocation {
        latitude,
        longitude,
        place,
    })
}

pub struct IpInfoLocator {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl IpInfoLocator {
    pub fn new(config: &GeoConfig) -> Result<Self, DataError> {
        Ok(Self {
            client: build_client(std::time::Duration::from_secs(config.timeout_secs))?,
            base_url: config.base_url.clone(),
        })
    }
}

impl GeoLocator for IpInfoLocator {
    fn locate(&self) -> Result<GeoLocation, DataError> {
        debug!(url = %self.base_url, "geolocation request");
        let resp = self
            .client
            .get(&self.base_url)
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited("ipinfo.io".into()));
        }
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                provider: "ipinfo",
                status: status.as_u16(),
            });
        }

        let body: Value = resp
            .json()
            .map_err(|e| DataError::ResponseFormatChanged(format!("ipinfo response: {e}")))?;
        location_from_body(&body)
    }
}
