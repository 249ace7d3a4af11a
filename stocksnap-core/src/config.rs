//! Runtime configuration.
//!
//! Settings live in a TOML file (default `<config_dir>/stocksnap/config.toml`)
//! with one table per external service. API keys may also come from the
//! `ALPHA_API_KEY` and `NEWS_API_KEY` environment variables, which win over
//! the file. Keys are held as [`SecretString`] and never logged.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

use crate::insights::gainers::{ChangeRange, DEFAULT_GAINER_SYMBOLS};

pub const ALPHA_API_KEY_ENV: &str = "ALPHA_API_KEY";
pub const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";

const INTRADAY_INTERVALS: [&str; 5] = ["1min", "5min", "15min", "30min", "60min"];
const MAX_RETRIES_LIMIT: u32 = 10;
const MAX_RETRY_BASE_DELAY_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing {service} API key: set {env_var} or [{section}] api_key in the config file")]
    MissingApiKey {
        service: &'static str,
        env_var: &'static str,
        section: &'static str,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| SecretString::new(s.into())))
}

fn copy_secret(secret: &SecretString) -> SecretString {
    SecretString::new(secret.expose_secret().into())
}

/// `[alpha_vantage]` — price data.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AlphaVantageConfig {
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    pub base_url: String,
    /// Bar interval for intraday requests (`1min` … `60min`).
    pub intraday_interval: String,
    /// `compact` (latest 100 points) or `full`.
    pub output_size: String,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.alphavantage.co/query".into(),
            intraday_interval: "5min".into(),
            output_size: "compact".into(),
            max_retries: 2,
            retry_base_delay_ms: 500,
            timeout_secs: 30,
        }
    }
}

impl AlphaVantageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// `[news]` — NewsAPI top headlines.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub country: String,
    pub category: String,
    pub query: String,
    pub max_articles: usize,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://newsapi.org/v2/top-headlines".into(),
            country: "us".into(),
            category: "business".into(),
            query: "finance".into(),
            max_articles: 5,
            timeout_secs: 30,
        }
    }
}

/// `[geo]` — IP geolocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ipinfo.io/json".into(),
            timeout_secs: 10,
        }
    }
}

/// `[insights]` — daily gainers defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub symbols: Vec<String>,
    pub min_change_pct: f64,
    pub max_change_pct: f64,
    pub top_n: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        let range = ChangeRange::default();
        Self {
            symbols: DEFAULT_GAINER_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            min_change_pct: range.min,
            max_change_pct: range.max,
            top_n: 5,
        }
    }
}

impl InsightsConfig {
    pub fn change_range(&self) -> ChangeRange {
        ChangeRange::new(self.min_change_pct, self.max_change_pct)
    }
}

/// Complete StockSnap configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub alpha_vantage: AlphaVantageConfig,
    pub news: NewsConfig,
    pub geo: GeoConfig,
    pub insights: InsightsConfig,
}

impl Settings {
    /// `<config_dir>/stocksnap/config.toml`, if a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("stocksnap").join("config.toml"))
    }

    /// Parse settings from a TOML string (no environment overrides).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path` (or the default location), then apply
    /// environment overrides.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (Some(p.to_path_buf()), true),
            None => (Self::default_path(), false),
        };

        let mut settings = match path {
            Some(path) if required || path.exists() => {
                debug!(path = %path.display(), "loading config");
                let content = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Read { path, source })?;
                Self::from_toml_str(&content)?
            }
            _ => Settings::default(),
        };

        settings.apply_env(|name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Override API keys from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .map(|v| SecretString::new(v.into()))
        };
        if let Some(key) = secret(ALPHA_API_KEY_ENV) {
            self.alpha_vantage.api_key = Some(key);
        }
        if let Some(key) = secret(NEWS_API_KEY_ENV) {
            self.news.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let av = &self.alpha_vantage;
        if !INTRADAY_INTERVALS.contains(&av.intraday_interval.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "alpha_vantage.intraday_interval must be one of {}, got '{}'",
                INTRADAY_INTERVALS.join(", "),
                av.intraday_interval
            )));
        }
        if !matches!(av.output_size.as_str(), "compact" | "full") {
            return Err(ConfigError::Invalid(format!(
                "alpha_vantage.output_size must be 'compact' or 'full', got '{}'",
                av.output_size
            )));
        }
        if av.timeout_secs == 0 || self.news.timeout_secs == 0 || self.geo.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if av.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "alpha_vantage.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                av.max_retries
            )));
        }
        if av.retry_base_delay_ms > MAX_RETRY_BASE_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "alpha_vantage.retry_base_delay_ms must be at most {MAX_RETRY_BASE_DELAY_MS}, got {}",
                av.retry_base_delay_ms
            )));
        }
        if self.news.max_articles == 0 {
            return Err(ConfigError::Invalid("news.max_articles must be positive".into()));
        }

        let insights = &self.insights;
        if !insights.min_change_pct.is_finite()
            || !insights.max_change_pct.is_finite()
            || insights.min_change_pct > insights.max_change_pct
        {
            return Err(ConfigError::Invalid(format!(
                "insights range {}..={} is empty",
                insights.min_change_pct, insights.max_change_pct
            )));
        }
        let slider = ChangeRange::SLIDER_MIN..=ChangeRange::SLIDER_MAX;
        if !slider.contains(&insights.min_change_pct) || !slider.contains(&insights.max_change_pct) {
            return Err(ConfigError::Invalid(format!(
                "insights range {}..={} must lie within {}..={}",
                insights.min_change_pct,
                insights.max_change_pct,
                ChangeRange::SLIDER_MIN,
                ChangeRange::SLIDER_MAX
            )));
        }
        if insights.top_n == 0 {
            return Err(ConfigError::Invalid("insights.top_n must be positive".into()));
        }
        Ok(())
    }

    pub fn alpha_api_key(&self) -> Result<SecretString, ConfigError> {
        self.alpha_vantage
            .api_key
            .as_ref()
            .map(copy_secret)
            .ok_or(ConfigError::MissingApiKey {
                service: "Alpha Vantage",
                env_var: ALPHA_API_KEY_ENV,
                section: "alpha_vantage",
            })
    }

    pub fn news_api_key(&self) -> Result<SecretString, ConfigError> {
        self.news
            .api_key
            .as_ref()
            .map(copy_secret)
            .ok_or(ConfigError::MissingApiKey {
                service: "NewsAPI",
                env_var: NEWS_API_KEY_ENV,
                section: "news",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert!(settings.alpha_vantage.api_key.is_none());
        assert_eq!(settings.alpha_vantage.intraday_interval, "5min");
        assert_eq!(settings.news.max_articles, 5);
        assert_eq!(settings.news.country, "us");
        assert_eq!(settings.insights.symbols.len(), 5);
        assert_eq!(settings.insights.min_change_pct, 0.0);
        assert_eq!(settings.insights.max_change_pct, 5.0);
    }

    #[test]
    fn parses_tables() {
        let settings = Settings::from_toml_str(
            r#"
            [alpha_vantage]
            api_key = "file-key"
            intraday_interval = "15min"
            max_retries = 4

            [news]
            max_articles = 3
            query = "markets"

            [insights]
            symbols = ["NVDA", "AMD"]
            min_change_pct = -2.0
            max_change_pct = 8.0
            top_n = 2
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.alpha_api_key().unwrap().expose_secret(),
            "file-key"
        );
        assert_eq!(settings.alpha_vantage.intraday_interval, "15min");
        assert_eq!(settings.alpha_vantage.max_retries, 4);
        assert_eq!(settings.alpha_vantage.timeout_secs, 30);
        assert_eq!(settings.news.max_articles, 3);
        assert_eq!(settings.news.query, "markets");
        assert_eq!(settings.insights.symbols, vec!["NVDA", "AMD"]);
        assert_eq!(settings.insights.change_range(), ChangeRange::new(-2.0, 8.0));
    }

    #[test]
    fn env_overrides_file_keys() {
        let mut settings = Settings::from_toml_str(
            r#"
            [alpha_vantage]
            api_key = "file-key"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> =
            [(ALPHA_API_KEY_ENV, "env-key"), (NEWS_API_KEY_ENV, "news-key")].into();
        settings.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.alpha_api_key().unwrap().expose_secret(), "env-key");
        assert_eq!(settings.news_api_key().unwrap().expose_secret(), "news-key");
    }

    #[test]
    fn blank_keys_count_as_missing() {
        let mut settings = Settings::from_toml_str(
            r#"
            [news]
            api_key = "   "
            "#,
        )
        .unwrap();
        settings.apply_env(|_| Some(String::new()));
        assert!(matches!(
            settings.news_api_key(),
            Err(ConfigError::MissingApiKey {
                env_var: NEWS_API_KEY_ENV,
                ..
            })
        ));
        assert!(settings.alpha_api_key().is_err());
    }

    #[test]
    fn keys_are_redacted_in_debug_output() {
        let settings = Settings::from_toml_str(
            r#"
            [alpha_vantage]
            api_key = "super-secret"
            "#,
        )
        .unwrap();
        assert!(!format!("{settings:?}").contains("super-secret"));
    }

    #[test]
    fn rejects_invalid_values() {
        for toml in [
            "[alpha_vantage]\nintraday_interval = \"2min\"",
            "[alpha_vantage]\noutput_size = \"huge\"",
            "[news]\nmax_articles = 0",
            "[insights]\nmin_change_pct = 6.0\nmax_change_pct = 1.0",
            "[insights]\nmin_change_pct = -30.0\nmax_change_pct = -20.0",
            "[insights]\nmin_change_pct = 15.0\nmax_change_pct = 20.0",
            "[alpha_vantage]\nmax_retries = 40",
            "[alpha_vantage]\nretry_base_delay_ms = 600000",
        ] {
            assert!(
                matches!(Settings::from_toml_str(toml), Err(ConfigError::Invalid(_))),
                "expected invalid: {toml}"
            );
        }
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            Settings::from_toml_str("[alpha_vantage\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_explicit_file_and_rejects_missing_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[news]\nmax_articles = 2\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.news.max_articles, 2);

        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            Settings::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
