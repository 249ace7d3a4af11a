//! Financial news headlines.
//!
//! [`NewsApiProvider`] calls NewsAPI `v2/top-headlines`. Articles keep the
//! order the service returns them in; missing fields fall back to
//! placeholder text rather than failing the whole list.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::NewsConfig;
use crate::data::http::{build_client, transport_error};
use crate::data::DataError;

pub const NO_TITLE: &str = "No Title";
pub const NO_DESCRIPTION: &str = "No Description";
pub const NO_URL: &str = "#";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub article_url: String,
    pub source_name: Option<String>,
}

pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Current top headlines, at most the provider's configured article count.
    fn top_headlines(&self) -> Result<Vec<NewsArticle>, DataError>;
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    source: Option<RawSource>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<RawArticle> for NewsArticle {
    fn from(raw: RawArticle) -> Self {
        NewsArticle {
            title: non_empty(raw.title).unwrap_or_else(|| NO_TITLE.into()),
            description: non_empty(raw.description).unwrap_or_else(|| NO_DESCRIPTION.into()),
            image_url: non_empty(raw.url_to_image),
            article_url: non_empty(raw.url).unwrap_or_else(|| NO_URL.into()),
            source_name: raw.source.and_then(|s| non_empty(s.name)),
        }
    }
}

/// Parse a NewsAPI response body, keeping at most `limit` articles.
pub fn parse_headlines(body: &Value, limit: usize) -> Result<Vec<NewsArticle>, DataError> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        let code = body.get("code").and_then(Value::as_str).unwrap_or("unknown");
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message")
            .to_string();
        return Err(match code {
            "apiKeyInvalid" | "apiKeyMissing" | "apiKeyDisabled" | "apiKeyExhausted" => {
                DataError::AuthenticationRequired(message)
            }
            "rateLimited" => DataError::RateLimited(message),
            _ => DataError::Other(format!("NewsAPI error {code}: {message}")),
        });
    }

    let articles = match body.get("articles") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(DataError::ResponseFormatChanged(
                "'articles' is not an array".into(),
            ))
        }
        None => return Ok(Vec::new()),
    };

    articles
        .iter()
        .take(limit)
        .map(|item| {
            serde_json::from_value::<RawArticle>(item.clone())
                .map(NewsArticle::from)
                .map_err(|e| DataError::ResponseFormatChanged(format!("article: {e}")))
        })
        .collect()
}

pub struct NewsApiProvider {
    client: reqwest::blocking::Client,
    api_key: SecretString,
    base_url: String,
    country: String,
    category: String,
    query: String,
    max_articles: usize,
}

impl NewsApiProvider {
    pub fn new(config: &NewsConfig, api_key: SecretString) -> Result<Self, DataError> {
        Ok(Self {
            client: build_client(std::time::Duration::from_secs(config.timeout_secs))?,
            api_key,
            base_url: config.base_url.clone(),
            country: config.country.clone(),
            category: config.category.clone(),
            query: config.query.clone(),
            max_articles: config.max_articles,
        })
    }
}

impl NewsProvider for NewsApiProvider {
    fn name(&self) -> &str {
        "newsapi"
    }

    fn top_headlines(&self) -> Result<Vec<NewsArticle>, DataError> {
        debug!(url = %self.base_url, country = %self.country, category = %self.category, "news request");
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("country", self.country.as_str()),
                ("category", self.category.as_str()),
                ("q", self.query.as_str()),
            ])
            .query(&[("apiKey", self.api_key.expose_secret())])
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        // NewsAPI explains failures in a JSON body on 4xx responses as well.
        let body: Value = match resp.json() {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(DataError::HttpStatus {
                    provider: "newsapi",
                    status: status.as_u16(),
                })
            }
            Err(e) => {
                return Err(DataError::ResponseFormatChanged(format!(
                    "news response: {}",
                    e.without_url()
                )))
            }
        };

        let articles = parse_headlines(&body, self.max_articles)?;
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                provider: "newsapi",
                status: status.as_u16(),
            });
        }
        info!(count = articles.len(), "fetched news headlines");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_first_n_articles_in_order() {
        let body = json!({
            "status": "ok",
            "articles": (0..8).map(|i| json!({
                "title": format!("Headline {i}"),
                "description": "d",
                "url": format!("https://example.com/{i}"),
                "urlToImage": null,
                "source": {"id": null, "name": "Wire"}
            })).collect::<Vec<_>>()
        });
        let articles = parse_headlines(&body, 5).unwrap();
        assert_eq!(articles.len(), 5);
        assert_eq!(articles[0].title, "Headline 0");
        assert_eq!(articles[4].title, "Headline 4");
        assert_eq!(articles[0].source_name.as_deref(), Some("Wire"));
    }

    #[test]
    fn missing_fields_use_placeholders() {
        let body = json!({
            "status": "ok",
            "articles": [{"description": null, "urlToImage": "https://img.example.com/a.png"}]
        });
        let article = &parse_headlines(&body, 5).unwrap()[0];
        assert_eq!(article.title, NO_TITLE);
        assert_eq!(article.description, NO_DESCRIPTION);
        assert_eq!(article.article_url, NO_URL);
        assert_eq!(
            article.image_url.as_deref(),
            Some("https://img.example.com/a.png")
        );
    }

    #[test]
    fn no_articles_is_empty_list() {
        assert!(parse_headlines(&json!({"status": "ok", "articles": []}), 5)
            .unwrap()
            .is_empty());
        assert!(parse_headlines(&json!({"status": "ok"}), 5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn error_bodies_map_to_data_errors() {
        let invalid = json!({"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."});
        assert!(matches!(
            parse_headlines(&invalid, 5),
            Err(DataError::AuthenticationRequired(_))
        ));

        let limited = json!({"status": "error", "code": "rateLimited", "message": "slow down"});
        assert!(matches!(
            parse_headlines(&limited, 5),
            Err(DataError::RateLimited(_))
        ));

        let other = json!({"status": "error", "code": "parametersIncompatible", "message": "nope"});
        assert!(matches!(
            parse_headlines(&other, 5),
            Err(DataError::Other(_))
        ));
    }
}
