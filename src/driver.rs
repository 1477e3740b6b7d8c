//! Plumbing shared by every provider adapter: request building, the JSON
//! fetch, and the lenient numeric/timestamp parsing upstream data needs.

use crate::{
    cache::{CacheStore, ResponseCache},
    currency::{Currency, CurrencyUnit},
    error::{PriceFeedError, Result},
    settings::ProviderConfig,
    transport::{HttpRequest, HttpTransport},
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::info;
use serde_json::Value;
use std::sync::Arc;

pub struct AdapterCore {
    name: String,
    config: ProviderConfig,
    transport: Arc<dyn HttpTransport>,
    cache: ResponseCache,
}

impl AdapterCore {
    pub fn new(
        name: &str,
        config: ProviderConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        let cache = ResponseCache::new(
            store,
            config.cache_enabled,
            config.ttl(),
            &config.cache_prefix,
            name,
        );
        Self {
            name: name.to_owned(),
            config,
            transport,
            cache,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn currencies(&self) -> &[Currency] {
        &self.config.currencies
    }

    /// Configured unit, falling back to what the provider quotes in.
    pub fn unit_or(&self, fallback: Option<CurrencyUnit>) -> Option<CurrencyUnit> {
        self.config.options.unit.or(fallback)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// GET request for `path` under the configured base URL.
    pub fn request(&self, path: &str) -> HttpRequest {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        HttpRequest::get(url, self.config.timeout())
    }

    /// Performs `request` and decodes the body as JSON. Non-success statuses
    /// and undecodable bodies are upstream errors.
    pub async fn fetch_json(&self, request: HttpRequest) -> Result<Value> {
        info!("{} GET {}", self.name, request.url);
        let response = self
            .transport
            .get(&request)
            .await
            .map_err(|e| PriceFeedError::transport(&self.name, e))?;
        if !response.is_success() {
            return Err(PriceFeedError::upstream(
                &self.name,
                format!("HTTP {}: {}", response.status, excerpt(&response.body)),
            ));
        }
        serde_json::from_str(&response.body).map_err(|e| {
            PriceFeedError::upstream(&self.name, format!("response is not valid JSON: {}", e))
        })
    }

    pub fn unsupported(&self, currency: Currency) -> PriceFeedError {
        PriceFeedError::UnsupportedCurrency {
            adapter: self.name.clone(),
            currency,
        }
    }

    pub fn not_found(&self, currency: Currency, key: &str) -> PriceFeedError {
        PriceFeedError::Upstream {
            adapter: self.name.clone(),
            currency: Some(currency),
            message: format!("instrument {} not found in response", key),
            source: None,
        }
    }

    pub fn malformed(&self, currency: Currency, field: &'static str) -> PriceFeedError {
        PriceFeedError::MalformedData {
            adapter: self.name.clone(),
            currency,
            field,
        }
    }
}

fn excerpt(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.chars().count() <= LIMIT {
        body.to_owned()
    } else {
        format!("{}...", body.chars().take(LIMIT).collect::<String>())
    }
}

/// Lenient numeric parse for price-like fields.
///
/// Grouping commas are stripped ("1,125,050,000" is 1125050000.0). Null,
/// empty and unparseable values become 0.0 rather than an error.
pub fn parse_price(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => parse_price_str(text),
        _ => 0.0,
    }
}

pub fn parse_price_str(text: &str) -> f64 {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// `None` for an absent or null field, otherwise `parse_price`. Required
/// price fields use this to tell "missing" apart from "soft zero".
///
/// Optional record fields (high, low, change) go through here too, so a
/// field the provider leaves out or sends as null stays `None` instead of
/// being reported as a 0.0 change or range.
pub fn optional_price(value: &Value) -> Option<f64> {
    if value.is_null() {
        None
    } else {
        Some(parse_price(value))
    }
}

/// Parses a naive date-time with the first matching format, read as UTC.
pub fn parse_datetime(text: &str, formats: &[&str]) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Unix seconds, given as a number or a numeric string. Fractional
/// seconds are truncated.
pub fn unix_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let seconds = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }?;
    Utc.timestamp_opt(seconds, 0).single()
}
