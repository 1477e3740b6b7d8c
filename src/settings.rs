//! Feed configuration: per-adapter provider settings plus the facade cache.
//!
//! Settings start from the built-in provider table, then an optional TOML or
//! JSON file is layered on top, then `PRICE_FEED_*` environment variables
//! (nested keys separated by `__`, e.g. `PRICE_FEED_ADAPTERS__BRSAPI__API_KEY`).

use crate::{
    currency::{Currency, CurrencyUnit},
    error::{PriceFeedError, Result},
    registry::AdapterKind,
};
use config::{Config, Environment, File};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::{collections::BTreeMap, time::Duration};

fn default_true() -> bool {
    true
}

fn default_ttl() -> u64 {
    60
}

fn default_prefix() -> String {
    "price_feed".to_owned()
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub driver: AdapterKind,
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
    /// Seconds.
    #[serde(default = "default_ttl")]
    pub cache_ttl: u64,
    #[serde(default = "default_prefix")]
    pub cache_prefix: String,
    /// Declared coverage; authoritative for `supports`.
    #[serde(default)]
    pub currencies: Vec<Currency>,
    #[serde(default)]
    pub options: ProviderOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOptions {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub base_currency: Option<String>,
    #[serde(default)]
    pub unit: Option<CurrencyUnit>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            base_currency: None,
            unit: None,
        }
    }
}

impl ProviderConfig {
    pub fn new(driver: AdapterKind, base_url: &str) -> Self {
        Self {
            driver,
            base_url: base_url.to_owned(),
            api_key: None,
            username: None,
            cache_enabled: true,
            cache_ttl: default_ttl(),
            cache_prefix: default_prefix(),
            currencies: Vec::new(),
            options: ProviderOptions::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.options.timeout)
    }

    /// Declared currencies the adapter's key-map cannot price.
    pub fn uncovered_currencies(&self) -> Vec<Currency> {
        self.currencies
            .iter()
            .copied()
            .filter(|c| !self.driver.covers(*c))
            .collect()
    }
}

/// Facade-level record cache, sitting above each adapter's own cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacadeCacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_ttl")]
    pub ttl: u64,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for FacadeCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl: default_ttl(),
            prefix: default_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSettings {
    pub default: String,
    #[serde(default)]
    pub adapters: BTreeMap<String, ProviderConfig>,
    #[serde(default)]
    pub cache: FacadeCacheConfig,
    /// Reject declared currencies missing from an adapter's key-map instead
    /// of only warning about them.
    #[serde(default)]
    pub strict_coverage: bool,
}

impl Default for FeedSettings {
    fn default() -> Self {
        let mut adapters = BTreeMap::new();

        let mut brsapi = ProviderConfig::new(AdapterKind::Brsapi, "https://brsapi.ir");
        brsapi.cache_ttl = 120;
        brsapi.currencies = Currency::cryptocurrencies()
            .iter()
            .chain(&[
                Currency::Usd,
                Currency::Eur,
                Currency::Gbp,
                Currency::Jpy,
                Currency::Cny,
                Currency::Aud,
                Currency::Cad,
                Currency::Chf,
                Currency::Aed,
                Currency::Try,
                Currency::Gold,
                Currency::Silver,
                Currency::Platinum,
                Currency::Palladium,
            ])
            .copied()
            .collect();
        adapters.insert("brsapi".to_owned(), brsapi);

        let mut goldapi = ProviderConfig::new(AdapterKind::GoldApi, "https://www.goldapi.io/api");
        goldapi.cache_ttl = 300;
        goldapi.currencies = vec![
            Currency::Gold,
            Currency::Silver,
            Currency::Platinum,
            Currency::Palladium,
        ];
        goldapi.options.base_currency = Some("USD".to_owned());
        adapters.insert("goldapi".to_owned(), goldapi);

        let mut tgju = ProviderConfig::new(AdapterKind::Tgju, "https://call5.tgju.org");
        tgju.cache_ttl = 120;
        tgju.currencies = vec![
            Currency::Usd,
            Currency::Eur,
            Currency::Gbp,
            Currency::Jpy,
            Currency::Cny,
            Currency::Aud,
            Currency::Cad,
            Currency::Chf,
            Currency::Aed,
            Currency::Try,
            Currency::Gold,
            Currency::Silver,
        ];
        adapters.insert("tgju".to_owned(), tgju);

        Self {
            default: "tgju".to_owned(),
            adapters,
            cache: FacadeCacheConfig::default(),
            strict_coverage: false,
        }
    }
}

impl FeedSettings {
    /// Built-in defaults, then `path` (if given), then the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut settings = Config::new();
        let defaults = serde_json::to_value(FeedSettings::default())
            .map_err(|e| PriceFeedError::Settings(e.to_string()))?;
        set_defaults(&mut settings, "", &defaults)?;
        if let Some(path) = path {
            settings.merge(File::with_name(path))?;
        }
        settings.merge(Environment::with_prefix("PRICE_FEED").separator("__"))?;
        let loaded = settings.try_into::<FeedSettings>()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn adapter(&self, name: &str) -> Option<&ProviderConfig> {
        self.adapters.get(name)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.adapters.contains_key(&self.default) {
            return Err(PriceFeedError::Settings(format!(
                "default adapter [{}] is not configured",
                self.default
            )));
        }
        for (name, provider) in &self.adapters {
            if provider.base_url.trim().is_empty() {
                return Err(PriceFeedError::Settings(format!(
                    "adapter [{}] has no base_url",
                    name
                )));
            }
            let uncovered = provider.uncovered_currencies();
            if uncovered.is_empty() {
                continue;
            }
            let listed = uncovered
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if self.strict_coverage {
                return Err(PriceFeedError::Settings(format!(
                    "adapter [{}] declares currencies it cannot price: {}",
                    name, listed
                )));
            }
            warn!(
                "adapter [{}] declares currencies it cannot price: {}",
                name, listed
            );
        }
        Ok(())
    }
}

/// Registers every leaf of `value` as a config default. Arrays are set
/// whole so a file listing fewer currencies replaces the built-in list.
fn set_defaults(settings: &mut Config, path: &str, value: &Json) -> Result<()> {
    match value {
        Json::Object(fields) => {
            for (key, field) in fields {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                set_defaults(settings, &child, field)?;
            }
        }
        Json::Null => {}
        leaf => {
            if let Some(converted) = config_value(leaf) {
                settings.set_default(path, converted)?;
            }
        }
    }
    Ok(())
}

fn config_value(value: &Json) -> Option<config::Value> {
    match value {
        Json::Bool(flag) => Some(config::Value::from(*flag)),
        Json::Number(number) => number
            .as_i64()
            .map(config::Value::from)
            .or_else(|| number.as_f64().map(config::Value::from)),
        Json::String(text) => Some(config::Value::from(text.clone())),
        Json::Array(items) => Some(config::Value::from(
            items.iter().filter_map(config_value).collect::<Vec<_>>(),
        )),
        Json::Null | Json::Object(_) => None,
    }
}
