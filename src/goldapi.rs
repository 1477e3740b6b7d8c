//! GoldAPI precious-metals index: one request per metal, `/{symbol}/{base}`,
//! authenticated with the `x-access-token` header.

use crate::{
    cache::CacheStore,
    currency::{Currency, CurrencyUnit},
    driver::{optional_price, unix_timestamp, AdapterCore},
    error::Result,
    record::PriceRecord,
    settings::ProviderConfig,
    transport::HttpTransport,
    NamedAdapter, PriceAdapter,
};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::sync::Arc;

const DEFAULT_BASE_CURRENCY: &str = "USD";

pub fn instrument_key(currency: Currency) -> Option<&'static str> {
    match currency {
        Currency::Gold | Currency::GoldOunce => Some("XAU"),
        Currency::Silver => Some("XAG"),
        Currency::Platinum => Some("XPT"),
        Currency::Palladium => Some("XPD"),
        _ => None,
    }
}

pub struct GoldApiAdapter {
    core: AdapterCore,
}

impl GoldApiAdapter {
    pub fn new(
        name: &str,
        config: ProviderConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            core: AdapterCore::new(name, config, transport, store),
        }
    }

    fn base_currency(&self) -> &str {
        self.core
            .config()
            .options
            .base_currency
            .as_deref()
            .unwrap_or(DEFAULT_BASE_CURRENCY)
    }

    async fn fetch_price(&self, currency: Currency) -> Result<PriceRecord> {
        let symbol = instrument_key(currency).ok_or_else(|| self.core.unsupported(currency))?;
        let mut request = self
            .core
            .request(&format!("/{}/{}", symbol, self.base_currency()));
        if let Some(token) = self.core.api_key() {
            request = request.header("x-access-token", token);
        }
        let data = self
            .core
            .fetch_json(request)
            .await
            .map_err(|e| e.with_currency(currency))?;
        debug!("{} {} -> {}", self.core.name(), currency, data);

        if !data.is_object() {
            return Err(self.core.not_found(currency, symbol));
        }
        let price = optional_price(&data["price"])
            .ok_or_else(|| self.core.malformed(currency, "price"))?;

        Ok(PriceRecord {
            unit: self
                .core
                .unit_or(CurrencyUnit::from_code(self.base_currency())),
            symbol: Some(symbol.to_owned()),
            change_24h: optional_price(&data["ch"]),
            change_percentage_24h: optional_price(&data["chp"]),
            high_24h: optional_price(&data["high_price"]),
            low_24h: optional_price(&data["low_price"]),
            timestamp: unix_timestamp(&data["timestamp"]).unwrap_or_else(Utc::now),
            raw: data,
            ..PriceRecord::new(currency, price)
        })
    }
}

impl NamedAdapter for GoldApiAdapter {
    fn get_name(&self) -> &str {
        self.core.name()
    }
}

#[async_trait]
impl PriceAdapter for GoldApiAdapter {
    async fn get_price(&self, currency: Currency) -> Result<PriceRecord> {
        self.core
            .cache()
            .remember_record(currency, || self.fetch_price(currency))
            .await
    }

    fn get_supported_currencies(&self) -> &[Currency] {
        self.core.currencies()
    }
}
