//! TGN: a single flat object keyed by provider field names, with credentials
//! embedded in the request path and a shared `TimeRead` stamp.

use crate::{
    cache::CacheStore,
    currency::{Currency, CurrencyUnit},
    driver::{optional_price, parse_datetime, AdapterCore},
    error::Result,
    record::PriceRecord,
    settings::ProviderConfig,
    transport::HttpTransport,
    NamedAdapter, PriceAdapter,
};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use serde_json::{json, Value};
use std::sync::Arc;

const TIME_FIELD: &str = "TimeRead";
const TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

pub fn instrument_key(currency: Currency) -> Option<&'static str> {
    let key = match currency {
        Currency::Usd => "Dollar",
        Currency::Eur => "Euro",
        Currency::Aed => "Derham",

        Currency::GoldOunce => "OunceTala",
        Currency::IrGold18 => "YekGram18",
        Currency::IrCoin1g => "SekehGerami",
        Currency::IrCoinQuarter => "SekehRob",
        Currency::IrCoinHalf => "SekehNim",
        Currency::IrCoinEmami => "SekehEmam",
        Currency::IrCoinBahar => "SekehTamam",
        _ => return None,
    };
    Some(key)
}

pub struct TgnAdapter {
    core: AdapterCore,
}

impl TgnAdapter {
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

    async fn fetch_payload(&self) -> Result<Value> {
        let username = self.core.config().username.as_deref().unwrap_or_default();
        let api_key = self.core.api_key().unwrap_or_default();
        let request = self
            .core
            .request(&format!("/Pr/Get/{}/{}", username, api_key));
        self.core.fetch_json(request).await
    }

    async fn fetch_price(&self, currency: Currency) -> Result<PriceRecord> {
        let key = instrument_key(currency).ok_or_else(|| self.core.unsupported(currency))?;
        let data = self
            .core
            .cache()
            .remember_payload(None, || self.fetch_payload())
            .await
            .map_err(|e| e.with_currency(currency))?;

        let field = data
            .get(key)
            .ok_or_else(|| self.core.not_found(currency, key))?;
        debug!("{} {} -> {}", self.core.name(), currency, field);
        let price = optional_price(field).ok_or_else(|| self.core.malformed(currency, "price"))?;

        let time_read = &data[TIME_FIELD];
        let timestamp = time_read
            .as_str()
            .and_then(|ts| parse_datetime(ts, &[TIME_FORMAT]))
            .unwrap_or_else(Utc::now);

        Ok(PriceRecord {
            unit: self.core.unit_or(Some(CurrencyUnit::Irr)),
            symbol: Some(currency.as_str().to_owned()),
            timestamp,
            raw: json!({ key: field, TIME_FIELD: time_read }),
            ..PriceRecord::new(currency, price)
        })
    }
}

impl NamedAdapter for TgnAdapter {
    fn get_name(&self) -> &str {
        self.core.name()
    }
}

#[async_trait]
impl PriceAdapter for TgnAdapter {
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
