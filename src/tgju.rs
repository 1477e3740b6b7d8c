//! TGJU: one flat `ajax.json` payload carries every instrument under
//! `current.<key>`, so a single fetch per cache window serves all currencies.

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
use std::sync::Arc;

const ENDPOINT: &str = "/ajax.json";
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// TGJU instrument key. Every price is quoted in Rial.
pub fn instrument_key(currency: Currency) -> Option<&'static str> {
    let key = match currency {
        Currency::Btc => "btc-irr",
        Currency::Eth => "eth-irr",
        Currency::Usdt => "usdt-irr",
        Currency::Bnb => "crypto-binance-coin-irr",
        Currency::Xrp => "xrp-irr",
        Currency::Ada => "crypto-cardano-irr",
        Currency::Doge => "crypto-dogecoin-irr",
        Currency::Sol => "crypto-solana-irr",
        Currency::Trx => "crypto-tron-irr",
        Currency::Dot => "crypto-polkadot-irr",
        Currency::Ltc => "crypto-litecoin-irr",
        Currency::Shib => "crypto-shiba-inu-irr",
        Currency::Avax => "crypto-avalanche-irr",
        // listed without the -irr suffix upstream
        Currency::Uni => "crypto-uniswap",
        Currency::Link => "crypto-chainlink-irr",

        Currency::Usd => "price_dollar_rl",
        Currency::Eur => "price_eur",
        Currency::Gbp => "price_gbp",
        Currency::Jpy => "usd-jpy-ask",
        Currency::Cny => "usd-cny-ask",
        Currency::Aud => "price_aud",
        Currency::Cad => "usd-cad-ask",
        Currency::Chf => "usd-chf-ask",
        Currency::Aed => "price_aed",
        Currency::Try => "price_try",

        // 18k, per gram
        Currency::Gold => "geram18",
        Currency::Silver => "silver",
        _ => return None,
    };
    Some(key)
}

pub struct TgjuAdapter {
    core: AdapterCore,
}

impl TgjuAdapter {
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

    async fn fetch_price(&self, currency: Currency) -> Result<PriceRecord> {
        let key = instrument_key(currency).ok_or_else(|| self.core.unsupported(currency))?;
        let data = self
            .core
            .cache()
            .remember_payload(None, || self.core.fetch_json(self.core.request(ENDPOINT)))
            .await
            .map_err(|e| e.with_currency(currency))?;

        let instrument = &data["current"][key];
        if !instrument.is_object() {
            return Err(self.core.not_found(currency, key));
        }
        debug!("{} {} -> {}", self.core.name(), currency, instrument);

        let price = optional_price(&instrument["p"])
            .ok_or_else(|| self.core.malformed(currency, "p"))?;
        let timestamp = instrument["ts"]
            .as_str()
            .and_then(|ts| parse_datetime(ts, TIMESTAMP_FORMATS))
            .unwrap_or_else(Utc::now);

        Ok(PriceRecord {
            unit: self.core.unit_or(Some(CurrencyUnit::Irr)),
            symbol: Some(currency.as_str().to_owned()),
            change_24h: optional_price(&instrument["d"]),
            change_percentage_24h: optional_price(&instrument["dp"]),
            high_24h: optional_price(&instrument["h"]),
            low_24h: optional_price(&instrument["l"]),
            timestamp,
            raw: instrument.clone(),
            ..PriceRecord::new(currency, price)
        })
    }
}

impl NamedAdapter for TgjuAdapter {
    fn get_name(&self) -> &str {
        self.core.name()
    }
}

#[async_trait]
impl PriceAdapter for TgjuAdapter {
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
