//! BrsApi: four categorized endpoints, each returning a collection that is
//! searched for the requested instrument. Each category's payload is cached
//! on its own, so many currencies of one category cost one upstream call.

use crate::{
    cache::CacheStore,
    currency::{Currency, CurrencyUnit},
    driver::{optional_price, unix_timestamp, AdapterCore},
    error::{PriceFeedError, Result},
    record::PriceRecord,
    settings::ProviderConfig,
    transport::HttpTransport,
    NamedAdapter, PriceAdapter,
};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Crypto,
    Currency,
    Gold,
    Commodity,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Crypto,
        Category::Currency,
        Category::Gold,
        Category::Commodity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Crypto => "crypto",
            Category::Currency => "currency",
            Category::Gold => "gold",
            Category::Commodity => "commodity",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Category::Crypto => "/Api/Market/Cryptocurrency.php",
            Category::Commodity => "/Api/Market/Commodity.php",
            Category::Gold | Category::Currency => "/Api/Market/Gold_Currency.php",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentKey {
    pub category: Category,
    pub key: &'static str,
}

/// BrsApi category and lookup key for a currency.
pub fn instrument_key(currency: Currency) -> Option<InstrumentKey> {
    let (category, key) = match currency {
        Currency::Btc => (Category::Crypto, "Bitcoin"),
        Currency::Eth => (Category::Crypto, "Ethereum"),
        Currency::Usdt => (Category::Crypto, "Tether"),
        Currency::Bnb => (Category::Crypto, "Binance Coin"),
        Currency::Xrp => (Category::Crypto, "XRP"),
        Currency::Ada => (Category::Crypto, "Cardano"),
        Currency::Doge => (Category::Crypto, "Dogecoin"),
        Currency::Sol => (Category::Crypto, "Solana"),
        Currency::Trx => (Category::Crypto, "TRON"),
        Currency::Dot => (Category::Crypto, "Polkadot"),
        Currency::Ltc => (Category::Crypto, "Litecoin"),
        Currency::Shib => (Category::Crypto, "SHIBA INU"),
        Currency::Avax => (Category::Crypto, "Avalanche"),
        Currency::Uni => (Category::Crypto, "Uniswap"),
        Currency::Link => (Category::Crypto, "Chainlink"),
        Currency::Matic => (Category::Crypto, "Polygon Ecosystem Token"),

        Currency::Usd => (Category::Currency, "USD"),
        Currency::Eur => (Category::Currency, "EUR"),
        Currency::Gbp => (Category::Currency, "GBP"),
        Currency::Jpy => (Category::Currency, "JPY"),
        Currency::Cny => (Category::Currency, "CNY"),
        Currency::Aud => (Category::Currency, "AUD"),
        Currency::Cad => (Category::Currency, "CAD"),
        Currency::Chf => (Category::Currency, "CHF"),
        Currency::Aed => (Category::Currency, "AED"),
        Currency::Try => (Category::Currency, "TRY"),

        Currency::Gold => (Category::Gold, "IR_GOLD_18K"),
        Currency::Silver => (Category::Commodity, "XAGUSD"),
        Currency::Platinum => (Category::Commodity, "XPTUSD"),
        Currency::Palladium => (Category::Commodity, "XPDUSD"),
        _ => return None,
    };
    Some(InstrumentKey { category, key })
}

/// Finds the instrument's entry in a category payload.
///
/// Crypto matches `name_en` exactly and gold matches `symbol` exactly.
/// Currency and commodity symbols carry suffixes upstream, so those match by
/// containment (case-insensitive for commodities).
pub fn find_instrument<'a>(data: &'a Value, instrument: &InstrumentKey) -> Option<&'a Value> {
    let key = instrument.key;
    let (items, field) = match instrument.category {
        Category::Crypto => (data, "name_en"),
        Category::Gold => (&data["gold"], "symbol"),
        Category::Currency => (&data["currency"], "symbol"),
        Category::Commodity => (&data["metal_precious"], "symbol"),
    };
    let lowered = key.to_lowercase();
    items.as_array()?.iter().find(|item| {
        let value = match item[field].as_str() {
            Some(value) => value,
            None => return false,
        };
        match instrument.category {
            Category::Crypto | Category::Gold => value == key,
            Category::Currency => value.contains(key),
            Category::Commodity => value.to_lowercase().contains(&lowered),
        }
    })
}

pub struct BrsapiAdapter {
    core: AdapterCore,
}

impl BrsapiAdapter {
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

    async fn fetch_category(&self, category: Category) -> Result<Value> {
        let mut request = self.core.request(category.endpoint());
        if let Some(key) = self.core.api_key() {
            request = request.query("key", key);
        }
        let data = self.core.fetch_json(request).await?;
        if !(data.is_array() || data.is_object()) {
            return Err(PriceFeedError::upstream(
                self.core.name(),
                "response is neither a list nor an object",
            ));
        }
        Ok(data)
    }

    async fn fetch_price(&self, currency: Currency) -> Result<PriceRecord> {
        let instrument = instrument_key(currency).ok_or_else(|| self.core.unsupported(currency))?;
        let category = instrument.category;
        let data = self
            .core
            .cache()
            .remember_payload(Some(category.as_str()), || self.fetch_category(category))
            .await
            .map_err(|e| e.with_currency(currency))?;

        let item = find_instrument(&data, &instrument).ok_or_else(|| {
            self.core.not_found(
                currency,
                &format!("{} ({})", instrument.key, category.as_str()),
            )
        })?;
        debug!("{} {} -> {}", self.core.name(), currency, item);

        let price_field = match category {
            Category::Crypto if !item["price_toman"].is_null() => &item["price_toman"],
            _ => &item["price"],
        };
        let price = optional_price(price_field).ok_or_else(|| self.core.malformed(currency, "price"))?;

        let change_24h = match category {
            Category::Crypto => None,
            _ => optional_price(&item["change_value"]),
        };
        let market_cap = match category {
            Category::Crypto => optional_price(&item["market_cap"]),
            _ => None,
        };

        Ok(PriceRecord {
            unit: self.core.unit_or(Some(CurrencyUnit::Irt)),
            symbol: Some(currency.as_str().to_owned()),
            change_24h,
            change_percentage_24h: optional_price(&item["change_percent"]),
            market_cap,
            timestamp: unix_timestamp(&item["time_unix"]).unwrap_or_else(Utc::now),
            raw: item.clone(),
            ..PriceRecord::new(currency, price)
        })
    }
}

impl NamedAdapter for BrsapiAdapter {
    fn get_name(&self) -> &str {
        self.core.name()
    }
}

#[async_trait]
impl PriceAdapter for BrsapiAdapter {
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
