pub mod brsapi;
pub mod cache;
pub mod currency;
pub mod driver;
pub mod error;
pub mod feed;
pub mod goldapi;
pub mod record;
pub mod registry;
pub mod settings;
pub mod tgju;
pub mod tgn;
pub mod transport;

use std::collections::BTreeMap;

use async_trait::async_trait;

pub use crate::currency::{Currency, CurrencyUnit};
pub use crate::error::{PriceFeedError, Result};
pub use crate::feed::PriceFeed;
pub use crate::record::PriceRecord;
pub use crate::registry::{AdapterKind, FeedRegistry};
pub use crate::settings::{FeedSettings, ProviderConfig};

pub trait NamedAdapter {
    /// Stable adapter identifier, also part of every cache key.
    fn get_name(&self) -> &str;
}

#[async_trait]
pub trait PriceAdapter: NamedAdapter + Send + Sync {
    async fn get_price(&self, currency: Currency) -> Result<PriceRecord>;

    /// Declared coverage from configuration, not probed upstream.
    fn get_supported_currencies(&self) -> &[Currency];

    fn supports(&self, currency: Currency) -> bool {
        self.get_supported_currencies().contains(&currency)
    }

    /// Prices each currency in turn; the first failure aborts the batch.
    async fn get_prices(&self, currencies: &[Currency]) -> Result<BTreeMap<Currency, PriceRecord>> {
        let mut prices = BTreeMap::new();
        for &currency in currencies {
            prices.insert(currency, self.get_price(currency).await?);
        }
        Ok(prices)
    }

    /// Like `get_prices`, but keeps going and reports each currency's outcome.
    async fn get_prices_settled(
        &self,
        currencies: &[Currency],
    ) -> BTreeMap<Currency, Result<PriceRecord>> {
        let mut prices = BTreeMap::new();
        for &currency in currencies {
            prices.insert(currency, self.get_price(currency).await);
        }
        prices
    }
}
