//! Single entry point for price lookups across all configured adapters.

use crate::{
    cache::{facade_key, remember, CacheStore, MemoryCache},
    currency::Currency,
    error::{PriceFeedError, Result},
    record::PriceRecord,
    registry::FeedRegistry,
    settings::FeedSettings,
    transport::{HttpTransport, ReqwestTransport},
    PriceAdapter,
};
use log::info;
use std::{collections::BTreeMap, sync::Arc, time::Duration};

pub struct PriceFeed {
    registry: FeedRegistry,
    store: Arc<dyn CacheStore>,
}

impl PriceFeed {
    pub fn new(
        settings: FeedSettings,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self> {
        Ok(Self {
            registry: FeedRegistry::new(settings, transport, store.clone())?,
            store,
        })
    }

    /// reqwest transport with the default retry and a private in-memory cache.
    pub fn with_settings(settings: FeedSettings) -> Result<Self> {
        let transport = ReqwestTransport::build()
            .map_err(|e| PriceFeedError::Settings(format!("cannot build HTTP client: {}", e)))?;
        Self::new(settings, Arc::new(transport), Arc::new(MemoryCache::new()))
    }

    pub fn registry(&self) -> &FeedRegistry {
        &self.registry
    }

    pub fn adapter(&self, name: Option<&str>) -> Result<Arc<dyn PriceAdapter>> {
        self.registry.resolve(name)
    }

    fn adapter_name<'a>(&'a self, name: Option<&'a str>) -> &'a str {
        name.unwrap_or_else(|| self.registry.default_adapter())
    }

    pub async fn get_price(&self, currency: Currency, adapter: Option<&str>) -> Result<PriceRecord> {
        let name = self.adapter_name(adapter);
        let driver = self.registry.resolve(Some(name))?;
        if !driver.supports(currency) {
            return Err(PriceFeedError::UnsupportedCurrency {
                adapter: name.to_owned(),
                currency,
            });
        }

        let cache = &self.registry.settings().cache;
        if !cache.enabled {
            return driver.get_price(currency).await;
        }
        let key = facade_key(&cache.prefix, name, currency);
        remember(
            self.store.as_ref(),
            &key,
            Duration::from_secs(cache.ttl),
            || driver.get_price(currency),
        )
        .await
    }

    /// Delegates to the adapter as-is: no support check, no facade cache,
    /// and the first failing currency fails the batch.
    pub async fn get_prices(
        &self,
        currencies: &[Currency],
        adapter: Option<&str>,
    ) -> Result<BTreeMap<Currency, PriceRecord>> {
        self.registry.resolve(adapter)?.get_prices(currencies).await
    }

    pub async fn get_prices_settled(
        &self,
        currencies: &[Currency],
        adapter: Option<&str>,
    ) -> Result<BTreeMap<Currency, Result<PriceRecord>>> {
        Ok(self
            .registry
            .resolve(adapter)?
            .get_prices_settled(currencies)
            .await)
    }

    pub fn get_supported_currencies(&self, adapter: Option<&str>) -> Result<Vec<Currency>> {
        Ok(self
            .registry
            .resolve(adapter)?
            .get_supported_currencies()
            .to_vec())
    }

    pub fn list_adapters(&self) -> Vec<String> {
        self.registry.adapter_names()
    }

    /// Cache invalidation at three scopes:
    /// - currency and adapter: that pair's cached records only;
    /// - adapter only: every known currency of that adapter, plus its raw payloads;
    /// - no adapter: flush the whole store, including unrelated entries sharing it.
    pub fn clear_cache(&self, currency: Option<Currency>, adapter: Option<&str>) -> Result<()> {
        let prefix = &self.registry.settings().cache.prefix;
        match (currency, adapter) {
            (_, None) => {
                info!("flushing price cache");
                self.store.flush();
            }
            (Some(currency), Some(name)) => {
                self.store.forget(&facade_key(prefix, name, currency));
                self.registry.forget_adapter_entries(name, Some(currency))?;
            }
            (None, Some(name)) => {
                for &currency in Currency::cases() {
                    self.store.forget(&facade_key(prefix, name, currency));
                }
                self.registry.forget_adapter_entries(name, None)?;
            }
        }
        Ok(())
    }
}
