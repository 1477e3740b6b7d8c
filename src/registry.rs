use crate::{
    brsapi::{self, BrsapiAdapter},
    cache::{payload_key, record_key, CacheStore},
    currency::Currency,
    error::{PriceFeedError, Result},
    goldapi::{self, GoldApiAdapter},
    settings::{FeedSettings, ProviderConfig},
    tgju::{self, TgjuAdapter},
    tgn::{self, TgnAdapter},
    transport::HttpTransport,
    PriceAdapter,
};
use log::info;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};

/// The closed set of provider implementations a config entry can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    Brsapi,
    GoldApi,
    Tgju,
    Tgn,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 4] = [
        AdapterKind::Brsapi,
        AdapterKind::GoldApi,
        AdapterKind::Tgju,
        AdapterKind::Tgn,
    ];

    /// Whether the implementation's key-map can price `currency`.
    pub fn covers(self, currency: Currency) -> bool {
        match self {
            AdapterKind::Brsapi => brsapi::instrument_key(currency).is_some(),
            AdapterKind::GoldApi => goldapi::instrument_key(currency).is_some(),
            AdapterKind::Tgju => tgju::instrument_key(currency).is_some(),
            AdapterKind::Tgn => tgn::instrument_key(currency).is_some(),
        }
    }

    /// Categories under which the implementation caches raw payloads.
    pub fn payload_categories(self) -> Vec<Option<&'static str>> {
        match self {
            AdapterKind::Brsapi => brsapi::Category::ALL
                .iter()
                .map(|c| Some(c.as_str()))
                .collect(),
            AdapterKind::Tgju | AdapterKind::Tgn => vec![None],
            AdapterKind::GoldApi => Vec::new(),
        }
    }

    pub fn build(
        self,
        name: &str,
        config: ProviderConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CacheStore>,
    ) -> Arc<dyn PriceAdapter> {
        match self {
            AdapterKind::Brsapi => Arc::new(BrsapiAdapter::new(name, config, transport, store)),
            AdapterKind::GoldApi => Arc::new(GoldApiAdapter::new(name, config, transport, store)),
            AdapterKind::Tgju => Arc::new(TgjuAdapter::new(name, config, transport, store)),
            AdapterKind::Tgn => Arc::new(TgnAdapter::new(name, config, transport, store)),
        }
    }
}

/// Configured adapters, built on first use and kept for the registry's life.
pub struct FeedRegistry {
    settings: FeedSettings,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn CacheStore>,
    instances: Mutex<HashMap<String, Arc<dyn PriceAdapter>>>,
}

impl FeedRegistry {
    pub fn new(
        settings: FeedSettings,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            transport,
            store,
            instances: Mutex::new(HashMap::new()),
        })
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    pub fn default_adapter(&self) -> &str {
        &self.settings.default
    }

    pub fn adapter_names(&self) -> Vec<String> {
        self.settings.adapters.keys().cloned().collect()
    }

    /// The named adapter, or the default one when `name` is `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn PriceAdapter>> {
        let name = name.unwrap_or(&self.settings.default);
        let mut instances = self.instances.lock();
        if let Some(adapter) = instances.get(name) {
            return Ok(adapter.clone());
        }
        let config = self
            .settings
            .adapter(name)
            .ok_or_else(|| PriceFeedError::AdapterNotFound(name.to_owned()))?;
        info!("building adapter [{}] ({:?})", name, config.driver);
        let adapter = config.driver.build(
            name,
            config.clone(),
            self.transport.clone(),
            self.store.clone(),
        );
        instances.insert(name.to_owned(), adapter.clone());
        Ok(adapter)
    }

    /// Drops the adapter's own cached records (every known currency) and its
    /// cached raw payloads.
    pub fn forget_adapter_entries(&self, name: &str, currency: Option<Currency>) -> Result<()> {
        let config = self
            .settings
            .adapter(name)
            .ok_or_else(|| PriceFeedError::AdapterNotFound(name.to_owned()))?;
        let prefix = &config.cache_prefix;
        match currency {
            Some(currency) => {
                self.store.forget(&record_key(prefix, name, currency));
            }
            None => {
                for &currency in Currency::cases() {
                    self.store.forget(&record_key(prefix, name, currency));
                }
                for category in config.driver.payload_categories() {
                    self.store.forget(&payload_key(prefix, name, category));
                }
            }
        }
        Ok(())
    }
}
