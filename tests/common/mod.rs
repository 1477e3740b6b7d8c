#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use price_feed::{
    cache::{CacheStore, MemoryCache},
    transport::{HttpRequest, HttpResponse, HttpTransport, TransportError},
    AdapterKind, ProviderConfig,
};
use std::sync::Arc;

/// Canned upstream: answers by URL suffix and records every request.
pub struct MockTransport {
    routes: Mutex<Vec<(String, HttpResponse)>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn route(&self, suffix: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .push((suffix.to_owned(), HttpResponse::new(status, body)));
    }

    pub fn json(&self, suffix: &str, body: serde_json::Value) {
        self.route(suffix, 200, &body.to_string());
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_to(&self, suffix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().push(request.clone());
        let routes = self.routes.lock();
        let response = routes
            .iter()
            .find(|(suffix, _)| request.url.ends_with(suffix.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| HttpResponse::new(404, "no route"));
        Ok(response)
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn store() -> Arc<MemoryCache> {
    Arc::new(MemoryCache::new())
}

pub fn as_store(store: &Arc<MemoryCache>) -> Arc<dyn CacheStore> {
    store.clone()
}

pub fn config(driver: AdapterKind, base_url: &str, currencies: &[price_feed::Currency]) -> ProviderConfig {
    let mut config = ProviderConfig::new(driver, base_url);
    config.currencies = currencies.to_vec();
    config
}
