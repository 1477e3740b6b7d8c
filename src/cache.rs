use crate::{currency::Currency, error::Result};
use log::{debug, warn};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

/// Shared key/value store with per-entry expiry.
///
/// The store is handed to every component at construction and may be shared
/// with unrelated users, so `flush` really does drop everything.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value, ttl: Duration);
    fn forget(&self, key: &str) -> bool;
    fn flush(&self);
}

pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: Value,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Also sweeps out every expired entry.
    fn put(&self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_owned(),
            CacheEntry {
                value,
                expires_at: now.checked_add(ttl),
            },
        );
    }

    fn forget(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    fn flush(&self) {
        self.entries.lock().clear();
    }
}

/// Returns the cached value for `key`, or computes, stores and returns it.
///
/// Nothing is written when `compute` fails. An entry that no longer
/// deserializes as `T` counts as a miss.
pub async fn remember<T, F, Fut>(
    store: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Some(cached) = store.get(key) {
        match serde_json::from_value(cached) {
            Ok(value) => {
                debug!("cache hit {}", key);
                return Ok(value);
            }
            Err(err) => warn!("discarding unreadable cache entry {}: {}", key, err),
        }
    }
    debug!("cache miss {}", key);
    let value = compute().await?;
    match serde_json::to_value(&value) {
        Ok(encoded) => store.put(key, encoded, ttl),
        Err(err) => warn!("not caching {}: {}", key, err),
    }
    Ok(value)
}

/// Key of an adapter's parsed record for one currency.
pub fn record_key(prefix: &str, adapter: &str, currency: Currency) -> String {
    format!("{}:{}:{}", prefix, adapter, currency)
}

/// Key of an adapter's raw upstream payload, optionally per category.
pub fn payload_key(prefix: &str, adapter: &str, category: Option<&str>) -> String {
    match category {
        Some(category) => format!("{}:{}:{}:api_response", prefix, adapter, category),
        None => format!("{}:{}:api_response", prefix, adapter),
    }
}

/// Key of the facade-level record cache.
pub fn facade_key(prefix: &str, adapter: &str, currency: Currency) -> String {
    format!("{}.{}.{}", prefix, adapter, currency)
}

/// Caching policy of a single adapter: on/off, TTL and key namespace.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    enabled: bool,
    ttl: Duration,
    prefix: String,
    adapter: String,
}

impl ResponseCache {
    pub fn new(
        store: Arc<dyn CacheStore>,
        enabled: bool,
        ttl: Duration,
        prefix: &str,
        adapter: &str,
    ) -> Self {
        Self {
            store,
            enabled,
            ttl,
            prefix: prefix.to_owned(),
            adapter: adapter.to_owned(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Memoizes a parsed record under `(prefix, adapter, currency)`.
    pub async fn remember_record<T, F, Fut>(&self, currency: Currency, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.enabled {
            return compute().await;
        }
        let key = record_key(&self.prefix, &self.adapter, currency);
        remember(self.store.as_ref(), &key, self.ttl, compute).await
    }

    /// Memoizes a raw upstream payload under `(prefix, adapter, category)`.
    pub async fn remember_payload<F, Fut>(&self, category: Option<&str>, compute: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if !self.enabled {
            return compute().await;
        }
        let key = payload_key(&self.prefix, &self.adapter, category);
        remember(self.store.as_ref(), &key, self.ttl, compute).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(cache: &MemoryCache) -> usize {
        cache.entries.lock().len()
    }

    #[test]
    fn test_put_sweeps_expired_entries() {
        let cache = MemoryCache::new();
        cache.put("stale:a", json!(1), Duration::ZERO);
        cache.put("stale:b", json!(2), Duration::ZERO);
        assert_eq!(stored(&cache), 1);
        assert!(cache.is_empty());

        cache.put("fresh", json!(3), Duration::from_secs(60));
        assert_eq!(stored(&cache), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(json!(3)));
    }

    #[test]
    fn test_ttl_beyond_instant_range_never_expires() {
        let cache = MemoryCache::new();
        cache.put("forever", json!("kept"), Duration::MAX);
        cache.put("other", json!(1), Duration::from_secs(u64::MAX));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("forever"), Some(json!("kept")));
        assert!(cache.forget("forever"));
        assert!(!cache.contains("forever"));
    }
}
