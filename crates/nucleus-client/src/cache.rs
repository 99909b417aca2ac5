// Cache store seam and single-flight layer
//
// CacheStore is the pluggable get/put/forget capability; hosts can back
// it with Redis or memcached, the library ships a process-local map.
// SharedCache adds get-or-compute with per-key coalescing: concurrent
// misses on one key collapse to a single upstream fetch and the waiters
// read the stored value. Failed computes are not cached; the next caller
// retries upstream.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Pluggable cache capability with TTL semantics
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry, or None when absent or expired
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store a value for at most `ttl`
    async fn put(&self, key: &str, value: Value, ttl: Duration);

    /// Drop an entry immediately
    async fn forget(&self, key: &str);
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Process-local cache store
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn forget(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// Get-or-compute layer with per-key single-flight coalescing
pub struct SharedCache {
    store: Arc<dyn CacheStore>,
    flights: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SharedCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            flights: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// The backing store
    pub fn store(&self) -> Arc<dyn CacheStore> {
        Arc::clone(&self.store)
    }

    /// Return the cached value for `key`, or run `compute` and cache its
    /// success for `ttl`.
    ///
    /// Concurrent callers missing on the same key serialize on a per-key
    /// gate; whoever wins fetches once and the rest observe the stored
    /// value. An Err from `compute` is returned as-is and leaves the key
    /// empty.
    pub async fn remember<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(hit) = self.store.get(key).await {
            return Ok(hit);
        }

        let gate = {
            let mut flights = self.flights.lock().await;
            Arc::clone(
                flights
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        let _guard = gate.lock().await;

        // Another flight may have filled the key while we waited
        if let Some(hit) = self.store.get(key).await {
            self.release(key, &gate).await;
            return Ok(hit);
        }

        let result = compute().await;
        if let Ok(value) = &result {
            self.store.put(key, value.clone(), ttl).await;
        }
        self.release(key, &gate).await;
        result
    }

    /// Drop a cached entry
    pub async fn forget(&self, key: &str) {
        self.store.forget(key).await;
        self.flights.lock().await.remove(key);
    }

    // Retire the gate once the flight is over so the map does not grow
    // with every distinct key. Only removes our own gate; a newer one
    // created after a `forget` belongs to a live flight.
    async fn release(&self, key: &str, gate: &Arc<tokio::sync::Mutex<()>>) {
        let mut flights = self.flights.lock().await;
        if flights.get(key).is_some_and(|current| Arc::ptr_eq(current, gate)) {
            flights.remove(key);
        }
    }

    #[cfg(test)]
    async fn flight_count(&self) -> usize {
        self.flights.lock().await.len()
    }
}
