// Capability registry
//
// Durable mapping of data type -> capability entry, persisted in the
// cache store under one well-known key with a 30-day retention so it
// survives process restarts. Writes are read-modify-write under a single
// async mutex so two writers cannot interleave on the backing key.

use nucleus_contracts::{CapabilityEntry, CapabilityStatus};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::cache::CacheStore;

/// Well-known persistence key for the capability map
pub const CAPABILITIES_CACHE_KEY: &str = "brain_client_capabilities";

const CAPABILITY_RETENTION: Duration = Duration::from_secs(30 * 24 * 3600);

type CapabilityMap = BTreeMap<String, CapabilityEntry>;

pub struct CapabilityRegistry {
    store: Arc<dyn CacheStore>,
    write_lock: tokio::sync::Mutex<()>,
}

impl CapabilityRegistry {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// True only when an entry exists with status `active`.
    /// `ready` and `pending` entries do not count.
    pub async fn has_capability(&self, name: &str) -> bool {
        self.load()
            .await
            .get(name)
            .map(|entry| entry.status == CapabilityStatus::Active)
            .unwrap_or(false)
    }

    pub async fn get_capability(&self, name: &str) -> Option<CapabilityEntry> {
        self.load().await.remove(name)
    }

    pub async fn get_all(&self) -> CapabilityMap {
        self.load().await
    }

    /// Merge entries by data type; last write wins, entries absent from
    /// the batch are kept.
    pub async fn register(&self, entries: Vec<CapabilityEntry>) {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await;
        for entry in entries {
            map.insert(entry.data_type.clone(), entry);
        }
        self.save(&map).await;
    }

    /// Update the status of a known entry; unknown names are ignored
    pub async fn update_status(&self, name: &str, status: CapabilityStatus) {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await;
        if let Some(entry) = map.get_mut(name) {
            entry.status = status;
            self.save(&map).await;
        }
    }

    /// Drop every capability from the backing store
    pub async fn clear(&self) {
        let _guard = self.write_lock.lock().await;
        self.store.forget(CAPABILITIES_CACHE_KEY).await;
    }

    async fn load(&self) -> CapabilityMap {
        match self.store.get(CAPABILITIES_CACHE_KEY).await {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "capability cache entry was malformed, resetting");
                CapabilityMap::new()
            }),
            None => CapabilityMap::new(),
        }
    }

    async fn save(&self, map: &CapabilityMap) {
        match serde_json::to_value(map) {
            Ok(value) => {
                self.store
                    .put(CAPABILITIES_CACHE_KEY, value, CAPABILITY_RETENTION)
                    .await;
            }
            Err(e) => warn!(error = %e, "failed to serialize capability map"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheStore;

    fn entry(name: &str, status: CapabilityStatus) -> CapabilityEntry {
        CapabilityEntry::new(name, "1.0").with_status(status)
    }

    #[tokio::test]
    async fn test_has_capability_requires_active_status() {
        let registry = CapabilityRegistry::new(Arc::new(InMemoryCacheStore::new()));
        registry
            .register(vec![
                entry("seo_snapshot", CapabilityStatus::Active),
                entry("uptime_sample", CapabilityStatus::Ready),
                entry("backlog_depth", CapabilityStatus::Pending),
            ])
            .await;

        assert!(registry.has_capability("seo_snapshot").await);
        assert!(!registry.has_capability("uptime_sample").await);
        assert!(!registry.has_capability("backlog_depth").await);
        assert!(!registry.has_capability("absent").await);
    }

    #[tokio::test]
    async fn test_register_merges_by_data_type() {
        let registry = CapabilityRegistry::new(Arc::new(InMemoryCacheStore::new()));
        registry
            .register(vec![entry("seo_snapshot", CapabilityStatus::Ready)])
            .await;
        registry
            .register(vec![entry("seo_snapshot", CapabilityStatus::Active)])
            .await;

        let all = registry.get_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all["seo_snapshot"].status, CapabilityStatus::Active);
    }

    #[tokio::test]
    async fn test_register_keeps_entries_missing_from_batch() {
        let registry = CapabilityRegistry::new(Arc::new(InMemoryCacheStore::new()));
        registry
            .register(vec![entry("a", CapabilityStatus::Active)])
            .await;
        registry
            .register(vec![entry("b", CapabilityStatus::Ready)])
            .await;

        assert_eq!(registry.get_all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_update_status_ignores_unknown_names() {
        let registry = CapabilityRegistry::new(Arc::new(InMemoryCacheStore::new()));
        registry
            .register(vec![entry("a", CapabilityStatus::Pending)])
            .await;

        registry.update_status("a", CapabilityStatus::Active).await;
        registry
            .update_status("missing", CapabilityStatus::Active)
            .await;

        assert!(registry.has_capability("a").await);
        assert!(registry.get_capability("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_registry_persists_through_shared_store() {
        let store: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        {
            let registry = CapabilityRegistry::new(Arc::clone(&store));
            registry
                .register(vec![entry("a", CapabilityStatus::Active)])
                .await;
        }

        // A fresh registry over the same store sees the persisted map
        let reloaded = CapabilityRegistry::new(store);
        assert!(reloaded.has_capability("a").await);
    }

    #[tokio::test]
    async fn test_clear_empties_registry() {
        let registry = CapabilityRegistry::new(Arc::new(InMemoryCacheStore::new()));
        registry
            .register(vec![entry("a", CapabilityStatus::Active)])
            .await;
        registry.clear().await;

        assert!(registry.get_all().await.is_empty());
    }
}
