//! In-process generic fallback cache
//!
//! Namespace/key addressed store used when the durable cache is unreachable.
//! Expiry is lazy: entries are pruned when read or through `prune_expired`.
//! The cache owns no background tasks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory namespaced cache
#[derive(Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<(String, String), MemoryEntry>>>,
}

impl MemoryCache {
    /// Create an empty memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value, pruning it if expired
    pub async fn get(&self, namespace: &str, key: &str) -> Option<String> {
        let map_key = (namespace.to_string(), key.to_string());
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&map_key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Entry exists but expired; drop it
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(&map_key)
            && entry.is_expired(now)
        {
            entries.remove(&map_key);
        }
        None
    }

    /// Store a value with a time-to-live
    pub async fn set_item(&self, value: &str, namespace: &str, key: &str, ttl: Duration) {
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: Instant::now().checked_add(ttl),
        };

        let mut entries = self.entries.write().await;
        entries.insert((namespace.to_string(), key.to_string()), entry);
    }

    /// Remove a single item
    pub async fn delete_item(&self, namespace: &str, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(&(namespace.to_string(), key.to_string()));
    }

    /// Remove every item in a namespace
    pub async fn delete_group(&self, namespace: &str) {
        let mut entries = self.entries.write().await;
        entries.retain(|(ns, _), _| ns != namespace);
    }

    /// Drop all expired entries, returning the count removed
    pub async fn prune_expired(&self) -> u64 {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        (before - entries.len()) as u64
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();

        cache.set_item("v", "ns", "k", Duration::from_secs(60)).await;
        assert_eq!(cache.get("ns", "k").await.as_deref(), Some("v"));
        assert_eq!(cache.get("ns", "other").await, None);
        assert_eq!(cache.get("other", "k").await, None);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = MemoryCache::new();

        cache.set_item("v", "ns", "k", Duration::ZERO).await;
        assert_eq!(cache.get("ns", "k").await, None);
        // The expired read pruned the entry
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_item() {
        let cache = MemoryCache::new();

        cache.set_item("v", "ns", "k", Duration::from_secs(60)).await;
        cache.delete_item("ns", "k").await;
        assert_eq!(cache.get("ns", "k").await, None);
    }

    #[tokio::test]
    async fn test_delete_group_spares_other_namespaces() {
        let cache = MemoryCache::new();

        cache.set_item("1", "ns1", "a", Duration::from_secs(60)).await;
        cache.set_item("2", "ns1", "b", Duration::from_secs(60)).await;
        cache.set_item("3", "ns2", "a", Duration::from_secs(60)).await;

        cache.delete_group("ns1").await;

        assert_eq!(cache.get("ns1", "a").await, None);
        assert_eq!(cache.get("ns1", "b").await, None);
        assert_eq!(cache.get("ns2", "a").await.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_prune_expired() {
        let cache = MemoryCache::new();

        cache.set_item("old", "ns", "a", Duration::ZERO).await;
        cache.set_item("new", "ns", "b", Duration::from_secs(60)).await;

        let removed = cache.prune_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.prune_expired().await, 0);
    }

    #[tokio::test]
    async fn test_overwrite_same_key() {
        let cache = MemoryCache::new();

        cache.set_item("old", "ns", "k", Duration::from_secs(60)).await;
        cache.set_item("new", "ns", "k", Duration::from_secs(60)).await;

        assert_eq!(cache.get("ns", "k").await.as_deref(), Some("new"));
        assert_eq!(cache.len().await, 1);
    }
}
