//! TTL-bounded key-value cache for merged search responses.
//!
//! [`KvCache`] mirrors the surface of a string/TTL store (`get`, `setex`,
//! `expire`, plus hash-field operations); [`MemoryCache`] backs it with
//! [`moka`] using a per-entry time-to-live. The search route only uses
//! `get`/`setex`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

/// Maximum number of cached entries per store.
const MAX_CACHE_ENTRIES: u64 = 10_000;

/// A string/TTL key-value store.
#[async_trait]
pub trait KvCache: Send + Sync {
    /// Look up a value. `None` on miss or after expiry.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value that expires after `ttl_secs` seconds.
    async fn setex(&self, key: &str, ttl_secs: u64, value: &str);

    /// Reset an existing key's remaining lifetime. No-op for missing keys.
    async fn expire(&self, key: &str, ttl_secs: u64);

    /// Look up one field of a hash entry.
    async fn hget(&self, key: &str, field: &str) -> Option<String>;

    /// Set one field of a hash entry, creating the hash if needed.
    async fn hset(&self, key: &str, field: &str, value: &str);
}

/// A cached value with its own time-to-live.
#[derive(Clone)]
struct Entry<T> {
    value: T,
    /// `None` means no expiry.
    ttl: Option<Duration>,
}

/// moka expiry policy that reads the TTL off each entry.
struct PerEntryTtl;

impl<K, T> Expiry<K, Entry<T>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &K,
        value: &Entry<T>,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &K,
        value: &Entry<T>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-process [`KvCache`] implementation.
pub struct MemoryCache {
    strings: Cache<String, Entry<String>>,
    hashes: Cache<String, Entry<HashMap<String, String>>>,
}

impl MemoryCache {
    /// Build an empty cache.
    pub fn new() -> Self {
        Self {
            strings: Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .expire_after(PerEntryTtl)
                .build(),
            hashes: Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.strings.get(key).await.map(|entry| entry.value)
    }

    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) {
        let entry = Entry {
            value: value.to_owned(),
            ttl: Some(Duration::from_secs(ttl_secs)),
        };
        self.strings.insert(key.to_owned(), entry).await;
    }

    async fn expire(&self, key: &str, ttl_secs: u64) {
        // moka has no in-place TTL reset; re-insert restarts the clock.
        if let Some(entry) = self.strings.get(key).await {
            self.setex(key, ttl_secs, &entry.value).await;
        } else if let Some(entry) = self.hashes.get(key).await {
            let entry = Entry {
                ttl: Some(Duration::from_secs(ttl_secs)),
                ..entry
            };
            self.hashes.insert(key.to_owned(), entry).await;
        }
    }

    async fn hget(&self, key: &str, field: &str) -> Option<String> {
        self.hashes
            .get(key)
            .await
            .and_then(|entry| entry.value.get(field).cloned())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) {
        let mut entry = self.hashes.get(key).await.unwrap_or(Entry {
            value: HashMap::new(),
            ttl: None,
        });
        entry.value.insert(field.to_owned(), value.to_owned());
        self.hashes.insert(key.to_owned(), entry).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_returns_none() {
        let cache = MemoryCache::new();
        assert!(cache.get("absent").await.is_none());
    }

    #[tokio::test]
    async fn setex_then_get() {
        let cache = MemoryCache::new();
        cache.setex("k", 60, "payload").await;
        assert_eq!(cache.get("k").await.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn setex_overwrites() {
        let cache = MemoryCache::new();
        cache.setex("k", 60, "old").await;
        cache.setex("k", 60, "new").await;
        assert_eq!(cache.get("k").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache.setex("short", 1, "payload").await;
        assert!(cache.get("short").await.is_some());

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert!(cache.get("short").await.is_none());
    }

    #[tokio::test]
    async fn expire_resets_lifetime() {
        let cache = MemoryCache::new();
        cache.setex("k", 1, "payload").await;
        tokio::time::sleep(Duration::from_millis(700)).await;

        cache.expire("k", 60).await;
        tokio::time::sleep(Duration::from_millis(600)).await;
        // Past the original 1s deadline but within the reset one.
        assert_eq!(cache.get("k").await.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn expire_missing_key_is_noop() {
        let cache = MemoryCache::new();
        cache.expire("absent", 60).await;
        assert!(cache.get("absent").await.is_none());
    }

    #[tokio::test]
    async fn hset_then_hget() {
        let cache = MemoryCache::new();
        cache.hset("h", "field1", "a").await;
        cache.hset("h", "field2", "b").await;

        assert_eq!(cache.hget("h", "field1").await.as_deref(), Some("a"));
        assert_eq!(cache.hget("h", "field2").await.as_deref(), Some("b"));
        assert!(cache.hget("h", "field3").await.is_none());
        assert!(cache.hget("other", "field1").await.is_none());
    }

    #[tokio::test]
    async fn hash_and_string_namespaces_are_separate() {
        let cache = MemoryCache::new();
        cache.setex("k", 60, "string-value").await;
        cache.hset("k", "f", "hash-value").await;

        assert_eq!(cache.get("k").await.as_deref(), Some("string-value"));
        assert_eq!(cache.hget("k", "f").await.as_deref(), Some("hash-value"));
    }
}
