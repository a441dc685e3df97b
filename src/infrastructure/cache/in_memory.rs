//! In-memory cache implementation using moka

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: String,
    ttl: Duration,
    stored_at: Instant,
}

impl CacheEntry {
    fn remaining(&self) -> Option<Duration> {
        self.ttl
            .checked_sub(self.stored_at.elapsed())
            .filter(|d| !d.is_zero())
    }
}

/// Expires each entry after the TTL it was stored with
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local cache backend
///
/// Entries expire individually and the least recently used ones are evicted
/// once `max_capacity` is reached. Suitable for development and tests; a
/// multi-instance deployment should use [`super::RedisCache`].
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
    config: InMemoryCacheConfig,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache, config }
    }

    pub fn max_capacity(&self) -> u64 {
        self.config.max_capacity
    }

    /// Live entry for `key`, dropping it when already past its TTL
    async fn live_entry(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.cache.get(key).await?;

        if entry.remaining().is_none() {
            self.cache.remove(key).await;
            return None;
        }

        Some(entry)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.live_entry(key).await.map(|entry| entry.data))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let entry = CacheEntry {
            data: value.to_string(),
            ttl,
            stored_at: Instant::now(),
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let pattern_regex = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
        let regex = regex::Regex::new(&pattern_regex)
            .map_err(|e| DomainError::cache(format!("Invalid pattern: {}", e)))?;

        self.cache.run_pending_tasks().await;

        let matching: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| regex.is_match(key.as_str()))
            .map(|(key, _)| key.to_string())
            .collect();

        let mut deleted = 0;
        for key in matching {
            if self.cache.remove(&key).await.is_some() {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        Ok(self
            .live_entry(key)
            .await
            .and_then(|entry| entry.remaining()))
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;
    use crate::domain::{EtfDocument, EtfRecord};

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();

        cache
            .set_raw("key1", "\"value1\"", Duration::from_secs(60))
            .await
            .unwrap();

        let result = cache.get_raw("key1").await.unwrap();
        assert_eq!(result.as_deref(), Some("\"value1\""));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = InMemoryCache::new();

        assert!(cache.get_raw("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = InMemoryCache::new();

        cache.set_raw("key", "1", Duration::from_secs(60)).await.unwrap();
        cache.set_raw("key", "2", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get_raw("key").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new();

        cache.set_raw("key1", "1", Duration::from_secs(60)).await.unwrap();

        assert!(cache.delete("key1").await.unwrap());
        assert!(!cache.delete("key1").await.unwrap());
        assert!(!cache.exists("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = InMemoryCache::new();

        cache
            .set_raw("key1", "1", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(cache.exists("key1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(cache.get_raw("key1").await.unwrap().is_none());
        assert!(cache.ttl("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entries_keep_their_own_ttl() {
        let cache = InMemoryCache::new();

        cache
            .set_raw("short", "1", Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_raw("long", "2", Duration::from_secs(3600))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(!cache.exists("short").await.unwrap());
        assert!(cache.exists("long").await.unwrap());
    }

    #[tokio::test]
    async fn test_ttl_remaining() {
        let cache = InMemoryCache::new();

        cache
            .set_raw("key1", "1", Duration::from_secs(3600))
            .await
            .unwrap();

        let remaining = cache.ttl("key1").await.unwrap().unwrap();
        assert!(remaining.as_secs() > 3590 && remaining.as_secs() <= 3600);
    }

    #[tokio::test]
    async fn test_typed_documents() {
        let cache = InMemoryCache::new();
        let docs = vec![EtfDocument::new(
            "1",
            EtfRecord::new("Amundi MSCI World", "FR0010315770").with_fees(0.38),
        )];

        cache
            .set("etf_search:{}", &docs, Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<Vec<EtfDocument>> = cache.get("etf_search:{}").await.unwrap();
        assert_eq!(result, Some(docs));
    }

    #[tokio::test]
    async fn test_delete_pattern() {
        let cache = InMemoryCache::new();

        cache
            .set_raw("etf_search:{\"sectors\":[\"tech\"]}", "[]", Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set_raw("etf_search:{\"sectors\":[]}", "[]", Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set_raw("other:etf_search:key", "[]", Duration::from_secs(60))
            .await
            .unwrap();

        let deleted = cache.delete_pattern("etf_search:*").await.unwrap();
        assert_eq!(deleted, 2);
        assert!(cache.exists("other:etf_search:key").await.unwrap());
    }

    #[test]
    fn test_config() {
        let cache = InMemoryCache::with_config(InMemoryCacheConfig::default().with_max_capacity(100));

        assert_eq!(cache.max_capacity(), 100);
        assert_eq!(cache.backend_name(), "in_memory");
    }
}
