//! Read-through cache in front of the search client

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::cache::{Cache, CacheExt, CacheFailure};
use crate::domain::criteria::{canonical_key, InvestmentCriteria};
use crate::domain::search::{build_query, EtfDocument, SearchFailure};
use crate::domain::DomainError;
use crate::infrastructure::metrics::{self, CacheOutcome};

use super::search_client::SearchClient;

/// Configuration for search result caching
#[derive(Debug, Clone)]
pub struct SearchCacheConfig {
    /// Prefix of every cache key, separated from the criteria by `:`
    pub namespace: String,
    /// Lifetime of a cached result list
    pub ttl: Duration,
    /// Whether caching is enabled
    pub enabled: bool,
    /// Serialize concurrent misses for the same key within this process
    pub single_flight: bool,
}

impl Default for SearchCacheConfig {
    fn default() -> Self {
        Self {
            namespace: "etf_search".to_string(),
            ttl: Duration::from_secs(3600),
            enabled: true,
            single_flight: true,
        }
    }
}

impl SearchCacheConfig {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_single_flight(mut self, single_flight: bool) -> Self {
        self.single_flight = single_flight;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Where a result list came from
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSource {
    /// Served from a cached entry
    Cache,
    /// Computed by the search engine
    Engine,
    /// Computed by the search engine while the cache was unusable
    CacheBypassed(CacheFailure),
}

/// Result list plus how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSearchResult {
    pub documents: Vec<EtfDocument>,
    pub source: ResultSource,
    /// Set when the engine failed and `documents` is the empty fallback
    pub search_failure: Option<SearchFailure>,
}

enum Lookup {
    Hit(Vec<EtfDocument>),
    Miss,
    Unavailable(CacheFailure),
}

/// Caches search results by canonical criteria
///
/// Cache problems never fail a search: the engine is queried directly
/// instead. Degraded engine results are returned but never stored.
#[derive(Debug)]
pub struct CachedSearchService {
    cache: Arc<dyn Cache>,
    search: SearchClient,
    config: SearchCacheConfig,
    in_flight: FlightMap,
}

impl CachedSearchService {
    pub fn new(cache: Arc<dyn Cache>, search: SearchClient) -> Self {
        Self::with_config(cache, search, SearchCacheConfig::default())
    }

    pub fn with_config(cache: Arc<dyn Cache>, search: SearchClient, config: SearchCacheConfig) -> Self {
        Self {
            cache,
            search,
            config,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Key under which results for `criteria` are stored
    pub fn cache_key(&self, criteria: &InvestmentCriteria) -> String {
        format!("{}:{}", self.config.namespace, canonical_key(criteria))
    }

    pub async fn search(&self, criteria: &InvestmentCriteria) -> CachedSearchResult {
        if !self.config.enabled {
            return self.run_query(criteria, ResultSource::Engine).await;
        }

        let key = self.cache_key(criteria);

        match self.lookup(&key).await {
            Lookup::Hit(documents) => return Self::hit(documents),
            Lookup::Unavailable(failure) => {
                metrics::record_cache_lookup(CacheOutcome::Bypass);
                return self
                    .run_query(criteria, ResultSource::CacheBypassed(failure))
                    .await;
            }
            Lookup::Miss => {}
        }

        if !self.config.single_flight {
            return self.fill(&key, criteria).await;
        }

        let flight = Flight::join(&self.in_flight, &key);
        let _guard = flight.lock().await;

        // another request may have filled the entry while we waited
        match self.lookup(&key).await {
            Lookup::Hit(documents) => Self::hit(documents),
            _ => self.fill(&key, criteria).await,
        }
    }

    /// Drops the cached results for `criteria`
    pub async fn invalidate(&self, criteria: &InvestmentCriteria) -> Result<bool, DomainError> {
        let key = self.cache_key(criteria);
        let deleted = self.cache.delete(&key).await?;

        debug!(key = %key, deleted, "Invalidated cached search");
        Ok(deleted)
    }

    /// Drops every cached result list in the namespace
    pub async fn invalidate_all(&self) -> Result<usize, DomainError> {
        let deleted = self
            .cache
            .delete_pattern(&format!("{}:*", self.config.namespace))
            .await?;

        info!(namespace = %self.config.namespace, deleted, "Invalidated cached searches");
        Ok(deleted)
    }

    fn hit(documents: Vec<EtfDocument>) -> CachedSearchResult {
        metrics::record_cache_lookup(CacheOutcome::Hit);
        info!(results = documents.len(), "Search results served from cache");

        CachedSearchResult {
            documents,
            source: ResultSource::Cache,
            search_failure: None,
        }
    }

    async fn lookup(&self, key: &str) -> Lookup {
        match self.cache.get::<Vec<EtfDocument>>(key).await {
            Ok(Some(documents)) => Lookup::Hit(documents),
            Ok(None) => Lookup::Miss,
            Err(DomainError::Serialization { message }) => {
                warn!(key = %key, error = %message, "Corrupt cache entry, recomputing");
                Lookup::Miss
            }
            Err(e) => {
                warn!(
                    backend = self.cache.backend_name(),
                    error = %e,
                    "Cache read failed, searching without cache"
                );
                Lookup::Unavailable(CacheFailure::from(e))
            }
        }
    }

    /// Searches and stores the results unless the search degraded
    async fn fill(&self, key: &str, criteria: &InvestmentCriteria) -> CachedSearchResult {
        metrics::record_cache_lookup(CacheOutcome::Miss);

        let mut result = self.run_query(criteria, ResultSource::Engine).await;

        if result.search_failure.is_some() {
            return result;
        }

        match self.cache.set(key, &result.documents, self.config.ttl).await {
            Ok(()) => {
                info!(
                    key = %key,
                    results = result.documents.len(),
                    ttl_secs = self.config.ttl.as_secs(),
                    "Search results cached"
                );
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to cache search results");
                result.source = ResultSource::CacheBypassed(CacheFailure::from(e));
            }
        }

        result
    }

    async fn run_query(
        &self,
        criteria: &InvestmentCriteria,
        source: ResultSource,
    ) -> CachedSearchResult {
        let query = build_query(criteria);
        let (documents, search_failure) = self.search.execute(&query).await.into_parts();

        CachedSearchResult {
            documents,
            source,
            search_failure,
        }
    }
}

type FlightMap = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Membership in the single-flight group of one cache key
///
/// Leaves the group on drop, including when the search future is cancelled,
/// and removes the key once no other request holds it.
struct Flight<'a> {
    in_flight: &'a FlightMap,
    key: &'a str,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> Flight<'a> {
    fn join(in_flight: &'a FlightMap, key: &'a str) -> Self {
        let lock = in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(key.to_string())
            .or_default()
            .clone();

        Self {
            in_flight,
            key,
            lock,
        }
    }

    async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // the map and this member are the last two owners
        if Arc::strong_count(&self.lock) <= 2 {
            in_flight.remove(self.key);
        }
    }
}
