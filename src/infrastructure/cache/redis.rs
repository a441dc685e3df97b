//! Redis cache implementation

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://redis:6379")
    pub url: String,
    /// Key prefix for sharing one database between deployments
    pub key_prefix: Option<String>,
    /// Upper bound on establishing the connection
    pub connection_timeout: Duration,
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: None,
            connection_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

/// Shared cache backed by Redis
///
/// Values are stored with `SET EX`, so expiry is enforced by the server and
/// every application instance sees the same entries. The connection is
/// established on first use; until it succeeds every operation fails with
/// [`DomainError::Cache`] after at most `connection_timeout`.
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
    manager: Arc<OnceCell<ConnectionManager>>,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connected", &self.manager.initialized())
            .finish()
    }
}

impl RedisCache {
    /// Creates the client without connecting
    pub fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::configuration(format!("Invalid Redis URL: {}", e)))?;

        Ok(Self {
            client,
            manager: Arc::new(OnceCell::new()),
            config,
        })
    }

    /// Creates the client and tries to connect once
    ///
    /// An unreachable server is logged, not returned: the cache keeps
    /// retrying on later operations.
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let cache = Self::new(config)?;

        match cache.connection().await {
            Ok(_) => info!(url = %cache.config.url, "Connected to Redis"),
            Err(e) => warn!(
                url = %cache.config.url,
                error = %e,
                "Redis unavailable, searches will bypass the cache until it is reachable"
            ),
        }

        Ok(cache)
    }

    async fn connection(&self) -> Result<ConnectionManager, DomainError> {
        let timeout = self.config.connection_timeout;

        let manager = self
            .manager
            .get_or_try_init(|| async {
                let connecting = ConnectionManager::new(self.client.clone());

                match tokio::time::timeout(timeout, connecting).await {
                    Ok(Ok(manager)) => Ok(manager),
                    Ok(Err(e)) => Err(DomainError::cache(format!(
                        "Failed to connect to Redis: {}",
                        e
                    ))),
                    Err(_) => Err(DomainError::cache(format!(
                        "Timed out connecting to Redis after {}ms",
                        timeout.as_millis()
                    ))),
                }
            })
            .await?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection().await?;

        conn.get(self.config.prefix_key(key))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(self.config.prefix_key(key), value, ttl_secs)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection().await?;

        let deleted: i64 = conn.del(self.config.prefix_key(key)).await.map_err(|e| {
            DomainError::cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        Ok(deleted > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let prefixed_pattern = self.config.prefix_key(pattern);
        let mut conn = self.connection().await?;

        // SCAN rather than KEYS so a large keyspace does not block the server
        let mut cursor = 0u64;
        let mut total_deleted = 0usize;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&prefixed_pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::cache(format!(
                        "Failed to scan keys with pattern '{}': {}",
                        pattern, e
                    ))
                })?;

            if !keys.is_empty() {
                let deleted: i64 = conn.del(&keys).await.map_err(|e| {
                    DomainError::cache(format!("Failed to delete keys: {}", e))
                })?;
                total_deleted += deleted as usize;
            }

            cursor = next_cursor;

            if cursor == 0 {
                break;
            }
        }

        Ok(total_deleted)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection().await?;

        conn.exists(self.config.prefix_key(key)).await.map_err(|e| {
            DomainError::cache(format!("Failed to check existence of key '{}': {}", key, e))
        })
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        let mut conn = self.connection().await?;

        let ttl_secs: i64 = conn.ttl(self.config.prefix_key(key)).await.map_err(|e| {
            DomainError::cache(format!("Failed to get TTL for key '{}': {}", key, e))
        })?;

        // -2: no such key, -1: no expiry
        if ttl_secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl_secs as u64)))
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
