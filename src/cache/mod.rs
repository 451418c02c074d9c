//! Query cache for content API responses
//!
//! Two tiers:
//! - L1 (moka): in-process, TTL equal to the staleness window
//! - L2 (Redis, optional): shared between instances
//!
//! Values are stored as JSON. When Redis is not configured or cannot be
//! reached the cache keeps working with L1 only.
//!
//! # Example
//!
//! ```rust,ignore
//! use kosen_web::cache::{CacheConfig, QueryCache};
//!
//! let cache = QueryCache::connect(&CacheConfig::default()).await;
//! let key = cache.key(&["content", "5"]);
//! let content = cache.get_or_fetch(&key, || api.content(5)).await?;
//! ```

use anyhow::{Context, Result};
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use moka::future::Cache;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::metrics;

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis URL (e.g., redis://localhost:6379); L1 only when absent
    pub redis_url: Option<String>,

    /// Redis connection pool size
    pub pool_size: usize,

    /// Time before a cached response is considered stale (default: 5 minutes)
    pub ttl_secs: u64,

    /// Maximum number of L1 entries
    pub max_capacity: u64,

    /// Key prefix for namespacing
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            pool_size: 8,
            ttl_secs: 300,
            max_capacity: 10_000,
            key_prefix: "kosen".to_string(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Total cache hits
    pub hits: u64,
    /// Total cache misses
    pub misses: u64,
    /// Approximate number of L1 entries
    pub entries: u64,
    /// Whether the Redis tier is connected
    pub shared: bool,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Number of entries removed per tier by an invalidation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Invalidation {
    pub local: u64,
    pub shared: u64,
}

/// Redis tier
struct SharedCache {
    pool: Pool,
    ttl: Duration,
}

impl SharedCache {
    async fn connect(url: &str, pool_size: usize, ttl: Duration) -> Result<Self> {
        let pool = PoolConfig::from_url(url)
            .builder()
            .map_err(|e| anyhow::anyhow!("Failed to create pool builder: {e}"))?
            .max_size(pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .context("Failed to create Redis connection pool")?;

        let mut conn = pool.get().await.context("Failed to get Redis connection")?;

        let _: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .context("Failed to ping Redis")?;

        Ok(Self { pool, ttl })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.pool.get().await.context("Failed to get connection")?;
        let value: Option<String> = conn.get(key).await.context("Failed to get from cache")?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.pool.get().await.context("Failed to get connection")?;
        conn.set_ex::<_, _, ()>(key, value, self.ttl.as_secs())
            .await
            .context("Failed to set cache")?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.pool.get().await.context("Failed to get connection")?;
        conn.del::<_, ()>(key)
            .await
            .context("Failed to delete cache key")?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.pool.get().await.context("Failed to get connection")?;

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut *conn)
            .await
            .context("Failed to list keys")?;

        if keys.is_empty() {
            return Ok(0);
        }

        let count = keys.len() as u64;
        conn.del::<_, ()>(keys)
            .await
            .context("Failed to delete keys")?;

        Ok(count)
    }

    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let result: String = redis::cmd("PING").query_async(&mut *conn).await?;
        Ok(result == "PONG")
    }
}

/// Cache shared by every request of one server instance
pub struct QueryCache {
    local: Cache<String, String>,
    shared: Option<SharedCache>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    /// Create an L1-only cache
    pub fn in_memory(config: &CacheConfig) -> Self {
        let local = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl())
            .build();

        Self {
            local,
            shared: None,
            config: config.clone(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a cache, attaching Redis when configured and reachable
    pub async fn connect(config: &CacheConfig) -> Self {
        let mut cache = Self::in_memory(config);

        if let Some(url) = config.redis_url.as_deref() {
            match SharedCache::connect(url, config.pool_size, config.ttl()).await {
                Ok(shared) => {
                    info!(url = %url, "Connected to Redis");
                    cache.shared = Some(shared);
                }
                Err(e) => {
                    warn!(error = %e, "Redis cache unavailable, continuing with in-process cache");
                }
            }
        }

        cache
    }

    /// Whether the Redis tier is attached
    pub fn is_shared(&self) -> bool {
        self.shared.is_some()
    }

    /// Namespaced key, e.g. `kosen:content:5`
    pub fn key(&self, parts: &[&str]) -> String {
        let mut key = self.config.key_prefix.clone();
        for part in parts {
            key.push(':');
            key.push_str(part);
        }
        key
    }

    /// Look a value up in L1, then L2
    ///
    /// An L2 hit repopulates L1. Entries that no longer decode as `T` count
    /// as a miss, so the next `get_or_fetch` overwrites them.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.local.get(key).await {
            Some(raw) => Some(raw),
            None => self.get_shared(key).await,
        };

        let decoded = raw.and_then(|raw| match serde_json::from_str::<T>(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring undecodable cache entry");
                None
            }
        });

        match decoded {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_lookup(true);
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_lookup(false);
                debug!(key = %key, "Cache miss");
                None
            }
        }
    }

    async fn get_shared(&self, key: &str) -> Option<String> {
        let shared = self.shared.as_ref()?;

        match shared.get(key).await {
            Ok(Some(raw)) => {
                debug!(key = %key, "Cache L2 hit, populating L1");
                self.local.insert(key.to_string(), raw.clone()).await;
                Some(raw)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Redis lookup failed");
                None
            }
        }
    }

    /// Store a value in both tiers
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize cache value");
                return;
            }
        };

        self.local.insert(key.to_string(), raw.clone()).await;

        if let Some(shared) = &self.shared {
            if let Err(e) = shared.set(key, &raw).await {
                warn!(key = %key, error = %e, "Failed to set cache value in Redis");
            }
        }
    }

    /// Return the cached value or fetch, store and return a fresh one
    ///
    /// Errors from `fetch` are returned as is and never cached.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get::<T>(key).await {
            return Ok(value);
        }

        let value = fetch().await?;
        self.set(key, &value).await;
        Ok(value)
    }

    /// Remove one key from both tiers
    pub async fn invalidate(&self, key: &str) {
        self.local.invalidate(key).await;

        if let Some(shared) = &self.shared {
            if let Err(e) = shared.delete(key).await {
                warn!(key = %key, error = %e, "Failed to delete cache key from Redis");
            }
        }

        debug!(key = %key, "Cache invalidated");
    }

    /// Remove every key under `{key_prefix}:{prefix}`
    ///
    /// An empty `prefix` clears everything this instance owns.
    pub async fn invalidate_prefix(&self, prefix: &str) -> Invalidation {
        let full = if prefix.is_empty() {
            format!("{}:", self.config.key_prefix)
        } else {
            self.key(&[prefix])
        };

        let keys: Vec<String> = self
            .local
            .iter()
            .filter(|(key, _)| key.starts_with(&full))
            .map(|(key, _)| key.to_string())
            .collect();

        for key in &keys {
            self.local.invalidate(key).await;
        }

        let mut report = Invalidation {
            local: keys.len() as u64,
            shared: 0,
        };

        if let Some(shared) = &self.shared {
            match shared.delete_pattern(&format!("{full}*")).await {
                Ok(count) => report.shared = count,
                Err(e) => warn!(prefix = %full, error = %e, "Failed to invalidate Redis keys"),
            }
        }

        info!(
            prefix = %full,
            local = report.local,
            shared = report.shared,
            "Invalidated cache entries"
        );

        report
    }

    /// Check that the shared tier, if any, answers
    pub async fn health_check(&self) -> bool {
        match &self.shared {
            Some(shared) => shared.health_check().await.unwrap_or(false),
            None => true,
        }
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.local.run_pending_tasks().await;

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.local.entry_count(),
            shared: self.is_shared(),
        }
    }

    /// Get config reference
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("key_prefix", &self.config.key_prefix)
            .field("shared", &self.is_shared())
            .finish()
    }
}
