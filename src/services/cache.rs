use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalidation error: {0}")]
    InvalidationError(String),
}

/// Two-tier cache for ranked partner lists
///
/// L1 is an in-process `moka` cache. L2 is Redis, shared across instances, and is
/// optional: without it the manager behaves as a plain local cache.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        })
    }

    /// Create an in-process cache with no Redis tier
    pub fn local(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            redis: None,
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        }
    }

    /// Connect to Redis when configured, falling back to a local cache
    pub async fn connect_or_local(redis_url: Option<&str>, l1_size: u64, ttl_secs: u64) -> Self {
        let Some(url) = redis_url else {
            tracing::info!("No Redis URL configured, using in-process cache only");
            return Self::local(l1_size, ttl_secs);
        };

        match Self::new(url, l1_size, ttl_secs).await {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                Self::local(l1_size, ttl_secs)
            }
        }
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        let Some(redis) = &self.redis else {
            tracing::trace!("Cache miss: {}", key);
            return Ok(None);
        };

        let mut conn = redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                let parsed = serde_json::from_str(&json)?;
                self.l1_cache.insert(key.to_string(), json.into_bytes()).await;
                Ok(Some(parsed))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    /// Set a value in cache (both tiers)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Drop every entry whose key starts with `prefix`
    pub async fn invalidate_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let owned = prefix.to_string();
        self.l1_cache
            .invalidate_entries_if(move |key, _| key.starts_with(&owned))
            .map_err(|e| CacheError::InvalidationError(e.to_string()))?;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let keys: Vec<String> = redis::cmd("KEYS")
                .arg(format!("{}*", escape_glob(prefix)))
                .query_async(&mut *conn)
                .await?;

            if !keys.is_empty() {
                redis::cmd("DEL")
                    .arg(keys)
                    .query_async::<()>(&mut *conn)
                    .await?;
            }
        }

        tracing::debug!("Invalidated cache prefix: {}", prefix);
        Ok(())
    }
}

/// Escape Redis glob metacharacters so `raw` matches literally in KEYS/SCAN
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\' | '^') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn build_l1(l1_size: u64, ttl_secs: u64) -> moka::future::Cache<String, Vec<u8>> {
    moka::future::CacheBuilder::new(l1_size)
        .time_to_live(Duration::from_secs(ttl_secs))
        .support_invalidation_closures()
        .build()
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Ranked partners for a user at a given limit
    pub fn partners(user_id: &str, limit: usize) -> String {
        format!("partners:{}:{}", user_id, limit)
    }

    /// Prefix covering every ranked list for a user
    pub fn partners_prefix(user_id: &str) -> String {
        format!("partners:{}:", user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_set_get() {
        let cache = CacheManager::local(100, 60);
        assert!(!cache.has_redis());

        cache.set("k", &vec![1, 2, 3]).await.unwrap();
        let value: Option<Vec<i32>> = cache.get("k").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));

        let missing: Option<Vec<i32>> = cache.get("other").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_only_hits_one_user() {
        let cache = CacheManager::local(100, 60);
        cache.set(&CacheKey::partners("u1", 10), &"a").await.unwrap();
        cache.set(&CacheKey::partners("u1", 50), &"b").await.unwrap();
        cache.set(&CacheKey::partners("u10", 50), &"c").await.unwrap();

        cache.invalidate_prefix(&CacheKey::partners_prefix("u1")).await.unwrap();

        let a: Option<String> = cache.get(&CacheKey::partners("u1", 10)).await.unwrap();
        let b: Option<String> = cache.get(&CacheKey::partners("u1", 50)).await.unwrap();
        let c: Option<String> = cache.get(&CacheKey::partners("u10", 50)).await.unwrap();
        assert_eq!(a, None);
        assert_eq!(b, None);
        assert_eq!(c.as_deref(), Some("c"));
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_redis_round_trip() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        cache.set("partner_test_key", &"value").await.unwrap();
        let result: Option<String> = cache.get("partner_test_key").await.unwrap();
        assert_eq!(result.as_deref(), Some("value"));
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("partners:u1:"), "partners:u1:");
        assert_eq!(escape_glob("partners:a*b?:"), "partners:a\\*b\\?:");
        assert_eq!(escape_glob("[x]^\\"), "\\[x\\]\\^\\\\");
    }

    #[tokio::test]
    async fn test_invalidate_prefix_treats_glob_chars_literally() {
        let cache = CacheManager::local(100, 60);
        cache.set(&CacheKey::partners("u*", 10), &"wild").await.unwrap();
        cache.set(&CacheKey::partners("u1", 10), &"other").await.unwrap();

        cache.invalidate_prefix(&CacheKey::partners_prefix("u*")).await.unwrap();

        let wild: Option<String> = cache.get(&CacheKey::partners("u*", 10)).await.unwrap();
        let other: Option<String> = cache.get(&CacheKey::partners("u1", 10)).await.unwrap();
        assert_eq!(wild, None);
        assert_eq!(other.as_deref(), Some("other"));
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::partners("user123", 50), "partners:user123:50");
        assert_eq!(CacheKey::partners_prefix("user123"), "partners:user123:");
    }
}
