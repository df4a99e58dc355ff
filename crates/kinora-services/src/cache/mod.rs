//! Key/value cache consulted for metadata lookups.
//!
//! The cache is an optional capability: [`NoOpCache`] is the default and every cache
//! failure is logged and otherwise ignored by callers.

#[cfg(feature = "redis-cache")]
mod redis_cache;

use async_trait::async_trait;
use std::time::Duration;

#[cfg(feature = "redis-cache")]
pub use self::redis_cache::RedisCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait MediaCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration)
        -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// No-op implementation for when no cache backend is configured
pub struct NoOpCache;

#[async_trait]
impl MediaCache for NoOpCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set_with_expiry(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoOpCache;
        cache
            .set_with_expiry("media:1", "{}", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.get("media:1").await.unwrap().is_none());
        cache.delete("media:1").await.unwrap();
    }
}
