use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use tokio::sync::Mutex;
use tracing::warn;

use insight_domain::ports::RemoteCache;
use insight_domain::CacheConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis-backed remote cache tier. Keys are namespaced with `prefix`.
/// A failed command drops the connection so the next call reconnects.
pub struct RedisCache {
    client: redis::Client,
    connection: Mutex<Option<ConnectionManager>>,
    prefix: String,
}

impl RedisCache {
    pub fn new(url: &str, prefix: String) -> Result<Self> {
        let client = redis::Client::open(url).context("invalid redis url")?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
            prefix,
        })
    }

    /// `None` when no redis url is configured.
    pub fn from_config(config: &CacheConfig) -> Result<Option<Self>> {
        config
            .redis_url
            .as_deref()
            .map(|url| Self::new(url, config.redis_prefix.clone()))
            .transpose()
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, self.client.get_connection_manager())
            .await
            .map_err(|_| anyhow!("redis connect timed out"))?
            .context("redis connect failed")?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn settle<T>(&self, op: &str, result: RedisResult<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(op, "redis command failed: {}", err);
                *self.connection.lock().await = None;
                Err(anyhow!(err).context(format!("redis {} failed", op)))
            }
        }
    }
}

#[async_trait]
impl RemoteCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let result: RedisResult<Option<String>> = conn.get(self.key(key)).await;
        self.settle("get", result).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
        let mut conn = self.connection().await?;
        let result: RedisResult<()> = match ttl_seconds {
            Some(ttl) => conn.set_ex(self.key(key), value, ttl).await,
            None => conn.set(self.key(key), value).await,
        };
        self.settle("set", result).await
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let result: RedisResult<()> = conn.del(self.key(key)).await;
        self.settle("del", result).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let result: RedisResult<bool> = conn.exists(self.key(key)).await;
        self.settle("exists", result).await
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection().await?;
        let result: RedisResult<i64> = conn.incr(self.key(key), 1).await;
        self.settle("incr", result).await
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<()> {
        let mut conn = self.connection().await?;
        let seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
        let result: RedisResult<()> = conn.expire(self.key(key), seconds).await;
        self.settle("expire", result).await
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        self.settle("ping", result).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed() {
        let cache = RedisCache::new("redis://127.0.0.1:6379", "turbo:".to_string())
            .expect("client");
        assert_eq!(cache.key("analysis:aviator"), "turbo:analysis:aviator");
    }

    #[test]
    fn missing_url_disables_cache() {
        let config = CacheConfig {
            redis_url: None,
            redis_prefix: "turbo:".to_string(),
        };
        assert!(RedisCache::from_config(&config).expect("config").is_none());
    }
}
