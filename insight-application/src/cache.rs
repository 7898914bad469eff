use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use insight_domain::ports::{Clock, RemoteCache};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Remote,
    Local,
}

struct LocalEntry {
    value: String,
    expires_at: Option<i64>,
}

impl LocalEntry {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

/// Two-tier key/value cache.
///
/// The remote tier is primary. Every remote call is attempted first and any failure is
/// logged as degraded, after which the operation falls back to the in-process tier. The
/// local tier checks expiry on read only and never sweeps, so keys written while the remote
/// tier was down stay in memory until they are read again.
pub struct CacheLayer {
    remote: Option<Arc<dyn RemoteCache>>,
    local: RwLock<HashMap<String, LocalEntry>>,
    clock: Arc<dyn Clock>,
}

impl CacheLayer {
    pub fn new(remote: Option<Arc<dyn RemoteCache>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            remote,
            local: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Runs `call` against the remote tier. `None` means the caller must fall back.
    async fn attempt<'a, T, F, Fut>(&'a self, op: &'static str, key: &str, call: F) -> Option<T>
    where
        F: FnOnce(&'a dyn RemoteCache) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let remote = self.remote.as_deref()?;
        match call(remote).await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(op, key, "remote cache degraded: {:#}", err);
                None
            }
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.lookup(key).await.map(|(value, _)| value)
    }

    /// Like `get`, also reporting which tier answered.
    pub async fn lookup(&self, key: &str) -> Option<(String, CacheTier)> {
        if let Some(found) = self.attempt("get", key, |remote| remote.get(key)).await {
            return found.map(|value| (value, CacheTier::Remote));
        }
        self.local_get(key)
            .await
            .map(|value| (value, CacheTier::Local))
    }

    /// A zero ttl means no expiry.
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) {
        let ttl_seconds = ttl_seconds.filter(|ttl| *ttl > 0);
        if self
            .attempt("set", key, |remote| remote.set(key, value, ttl_seconds))
            .await
            .is_some()
        {
            return;
        }
        let expires_at = ttl_seconds
            .map(|ttl| self.clock.now_millis() + (ttl as i64).saturating_mul(1000));
        self.local.write().await.insert(
            key.to_string(),
            LocalEntry {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    pub async fn del(&self, key: &str) {
        let _ = self.attempt("del", key, |remote| remote.del(key)).await;
        self.invalidate_local(key).await;
    }

    pub async fn exists(&self, key: &str) -> bool {
        if let Some(found) = self.attempt("exists", key, |remote| remote.exists(key)).await {
            return found;
        }
        self.local_get(key).await.is_some()
    }

    /// Post-increment counter value, or 0 when the remote tier is unavailable.
    pub async fn incr(&self, key: &str) -> i64 {
        self.attempt("incr", key, |remote| remote.incr(key))
            .await
            .unwrap_or(0)
    }

    pub async fn expire(&self, key: &str, seconds: u64) {
        if self
            .attempt("expire", key, |remote| remote.expire(key, seconds))
            .await
            .is_none()
        {
            debug!(key, "expire skipped without remote cache");
        }
    }

    /// Drops the in-process entry only; the remote tier keeps its copy.
    pub async fn invalidate_local(&self, key: &str) {
        self.local.write().await.remove(key);
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, "discarding undecodable cache entry: {}", err);
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw, ttl_seconds).await,
            Err(err) => warn!(key, "failed to encode cache entry: {}", err),
        }
    }

    pub async fn local_len(&self) -> usize {
        self.local.read().await.len()
    }

    async fn local_get(&self, key: &str) -> Option<String> {
        let now = self.clock.now_millis();
        let mut local = self.local.write().await;
        match local.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                local.remove(key);
                None
            }
            None => None,
        }
    }
}
