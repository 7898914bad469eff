use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::millis_to_datetime;

/// Remote key/value store backing the primary cache tier.
/// Every method may fail; callers decide how to degrade.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> anyhow::Result<()>;
    async fn del(&self, key: &str) -> anyhow::Result<()>;
    async fn exists(&self, key: &str) -> anyhow::Result<bool>;
    /// Atomic increment; returns the post-increment value.
    async fn incr(&self, key: &str) -> anyhow::Result<i64>;
    async fn expire(&self, key: &str, seconds: u64) -> anyhow::Result<()>;
    async fn ping(&self) -> anyhow::Result<()>;
}

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;

    fn now(&self) -> DateTime<Utc> {
        millis_to_datetime(self.now_millis())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub status: String,
    pub latency_ms: u64,
}

impl ServiceStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> ServiceStatus;
    async fn check_cache(&self) -> ServiceStatus;
}
