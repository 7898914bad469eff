// Runtime configuration shared by the application layer

use crate::services::{AlertRuleConfig, ClassifierTuning};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub analysis_cache_ttl_seconds: u64,
    pub stats_cache_ttl_seconds: u64,
    pub rate_limit_requests: u64,
    pub rate_limit_window_seconds: u64,
    pub history_limit: usize,
    pub alerts_list_limit: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub classifiers: ClassifierTuning,
    pub alerts: AlertRuleConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3300".to_string(),
            api_token: None,
            analysis_cache_ttl_seconds: 300,
            stats_cache_ttl_seconds: 120,
            rate_limit_requests: 10,
            rate_limit_window_seconds: 60,
            history_limit: 100,
            alerts_list_limit: 20,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
            classifiers: ClassifierTuning::default(),
            alerts: AlertRuleConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub redis_prefix: String,
}
