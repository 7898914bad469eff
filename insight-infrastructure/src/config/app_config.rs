use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use crate::config::validation::{validate_database_name, validate_endpoint};
use insight_domain::{AlertRuleConfig, CacheConfig, ClassifierTuning, DbConfig, RuntimeConfig};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub redis_url: Option<String>,
    pub redis_prefix: String,
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

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            api_token: None,
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "turbo_insight".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            redis_url: None,
            redis_prefix: "turbo:".to_string(),
            analysis_cache_ttl_seconds: runtime.analysis_cache_ttl_seconds,
            stats_cache_ttl_seconds: runtime.stats_cache_ttl_seconds,
            rate_limit_requests: runtime.rate_limit_requests,
            rate_limit_window_seconds: runtime.rate_limit_window_seconds,
            history_limit: runtime.history_limit,
            alerts_list_limit: runtime.alerts_list_limit,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            classifiers: runtime.classifiers,
            alerts: runtime.alerts,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("INSIGHT_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::from_toml(&content)?
        } else {
            warn!(path = %path, "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config: {}", err))
    }

    pub fn normalize(&mut self) {
        self.api_token = non_blank(self.api_token.take());
        self.clickhouse_user = non_blank(self.clickhouse_user.take());
        self.clickhouse_password = non_blank(self.clickhouse_password.take());
        self.redis_url = non_blank(self.redis_url.take());
        self.clickhouse_database = self.clickhouse_database.trim().to_string();
        self.redis_prefix = self.redis_prefix.trim().to_string();
        self.alerts.tracked_games =
            normalize_game_list(std::mem::take(&mut self.alerts.tracked_games));
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        validate_endpoint("clickhouse_url", &self.clickhouse_url, &["http", "https"])?;
        validate_database_name(&self.clickhouse_database)?;
        if let Some(redis_url) = &self.redis_url {
            validate_endpoint("redis_url", redis_url, &["redis", "rediss"])?;
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.rate_limit_requests == 0 || self.rate_limit_window_seconds == 0 {
            return Err(anyhow!(
                "rate_limit_requests and rate_limit_window_seconds must be greater than 0"
            ));
        }
        if self.history_limit == 0 || self.alerts_list_limit == 0 {
            return Err(anyhow!(
                "history_limit and alerts_list_limit must be greater than 0"
            ));
        }
        if self.analysis_cache_ttl_seconds == 0 || self.stats_cache_ttl_seconds == 0 {
            return Err(anyhow!("cache ttls must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            analysis_cache_ttl_seconds: self.analysis_cache_ttl_seconds,
            stats_cache_ttl_seconds: self.stats_cache_ttl_seconds,
            rate_limit_requests: self.rate_limit_requests,
            rate_limit_window_seconds: self.rate_limit_window_seconds,
            history_limit: self.history_limit,
            alerts_list_limit: self.alerts_list_limit,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            classifiers: self.classifiers.clone(),
            alerts: self.alerts.clone(),
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
        }
    }

    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            redis_url: self.redis_url.clone(),
            redis_prefix: self.redis_prefix.clone(),
        }
    }

    /// Applies `INSIGHT_*` overrides; `lookup` resolves a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("INSIGHT_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("INSIGHT_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Some(value) = lookup("INSIGHT_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Some(value) = lookup("INSIGHT_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Some(value) = lookup("INSIGHT_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Some(value) = lookup("INSIGHT_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Some(value) = lookup("INSIGHT_REDIS_URL") {
            self.redis_url = Some(value);
        }
        if let Some(value) = lookup("INSIGHT_REDIS_PREFIX") {
            self.redis_prefix = value;
        }
        if let Some(value) = lookup("INSIGHT_ANALYSIS_CACHE_TTL_SECONDS") {
            self.analysis_cache_ttl_seconds =
                value.parse().unwrap_or(self.analysis_cache_ttl_seconds);
        }
        if let Some(value) = lookup("INSIGHT_STATS_CACHE_TTL_SECONDS") {
            self.stats_cache_ttl_seconds = value.parse().unwrap_or(self.stats_cache_ttl_seconds);
        }
        if let Some(value) = lookup("INSIGHT_RATE_LIMIT_REQUESTS") {
            self.rate_limit_requests = value.parse().unwrap_or(self.rate_limit_requests);
        }
        if let Some(value) = lookup("INSIGHT_RATE_LIMIT_WINDOW_SECONDS") {
            self.rate_limit_window_seconds =
                value.parse().unwrap_or(self.rate_limit_window_seconds);
        }
        if let Some(value) = lookup("INSIGHT_HISTORY_LIMIT") {
            self.history_limit = value.parse().unwrap_or(self.history_limit);
        }
        if let Some(value) = lookup("INSIGHT_ALERTS_LIST_LIMIT") {
            self.alerts_list_limit = value.parse().unwrap_or(self.alerts_list_limit);
        }
        if let Some(value) = lookup("INSIGHT_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("INSIGHT_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn normalize_game_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let game = value.trim().to_lowercase();
        if !game.is_empty() && !out.contains(&game) {
            out.push(game);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").expect("config");
        assert_eq!(config.analysis_cache_ttl_seconds, 300);
        assert_eq!(config.stats_cache_ttl_seconds, 120);
        assert_eq!(config.rate_limit_requests, 10);
        assert_eq!(config.rate_limit_window_seconds, 60);
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.alerts.loss_streak_threshold, 4);
        assert_eq!(config.classifiers.aviator.min_samples, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_tuning_tables_override_single_fields() {
        let config = AppConfig::from_toml(
            r#"
redis_url = "redis://127.0.0.1:6379"

[classifiers.mines]
min_samples = 8

[alerts]
high_bet_ratio = 4.5
tracked_games = [" Mines ", "mines", "Crash"]
"#,
        )
        .expect("config");
        assert_eq!(config.classifiers.mines.min_samples, 8);
        assert_eq!(config.classifiers.mines.lookback, 30);
        assert_eq!(config.alerts.high_bet_ratio, 4.5);
        assert_eq!(config.alerts.recent_window, 5);

        let mut config = config;
        config.normalize();
        assert_eq!(config.alerts.tracked_games, vec!["mines", "crash"]);
        assert_eq!(
            config.to_cache_config().redis_url.as_deref(),
            Some("redis://127.0.0.1:6379")
        );
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("INSIGHT_BIND_ADDR", "0.0.0.0:9000"),
            ("INSIGHT_API_TOKEN", "  "),
            ("INSIGHT_RATE_LIMIT_REQUESTS", "25"),
            ("INSIGHT_HISTORY_LIMIT", "not-a-number"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|value| value.to_string()));
        config.normalize();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.api_token, None);
        assert_eq!(config.rate_limit_requests, 25);
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.to_runtime_config().rate_limit_requests, 25);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = AppConfig {
            bind_addr: "nowhere".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        config.bind_addr = "127.0.0.1:3300".to_string();
        config.redis_url = Some("http://cache".to_string());
        assert!(config.validate().is_err());

        config.redis_url = None;
        config.rate_limit_window_seconds = 0;
        assert!(config.validate().is_err());
    }
}
