use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use insight_application::{
    AppState, CacheLayer, EventHub, Metrics, PatternCatalog, RateLimiter,
};
use insight_domain::ports::{Clock, OutcomeRepository, RemoteCache};
use insight_domain::SystemClock;
use insight_infrastructure::{AppConfig, ClickhouseRepo, DefaultHealthService, RedisCache};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();
        let cache_config = config.to_cache_config();

        let repo = Arc::new(ClickhouseRepo::from_config(&db_config));
        repo.ensure_schema().await?;

        let remote: Option<Arc<dyn RemoteCache>> = match RedisCache::from_config(&cache_config)? {
            Some(cache) => {
                info!("remote cache enabled");
                Some(Arc::new(cache))
            }
            None => {
                warn!("redis_url not set, caching in process only");
                None
            }
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(CacheLayer::new(remote.clone(), clock.clone()));

        let state = AppState {
            config: runtime_config,
            outcome_repo: repo.clone(),
            analysis_repo: repo.clone(),
            alert_repo: repo.clone(),
            catalog: Arc::new(PatternCatalog::new(repo.clone(), clock.clone())),
            rate_limiter: Arc::new(RateLimiter::new(cache.clone())),
            cache,
            events: Arc::new(EventHub::default()),
            health: Arc::new(DefaultHealthService::new(repo, remote)),
            clock,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
