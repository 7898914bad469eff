use std::sync::Arc;

use insight_domain::ports::{
    AlertRepository, AnalysisRepository, Clock, HealthCheckService, OutcomeRepository,
};
use insight_domain::RuntimeConfig;

use crate::{CacheLayer, EventHub, Metrics, PatternCatalog, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub outcome_repo: Arc<dyn OutcomeRepository>,
    pub analysis_repo: Arc<dyn AnalysisRepository>,
    pub alert_repo: Arc<dyn AlertRepository>,
    pub catalog: Arc<PatternCatalog>,
    pub cache: Arc<CacheLayer>,
    pub rate_limiter: Arc<RateLimiter>,
    pub events: Arc<EventHub>,
    pub health: Arc<dyn HealthCheckService>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<Metrics>,
}
