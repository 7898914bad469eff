use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::warn;

use insight_domain::ports::{HealthCheckService, OutcomeRepository, RemoteCache, ServiceStatus};

pub struct DefaultHealthService {
    outcome_repo: Arc<dyn OutcomeRepository>,
    cache: Option<Arc<dyn RemoteCache>>,
}

impl DefaultHealthService {
    pub fn new(
        outcome_repo: Arc<dyn OutcomeRepository>,
        cache: Option<Arc<dyn RemoteCache>>,
    ) -> Self {
        Self {
            outcome_repo,
            cache,
        }
    }
}

fn status_from(component: &str, started: Instant, result: anyhow::Result<()>) -> ServiceStatus {
    let latency_ms = started.elapsed().as_millis() as u64;
    let status = match result {
        Ok(()) => "ok".to_string(),
        Err(err) => {
            warn!(component, "health check failed: {:#}", err);
            "error".to_string()
        }
    };
    ServiceStatus { status, latency_ms }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> ServiceStatus {
        let started = Instant::now();
        let result = self.outcome_repo.ping().await;
        status_from("database", started, result)
    }

    async fn check_cache(&self) -> ServiceStatus {
        let Some(cache) = &self.cache else {
            return ServiceStatus {
                status: "disabled".to_string(),
                latency_ms: 0,
            };
        };
        let started = Instant::now();
        let result = cache.ping().await;
        status_from("cache", started, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use insight_domain::{GameOutcome, OutcomeFilter, OutcomeStats};

    struct DownRepo;

    #[async_trait]
    impl OutcomeRepository for DownRepo {
        async fn ensure_schema(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn fetch_recent(
            &self,
            _filter: &OutcomeFilter,
            _limit: usize,
        ) -> anyhow::Result<Vec<GameOutcome>> {
            Ok(Vec::new())
        }

        async fn append(&self, _outcome: &GameOutcome) -> anyhow::Result<()> {
            Ok(())
        }

        async fn aggregate(&self, _game_type: &str, _hours: u32) -> anyhow::Result<OutcomeStats> {
            Ok(OutcomeStats::default())
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn reports_database_error_and_disabled_cache() {
        let service = DefaultHealthService::new(Arc::new(DownRepo), None);
        assert_eq!(service.check_database().await.status, "error");
        let cache = service.check_cache().await;
        assert_eq!(cache.status, "disabled");
        assert!(!cache.is_ok());
    }
}
