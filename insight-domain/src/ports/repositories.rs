use async_trait::async_trait;

use crate::entities::{
    Alert,
    AnalysisRecord,
    GameOutcome,
    OutcomeFilter,
    OutcomeStats,
    PatternRecord,
};

#[async_trait]
pub trait OutcomeRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    /// Most-recent-first.
    async fn fetch_recent(
        &self,
        filter: &OutcomeFilter,
        limit: usize,
    ) -> anyhow::Result<Vec<GameOutcome>>;
    async fn append(&self, outcome: &GameOutcome) -> anyhow::Result<()>;
    async fn aggregate(&self, game_type: &str, hours: u32) -> anyhow::Result<OutcomeStats>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait PatternRepository: Send + Sync {
    /// Ordered by frequency, highest first.
    async fn fetch_patterns(&self, game_type: &str) -> anyhow::Result<Vec<PatternRecord>>;
    async fn find_pattern(
        &self,
        game_type: &str,
        pattern_type: &str,
    ) -> anyhow::Result<Option<PatternRecord>>;
    /// Replaces any record with the same (game_type, pattern_type).
    async fn save_pattern(&self, record: &PatternRecord) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    async fn insert_analysis(&self, record: &AnalysisRecord) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn insert_alert(&self, alert: &Alert) -> anyhow::Result<()>;
    /// Most-recent-first.
    async fn fetch_alerts(&self, user_id: &str, limit: usize) -> anyhow::Result<Vec<Alert>>;
}
