use std::sync::Arc;

use insight_domain::ports::{Clock, PatternRepository};
use insight_domain::PatternRecord;
use serde_json::Value;

/// Pattern bookkeeping over the pattern store.
///
/// `upsert` is a read-modify-write cycle with no lock around it. Two concurrent upserts of the
/// same key can both read frequency `n` and both write `n + 1`.
pub struct PatternCatalog {
    repo: Arc<dyn PatternRepository>,
    clock: Arc<dyn Clock>,
}

impl PatternCatalog {
    pub fn new(repo: Arc<dyn PatternRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn list(&self, game_type: &str) -> anyhow::Result<Vec<PatternRecord>> {
        let mut records = self.repo.fetch_patterns(game_type).await?;
        records.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        Ok(records)
    }

    pub async fn upsert(
        &self,
        game_type: &str,
        pattern_type: &str,
        payload: Value,
    ) -> anyhow::Result<PatternRecord> {
        let now = self.clock.now();
        let record = match self.repo.find_pattern(game_type, pattern_type).await? {
            Some(mut existing) => {
                existing.touch(payload, now);
                existing
            }
            None => PatternRecord::first_seen(game_type, pattern_type, payload, now),
        };
        self.repo.save_pattern(&record).await?;
        Ok(record)
    }
}
