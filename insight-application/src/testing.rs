// In-memory fakes of the domain ports plus a manually driven clock.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Duration;
use serde_json::json;

use insight_domain::ports::{
    AlertRepository, AnalysisRepository, Clock, HealthCheckService, OutcomeRepository,
    PatternRepository, RemoteCache, ServiceStatus,
};
use insight_domain::{
    millis_to_datetime, Alert, AlertType, AnalysisRecord, GameOutcome, OutcomeFilter,
    OutcomeStats, PatternRecord, RuntimeConfig,
};

use crate::{AppState, CacheLayer, EventHub, Metrics, PatternCatalog, RateLimiter};

pub const START_MILLIS: i64 = 1_760_000_000_000;

pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(start),
        })
    }

    pub fn advance_millis(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_millis(secs * 1000);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

pub struct MemoryRemoteCache {
    entries: Mutex<HashMap<String, (String, Option<i64>)>>,
    clock: Arc<dyn Clock>,
    failing: AtomicBool,
}

impl MemoryRemoteCache {
    pub fn new(clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            failing: AtomicBool::new(false),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().expect("remote lock").contains_key(key)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }

    fn live_value(&self, key: &str) -> Option<(String, Option<i64>)> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock().expect("remote lock");
        match entries.get(key) {
            Some((_, Some(expires_at))) if *expires_at <= now => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.clone()),
            None => None,
        }
    }
}

#[async_trait]
impl RemoteCache for MemoryRemoteCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.check()?;
        Ok(self.live_value(key).map(|(value, _)| value))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> anyhow::Result<()> {
        self.check()?;
        let expires_at = ttl_seconds.map(|ttl| self.clock.now_millis() + ttl as i64 * 1000);
        self.entries
            .lock()
            .expect("remote lock")
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn del(&self, key: &str) -> anyhow::Result<()> {
        self.check()?;
        self.entries.lock().expect("remote lock").remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        self.check()?;
        Ok(self.live_value(key).is_some())
    }

    async fn incr(&self, key: &str) -> anyhow::Result<i64> {
        self.check()?;
        let (next, expires_at) = match self.live_value(key) {
            Some((value, expires_at)) => (value.parse::<i64>()? + 1, expires_at),
            None => (1, None),
        };
        self.entries
            .lock()
            .expect("remote lock")
            .insert(key.to_string(), (next.to_string(), expires_at));
        Ok(next)
    }

    async fn expire(&self, key: &str, seconds: u64) -> anyhow::Result<()> {
        self.check()?;
        let expires_at = self.clock.now_millis() + seconds as i64 * 1000;
        if let Some(entry) = self.entries.lock().expect("remote lock").get_mut(key) {
            entry.1 = Some(expires_at);
        }
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.check()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    outcomes: Mutex<Vec<GameOutcome>>,
    patterns: Mutex<HashMap<(String, String), PatternRecord>>,
    analyses: Mutex<Vec<AnalysisRecord>>,
    alerts: Mutex<Vec<Alert>>,
    history_reads: AtomicI64,
    fail_history: AtomicBool,
    fail_patterns: AtomicBool,
    fail_analysis_writes: AtomicBool,
    failing_alert_types: Mutex<HashSet<AlertType>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, outcomes: Vec<GameOutcome>) {
        self.outcomes.lock().expect("store lock").extend(outcomes);
    }

    pub fn analyses(&self) -> Vec<AnalysisRecord> {
        self.analyses.lock().expect("store lock").clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().expect("store lock").clone()
    }

    pub fn outcomes(&self) -> Vec<GameOutcome> {
        self.outcomes.lock().expect("store lock").clone()
    }

    pub fn history_reads(&self) -> i64 {
        self.history_reads.load(Ordering::SeqCst)
    }

    pub fn fail_history(&self, failing: bool) {
        self.fail_history.store(failing, Ordering::SeqCst);
    }

    pub fn fail_patterns(&self, failing: bool) {
        self.fail_patterns.store(failing, Ordering::SeqCst);
    }

    pub fn fail_analysis_writes(&self, failing: bool) {
        self.fail_analysis_writes.store(failing, Ordering::SeqCst);
    }

    pub fn fail_alert_writes_for(&self, alert_type: AlertType) {
        self.failing_alert_types
            .lock()
            .expect("store lock")
            .insert(alert_type);
    }
}

#[async_trait]
impl OutcomeRepository for MemoryStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn fetch_recent(
        &self,
        filter: &OutcomeFilter,
        limit: usize,
    ) -> anyhow::Result<Vec<GameOutcome>> {
        self.history_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(anyhow!("history store unavailable"));
        }
        let mut rows: Vec<GameOutcome> = self
            .outcomes
            .lock()
            .expect("store lock")
            .iter()
            .filter(|outcome| filter.matches(outcome))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn append(&self, outcome: &GameOutcome) -> anyhow::Result<()> {
        self.outcomes
            .lock()
            .expect("store lock")
            .push(outcome.clone());
        Ok(())
    }

    async fn aggregate(&self, game_type: &str, hours: u32) -> anyhow::Result<OutcomeStats> {
        let outcomes = self.outcomes.lock().expect("store lock");
        let newest = outcomes
            .iter()
            .map(|outcome| outcome.created_at)
            .max()
            .unwrap_or_else(chrono::Utc::now);
        let since = newest - Duration::hours(i64::from(hours));
        let rows: Vec<&GameOutcome> = outcomes
            .iter()
            .filter(|outcome| outcome.game_type == game_type && outcome.created_at >= since)
            .collect();
        if rows.is_empty() {
            return Ok(OutcomeStats::default());
        }
        let count = rows.len() as f64;
        let multipliers: Vec<f64> = rows.iter().map(|outcome| outcome.multiplier).collect();
        let wins = rows.iter().filter(|outcome| outcome.is_win()).count() as u64;
        Ok(OutcomeStats {
            total_games: rows.len() as u64,
            avg_multiplier: multipliers.iter().sum::<f64>() / count,
            max_multiplier: multipliers.iter().cloned().fold(f64::MIN, f64::max),
            min_multiplier: multipliers.iter().cloned().fold(f64::MAX, f64::min),
            avg_bet: rows.iter().map(|outcome| outcome.bet_amount).sum::<f64>() / count,
            wins,
            losses: rows.len() as u64 - wins,
        })
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl PatternRepository for MemoryStore {
    async fn fetch_patterns(&self, game_type: &str) -> anyhow::Result<Vec<PatternRecord>> {
        if self.fail_patterns.load(Ordering::SeqCst) {
            return Err(anyhow!("pattern store unavailable"));
        }
        let mut rows: Vec<PatternRecord> = self
            .patterns
            .lock()
            .expect("store lock")
            .values()
            .filter(|record| record.game_type == game_type)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        Ok(rows)
    }

    async fn find_pattern(
        &self,
        game_type: &str,
        pattern_type: &str,
    ) -> anyhow::Result<Option<PatternRecord>> {
        if self.fail_patterns.load(Ordering::SeqCst) {
            return Err(anyhow!("pattern store unavailable"));
        }
        Ok(self
            .patterns
            .lock()
            .expect("store lock")
            .get(&(game_type.to_string(), pattern_type.to_string()))
            .cloned())
    }

    async fn save_pattern(&self, record: &PatternRecord) -> anyhow::Result<()> {
        if self.fail_patterns.load(Ordering::SeqCst) {
            return Err(anyhow!("pattern store unavailable"));
        }
        self.patterns.lock().expect("store lock").insert(
            (record.game_type.clone(), record.pattern_type.clone()),
            record.clone(),
        );
        Ok(())
    }
}

#[async_trait]
impl AnalysisRepository for MemoryStore {
    async fn insert_analysis(&self, record: &AnalysisRecord) -> anyhow::Result<()> {
        if self.fail_analysis_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("analysis store unavailable"));
        }
        self.analyses
            .lock()
            .expect("store lock")
            .push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl AlertRepository for MemoryStore {
    async fn insert_alert(&self, alert: &Alert) -> anyhow::Result<()> {
        if self
            .failing_alert_types
            .lock()
            .expect("store lock")
            .contains(&alert.alert_type)
        {
            return Err(anyhow!("alert store rejected {}", alert.alert_type.as_str()));
        }
        self.alerts.lock().expect("store lock").push(alert.clone());
        Ok(())
    }

    async fn fetch_alerts(&self, user_id: &str, limit: usize) -> anyhow::Result<Vec<Alert>> {
        let mut rows: Vec<Alert> = self
            .alerts
            .lock()
            .expect("store lock")
            .iter()
            .filter(|alert| alert.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }
}

pub struct StaticHealth;

#[async_trait]
impl HealthCheckService for StaticHealth {
    async fn check_database(&self) -> ServiceStatus {
        ServiceStatus {
            status: "ok".to_string(),
            latency_ms: 0,
        }
    }

    async fn check_cache(&self) -> ServiceStatus {
        ServiceStatus {
            status: "ok".to_string(),
            latency_ms: 0,
        }
    }
}

pub struct Harness {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub remote: Arc<MemoryRemoteCache>,
    pub clock: Arc<ManualClock>,
}

pub fn harness() -> Harness {
    harness_with(RuntimeConfig::default())
}

pub fn harness_with(config: RuntimeConfig) -> Harness {
    let clock = ManualClock::new(START_MILLIS);
    let remote = MemoryRemoteCache::new(clock.clone());
    let store = MemoryStore::new();
    let cache = Arc::new(CacheLayer::new(Some(remote.clone()), clock.clone()));
    let state = AppState {
        config,
        outcome_repo: store.clone(),
        analysis_repo: store.clone(),
        alert_repo: store.clone(),
        catalog: Arc::new(PatternCatalog::new(store.clone(), clock.clone())),
        rate_limiter: Arc::new(RateLimiter::new(cache.clone())),
        cache,
        events: Arc::new(EventHub::default()),
        health: Arc::new(StaticHealth),
        clock: clock.clone(),
        metrics: Arc::new(Metrics::default()),
    };
    Harness {
        state,
        store,
        remote,
        clock,
    }
}

/// Outcome created `age_secs` before the harness start time.
pub fn outcome(
    user_id: Option<&str>,
    game_type: &str,
    bet: f64,
    result: f64,
    multiplier: f64,
    age_secs: i64,
) -> GameOutcome {
    GameOutcome {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.map(ToString::to_string),
        game_type: game_type.to_string(),
        bet_amount: bet,
        result_amount: result,
        multiplier,
        game_data: json!({}),
        created_at: millis_to_datetime(START_MILLIS - age_secs * 1000),
    }
}

/// Outcomes ordered most-recent-first as given, spaced one second apart.
pub fn history(
    user_id: Option<&str>,
    game_type: &str,
    rows: &[(f64, f64, f64)],
) -> Vec<GameOutcome> {
    rows.iter()
        .enumerate()
        .map(|(index, (bet, result, multiplier))| {
            outcome(user_id, game_type, *bet, *result, *multiplier, index as i64 + 1)
        })
        .collect()
}
