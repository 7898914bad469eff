use anyhow::{Context, Result};
use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::warn;

use crate::utils::{from_offset, to_offset};
use insight_domain::ports::{
    AlertRepository, AnalysisRepository, OutcomeRepository, PatternRepository,
};
use insight_domain::{
    Alert, AlertType, AnalysisRecord, DbConfig, GameOutcome, OutcomeFilter, OutcomeStats,
    PatternRecord,
};

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct OutcomeRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    created_at: OffsetDateTime,
    id: String,
    user_id: String,
    game_type: String,
    bet_amount: f64,
    result_amount: f64,
    multiplier: f64,
    game_data: String,
}

impl OutcomeRow {
    fn from_outcome(outcome: &GameOutcome) -> Self {
        Self {
            created_at: to_offset(outcome.created_at),
            id: outcome.id.clone(),
            user_id: outcome.user_id.clone().unwrap_or_default(),
            game_type: outcome.game_type.clone(),
            bet_amount: outcome.bet_amount,
            result_amount: outcome.result_amount,
            multiplier: outcome.multiplier,
            game_data: outcome.game_data.to_string(),
        }
    }

    fn into_outcome(self) -> GameOutcome {
        GameOutcome {
            id: self.id,
            user_id: Some(self.user_id).filter(|user| !user.is_empty()),
            game_type: self.game_type,
            bet_amount: self.bet_amount,
            result_amount: self.result_amount,
            multiplier: self.multiplier,
            game_data: serde_json::from_str(&self.game_data).unwrap_or(Value::Null),
            created_at: from_offset(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct PatternRow {
    game_type: String,
    pattern_type: String,
    payload: String,
    frequency: u64,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    last_seen: OffsetDateTime,
}

impl PatternRow {
    fn from_record(record: &PatternRecord) -> Self {
        Self {
            game_type: record.game_type.clone(),
            pattern_type: record.pattern_type.clone(),
            payload: record.payload.to_string(),
            frequency: record.frequency,
            last_seen: to_offset(record.last_seen),
        }
    }

    fn into_record(self) -> PatternRecord {
        PatternRecord {
            game_type: self.game_type,
            pattern_type: self.pattern_type,
            payload: serde_json::from_str(&self.payload).unwrap_or(Value::Null),
            frequency: self.frequency,
            last_seen: from_offset(self.last_seen),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct AnalysisRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    created_at: OffsetDateTime,
    id: String,
    game_type: String,
    analysis_type: String,
    payload: String,
    confidence_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct AlertRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    created_at: OffsetDateTime,
    id: String,
    user_id: String,
    alert_type: String,
    game_type: String,
    message: String,
    payload: String,
    is_read: u8,
}

impl AlertRow {
    fn into_alert(self) -> Result<Alert> {
        Ok(Alert {
            alert_type: self.alert_type.parse::<AlertType>()?,
            id: self.id,
            user_id: self.user_id,
            game_type: self.game_type,
            message: self.message,
            payload: serde_json::from_str(&self.payload).unwrap_or(Value::Null),
            is_read: self.is_read != 0,
            created_at: from_offset(self.created_at),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Row)]
struct StatsRow {
    total_games: u64,
    avg_multiplier: f64,
    max_multiplier: f64,
    min_multiplier: f64,
    avg_bet: f64,
    wins: u64,
    losses: u64,
}

#[derive(Clone)]
pub struct ClickhouseRepo {
    client: Client,
    database: String,
}

impl ClickhouseRepo {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn from_config(config: &DbConfig) -> Self {
        let mut client = Client::default()
            .with_url(&config.clickhouse_url)
            .with_database(&config.clickhouse_database);
        if let Some(user) = &config.clickhouse_user {
            client = client.with_user(user);
        }
        if let Some(password) = &config.clickhouse_password {
            client = client.with_password(password);
        }
        Self::new(client, config.clickhouse_database.clone())
    }
}

#[async_trait]
impl OutcomeRepository for ClickhouseRepo {
    async fn ensure_schema(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client
            .clone()
            .with_database("default")
            .query(&create_db)
            .execute()
            .await
            .context("create database")?;

        let create_outcomes = r#"
CREATE TABLE IF NOT EXISTS game_outcomes (
    created_at DateTime64(3),
    id String,
    user_id String,
    game_type LowCardinality(String),
    bet_amount Float64,
    result_amount Float64,
    multiplier Float64,
    game_data String
) ENGINE = MergeTree
PARTITION BY toYYYYMM(created_at)
ORDER BY (game_type, created_at)
"#;
        self.client.query(create_outcomes).execute().await.context("create game_outcomes")?;

        let create_patterns = r#"
CREATE TABLE IF NOT EXISTS game_patterns (
    game_type LowCardinality(String),
    pattern_type String,
    payload String,
    frequency UInt64,
    last_seen DateTime64(3)
) ENGINE = ReplacingMergeTree(last_seen)
ORDER BY (game_type, pattern_type)
"#;
        self.client.query(create_patterns).execute().await.context("create game_patterns")?;

        let create_analyses = r#"
CREATE TABLE IF NOT EXISTS analysis_records (
    created_at DateTime64(3),
    id String,
    game_type LowCardinality(String),
    analysis_type String,
    payload String,
    confidence_score Float64
) ENGINE = MergeTree
PARTITION BY toDate(created_at)
ORDER BY (game_type, created_at)
TTL toDateTime(created_at) + INTERVAL 30 DAY
"#;
        self.client.query(create_analyses).execute().await.context("create analysis_records")?;

        let create_alerts = r#"
CREATE TABLE IF NOT EXISTS alerts (
    created_at DateTime64(3),
    id String,
    user_id String,
    alert_type LowCardinality(String),
    game_type String,
    message String,
    payload String,
    is_read UInt8
) ENGINE = MergeTree
PARTITION BY toYYYYMM(created_at)
ORDER BY (user_id, created_at)
"#;
        self.client.query(create_alerts).execute().await.context("create alerts")?;
        Ok(())
    }

    async fn fetch_recent(&self, filter: &OutcomeFilter, limit: usize) -> Result<Vec<GameOutcome>> {
        let mut conditions = Vec::new();
        if filter.user_id.is_some() {
            conditions.push("user_id = ?");
        }
        if filter.game_type.is_some() {
            conditions.push("game_type = ?");
        }
        let mut sql = "SELECT ?fields FROM game_outcomes".to_string();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ?");

        let mut query = self.client.query(&sql);
        if let Some(user_id) = &filter.user_id {
            query = query.bind(user_id.as_str());
        }
        if let Some(game_type) = &filter.game_type {
            query = query.bind(game_type.as_str());
        }
        let rows = query
            .bind(limit as u64)
            .fetch_all::<OutcomeRow>()
            .await
            .context("fetch recent outcomes")?;
        Ok(rows.into_iter().map(OutcomeRow::into_outcome).collect())
    }

    async fn append(&self, outcome: &GameOutcome) -> Result<()> {
        let mut insert = self.client.insert("game_outcomes")?;
        insert.write(&OutcomeRow::from_outcome(outcome)).await?;
        insert.end().await.context("insert outcome")?;
        Ok(())
    }

    async fn aggregate(&self, game_type: &str, hours: u32) -> Result<OutcomeStats> {
        let row = self
            .client
            .query(
                "SELECT count() AS total_games, \
                 avg(multiplier) AS avg_multiplier, \
                 max(multiplier) AS max_multiplier, \
                 min(multiplier) AS min_multiplier, \
                 avg(bet_amount) AS avg_bet, \
                 countIf(result_amount > bet_amount) AS wins, \
                 countIf(result_amount <= bet_amount) AS losses \
                 FROM game_outcomes \
                 WHERE game_type = ? AND created_at >= now64(3) - toIntervalHour(?)",
            )
            .bind(game_type)
            .bind(hours)
            .fetch_one::<StatsRow>()
            .await
            .context("aggregate outcomes")?;
        if row.total_games == 0 {
            return Ok(OutcomeStats::default());
        }
        Ok(OutcomeStats {
            total_games: row.total_games,
            avg_multiplier: row.avg_multiplier,
            max_multiplier: row.max_multiplier,
            min_multiplier: row.min_multiplier,
            avg_bet: row.avg_bet,
            wins: row.wins,
            losses: row.losses,
        })
    }

    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }
}

#[async_trait]
impl PatternRepository for ClickhouseRepo {
    async fn fetch_patterns(&self, game_type: &str) -> Result<Vec<PatternRecord>> {
        let rows = self
            .client
            .query(
                "SELECT ?fields FROM game_patterns FINAL WHERE game_type = ? \
                 ORDER BY frequency DESC",
            )
            .bind(game_type)
            .fetch_all::<PatternRow>()
            .await
            .context("fetch patterns")?;
        Ok(rows.into_iter().map(PatternRow::into_record).collect())
    }

    async fn find_pattern(
        &self,
        game_type: &str,
        pattern_type: &str,
    ) -> Result<Option<PatternRecord>> {
        let rows = self
            .client
            .query(
                "SELECT ?fields FROM game_patterns FINAL \
                 WHERE game_type = ? AND pattern_type = ? LIMIT 1",
            )
            .bind(game_type)
            .bind(pattern_type)
            .fetch_all::<PatternRow>()
            .await
            .context("find pattern")?;
        Ok(rows.into_iter().next().map(PatternRow::into_record))
    }

    async fn save_pattern(&self, record: &PatternRecord) -> Result<()> {
        let mut insert = self.client.insert("game_patterns")?;
        insert.write(&PatternRow::from_record(record)).await?;
        insert.end().await.context("save pattern")?;
        Ok(())
    }
}

#[async_trait]
impl AnalysisRepository for ClickhouseRepo {
    async fn insert_analysis(&self, record: &AnalysisRecord) -> Result<()> {
        let row = AnalysisRow {
            created_at: to_offset(record.created_at),
            id: record.id.clone(),
            game_type: record.game_type.clone(),
            analysis_type: record.analysis_type.clone(),
            payload: serde_json::to_string(&record.payload)?,
            confidence_score: record.confidence_score,
        };
        let mut insert = self.client.insert("analysis_records")?;
        insert.write(&row).await?;
        insert.end().await.context("insert analysis")?;
        Ok(())
    }
}

#[async_trait]
impl AlertRepository for ClickhouseRepo {
    async fn insert_alert(&self, alert: &Alert) -> Result<()> {
        let row = AlertRow {
            created_at: to_offset(alert.created_at),
            id: alert.id.clone(),
            user_id: alert.user_id.clone(),
            alert_type: alert.alert_type.as_str().to_string(),
            game_type: alert.game_type.clone(),
            message: alert.message.clone(),
            payload: alert.payload.to_string(),
            is_read: u8::from(alert.is_read),
        };
        let mut insert = self.client.insert("alerts")?;
        insert.write(&row).await?;
        insert.end().await.context("insert alert")?;
        Ok(())
    }

    async fn fetch_alerts(&self, user_id: &str, limit: usize) -> Result<Vec<Alert>> {
        let rows = self
            .client
            .query(
                "SELECT ?fields FROM alerts WHERE user_id = ? \
                 ORDER BY created_at DESC LIMIT ?",
            )
            .bind(user_id)
            .bind(limit as u64)
            .fetch_all::<AlertRow>()
            .await
            .context("fetch alerts")?;
        let mut alerts = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id.clone();
            match row.into_alert() {
                Ok(alert) => alerts.push(alert),
                Err(err) => warn!(id = %id, "skipping unreadable alert: {:#}", err),
            }
        }
        Ok(alerts)
    }
}
