use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};
use uuid::Uuid;

use crate::commands::spawn_alerts;
use crate::queries::analysis_cache_key;
use crate::{AppError, AppState};
use insight_domain::{
    GameOutcome, GameType, InsightEvent, InsightEventKind, NewOutcome, UserId, REAL_TIME_UPDATE,
};

#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    #[serde(default, alias = "gameType")]
    pub game_type: Option<String>,
    #[serde(default, alias = "gameData")]
    pub game_data: Option<Value>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

/// Records a live observation as a `real_time_update` pattern and drops the in-process
/// analysis entry for the game. The remote analysis entry is left to expire on its own.
/// Failures are logged and swallowed.
pub async fn real_time_analysis(state: &AppState, game_type: &str, game_data: Value) {
    let game = GameType::from(game_type);
    let payload = json!({
        "timestamp": state.clock.now().to_rfc3339(),
        "data": game_data,
    });
    match state
        .catalog
        .upsert(game.as_str(), REAL_TIME_UPDATE, payload)
        .await
    {
        Ok(record) => {
            state
                .cache
                .invalidate_local(&analysis_cache_key(game.as_str()))
                .await;
            state.events.publish(InsightEvent {
                event: InsightEventKind::PatternDetected,
                game_type: record.game_type.clone(),
                user_id: None,
                data: json!({
                    "pattern_type": record.pattern_type,
                    "frequency": record.frequency,
                    "probability": record.probability(),
                }),
                timestamp: record.last_seen,
            });
        }
        Err(err) => warn!(game_type = %game, "real-time pattern update failed: {:#}", err),
    }
}

pub async fn process_ingest(state: &AppState, request: IngestRequest) -> Result<(), AppError> {
    let game_type = request
        .game_type
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let game_data = request.game_data.filter(|value| !value.is_null());
    let (Some(game_type), Some(game_data)) = (game_type, game_data) else {
        state.metrics.record_ingest_error();
        return Err(AppError::BadRequest(
            "gameType and gameData are required".to_string(),
        ));
    };
    let game = GameType::from(game_type);

    real_time_analysis(state, game.as_str(), game_data.clone()).await;

    let user = UserId::parse(request.user_id.as_deref());
    state.events.publish(InsightEvent {
        event: InsightEventKind::GameUpdate,
        game_type: game.as_str().to_string(),
        user_id: user.as_ref().map(|user| user.as_str().to_string()),
        data: game_data,
        timestamp: state.clock.now(),
    });
    state.metrics.record_ingest();

    if let Some(user) = user {
        spawn_alerts(state.clone(), user.0);
    }
    Ok(())
}

/// Validates and stores a finished round, then feeds it through live analysis.
pub async fn record_outcome(
    state: &AppState,
    new_outcome: NewOutcome,
) -> Result<GameOutcome, AppError> {
    if let Err(err) = new_outcome.validate() {
        state.metrics.record_ingest_error();
        return Err(AppError::BadRequest(err.to_string()));
    }
    let outcome = new_outcome.into_outcome(Uuid::new_v4().to_string(), state.clock.now());

    if let Err(err) = state.outcome_repo.append(&outcome).await {
        state.metrics.record_ingest_error();
        error!(game_type = %outcome.game_type, "failed to store outcome: {:#}", err);
        return Err(AppError::Internal(err));
    }

    let snapshot = serde_json::to_value(&outcome).unwrap_or_default();
    real_time_analysis(state, &outcome.game_type, snapshot.clone()).await;
    state.events.publish(InsightEvent {
        event: InsightEventKind::GameUpdate,
        game_type: outcome.game_type.clone(),
        user_id: outcome.user_id.clone(),
        data: snapshot,
        timestamp: outcome.created_at,
    });
    state.metrics.record_ingest();

    if let Some(user) = UserId::parse(outcome.user_id.as_deref()) {
        spawn_alerts(state.clone(), user.0);
    }
    Ok(outcome)
}
