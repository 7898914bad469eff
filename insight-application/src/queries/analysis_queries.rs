use tracing::{debug, warn};
use uuid::Uuid;

use crate::{AppError, AppState, RateDecision};
use insight_domain::{
    classify, AnalysisRecord, GameInsight, GameType, OutcomeFilter, PatternRecord, UserId,
};

pub fn analysis_cache_key(game_type: &str) -> String {
    format!("analysis:{}", game_type)
}

/// Full insight for one game type.
///
/// The cache key carries only the game type, so a user-scoped analysis is served to every
/// caller of that game until it expires.
pub async fn analyze_game(
    state: &AppState,
    game_type: &str,
    user_id: Option<&str>,
) -> Result<GameInsight, AppError> {
    let game = GameType::from(game_type);
    if game.as_str().is_empty() {
        return Err(AppError::BadRequest("game is required".to_string()));
    }
    let key = analysis_cache_key(game.as_str());
    if let Some(cached) = state.cache.get_json::<GameInsight>(&key).await {
        state.metrics.record_analyze(true);
        return Ok(cached);
    }
    state.metrics.record_analyze(false);

    let filter = match UserId::parse(user_id) {
        Some(user) => OutcomeFilter::for_user(user.as_str()).with_game(game.as_str()),
        None => OutcomeFilter::for_game(game.as_str()),
    };
    let history = match state
        .outcome_repo
        .fetch_recent(&filter, state.config.history_limit)
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            warn!(game_type = %game, "history unavailable, analyzing without it: {:#}", err);
            Vec::new()
        }
    };

    let classification = classify(&game, &history, &state.config.classifiers);
    let patterns = match state.catalog.list(game.as_str()).await {
        Ok(records) => records.iter().map(PatternRecord::to_view).collect(),
        Err(err) => {
            warn!(game_type = %game, "patterns unavailable: {:#}", err);
            Vec::new()
        }
    };

    let insight = GameInsight::assemble(
        game.as_str(),
        classification.insights,
        vec![classification.prediction],
        patterns,
        classification.alerts,
    );

    let record = AnalysisRecord::complete(Uuid::new_v4().to_string(), &insight, state.clock.now());
    if let Err(err) = state.analysis_repo.insert_analysis(&record).await {
        warn!(game_type = %game, "failed to store analysis: {:#}", err);
    }

    state
        .cache
        .set_json(&key, &insight, Some(state.config.analysis_cache_ttl_seconds))
        .await;
    debug!(game_type = %game, samples = history.len(), "analysis computed");
    Ok(insight)
}

/// Entry point for client requests: validates input and applies the per-client rate limit.
/// `client` is the caller's address; without one the limit is skipped.
pub async fn analyze_for_client(
    state: &AppState,
    game: Option<&str>,
    user_id: Option<&str>,
    client: Option<&str>,
) -> Result<GameInsight, AppError> {
    let game = game
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::BadRequest("game parameter is required".to_string()))?;

    if let Some(client) = client {
        let decision = state
            .rate_limiter
            .check_rate_limit(
                &format!("analyze:{}", client),
                state.config.rate_limit_requests,
                state.config.rate_limit_window_seconds,
            )
            .await;
        if let RateDecision::Limited { count } = decision {
            state.metrics.record_rate_limited();
            warn!(client, count, "analysis rate limit exceeded");
            return Err(AppError::RateLimited);
        }
    }

    analyze_game(state, game, user_id).await
}
