use tracing::error;

use crate::{AppError, AppState};
use insight_domain::{GameStats, GameType};

pub const DEFAULT_STATS_HOURS: u32 = 24;

pub fn stats_cache_key(game_type: &str, hours: u32) -> String {
    format!("stats:{}:{}", game_type, hours)
}

/// Aggregates over the trailing `hours` window. The flag reports whether the cache answered.
pub async fn game_stats(
    state: &AppState,
    game: Option<&str>,
    hours: Option<u32>,
) -> Result<(GameStats, bool), AppError> {
    let game = game
        .map(GameType::from)
        .filter(|game| !game.as_str().is_empty())
        .ok_or_else(|| AppError::BadRequest("game parameter is required".to_string()))?;
    let hours = match hours {
        Some(0) => return Err(AppError::BadRequest("hours must be positive".to_string())),
        Some(hours) => hours,
        None => DEFAULT_STATS_HOURS,
    };

    let key = stats_cache_key(game.as_str(), hours);
    if let Some(cached) = state.cache.get_json::<GameStats>(&key).await {
        return Ok((cached, true));
    }

    let raw = state
        .outcome_repo
        .aggregate(game.as_str(), hours)
        .await
        .map_err(|err| {
            error!(game_type = %game, "failed to aggregate stats: {:#}", err);
            AppError::Internal(err)
        })?;
    let stats = GameStats::from_stats(game.as_str(), hours, raw);
    state
        .cache
        .set_json(&key, &stats, Some(state.config.stats_cache_ttl_seconds))
        .await;
    Ok((stats, false))
}
