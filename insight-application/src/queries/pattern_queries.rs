use tracing::error;

use crate::{AppError, AppState};
use insight_domain::{GameType, PatternRecord, PatternView};

pub async fn list_patterns(
    state: &AppState,
    game: Option<&str>,
) -> Result<Vec<PatternView>, AppError> {
    let game = game
        .map(GameType::from)
        .filter(|game| !game.as_str().is_empty())
        .ok_or_else(|| AppError::BadRequest("game parameter is required".to_string()))?;
    let records = state.catalog.list(game.as_str()).await.map_err(|err| {
        error!(game_type = %game, "failed to list patterns: {:#}", err);
        AppError::Internal(err)
    })?;
    Ok(records.iter().map(PatternRecord::to_view).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::harness;
    use serde_json::json;

    #[tokio::test]
    async fn views_carry_capped_probability() {
        let h = harness();
        for _ in 0..120 {
            h.state
                .catalog
                .upsert("roulette", "color_streak", json!({ "color": "red", "length": 7 }))
                .await
                .expect("upsert");
        }
        let views = list_patterns(&h.state, Some("Roulette")).await.expect("patterns");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].frequency, 120);
        assert_eq!(views[0].probability, 0.95);
    }

    #[tokio::test]
    async fn store_failure_is_an_internal_error() {
        let h = harness();
        h.store.fail_patterns(true);
        assert!(matches!(
            list_patterns(&h.state, Some("mines")).await,
            Err(AppError::Internal(_))
        ));
    }
}
