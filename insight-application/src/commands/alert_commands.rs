use tracing::{info, warn};
use uuid::Uuid;

use crate::queries::analyze_game;
use crate::AppState;
use insight_domain::{
    high_bet_alert, loss_streak_alert, opportunity_alert, Alert, InsightEvent, InsightEventKind,
    NewAlert, OutcomeFilter, UserId,
};

/// Evaluates every alert rule for `user_id` and returns the alerts that were stored.
/// Never fails: a rule whose inputs or write fail is skipped and the rest still run.
pub async fn generate_alerts(state: &AppState, user_id: &str) -> Vec<Alert> {
    let Some(user) = UserId::parse(Some(user_id)) else {
        return Vec::new();
    };
    let rules = &state.config.alerts;

    let history = match state
        .outcome_repo
        .fetch_recent(&OutcomeFilter::for_user(user.as_str()), rules.history_limit)
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            warn!(
                user_id = user.as_str(),
                "alert generation skipped, history unavailable: {:#}", err
            );
            return Vec::new();
        }
    };

    let mut written = Vec::new();
    let behavioural = [
        loss_streak_alert(user.as_str(), &history, rules),
        high_bet_alert(user.as_str(), &history, rules),
    ];
    for candidate in behavioural.into_iter().flatten() {
        written.extend(store_alert(state, candidate).await);
    }

    for game in &rules.tracked_games {
        let insight = match analyze_game(state, game, Some(user.as_str())).await {
            Ok(insight) => insight,
            Err(err) => {
                warn!(
                    user_id = user.as_str(),
                    game_type = %game,
                    "opportunity check failed: {}", err
                );
                continue;
            }
        };
        if let Some(candidate) = opportunity_alert(user.as_str(), &insight, rules) {
            written.extend(store_alert(state, candidate).await);
        }
    }

    state.metrics.record_alerts(written.len());
    written
}

/// Detached alert generation for the ingestion path.
pub fn spawn_alerts(state: AppState, user_id: String) {
    tokio::spawn(async move {
        let alerts = generate_alerts(&state, &user_id).await;
        if !alerts.is_empty() {
            info!(user_id = %user_id, count = alerts.len(), "alerts generated");
        }
    });
}

async fn store_alert(state: &AppState, candidate: NewAlert) -> Option<Alert> {
    let alert = candidate.into_alert(Uuid::new_v4().to_string(), state.clock.now());
    if let Err(err) = state.alert_repo.insert_alert(&alert).await {
        warn!(
            user_id = %alert.user_id,
            alert_type = alert.alert_type.as_str(),
            "failed to store alert: {:#}",
            err
        );
        return None;
    }
    state.events.publish(InsightEvent {
        event: InsightEventKind::TurboAlert,
        game_type: alert.game_type.clone(),
        user_id: Some(alert.user_id.clone()),
        data: serde_json::to_value(&alert).unwrap_or_default(),
        timestamp: alert.created_at,
    });
    Some(alert)
}
