use tracing::error;

use crate::{AppError, AppState};
use insight_domain::{Alert, UserId};

/// Most-recent-first alerts for a user. The signed-out placeholder id gets an empty list.
pub async fn list_alerts(state: &AppState, user_id: Option<&str>) -> Result<Vec<Alert>, AppError> {
    let raw = user_id
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId parameter is required".to_string()))?;
    let Some(user) = UserId::parse(Some(raw)) else {
        return Ok(Vec::new());
    };

    state
        .alert_repo
        .fetch_alerts(user.as_str(), state.config.alerts_list_limit)
        .await
        .map_err(|err| {
            error!("failed to fetch alerts: {:#}", err);
            AppError::Internal(err)
        })
}
