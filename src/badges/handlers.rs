use axum::{extract::State, Extension, Json};
use tracing::instrument;

use super::models::{BadgeModel, BadgeNotification};
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};

/// GET /badges
#[instrument(name = "list_badges", skip(state))]
pub async fn list_badges(State(state): State<AppState>) -> Result<Json<Vec<BadgeModel>>, AppError> {
    Ok(Json(state.badge_service.list_badges().await?))
}

/// Pending unlocks for the session user; reading clears them
///
/// GET /notifications
#[instrument(name = "drain_notifications", skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn drain_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Json<Vec<BadgeNotification>> {
    Json(state.notifications.drain(&claims.user_id).await)
}
