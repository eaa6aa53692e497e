use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use super::models::MilestoneProgress;
use crate::shared::{AppError, AppState};

/// GET /users/:id/journey
#[instrument(name = "user_journey", skip(state))]
pub async fn user_journey(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MilestoneProgress>>, AppError> {
    Ok(Json(state.milestone_service.journey(&user_id).await?))
}
