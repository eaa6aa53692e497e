use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::models::HallEntry;
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};

const HALL_PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
pub struct UpdateHallRoastRequest {
    pub roast: String,
}

/// GET /hall
#[instrument(name = "list_hall", skip(state))]
pub async fn list_hall(State(state): State<AppState>) -> Result<Json<Vec<HallEntry>>, AppError> {
    Ok(Json(state.hall.list_entries(HALL_PAGE_SIZE).await?))
}

/// The entry's subject rewrites its narrative
///
/// PUT /hall/:id/roast
#[instrument(name = "update_hall_roast", skip(state, claims, request), fields(user_id = %claims.user_id))]
pub async fn update_hall_roast(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(entry_id): Path<String>,
    Json(request): Json<UpdateHallRoastRequest>,
) -> Result<Json<HallEntry>, AppError> {
    let roast = request.roast.trim();
    if roast.is_empty() {
        return Err(AppError::Validation("Roast cannot be empty".to_string()));
    }

    let entry = state
        .hall
        .get_entry(&entry_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Hall entry not found: {}", entry_id)))?;

    if entry.subject_id != claims.user_id {
        return Err(AppError::Forbidden(
            "Only the subject of an entry can edit it".to_string(),
        ));
    }

    state.hall.update_entry_roast(&entry_id, roast).await?;
    info!(entry_id = %entry_id, "Hall roast edited");

    Ok(Json(HallEntry {
        roast: roast.to_string(),
        ..entry
    }))
}
