use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::types::{CreateSessionRequest, SessionResponse};
use crate::shared::{AppError, AppState};

/// Issues a session token for a registered user
///
/// POST /session
#[instrument(name = "create_session", skip(state, request), fields(user_id = %request.user_id))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = state
        .users
        .get_user(&request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found: {}", request.user_id)))?;

    let token = state.token_config.create_token(&user.id, &user.name)?;

    info!(user_id = %user.id, "Session created");

    Ok(Json(SessionResponse {
        token,
        user_id: user.id,
        name: user.name,
    }))
}
