use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::{
    models::UserModel,
    types::{RegisterUserRequest, UserResponse},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a player
///
/// POST /users
#[instrument(name = "register_user", skip(state, request), fields(name = %request.name))]
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Display name is required".to_string()));
    }

    let user = UserModel::new(
        name,
        request.real_name,
        request.team_name,
        request.avatar_url,
    );
    state.users.create_user(&user).await?;

    info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users
#[instrument(name = "list_users", skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:id
#[instrument(name = "get_user", skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found: {}", user_id)))?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{body::Body, http::Request, Router};
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        let state = AppStateBuilder::new().build();
        Router::new()
            .route("/users", axum::routing::post(register_user).get(list_users))
            .route("/users/:id", axum::routing::get(get_user))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_register_user_starts_with_zero_stats() {
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "BanterKing99", "teamName": "Arsenal"}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let user: UserResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(user.name, "BanterKing99");
        assert_eq!(user.team_name.as_deref(), Some("Arsenal"));
        assert_eq!(user.matches_played, 0);
        assert_eq!(user.pass_accuracy, 0);
        assert!(user.badges.is_empty());
    }

    #[tokio::test]
    async fn test_register_user_rejects_blank_name() {
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "   "}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_get_unknown_user_is_not_found() {
        let request = Request::builder()
            .method("GET")
            .uri("/users/nobody")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
