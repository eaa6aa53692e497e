use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use super::{
    aggregate::{BestOfCard, LoserRow, MonthTrend, RivalRecord},
    service::Leaderboard,
    window::TimeRange,
};
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub range: TimeRange,
}

/// GET /leaderboard?range=monthly|yearly|all-time
#[instrument(name = "leaderboard", skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Leaderboard>, AppError> {
    Ok(Json(
        state
            .leaderboard_service
            .leaderboard(query.range, Utc::now())
            .await?,
    ))
}

/// GET /stats/best
#[instrument(name = "best_of", skip(state))]
pub async fn best_of(State(state): State<AppState>) -> Result<Json<Vec<BestOfCard>>, AppError> {
    Ok(Json(state.leaderboard_service.best_of().await?))
}

/// GET /users/:id/rivals
#[instrument(name = "rivals", skip(state))]
pub async fn rivals(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<RivalRecord>>, AppError> {
    Ok(Json(state.leaderboard_service.rivals(&user_id).await?))
}

/// GET /losers?range=daily|monthly|yearly
#[instrument(name = "losers", skip(state))]
pub async fn losers(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<LoserRow>>, AppError> {
    Ok(Json(
        state
            .leaderboard_service
            .losers(query.range, Utc::now())
            .await?,
    ))
}

/// GET /users/:id/trends
#[instrument(name = "trends", skip(state))]
pub async fn trends(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MonthTrend>>, AppError> {
    Ok(Json(
        state
            .leaderboard_service
            .trends(&user_id, Utc::now())
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    async fn status_of(uri: &str) -> StatusCode {
        let app = Router::new()
            .route("/leaderboard", get(leaderboard))
            .route("/losers", get(losers))
            .route("/users/:id/rivals", get(rivals))
            .route("/users/:id/trends", get(trends))
            .with_state(AppStateBuilder::new().build());
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn range_parameter_is_validated() {
        assert_eq!(status_of("/leaderboard").await, StatusCode::OK);
        assert_eq!(status_of("/leaderboard?range=all-time").await, StatusCode::OK);
        assert_eq!(status_of("/losers?range=daily").await, StatusCode::OK);
        assert_eq!(
            status_of("/leaderboard?range=fortnightly").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn unknown_user_views_are_not_found() {
        assert_eq!(status_of("/users/ghost/rivals").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of("/users/ghost/trends").await, StatusCode::NOT_FOUND);
    }
}
