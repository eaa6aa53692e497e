use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::ai::{ExtractionError, StatsExtractor};
use crate::badges::{BadgeService, NotificationCenter};
use crate::event::EventBus;
use crate::hall::HallRepository;
use crate::leaderboard::LeaderboardService;
use crate::matches::{MatchError, MatchService};
use crate::milestones::MilestoneService;
use crate::session::TokenConfig;
use crate::store::StoreError;
use crate::user::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub hall: Arc<dyn HallRepository>,
    pub match_service: Arc<MatchService>,
    pub badge_service: Arc<BadgeService>,
    pub milestone_service: Arc<MilestoneService>,
    pub leaderboard_service: Arc<LeaderboardService>,
    pub extractor: Arc<dyn StatsExtractor>,
    pub notifications: Arc<NotificationCenter>,
    pub token_config: TokenConfig,
    pub event_bus: EventBus,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate match: {0}")]
    DuplicateMatch(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, retryable) = match self {
            AppError::JwtError(msg) => (StatusCode::BAD_REQUEST, msg, false),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, false),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, false),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, false),
            AppError::DuplicateMatch(_) => (
                StatusCode::CONFLICT,
                "This match has already been uploaded".to_string(),
                false,
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Database error: {}", msg),
                true,
            ),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg, true),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, false),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                false,
            ),
        };

        let body = Json(json!({
            "error": error_message,
            "retryable": retryable,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateFingerprint(fingerprint) => AppError::DuplicateMatch(fingerprint),
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Database(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Validation(msg) => AppError::Validation(msg),
            MatchError::Duplicate { fingerprint } => AppError::DuplicateMatch(fingerprint),
            MatchError::UnknownUser(user_id) => {
                AppError::NotFound(format!("User not found: {}", user_id))
            }
            MatchError::NotFound(match_id) => {
                AppError::NotFound(format!("Match not found: {}", match_id))
            }
            MatchError::Forbidden(msg) => AppError::Forbidden(msg),
            MatchError::Store(store) => store.into(),
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::InvalidImage(msg) => AppError::Validation(msg),
            ExtractionError::NotConfigured => {
                AppError::Upstream("Stats extraction is not configured".to_string())
            }
            other => AppError::Upstream(format!("Could not extract stats: {}", other)),
        }
    }
}
