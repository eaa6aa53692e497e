use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{error, info, instrument};

use super::{
    confirmation::ConfirmationWorkflow,
    models::{Comment, ExtractedMatch, MatchModel},
    repository::MatchFilter,
    types::{AddCommentRequest, ExtractRequest, MatchListQuery, SubmitMatchRequest, UpdateRoastRequest},
};
use crate::ai::ImageData;
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};

/// Runs the screenshot through the extractor and returns the best-guess stats
///
/// POST /matches/extract
#[instrument(name = "extract_stats", skip(state, request))]
pub async fn extract_stats(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractedMatch>, AppError> {
    let image: ImageData = request.image.parse()?;

    let mut workflow = ConfirmationWorkflow::new();
    workflow.preview(image)?;
    workflow.extract(state.extractor.as_ref()).await?;

    match workflow {
        ConfirmationWorkflow::Extracted { stats, .. } => Ok(Json(stats)),
        other => {
            error!(state = other.state_name(), "Extraction left workflow in unexpected state");
            Err(AppError::Internal)
        }
    }
}

/// Confirms and commits a match for the session user
///
/// POST /matches
#[instrument(name = "submit_match", skip(state, claims, request), fields(user_id = %claims.user_id))]
pub async fn submit_match(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(request): Json<SubmitMatchRequest>,
) -> Result<(StatusCode, Json<MatchModel>), AppError> {
    let mut workflow = ConfirmationWorkflow::from_extracted(request.stats);
    if let Some(side) = request.user_team_side {
        workflow.select_side(side)?;
    }
    if let Some(opponent_id) = request.opponent_id {
        workflow.select_opponent(opponent_id)?;
    }
    if let Some(outcome) = request.outcome {
        workflow.select_outcome(outcome)?;
    }
    workflow.confirm(&claims.user_id)?;

    let confirmed = workflow.into_confirmed().ok_or(AppError::Internal)?;
    let record = state.match_service.submit(confirmed).await?;

    info!(match_id = %record.id, "Match saved");

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /matches?user=<id>
#[instrument(name = "list_matches", skip(state))]
pub async fn list_matches(
    State(state): State<AppState>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<Vec<MatchModel>>, AppError> {
    let filter = MatchFilter {
        participant: query.user,
        ..MatchFilter::default()
    };
    Ok(Json(state.match_service.list_matches(&filter).await?))
}

/// GET /matches/:id
#[instrument(name = "get_match", skip(state))]
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchModel>, AppError> {
    Ok(Json(state.match_service.get_match(&match_id).await?))
}

/// PUT /matches/:id/roast
#[instrument(name = "update_match_roast", skip(state, claims, request), fields(user_id = %claims.user_id))]
pub async fn update_roast(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(match_id): Path<String>,
    Json(request): Json<UpdateRoastRequest>,
) -> Result<Json<MatchModel>, AppError> {
    let record = state
        .match_service
        .update_roast(&match_id, &claims.user_id, &request.roast)
        .await?;
    Ok(Json(record))
}

/// POST /matches/:id/comments
#[instrument(name = "add_comment", skip(state, claims, request), fields(user_id = %claims.user_id))]
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(match_id): Path<String>,
    Json(request): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = state
        .match_service
        .add_comment(&match_id, &claims.user_id, &request.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
