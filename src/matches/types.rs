use serde::Deserialize;

use super::models::{ExtractedMatch, Outcome, TeamSide};

/// Request body for `POST /matches/extract`
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// `data:<mime>;base64,<payload>`
    pub image: String,
}

/// Request body for `POST /matches`.
///
/// The three selections are optional on the wire so a missing one surfaces
/// as a validation error rather than a deserialisation failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMatchRequest {
    pub stats: ExtractedMatch,
    pub user_team_side: Option<TeamSide>,
    pub opponent_id: Option<String>,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MatchListQuery {
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoastRequest {
    pub roast: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub text: String,
}
