use serde::{Deserialize, Serialize};

use super::models::{AggregateStats, UserModel};

/// Request body for `POST /users`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub name: String,
    pub real_name: Option<String>,
    pub team_name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
}

/// Public profile view with derived percentages
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub real_name: Option<String>,
    pub team_name: Option<String>,
    pub avatar_url: String,
    pub badges: Vec<String>,
    pub stats: AggregateStats,
    pub matches_played: u32,
    pub pass_accuracy: u32,
    pub shot_accuracy: u32,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            matches_played: user.stats.matches_played(),
            pass_accuracy: user.stats.pass_accuracy(),
            shot_accuracy: user.stats.shot_accuracy(),
            id: user.id,
            name: user.name,
            real_name: user.real_name,
            team_name: user.team_name,
            avatar_url: user.avatar_url,
            badges: user.badges,
            stats: user.stats,
        }
    }
}
