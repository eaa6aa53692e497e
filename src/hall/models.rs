use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HallKind {
    /// Winner spotlight
    Fame,
    /// Loser spotlight
    Shame,
}

/// Spotlight on one side of a decisive match.
///
/// References the match and users by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HallEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HallKind,
    pub title: String,
    /// "Alice defeated Bob" / "Bob was defeated by Alice"
    pub headline: String,
    pub subject_id: String,
    pub opponent_id: String,
    pub match_id: String,
    /// "Won by 2 goals" / "Lost by 2 goals"
    pub stat: String,
    pub roast: String,
    pub created_at: DateTime<Utc>,
}

impl HallEntry {
    pub fn fame(
        match_id: &str,
        winner: (&str, &str),
        loser: (&str, &str),
        goal_difference: u32,
        roast: String,
    ) -> Self {
        let (winner_id, winner_name) = winner;
        let (loser_id, loser_name) = loser;
        Self {
            id: Uuid::new_v4().to_string(),
            kind: HallKind::Fame,
            title: "Glorious Victory".to_string(),
            headline: format!("{} defeated {}", winner_name, loser_name),
            subject_id: winner_id.to_string(),
            opponent_id: loser_id.to_string(),
            match_id: match_id.to_string(),
            stat: format!("Won by {} goals", goal_difference),
            roast,
            created_at: Utc::now(),
        }
    }

    pub fn shame(
        match_id: &str,
        winner: (&str, &str),
        loser: (&str, &str),
        goal_difference: u32,
        roast: String,
    ) -> Self {
        let (winner_id, winner_name) = winner;
        let (loser_id, loser_name) = loser;
        Self {
            id: Uuid::new_v4().to_string(),
            kind: HallKind::Shame,
            title: "Crushing Defeat".to_string(),
            headline: format!("{} was defeated by {}", loser_name, winner_name),
            subject_id: loser_id.to_string(),
            opponent_id: winner_id.to_string(),
            match_id: match_id.to_string(),
            stat: format!("Lost by {} goals", goal_difference),
            roast,
            created_at: Utc::now(),
        }
    }
}
