use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Sentinel stored in `winnerId` when neither side won
pub const DRAW: &str = "draw";

/// One side's numbers as read off the post-match screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    pub name: String,
    pub score: u32,
    pub possession: String,
    pub shots: u32,
    pub shots_on_target: u32,
    pub fouls: u32,
    pub offsides: u32,
    pub corner_kicks: u32,
    pub free_kicks: u32,
    pub passes: u32,
    pub successful_passes: u32,
    pub crosses: u32,
    pub interceptions: u32,
    pub tackles: u32,
    pub saves: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_accuracy: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red_cards: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl PlayerStats {
    /// Possession as a whole percentage. Accepts "55", "55%", "55.4 %";
    /// anything unparseable counts as 0.
    pub fn possession_percent(&self) -> u32 {
        self.possession
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| value.round().min(100.0) as u32)
            .unwrap_or(0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TeamSide {
    Team1,
    Team2,
}

impl TeamSide {
    pub fn other(self) -> Self {
        match self {
            TeamSide::Team1 => TeamSide::Team2,
            TeamSide::Team2 => TeamSide::Team1,
        }
    }
}

/// Result from one participant's point of view
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// The same result seen from the other side
    pub fn inverse(self) -> Self {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }

    /// Outcome implied purely by the scoreline
    pub fn from_scores(own: u32, other: u32) -> Self {
        match own.cmp(&other) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// The two-sided record the extraction gateway returns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedMatch {
    pub team1_name: String,
    pub team2_name: String,
    pub team1_stats: PlayerStats,
    pub team2_stats: PlayerStats,
}

impl ExtractedMatch {
    pub fn side(&self, side: TeamSide) -> &PlayerStats {
        match side {
            TeamSide::Team1 => &self.team1_stats,
            TeamSide::Team2 => &self.team2_stats,
        }
    }

    pub fn side_mut(&mut self, side: TeamSide) -> &mut PlayerStats {
        match side {
            TeamSide::Team1 => &mut self.team1_stats,
            TeamSide::Team2 => &mut self.team2_stats,
        }
    }

    /// Same match with team1 and team2 exchanged
    pub fn swapped(&self) -> Self {
        Self {
            team1_name: self.team2_name.clone(),
            team2_name: self.team1_name.clone(),
            team1_stats: self.team2_stats.clone(),
            team2_stats: self.team1_stats.clone(),
        }
    }
}

/// Declared winner: a participant id, or the `"draw"` sentinel on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchWinner {
    Player(String),
    Draw,
}

impl From<String> for MatchWinner {
    fn from(value: String) -> Self {
        if value == DRAW {
            MatchWinner::Draw
        } else {
            MatchWinner::Player(value)
        }
    }
}

impl From<MatchWinner> for String {
    fn from(value: MatchWinner) -> Self {
        match value {
            MatchWinner::Player(id) => id,
            MatchWinner::Draw => DRAW.to_string(),
        }
    }
}

impl MatchWinner {
    pub fn as_str(&self) -> &str {
        match self {
            MatchWinner::Player(id) => id,
            MatchWinner::Draw => DRAW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            text,
            timestamp: Utc::now(),
        }
    }
}

/// A committed contest between exactly two users.
///
/// Participants, stat blocks and fingerprint never change after commit; only
/// `roast` and `comments` are edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchModel {
    pub id: String,
    pub created_by: String,
    pub opponent_id: String,
    pub participants: Vec<String>,
    pub date: DateTime<Utc>,
    pub comments: Vec<Comment>,
    pub roast: Option<String>,
    #[serde(rename = "winnerId")]
    pub winner: MatchWinner,
    pub opponent_name: String,
    pub team1_name: String,
    pub team2_name: String,
    pub team1_stats: PlayerStats,
    pub team2_stats: PlayerStats,
    pub fingerprint: String,
    pub user_team_side: TeamSide,
}

impl MatchModel {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|id| id == user_id)
    }

    /// `(own, other)` stat blocks for a participant, found by the stamped user id
    pub fn stats_for(&self, user_id: &str) -> Option<(&PlayerStats, &PlayerStats)> {
        if self.team1_stats.user_id.as_deref() == Some(user_id) {
            Some((&self.team1_stats, &self.team2_stats))
        } else if self.team2_stats.user_id.as_deref() == Some(user_id) {
            Some((&self.team2_stats, &self.team1_stats))
        } else {
            None
        }
    }

    /// The other participant's id
    pub fn opponent_of(&self, user_id: &str) -> Option<&str> {
        if !self.is_participant(user_id) {
            return None;
        }
        self.participants
            .iter()
            .find(|id| id.as_str() != user_id)
            .map(String::as_str)
    }

    /// Outcome for a participant according to the declared winner
    pub fn outcome_for(&self, user_id: &str) -> Option<Outcome> {
        if !self.is_participant(user_id) {
            return None;
        }
        Some(match &self.winner {
            MatchWinner::Draw => Outcome::Draw,
            MatchWinner::Player(winner) if winner == user_id => Outcome::Win,
            MatchWinner::Player(_) => Outcome::Loss,
        })
    }

    /// Outcome for a participant according to the scoreline alone
    pub fn score_outcome_for(&self, user_id: &str) -> Option<Outcome> {
        self.stats_for(user_id)
            .map(|(own, other)| Outcome::from_scores(own.score, other.score))
    }

    /// True when the declared winner disagrees with the scoreline
    pub fn winner_diverges_from_score(&self) -> bool {
        self.participants.first().is_some_and(|first| {
            match (self.outcome_for(first), self.score_outcome_for(first)) {
                (Some(declared), Some(scored)) => declared != scored,
                _ => false,
            }
        })
    }

    pub fn is_decisive(&self) -> bool {
        matches!(self.winner, MatchWinner::Player(_))
    }

    /// `(winner_id, loser_id)` for decisive matches
    pub fn winner_and_loser(&self) -> Option<(&str, &str)> {
        match &self.winner {
            MatchWinner::Player(winner) => self
                .opponent_of(winner)
                .map(|loser| (winner.as_str(), loser)),
            MatchWinner::Draw => None,
        }
    }

    pub fn goal_difference(&self) -> u32 {
        self.team1_stats.score.abs_diff(self.team2_stats.score)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;

    pub(crate) fn sample_match() -> MatchModel {
        MatchModel {
            id: "m1".to_string(),
            created_by: "u1".to_string(),
            opponent_id: "u2".to_string(),
            participants: vec!["u1".to_string(), "u2".to_string()],
            date: Utc::now(),
            comments: Vec::new(),
            roast: None,
            winner: MatchWinner::Player("u1".to_string()),
            opponent_name: "B".to_string(),
            team1_name: "A FC".to_string(),
            team2_name: "B FC".to_string(),
            team1_stats: PlayerStats {
                score: 3,
                user_id: Some("u1".to_string()),
                ..PlayerStats::default()
            },
            team2_stats: PlayerStats {
                score: 1,
                user_id: Some("u2".to_string()),
                ..PlayerStats::default()
            },
            fingerprint: "fp".to_string(),
            user_team_side: TeamSide::Team1,
        }
    }

    #[rstest]
    #[case("55%", 55)]
    #[case("55", 55)]
    #[case(" 48.6 % ", 49)]
    #[case("", 0)]
    #[case("about half", 0)]
    #[case("-3", 0)]
    fn possession_parsing_is_lenient(#[case] raw: &str, #[case] expected: u32) {
        let stats = PlayerStats {
            possession: raw.to_string(),
            ..PlayerStats::default()
        };
        assert_eq!(stats.possession_percent(), expected);
    }

    #[test]
    fn winner_serializes_with_draw_sentinel() {
        let json = serde_json::to_string(&MatchWinner::Draw).unwrap();
        assert_eq!(json, "\"draw\"");

        let parsed: MatchWinner = serde_json::from_str("\"u1\"").unwrap();
        assert_eq!(parsed, MatchWinner::Player("u1".to_string()));
    }

    #[test]
    fn outcome_for_is_never_win_for_both() {
        let record = sample_match();
        assert_eq!(record.outcome_for("u1"), Some(Outcome::Win));
        assert_eq!(record.outcome_for("u2"), Some(Outcome::Loss));
        assert_eq!(record.outcome_for("u3"), None);
        assert_eq!(record.winner_and_loser(), Some(("u1", "u2")));
        assert_eq!(record.goal_difference(), 2);
    }

    #[test]
    fn divergence_is_detected_not_corrected() {
        let mut record = sample_match();
        assert!(!record.winner_diverges_from_score());

        record.winner = MatchWinner::Player("u2".to_string());
        assert!(record.winner_diverges_from_score());
        assert_eq!(record.outcome_for("u2"), Some(Outcome::Win));
    }

    #[test]
    fn match_model_uses_winner_id_on_the_wire() {
        let json = serde_json::to_value(sample_match()).unwrap();
        assert_eq!(json["winnerId"], "u1");
        assert_eq!(json["userTeamSide"], "team1");
        assert_eq!(json["team1Stats"]["userId"], "u1");
    }
}
