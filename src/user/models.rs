use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matches::{Outcome, PlayerStats};

/// Lifetime totals for one player.
///
/// Only ever grown through [`AggregateStats::absorb`] inside a match commit;
/// nothing in the crate decrements or overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregateStats {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub shots: u32,
    pub shots_on_target: u32,
    pub passes: u32,
    pub successful_passes: u32,
    pub tackles: u32,
    pub saves: u32,
    pub red_cards: u32,
    pub fouls: u32,
    pub total_possession: u32,
}

impl AggregateStats {
    /// The increment one side of a match contributes to its owner's totals
    pub fn increment_for(own: &PlayerStats, other: &PlayerStats, outcome: Outcome) -> Self {
        Self {
            wins: u32::from(outcome == Outcome::Win),
            losses: u32::from(outcome == Outcome::Loss),
            draws: u32::from(outcome == Outcome::Draw),
            goals_for: own.score,
            goals_against: other.score,
            shots: own.shots,
            shots_on_target: own.shots_on_target,
            passes: own.passes,
            successful_passes: own.successful_passes,
            tackles: own.tackles,
            saves: own.saves,
            red_cards: own.red_cards.unwrap_or(0),
            fouls: own.fouls,
            total_possession: own.possession_percent(),
        }
    }

    /// Adds an increment to these totals
    pub fn absorb(&mut self, delta: &AggregateStats) {
        self.wins = self.wins.saturating_add(delta.wins);
        self.losses = self.losses.saturating_add(delta.losses);
        self.draws = self.draws.saturating_add(delta.draws);
        self.goals_for = self.goals_for.saturating_add(delta.goals_for);
        self.goals_against = self.goals_against.saturating_add(delta.goals_against);
        self.shots = self.shots.saturating_add(delta.shots);
        self.shots_on_target = self.shots_on_target.saturating_add(delta.shots_on_target);
        self.passes = self.passes.saturating_add(delta.passes);
        self.successful_passes = self
            .successful_passes
            .saturating_add(delta.successful_passes);
        self.tackles = self.tackles.saturating_add(delta.tackles);
        self.saves = self.saves.saturating_add(delta.saves);
        self.red_cards = self.red_cards.saturating_add(delta.red_cards);
        self.fouls = self.fouls.saturating_add(delta.fouls);
        self.total_possession = self.total_possession.saturating_add(delta.total_possession);
    }

    pub fn matches_played(&self) -> u32 {
        self.wins
            .saturating_add(self.losses)
            .saturating_add(self.draws)
    }

    /// wins / (wins + losses); draws don't count against the rate
    pub fn win_rate(&self) -> f64 {
        let decided = self.wins.saturating_add(self.losses);
        if decided == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(decided)
        }
    }

    pub fn pass_accuracy(&self) -> u32 {
        percentage(self.successful_passes, self.passes)
    }

    pub fn shot_accuracy(&self) -> u32 {
        percentage(self.shots_on_target, self.shots)
    }

    pub fn average_possession(&self) -> u32 {
        let played = self.matches_played();
        if played == 0 {
            0
        } else {
            (f64::from(self.total_possession) / f64::from(played)).round() as u32
        }
    }
}

/// Rounded `numerator / denominator` as a percentage; a zero denominator is 0%.
pub fn percentage(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((f64::from(numerator) / f64::from(denominator)) * 100.0).round() as u32
}

/// A registered player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    pub id: String,
    pub name: String,
    pub real_name: Option<String>,
    pub team_name: Option<String>,
    pub avatar_url: String,
    pub badges: Vec<String>,
    pub stats: AggregateStats,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a user with a generated id and all-zero stats
    pub fn new(
        name: String,
        real_name: Option<String>,
        team_name: Option<String>,
        avatar_url: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            real_name,
            team_name,
            avatar_url,
            badges: Vec::new(),
            stats: AggregateStats::default(),
            created_at: Utc::now(),
        }
    }

    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.badges.iter().any(|id| id == badge_id)
    }
}
