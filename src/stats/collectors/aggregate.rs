use super::super::key::StatKey;
use super::StatCollector;
use crate::matches::MatchModel;
use crate::user::UserModel;

/// Reads straight off the user's stored lifetime totals
pub struct AggregateCollector;

impl StatCollector for AggregateCollector {
    fn collect(&self, user: &UserModel, _history: &[MatchModel]) -> Vec<(StatKey, u32)> {
        let stats = &user.stats;
        vec![
            (StatKey::Wins, stats.wins),
            (StatKey::Losses, stats.losses),
            (StatKey::Draws, stats.draws),
            (StatKey::MatchesPlayed, stats.matches_played()),
            (StatKey::GoalsFor, stats.goals_for),
            (StatKey::GoalsAgainst, stats.goals_against),
            (StatKey::Shots, stats.shots),
            (StatKey::ShotsOnTarget, stats.shots_on_target),
            (StatKey::Passes, stats.passes),
            (StatKey::SuccessfulPasses, stats.successful_passes),
            (StatKey::Tackles, stats.tackles),
            (StatKey::Saves, stats.saves),
            (StatKey::RedCards, stats.red_cards),
            (StatKey::Fouls, stats.fouls),
        ]
    }
}
