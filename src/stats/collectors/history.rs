use super::super::key::StatKey;
use super::StatCollector;
use crate::matches::{MatchModel, Outcome};
use crate::user::UserModel;

/// Longest win and loss runs, ordered by match date.
///
/// Draws break both kinds of streak.
pub struct StreakCollector;

impl StatCollector for StreakCollector {
    fn collect(&self, user: &UserModel, history: &[MatchModel]) -> Vec<(StatKey, u32)> {
        let mut played: Vec<&MatchModel> = history
            .iter()
            .filter(|m| m.is_participant(&user.id))
            .collect();
        played.sort_by_key(|m| m.date);

        let (mut best_wins, mut best_losses) = (0, 0);
        let (mut wins, mut losses) = (0, 0);

        for record in played {
            match record.outcome_for(&user.id) {
                Some(Outcome::Win) => {
                    wins += 1;
                    losses = 0;
                }
                Some(Outcome::Loss) => {
                    losses += 1;
                    wins = 0;
                }
                _ => {
                    wins = 0;
                    losses = 0;
                }
            }
            best_wins = best_wins.max(wins);
            best_losses = best_losses.max(losses);
        }

        vec![(StatKey::WinStreak, best_wins), (StatKey::LossStreak, best_losses)]
    }
}

/// Matches where the opponent finished on zero goals
pub struct CleanSheetCollector;

impl StatCollector for CleanSheetCollector {
    fn collect(&self, user: &UserModel, history: &[MatchModel]) -> Vec<(StatKey, u32)> {
        let clean_sheets = history
            .iter()
            .filter_map(|m| m.stats_for(&user.id))
            .filter(|(_, other)| other.score == 0)
            .count() as u32;

        vec![(StatKey::CleanSheets, clean_sheets)]
    }
}
