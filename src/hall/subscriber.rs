use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{models::HallEntry, repository::HallRepository};
use crate::ai::{fame_fallback, shame_fallback, HallRoasts, NarrativeGenerator};
use crate::event::{EventError, EventHandler, MatchEvent};
use crate::matches::match_scenario;
use crate::user::UserRepository;

/// Margin from which a result counts as a thrashing
const ROUT_MARGIN: u32 = 3;

/// Writes one fame and one shame entry per decisive match.
///
/// Narrative failure falls back to fixed lines; the entries are still written.
/// Skips matches that already have entries, so redelivery is harmless.
pub struct HallOfFameWriter {
    hall: Arc<dyn HallRepository>,
    users: Arc<dyn UserRepository>,
    narrator: Arc<dyn NarrativeGenerator>,
}

impl HallOfFameWriter {
    pub fn new(
        hall: Arc<dyn HallRepository>,
        users: Arc<dyn UserRepository>,
        narrator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            hall,
            users,
            narrator,
        }
    }
}

#[async_trait]
impl EventHandler for HallOfFameWriter {
    async fn handle(&self, event: &MatchEvent) -> Result<(), EventError> {
        let MatchEvent::MatchCommitted { record, .. } = event;

        let Some((winner_id, loser_id)) = record.winner_and_loser() else {
            debug!(match_id = %record.id, "Draw, no hall entries");
            return Ok(());
        };

        let existing = self
            .hall
            .entries_for_match(&record.id)
            .await
            .map_err(|e| EventError::retryable(e.to_string()))?;
        if !existing.is_empty() {
            return Ok(());
        }

        let scenario = match match_scenario(record, self.users.as_ref()).await {
            Ok(Some(scenario)) => scenario,
            Ok(None) => return Err(EventError::non_retryable("match has no scoreable winner")),
            Err(e) => return Err(EventError::retryable(e.to_string())),
        };

        let goal_difference = record.goal_difference();
        let category = if goal_difference >= ROUT_MARGIN {
            "Losing / Failure"
        } else {
            "Challenge / Ego fight"
        };
        let stat = format!("{}-{}", scenario.winning_score, scenario.losing_score);

        let roasts = match self.narrator.hall_roasts(&scenario, category, &stat).await {
            Ok(roasts) => roasts,
            Err(e) => {
                warn!(match_id = %record.id, error = %e, "Hall narrative failed, using fallback");
                HallRoasts {
                    fame_roast: fame_fallback(&scenario.winner_name),
                    shame_roast: shame_fallback(&scenario.loser_name),
                }
            }
        };

        let winner = (winner_id, scenario.winner_name.as_str());
        let loser = (loser_id, scenario.loser_name.as_str());
        let entries = [
            HallEntry::fame(&record.id, winner, loser, goal_difference, roasts.fame_roast),
            HallEntry::shame(&record.id, winner, loser, goal_difference, roasts.shame_roast),
        ];

        self.hall
            .create_entries(&entries)
            .await
            .map_err(|e| EventError::retryable(e.to_string()))?;

        info!(match_id = %record.id, winner = %winner_id, loser = %loser_id, "Hall entries written");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "HallOfFameWriter"
    }
}
