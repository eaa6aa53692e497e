use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{models::MatchModel, repository::MatchRepository};
use crate::ai::{MatchScenario, NarrativeGenerator};
use crate::event::{EventError, EventHandler, MatchEvent};
use crate::store::StoreError;
use crate::user::UserRepository;

/// Winner/loser display names and scores for a decisive match.
///
/// Falls back to the team names read off the screenshot when a user
/// record can't be found.
pub async fn match_scenario(
    record: &MatchModel,
    users: &dyn UserRepository,
) -> Result<Option<MatchScenario>, StoreError> {
    let Some((winner_id, loser_id)) = record.winner_and_loser() else {
        return Ok(None);
    };
    let Some((winner_stats, loser_stats)) = record.stats_for(winner_id) else {
        return Ok(None);
    };

    let winner_name = match users.get_user(winner_id).await? {
        Some(user) => user.name,
        None => winner_stats.name.clone(),
    };
    let loser_name = match users.get_user(loser_id).await? {
        Some(user) => user.name,
        None => loser_stats.name.clone(),
    };

    Ok(Some(MatchScenario {
        winner_name,
        loser_name,
        winning_score: winner_stats.score,
        losing_score: loser_stats.score,
    }))
}

/// Writes a generated taunt onto decisive matches after commit.
///
/// If generation fails the roast simply stays empty; participants can write
/// one themselves.
pub struct MatchRoaster {
    matches: Arc<dyn MatchRepository>,
    users: Arc<dyn UserRepository>,
    narrator: Arc<dyn NarrativeGenerator>,
}

impl MatchRoaster {
    pub fn new(
        matches: Arc<dyn MatchRepository>,
        users: Arc<dyn UserRepository>,
        narrator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            matches,
            users,
            narrator,
        }
    }
}

#[async_trait]
impl EventHandler for MatchRoaster {
    async fn handle(&self, event: &MatchEvent) -> Result<(), EventError> {
        let MatchEvent::MatchCommitted { record, .. } = event;

        let scenario = match match_scenario(record, self.users.as_ref()).await {
            Ok(Some(scenario)) => scenario,
            Ok(None) => {
                debug!(match_id = %record.id, "Draw, no roast");
                return Ok(());
            }
            Err(e) => return Err(EventError::retryable(e.to_string())),
        };

        // A retry after a partial failure must not overwrite an edit
        match self.matches.get_match(&record.id).await {
            Ok(Some(current)) if current.roast.is_some() => return Ok(()),
            Ok(Some(_)) => {}
            Ok(None) => return Err(EventError::non_retryable("match vanished")),
            Err(e) => return Err(EventError::retryable(e.to_string())),
        }

        let roast = match self.narrator.match_roast(&scenario).await {
            Ok(roast) => roast,
            Err(e) => {
                warn!(match_id = %record.id, error = %e, "Roast generation failed, leaving empty");
                return Ok(());
            }
        };

        self.matches
            .set_roast(&record.id, &roast)
            .await
            .map_err(|e| EventError::retryable(e.to_string()))?;

        info!(match_id = %record.id, "Match roast written");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "MatchRoaster"
    }
}
