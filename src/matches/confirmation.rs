use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    errors::MatchError,
    fingerprint::match_fingerprint,
    models::{ExtractedMatch, MatchModel, MatchWinner, Outcome, PlayerStats, TeamSide},
};
use crate::ai::{ExtractionError, ImageData, StatsExtractor};

/// Facts the uploader supplies that extraction can't infer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    pub user_team_side: Option<TeamSide>,
    pub opponent_id: Option<String>,
    pub outcome: Option<Outcome>,
}

/// Upload session for one match: `Empty → Previewing → Extracted → Confirmed`.
///
/// Nothing here is persisted; dropping or cancelling the workflow discards
/// everything gathered so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfirmationWorkflow {
    #[default]
    Empty,
    Previewing(ImageData),
    Extracted {
        stats: ExtractedMatch,
        selections: Selections,
    },
    Confirmed(ConfirmedMatch),
}

impl ConfirmationWorkflow {
    pub fn new() -> Self {
        Self::Empty
    }

    /// Starts from stats the client already holds (the extract step ran earlier)
    pub fn from_extracted(stats: ExtractedMatch) -> Self {
        Self::Extracted {
            stats,
            selections: Selections::default(),
        }
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Previewing(_) => "imagePreview",
            Self::Extracted { .. } => "extracted",
            Self::Confirmed(_) => "confirmed",
        }
    }

    /// Holds an image for extraction. Picking a new image replaces any earlier one.
    pub fn preview(&mut self, image: ImageData) -> Result<(), MatchError> {
        match self {
            Self::Empty | Self::Previewing(_) => {
                *self = Self::Previewing(image);
                Ok(())
            }
            _ => Err(MatchError::validation(format!(
                "cannot select an image while {}",
                self.state_name()
            ))),
        }
    }

    /// Runs extraction on the previewed image.
    ///
    /// A failed extraction resets the workflow to `Empty`, so the uploader
    /// starts again with a different image.
    pub async fn extract(&mut self, extractor: &dyn StatsExtractor) -> Result<(), ExtractionError> {
        let Self::Previewing(image) = &*self else {
            return Err(ExtractionError::InvalidImage(
                "no image selected for extraction".to_string(),
            ));
        };

        match extractor.extract(image).await {
            Ok(stats) => {
                debug!(
                    team1 = %stats.team1_name,
                    team2 = %stats.team2_name,
                    "Stats extracted"
                );
                *self = Self::from_extracted(stats);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Extraction failed, discarding image");
                self.cancel();
                Err(err)
            }
        }
    }

    pub fn select_side(&mut self, side: TeamSide) -> Result<(), MatchError> {
        self.selections_mut()?.user_team_side = Some(side);
        Ok(())
    }

    pub fn select_opponent(&mut self, opponent_id: impl Into<String>) -> Result<(), MatchError> {
        self.selections_mut()?.opponent_id = Some(opponent_id.into());
        Ok(())
    }

    pub fn select_outcome(&mut self, outcome: Outcome) -> Result<(), MatchError> {
        self.selections_mut()?.outcome = Some(outcome);
        Ok(())
    }

    /// Moves `Extracted → Confirmed` once side, opponent and outcome are all set.
    ///
    /// On error the workflow stays in `Extracted` with its selections intact.
    pub fn confirm(&mut self, submitted_by: &str) -> Result<(), MatchError> {
        let Self::Extracted { stats, selections } = &*self else {
            return Err(MatchError::validation(format!(
                "nothing to confirm while {}",
                self.state_name()
            )));
        };

        let side = selections
            .user_team_side
            .ok_or_else(|| MatchError::validation("select which side you played"))?;
        let opponent_id = selections
            .opponent_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| MatchError::validation("select your opponent"))?;
        let outcome = selections
            .outcome
            .ok_or_else(|| MatchError::validation("select win, loss or draw"))?;

        if opponent_id == submitted_by {
            return Err(MatchError::validation("you cannot play against yourself"));
        }

        let confirmed = ConfirmedMatch::new(
            submitted_by.to_string(),
            opponent_id,
            side,
            outcome,
            stats.clone(),
        );
        *self = Self::Confirmed(confirmed);
        Ok(())
    }

    pub fn cancel(&mut self) {
        *self = Self::Empty;
    }

    pub fn into_confirmed(self) -> Option<ConfirmedMatch> {
        match self {
            Self::Confirmed(confirmed) => Some(confirmed),
            _ => None,
        }
    }

    fn selections_mut(&mut self) -> Result<&mut Selections, MatchError> {
        match self {
            Self::Extracted { selections, .. } => Ok(selections),
            other => Err(MatchError::validation(format!(
                "no extracted stats while {}",
                other.state_name()
            ))),
        }
    }
}

/// Immutable payload handed from the workflow to persistence
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedMatch {
    pub submitted_by: String,
    pub opponent_id: String,
    pub user_team_side: TeamSide,
    pub outcome: Outcome,
    pub stats: ExtractedMatch,
    pub fingerprint: String,
}

impl ConfirmedMatch {
    fn new(
        submitted_by: String,
        opponent_id: String,
        user_team_side: TeamSide,
        outcome: Outcome,
        mut stats: ExtractedMatch,
    ) -> Self {
        stats.side_mut(user_team_side).user_id = Some(submitted_by.clone());
        stats.side_mut(user_team_side.other()).user_id = Some(opponent_id.clone());

        let fingerprint = match_fingerprint(
            &submitted_by,
            stats.side(user_team_side),
            &opponent_id,
            stats.side(user_team_side.other()),
        );

        Self {
            submitted_by,
            opponent_id,
            user_team_side,
            outcome,
            stats,
            fingerprint,
        }
    }

    pub fn user_stats(&self) -> &PlayerStats {
        self.stats.side(self.user_team_side)
    }

    pub fn opponent_stats(&self) -> &PlayerStats {
        self.stats.side(self.user_team_side.other())
    }

    pub fn winner(&self) -> MatchWinner {
        match self.outcome {
            Outcome::Win => MatchWinner::Player(self.submitted_by.clone()),
            Outcome::Loss => MatchWinner::Player(self.opponent_id.clone()),
            Outcome::Draw => MatchWinner::Draw,
        }
    }

    /// Builds the record to commit; the roast is filled in after commit
    pub fn into_record(self, opponent_name: String, date: DateTime<Utc>) -> MatchModel {
        let winner = self.winner();
        MatchModel {
            id: Uuid::new_v4().to_string(),
            participants: vec![self.submitted_by.clone(), self.opponent_id.clone()],
            created_by: self.submitted_by,
            opponent_id: self.opponent_id,
            date,
            comments: Vec::new(),
            roast: None,
            winner,
            opponent_name,
            team1_name: self.stats.team1_name,
            team2_name: self.stats.team2_name,
            team1_stats: self.stats.team1_stats,
            team2_stats: self.stats.team2_stats,
            fingerprint: self.fingerprint,
            user_team_side: self.user_team_side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedExtractor(Result<ExtractedMatch, ()>);

    #[async_trait]
    impl StatsExtractor for FixedExtractor {
        async fn extract(&self, _image: &ImageData) -> Result<ExtractedMatch, ExtractionError> {
            self.0
                .clone()
                .map_err(|_| ExtractionError::Upstream("model unavailable".to_string()))
        }
    }

    fn image() -> ImageData {
        "data:image/png;base64,iVBORw0KGgo=".parse().unwrap()
    }

    fn extracted() -> ExtractedMatch {
        ExtractedMatch {
            team1_name: "Reds".to_string(),
            team2_name: "Blues".to_string(),
            team1_stats: PlayerStats {
                score: 1,
                ..PlayerStats::default()
            },
            team2_stats: PlayerStats {
                score: 3,
                ..PlayerStats::default()
            },
        }
    }

    #[tokio::test]
    async fn walks_through_every_state() {
        let mut workflow = ConfirmationWorkflow::new();
        assert_eq!(workflow.state_name(), "empty");

        workflow.preview(image()).unwrap();
        assert_eq!(workflow.state_name(), "imagePreview");

        workflow
            .extract(&FixedExtractor(Ok(extracted())))
            .await
            .unwrap();
        assert_eq!(workflow.state_name(), "extracted");

        workflow.select_side(TeamSide::Team2).unwrap();
        workflow.select_opponent("u2").unwrap();
        workflow.select_outcome(Outcome::Win).unwrap();
        workflow.confirm("u1").unwrap();
        assert_eq!(workflow.state_name(), "confirmed");

        let confirmed = workflow.into_confirmed().unwrap();
        assert_eq!(confirmed.user_stats().score, 3);
        assert_eq!(confirmed.user_stats().user_id.as_deref(), Some("u1"));
        assert_eq!(confirmed.opponent_stats().user_id.as_deref(), Some("u2"));
        assert_eq!(confirmed.winner(), MatchWinner::Player("u1".to_string()));
    }

    #[tokio::test]
    async fn failed_extraction_discards_the_image() {
        let mut workflow = ConfirmationWorkflow::new();
        workflow.preview(image()).unwrap();

        let result = workflow.extract(&FixedExtractor(Err(()))).await;

        assert!(result.is_err());
        assert_eq!(workflow, ConfirmationWorkflow::Empty);
    }

    #[test]
    fn confirm_is_blocked_until_all_selections_are_made() {
        let mut workflow = ConfirmationWorkflow::from_extracted(extracted());

        assert!(matches!(workflow.confirm("u1"), Err(MatchError::Validation(_))));
        workflow.select_side(TeamSide::Team1).unwrap();
        assert!(matches!(workflow.confirm("u1"), Err(MatchError::Validation(_))));
        workflow.select_opponent("u2").unwrap();
        assert!(matches!(workflow.confirm("u1"), Err(MatchError::Validation(_))));

        // Still extracted, nothing lost
        assert_eq!(workflow.state_name(), "extracted");

        workflow.select_outcome(Outcome::Loss).unwrap();
        workflow.confirm("u1").unwrap();
        assert_eq!(workflow.state_name(), "confirmed");
    }

    #[test]
    fn cannot_play_yourself() {
        let mut workflow = ConfirmationWorkflow::from_extracted(extracted());
        workflow.select_side(TeamSide::Team1).unwrap();
        workflow.select_opponent("u1").unwrap();
        workflow.select_outcome(Outcome::Draw).unwrap();

        assert!(matches!(workflow.confirm("u1"), Err(MatchError::Validation(_))));
    }

    #[test]
    fn selections_require_extracted_stats() {
        let mut workflow = ConfirmationWorkflow::new();
        assert!(workflow.select_side(TeamSide::Team1).is_err());
        assert!(workflow.confirm("u1").is_err());
    }

    #[test]
    fn cancel_discards_everything() {
        let mut workflow = ConfirmationWorkflow::from_extracted(extracted());
        workflow.select_side(TeamSide::Team1).unwrap();
        workflow.cancel();
        assert_eq!(workflow, ConfirmationWorkflow::Empty);
    }

    #[test]
    fn record_carries_stamped_sides_and_fingerprint() {
        let mut workflow = ConfirmationWorkflow::from_extracted(extracted());
        workflow.select_side(TeamSide::Team1).unwrap();
        workflow.select_opponent("u2").unwrap();
        workflow.select_outcome(Outcome::Loss).unwrap();
        workflow.confirm("u1").unwrap();

        let confirmed = workflow.into_confirmed().unwrap();
        let fingerprint = confirmed.fingerprint.clone();
        let record = confirmed.into_record("Blues".to_string(), Utc::now());

        assert_eq!(record.winner, MatchWinner::Player("u2".to_string()));
        assert_eq!(record.participants, vec!["u1".to_string(), "u2".to_string()]);
        assert_eq!(record.team1_stats.user_id.as_deref(), Some("u1"));
        assert_eq!(record.fingerprint, fingerprint);
        assert!(record.roast.is_none());
    }
}
