use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{Comment, MatchModel};
use crate::store::StoreError;
use crate::user::AggregateStats;

/// Increment for one participant's aggregate block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatIncrement {
    pub user_id: String,
    pub delta: AggregateStats,
}

/// Everything one match submission writes, applied all-or-nothing
#[derive(Debug, Clone)]
pub struct MatchCommit {
    pub record: MatchModel,
    pub increments: [StatIncrement; 2],
}

impl MatchCommit {
    /// Derives both participants' increments from the record.
    ///
    /// Outcomes come from the declared winner, so the two increments always
    /// mirror each other: one win and one loss, or two draws.
    ///
    /// Increments are ordered by user id, so every commit locks the two user
    /// rows in the same order whoever submitted.
    pub fn from_record(record: MatchModel) -> Result<Self, StoreError> {
        let increments = [record.created_by.as_str(), record.opponent_id.as_str()].map(|user_id| {
            let delta = match (record.stats_for(user_id), record.outcome_for(user_id)) {
                (Some((own, other)), Some(outcome)) => {
                    Some(AggregateStats::increment_for(own, other, outcome))
                }
                _ => None,
            };
            (user_id.to_string(), delta)
        });

        let [(first_id, first), (second_id, second)] = increments;
        match (first, second) {
            (Some(first), Some(second)) => {
                let mut increments = [
                    StatIncrement {
                        user_id: first_id,
                        delta: first,
                    },
                    StatIncrement {
                        user_id: second_id,
                        delta: second,
                    },
                ];
                increments.sort_by(|a, b| a.user_id.cmp(&b.user_id));
                Ok(Self { increments, record })
            }
            _ => Err(StoreError::Database(format!(
                "match {} has stat blocks not tagged with its participants",
                record.id
            ))),
        }
    }
}

/// Query for match history
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    /// Only matches on or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only matches this user played in
    pub participant: Option<String>,
}

impl MatchFilter {
    pub fn matches(&self, record: &MatchModel) -> bool {
        self.since.map_or(true, |since| record.date >= since)
            && self
                .participant
                .as_deref()
                .map_or(true, |user_id| record.is_participant(user_id))
    }
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn find_by_fingerprint(&self, fingerprint: &str)
        -> Result<Option<MatchModel>, StoreError>;

    /// Writes the match and applies both increments as one atomic unit.
    ///
    /// Re-checks the fingerprint inside the unit and fails with
    /// `StoreError::DuplicateFingerprint` if another commit got there first.
    /// A missing participant aborts the whole commit with `NotFound`.
    async fn commit_match(&self, commit: &MatchCommit) -> Result<(), StoreError>;

    async fn get_match(&self, match_id: &str) -> Result<Option<MatchModel>, StoreError>;

    /// Newest first
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchModel>, StoreError>;

    async fn set_roast(&self, match_id: &str, roast: &str) -> Result<(), StoreError>;

    async fn add_comment(&self, match_id: &str, comment: &Comment) -> Result<(), StoreError>;
}
