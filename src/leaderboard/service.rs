use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};

use super::{
    aggregate::{self, BestOfCard, LeaderboardRow, LoserRow, MonthTrend, RivalRecord},
    window::TimeRange,
};
use crate::matches::{MatchFilter, MatchModel, MatchRepository};
use crate::store::StoreError;
use crate::user::{UserModel, UserRepository};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub range: TimeRange,
    pub rows: Vec<LeaderboardRow>,
    /// Matches in the window whose declared winner contradicts the scoreline.
    /// They are ranked by the declared winner.
    #[serde(rename = "divergent_matches")]
    pub divergent_matches: Vec<String>,
}

/// Read-only views over users and match history
pub struct LeaderboardService {
    users: Arc<dyn UserRepository>,
    matches: Arc<dyn MatchRepository>,
}

impl LeaderboardService {
    pub fn new(users: Arc<dyn UserRepository>, matches: Arc<dyn MatchRepository>) -> Self {
        Self { users, matches }
    }

    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Leaderboard, StoreError> {
        let users = self.users.list_users().await?;

        let Some(since) = range.start(now) else {
            return Ok(Leaderboard {
                range,
                rows: aggregate::rank_all_time(&users),
                divergent_matches: Vec::new(),
            });
        };

        let window = self
            .matches
            .list_matches(&MatchFilter {
                since: Some(since),
                ..MatchFilter::default()
            })
            .await?;
        let (rows, divergent_matches) = aggregate::rank_window(&users, &window);

        if !divergent_matches.is_empty() {
            warn!(
                range = %range,
                matches = ?divergent_matches,
                "Declared winner disagrees with scoreline"
            );
        }

        Ok(Leaderboard {
            range,
            rows,
            divergent_matches,
        })
    }

    pub async fn best_of(&self) -> Result<Vec<BestOfCard>, StoreError> {
        let users = self.users.list_users().await?;
        Ok(aggregate::best_of(&users))
    }

    #[instrument(skip(self))]
    pub async fn rivals(&self, user_id: &str) -> Result<Vec<RivalRecord>, StoreError> {
        self.require_user(user_id).await?;
        let history = self.history_of(user_id).await?;
        let users = self.users.list_users().await?;
        Ok(aggregate::rivals(user_id, &history, &users))
    }

    #[instrument(skip(self))]
    pub async fn losers(
        &self,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<LoserRow>, StoreError> {
        let users = self.users.list_users().await?;
        let window = self
            .matches
            .list_matches(&MatchFilter {
                since: range.start(now),
                ..MatchFilter::default()
            })
            .await?;
        Ok(aggregate::losers(&users, &window))
    }

    #[instrument(skip(self))]
    pub async fn trends(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthTrend>, StoreError> {
        self.require_user(user_id).await?;
        let history = self.history_of(user_id).await?;
        Ok(aggregate::trends(user_id, &history, now))
    }

    async fn require_user(&self, user_id: &str) -> Result<UserModel, StoreError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("User not found: {}", user_id)))
    }

    async fn history_of(&self, user_id: &str) -> Result<Vec<MatchModel>, StoreError> {
        self.matches
            .list_matches(&MatchFilter {
                participant: Some(user_id.to_string()),
                ..MatchFilter::default()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::{models::tests::sample_match, MatchCommit, MatchWinner};
    use crate::store::InMemoryStore;

    async fn seeded() -> (LeaderboardService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        for (id, name) in [("u1", "Alice"), ("u2", "Bob")] {
            let mut user = UserModel::new(name.to_string(), None, None, String::new());
            user.id = id.to_string();
            store.create_user(&user).await.unwrap();
        }
        store
            .commit_match(&MatchCommit::from_record(sample_match()).unwrap())
            .await
            .unwrap();
        (LeaderboardService::new(store.clone(), store.clone()), store)
    }

    #[tokio::test]
    async fn monthly_and_all_time_agree_for_fresh_history() {
        let (service, _store) = seeded().await;
        let now = Utc::now();

        let monthly = service.leaderboard(TimeRange::Monthly, now).await.unwrap();
        let all_time = service.leaderboard(TimeRange::AllTime, now).await.unwrap();

        assert_eq!(monthly.rows, all_time.rows);
        assert_eq!(monthly.rows[0].user_id, "u1");
        assert!(monthly.divergent_matches.is_empty());
    }

    #[tokio::test]
    async fn divergent_winner_is_reported() {
        let (service, store) = seeded().await;
        let mut odd = sample_match();
        odd.id = "m2".to_string();
        odd.fingerprint = "fp2".to_string();
        odd.winner = MatchWinner::Player("u2".to_string());
        store
            .commit_match(&MatchCommit::from_record(odd).unwrap())
            .await
            .unwrap();

        let board = service
            .leaderboard(TimeRange::Yearly, Utc::now())
            .await
            .unwrap();

        assert_eq!(board.divergent_matches, vec!["m2".to_string()]);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["divergent_matches"][0], "m2");
        assert_eq!(json["range"], "yearly");
    }

    #[tokio::test]
    async fn per_user_views_require_a_known_user() {
        let (service, _store) = seeded().await;

        assert!(matches!(
            service.rivals("ghost").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            service.trends("ghost", Utc::now()).await,
            Err(StoreError::NotFound(_))
        ));

        let rivals = service.rivals("u2").await.unwrap();
        assert_eq!(rivals[0].opponent_name, "Alice");
        assert_eq!(rivals[0].losses, 1);
    }
}
