use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{info, instrument, warn};

use super::{
    confirmation::ConfirmedMatch,
    errors::MatchError,
    models::{Comment, MatchModel},
    repository::{MatchCommit, MatchFilter, MatchRepository},
};
use crate::event::{EventBus, MatchEvent};
use crate::user::UserRepository;

/// Commits confirmed matches and serves match history.
///
/// Submissions with the same fingerprint are serialised on a per-fingerprint
/// lock, so the second one sees the first in its duplicate pre-check.
/// Submissions for different matches never wait on each other. The store's
/// own in-transaction re-check still covers anything the lock can't
/// (another process, a lock cleared mid-flight).
pub struct MatchService {
    matches: Arc<dyn MatchRepository>,
    users: Arc<dyn UserRepository>,
    event_bus: EventBus,
    fingerprint_locks: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl MatchService {
    pub fn new(
        matches: Arc<dyn MatchRepository>,
        users: Arc<dyn UserRepository>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            matches,
            users,
            event_bus,
            fingerprint_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Persists a confirmed match and both participants' aggregates.
    ///
    /// Nothing is written on any error. On success `MatchCommitted` is
    /// published for the post-commit subscribers and the stored record is
    /// returned; their outcome never affects this result.
    #[instrument(skip(self, confirmed), fields(fingerprint = %confirmed.fingerprint, submitted_by = %confirmed.submitted_by))]
    pub async fn submit(&self, confirmed: ConfirmedMatch) -> Result<MatchModel, MatchError> {
        let fingerprint = confirmed.fingerprint.clone();
        let lock = self.fingerprint_lock(&fingerprint).await;

        let result = {
            let _guard = lock.lock().await;
            self.commit_locked(confirmed).await
        };

        self.release_fingerprint_lock(&fingerprint, lock).await;

        let record = result?;
        info!(
            match_id = %record.id,
            winner = %record.winner.as_str(),
            "Match committed"
        );

        self.event_bus.emit(MatchEvent::MatchCommitted {
            record: record.clone(),
            submitted_by: record.created_by.clone(),
        });

        Ok(record)
    }

    async fn commit_locked(&self, confirmed: ConfirmedMatch) -> Result<MatchModel, MatchError> {
        if self.users.get_user(&confirmed.submitted_by).await?.is_none() {
            return Err(MatchError::UnknownUser(confirmed.submitted_by));
        }
        let opponent = self
            .users
            .get_user(&confirmed.opponent_id)
            .await?
            .ok_or_else(|| MatchError::UnknownUser(confirmed.opponent_id.clone()))?;

        if self
            .matches
            .find_by_fingerprint(&confirmed.fingerprint)
            .await?
            .is_some()
        {
            warn!(fingerprint = %confirmed.fingerprint, "Duplicate match rejected");
            return Err(MatchError::Duplicate {
                fingerprint: confirmed.fingerprint,
            });
        }

        let record = confirmed.into_record(opponent.name, Utc::now());
        let commit = MatchCommit::from_record(record)?;
        self.matches.commit_match(&commit).await?;

        Ok(commit.record)
    }

    pub async fn get_match(&self, match_id: &str) -> Result<MatchModel, MatchError> {
        self.matches
            .get_match(match_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(match_id.to_string()))
    }

    pub async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchModel>, MatchError> {
        Ok(self.matches.list_matches(filter).await?)
    }

    /// Replaces the roast text; only the two participants may do this
    #[instrument(skip(self, roast))]
    pub async fn update_roast(
        &self,
        match_id: &str,
        user_id: &str,
        roast: &str,
    ) -> Result<MatchModel, MatchError> {
        let roast = roast.trim();
        if roast.is_empty() {
            return Err(MatchError::validation("roast cannot be empty"));
        }

        let record = self.get_match(match_id).await?;
        if !record.is_participant(user_id) {
            return Err(MatchError::Forbidden(
                "only the players in this match can edit its roast".to_string(),
            ));
        }

        self.matches.set_roast(match_id, roast).await?;
        info!(match_id, user_id, "Match roast edited");

        Ok(MatchModel {
            roast: Some(roast.to_string()),
            ..record
        })
    }

    #[instrument(skip(self, text))]
    pub async fn add_comment(
        &self,
        match_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<Comment, MatchError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MatchError::validation("comment cannot be empty"));
        }

        // 404 before 422 for a missing match
        self.get_match(match_id).await?;

        let comment = Comment::new(user_id.to_string(), text.to_string());
        self.matches.add_comment(match_id, &comment).await?;
        Ok(comment)
    }

    async fn fingerprint_lock(&self, fingerprint: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.fingerprint_locks.read().await;
            if let Some(lock) = guard.get(fingerprint) {
                return lock.clone();
            }
        }

        let mut guard = self.fingerprint_locks.write().await;
        guard
            .entry(fingerprint.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drops the map entry once no other submission holds it
    async fn release_fingerprint_lock(&self, fingerprint: &str, lock: Arc<AsyncMutex<()>>) {
        let mut guard = self.fingerprint_locks.write().await;
        // One reference in the map, one held here
        if Arc::strong_count(&lock) <= 2 {
            guard.remove(fingerprint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::{
        confirmation::ConfirmationWorkflow,
        models::{ExtractedMatch, MatchWinner, Outcome, PlayerStats, TeamSide},
    };
    use crate::store::InMemoryStore;
    use crate::user::UserModel;

    async fn setup() -> (MatchService, Arc<InMemoryStore>, EventBus) {
        let store = Arc::new(InMemoryStore::new());
        for (id, name) in [("u1", "Alice"), ("u2", "Bob")] {
            let mut user = UserModel::new(name.to_string(), None, None, String::new());
            user.id = id.to_string();
            store.create_user(&user).await.unwrap();
        }
        let bus = EventBus::with_default_capacity();
        let service = MatchService::new(store.clone(), store.clone(), bus.clone());
        (service, store, bus)
    }

    fn confirmed(submitter: &str, opponent: &str, side: TeamSide, outcome: Outcome) -> ConfirmedMatch {
        let stats = ExtractedMatch {
            team1_name: "Reds".to_string(),
            team2_name: "Blues".to_string(),
            team1_stats: PlayerStats {
                score: 3,
                possession: "55%".to_string(),
                shots: 10,
                ..PlayerStats::default()
            },
            team2_stats: PlayerStats {
                score: 1,
                possession: "45%".to_string(),
                shots: 4,
                ..PlayerStats::default()
            },
        };
        let mut workflow = ConfirmationWorkflow::from_extracted(stats);
        workflow.select_side(side).unwrap();
        workflow.select_opponent(opponent).unwrap();
        workflow.select_outcome(outcome).unwrap();
        workflow.confirm(submitter).unwrap();
        workflow.into_confirmed().unwrap()
    }

    #[tokio::test]
    async fn submit_commits_and_publishes() {
        let (service, store, bus) = setup().await;
        let mut events = bus.subscribe();

        let record = service
            .submit(confirmed("u1", "u2", TeamSide::Team1, Outcome::Win))
            .await
            .unwrap();

        assert_eq!(record.winner, MatchWinner::Player("u1".to_string()));
        assert_eq!(record.opponent_name, "Bob");

        let alice = store.get_user("u1").await.unwrap().unwrap();
        let bob = store.get_user("u2").await.unwrap().unwrap();
        assert_eq!((alice.stats.wins, alice.stats.goals_for), (1, 3));
        assert_eq!((bob.stats.losses, bob.stats.goals_against), (1, 3));

        let MatchEvent::MatchCommitted { record: published, submitted_by } =
            events.recv().await.unwrap();
        assert_eq!(published.id, record.id);
        assert_eq!(submitted_by, "u1");
    }

    #[tokio::test]
    async fn resubmission_from_the_other_side_is_a_duplicate() {
        let (service, store, _bus) = setup().await;

        service
            .submit(confirmed("u1", "u2", TeamSide::Team1, Outcome::Win))
            .await
            .unwrap();
        let second = service
            .submit(confirmed("u2", "u1", TeamSide::Team2, Outcome::Loss))
            .await;

        assert!(matches!(second, Err(MatchError::Duplicate { .. })));
        let bob = store.get_user("u2").await.unwrap().unwrap();
        assert_eq!(bob.stats.matches_played(), 1);
    }

    #[tokio::test]
    async fn concurrent_identical_submissions_commit_once() {
        let (service, store, _bus) = setup().await;
        let service = Arc::new(service);

        let attempts = (0..8).map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .submit(confirmed("u1", "u2", TeamSide::Team1, Outcome::Win))
                    .await
            })
        });
        let results = futures::future::join_all(attempts).await;

        let committed = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(committed, 1);

        let alice = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(alice.stats.wins, 1);
        assert!(service.fingerprint_locks.read().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_opponent_writes_nothing() {
        let (service, store, _bus) = setup().await;

        let result = service
            .submit(confirmed("u1", "ghost", TeamSide::Team1, Outcome::Win))
            .await;

        assert!(matches!(result, Err(MatchError::UnknownUser(id)) if id == "ghost"));
        let alice = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(alice.stats.matches_played(), 0);
        assert!(store.list_matches(&MatchFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_participants_edit_the_roast() {
        let (service, store, _bus) = setup().await;
        let mut outsider = UserModel::new("Carol".to_string(), None, None, String::new());
        outsider.id = "u3".to_string();
        store.create_user(&outsider).await.unwrap();

        let record = service
            .submit(confirmed("u1", "u2", TeamSide::Team1, Outcome::Win))
            .await
            .unwrap();

        let forbidden = service.update_roast(&record.id, "u3", "ha").await;
        assert!(matches!(forbidden, Err(MatchError::Forbidden(_))));

        let blank = service.update_roast(&record.id, "u2", "   ").await;
        assert!(matches!(blank, Err(MatchError::Validation(_))));

        let edited = service
            .update_roast(&record.id, "u2", "Lucky goal.")
            .await
            .unwrap();
        assert_eq!(edited.roast.as_deref(), Some("Lucky goal."));
    }

    #[tokio::test]
    async fn comments_append_in_order() {
        let (service, _store, _bus) = setup().await;
        let record = service
            .submit(confirmed("u1", "u2", TeamSide::Team1, Outcome::Win))
            .await
            .unwrap();

        service.add_comment(&record.id, "u2", "rematch").await.unwrap();
        service.add_comment(&record.id, "u1", "anytime").await.unwrap();

        let stored = service.get_match(&record.id).await.unwrap();
        let texts: Vec<_> = stored.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["rematch", "anytime"]);

        let missing = service.add_comment("nope", "u1", "hello").await;
        assert!(matches!(missing, Err(MatchError::NotFound(_))));
    }
}
