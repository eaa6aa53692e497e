use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::StoreError;
use crate::badges::{BadgeModel, BadgeRepository};
use crate::hall::{HallEntry, HallRepository};
use crate::matches::{Comment, MatchCommit, MatchFilter, MatchModel, MatchRepository};
use crate::milestones::{MilestoneModel, MilestoneRepository};
use crate::user::{UserModel, UserRepository};

#[derive(Default)]
struct Tables {
    users: Vec<UserModel>,
    matches: Vec<MatchModel>,
    badges: Vec<BadgeModel>,
    hall: Vec<HallEntry>,
    milestones: Vec<MilestoneModel>,
}

/// In-memory store for development and testing
///
/// Every collection sits behind one lock, so a match commit (fingerprint
/// re-check, record insert, both stat increments) happens under a single
/// write guard and is never observed half done. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &UserModel) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.id == user.id) {
            warn!("User already exists in memory");
            return Err(StoreError::Database(format!(
                "user {} already exists",
                user.id
            )));
        }
        tables.users.push(user.clone());
        debug!("User created in memory");
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserModel>, StoreError> {
        Ok(self.tables.read().await.users.clone())
    }

    #[instrument(skip(self, badge_ids))]
    async fn award_badges(
        &self,
        user_id: &str,
        badge_ids: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;

        let mut added = Vec::new();
        for badge_id in badge_ids {
            if !user.has_badge(badge_id) {
                user.badges.push(badge_id.clone());
                added.push(badge_id.clone());
            }
        }
        Ok(added)
    }
}

#[async_trait]
impl MatchRepository for InMemoryStore {
    async fn find_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<MatchModel>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .matches
            .iter()
            .find(|m| m.fingerprint == fingerprint)
            .cloned())
    }

    #[instrument(skip(self, commit), fields(match_id = %commit.record.id))]
    async fn commit_match(&self, commit: &MatchCommit) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        if tables
            .matches
            .iter()
            .any(|m| m.fingerprint == commit.record.fingerprint)
        {
            warn!(fingerprint = %commit.record.fingerprint, "Fingerprint taken inside commit");
            return Err(StoreError::DuplicateFingerprint(
                commit.record.fingerprint.clone(),
            ));
        }

        // Validate everything before the first write
        for increment in &commit.increments {
            if !tables.users.iter().any(|u| u.id == increment.user_id) {
                return Err(StoreError::NotFound(format!("user {}", increment.user_id)));
            }
        }

        for increment in &commit.increments {
            if let Some(user) = tables
                .users
                .iter_mut()
                .find(|u| u.id == increment.user_id)
            {
                user.stats.absorb(&increment.delta);
            }
        }
        tables.matches.push(commit.record.clone());

        info!("Match committed in memory");
        Ok(())
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<MatchModel>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.matches.iter().find(|m| m.id == match_id).cloned())
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchModel>, StoreError> {
        let tables = self.tables.read().await;
        let mut matches: Vec<MatchModel> = tables
            .matches
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        // Reversed first so equal timestamps list the later insert first
        matches.reverse();
        matches.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(matches)
    }

    async fn set_roast(&self, match_id: &str, roast: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let record = tables
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| StoreError::NotFound(format!("match {}", match_id)))?;
        record.roast = Some(roast.to_string());
        Ok(())
    }

    async fn add_comment(&self, match_id: &str, comment: &Comment) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let record = tables
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| StoreError::NotFound(format!("match {}", match_id)))?;
        record.comments.push(comment.clone());
        Ok(())
    }
}

#[async_trait]
impl BadgeRepository for InMemoryStore {
    async fn list_badges(&self) -> Result<Vec<BadgeModel>, StoreError> {
        Ok(self.tables.read().await.badges.clone())
    }

    async fn create_badge(&self, badge: &BadgeModel) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.badges.iter().any(|b| b.id == badge.id) {
            return Ok(false);
        }
        tables.badges.push(badge.clone());
        Ok(true)
    }

    async fn update_badge_description(
        &self,
        badge_id: &str,
        description: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let badge = tables
            .badges
            .iter_mut()
            .find(|b| b.id == badge_id)
            .ok_or_else(|| StoreError::NotFound(format!("badge {}", badge_id)))?;
        badge.description = description.to_string();
        Ok(())
    }
}

#[async_trait]
impl HallRepository for InMemoryStore {
    async fn create_entries(&self, entries: &[HallEntry]) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.hall.extend_from_slice(entries);
        Ok(())
    }

    async fn list_entries(&self, limit: usize) -> Result<Vec<HallEntry>, StoreError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<HallEntry> = tables.hall.iter().rev().cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn entries_for_match(&self, match_id: &str) -> Result<Vec<HallEntry>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .hall
            .iter()
            .filter(|e| e.match_id == match_id)
            .cloned()
            .collect())
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Option<HallEntry>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.hall.iter().find(|e| e.id == entry_id).cloned())
    }

    async fn update_entry_roast(&self, entry_id: &str, roast: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .hall
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| StoreError::NotFound(format!("hall entry {}", entry_id)))?;
        entry.roast = roast.to_string();
        Ok(())
    }
}

#[async_trait]
impl MilestoneRepository for InMemoryStore {
    async fn list_milestones(&self) -> Result<Vec<MilestoneModel>, StoreError> {
        let tables = self.tables.read().await;
        let mut milestones = tables.milestones.clone();
        milestones.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(milestones)
    }

    async fn create_milestone(&self, milestone: &MilestoneModel) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.milestones.iter().any(|m| m.title == milestone.title) {
            return Ok(false);
        }
        tables.milestones.push(milestone.clone());
        Ok(true)
    }
}
