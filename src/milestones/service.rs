use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    catalog::MILESTONE_CATALOG,
    models::{MilestoneModel, MilestoneProgress},
    repository::MilestoneRepository,
};
use crate::stats::{collectors::AggregateCollector, StatCollector, StatSnapshot};
use crate::store::StoreError;
use crate::user::UserRepository;

pub struct MilestoneService {
    milestones: Arc<dyn MilestoneRepository>,
    users: Arc<dyn UserRepository>,
    interval: Duration,
}

impl MilestoneService {
    pub fn new(
        milestones: Arc<dyn MilestoneRepository>,
        users: Arc<dyn UserRepository>,
        interval: Duration,
    ) -> Self {
        Self {
            milestones,
            users,
            interval,
        }
    }

    /// Materialises the next catalog milestone if the newest one is older
    /// than the configured interval (or none exist yet). At most one per call.
    #[instrument(skip(self))]
    pub async fn ensure_catalog(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<MilestoneModel>, StoreError> {
        let existing = self.milestones.list_milestones().await?;

        if let Some(newest) = existing.iter().map(|m| m.created_at).max() {
            if now - newest < self.interval {
                debug!(newest = %newest, "Newest milestone too recent, skipping");
                return Ok(None);
            }
        }

        let titles: HashSet<&str> = existing.iter().map(|m| m.title.as_str()).collect();
        let Some(next) = MILESTONE_CATALOG.iter().find(|t| !titles.contains(t.title)) else {
            return Ok(None);
        };

        let milestone = next.materialise(now);
        if !self.milestones.create_milestone(&milestone).await? {
            return Ok(None);
        }

        info!(title = %milestone.title, "Milestone added");
        Ok(Some(milestone))
    }

    /// Every milestone with the user's progress, lowest target first
    pub async fn journey(&self, user_id: &str) -> Result<Vec<MilestoneProgress>, StoreError> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("User not found: {}", user_id)))?;

        let collectors: [Box<dyn StatCollector>; 1] = [Box::new(AggregateCollector)];
        let snapshot = StatSnapshot::collect(&user, &[], &collectors);

        let mut milestones = self.milestones.list_milestones().await?;
        milestones.sort_by_key(|m| m.target);

        Ok(milestones
            .iter()
            .map(|milestone| MilestoneProgress::evaluate(milestone, &snapshot))
            .collect())
    }
}
