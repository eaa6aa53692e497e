use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    catalog::{template, BadgeTemplate, BADGE_CATALOG, LAZY_CATALOG_FLOOR},
    models::BadgeModel,
    repository::BadgeRepository,
};
use crate::ai::NarrativeGenerator;
use crate::matches::{MatchFilter, MatchRepository};
use crate::stats::{default_collectors, StatCollector, StatSnapshot};
use crate::store::StoreError;
use crate::user::UserRepository;

/// Badge catalog maintenance and per-user evaluation
pub struct BadgeService {
    badges: Arc<dyn BadgeRepository>,
    users: Arc<dyn UserRepository>,
    matches: Arc<dyn MatchRepository>,
    narrator: Arc<dyn NarrativeGenerator>,
    collectors: Vec<Box<dyn StatCollector>>,
    batch_size: usize,
}

impl BadgeService {
    pub fn new(
        badges: Arc<dyn BadgeRepository>,
        users: Arc<dyn UserRepository>,
        matches: Arc<dyn MatchRepository>,
        narrator: Arc<dyn NarrativeGenerator>,
        batch_size: usize,
    ) -> Self {
        Self {
            badges,
            users,
            matches,
            narrator,
            collectors: default_collectors(),
            batch_size,
        }
    }

    pub async fn list_badges(&self) -> Result<Vec<BadgeModel>, StoreError> {
        self.badges.list_badges().await
    }

    /// Materialises the next few catalog entries that don't exist yet.
    ///
    /// Creates at most `batch_size` per call. Unless `force` is set, does
    /// nothing once `LAZY_CATALOG_FLOOR` badges exist. Returns what it created.
    #[instrument(skip(self))]
    pub async fn ensure_catalog(&self, force: bool) -> Result<Vec<BadgeModel>, StoreError> {
        let existing = self.badges.list_badges().await?;
        if !force && existing.len() >= LAZY_CATALOG_FLOOR {
            return Ok(Vec::new());
        }

        let existing_ids: HashSet<&str> = existing.iter().map(|b| b.id.as_str()).collect();
        let pending: Vec<&BadgeTemplate> = BADGE_CATALOG
            .iter()
            .filter(|t| !existing_ids.contains(t.id))
            .take(self.batch_size)
            .collect();

        let mut created = Vec::with_capacity(pending.len());
        for template in pending {
            let description = self.describe(template).await;
            let badge = template.materialise(description);
            if self.badges.create_badge(&badge).await? {
                info!(badge_id = %badge.id, "Badge added to catalog");
                created.push(badge);
            }
        }

        Ok(created)
    }

    /// Regenerates descriptions for badges stored with an empty one
    pub async fn backfill_descriptions(&self) -> Result<usize, StoreError> {
        let mut updated = 0;
        for badge in self.badges.list_badges().await? {
            if !badge.description.trim().is_empty() {
                continue;
            }
            let Some(definition) = template(&badge.id) else {
                continue;
            };
            let description = self.describe(definition).await;
            self.badges
                .update_badge_description(&badge.id, &description)
                .await?;
            updated += 1;
        }
        if updated > 0 {
            info!(updated, "Backfilled badge descriptions");
        }
        Ok(updated)
    }

    /// Awards every materialised badge the user now qualifies for.
    ///
    /// Idempotent: already-earned badges are skipped, so running it twice
    /// against the same state awards nothing the second time. Returns only
    /// the badges newly awarded by this call.
    #[instrument(skip(self))]
    pub async fn evaluate_user(&self, user_id: &str) -> Result<Vec<BadgeModel>, StoreError> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;

        let history = self
            .matches
            .list_matches(&MatchFilter {
                participant: Some(user_id.to_string()),
                ..MatchFilter::default()
            })
            .await?;
        let snapshot = StatSnapshot::collect(&user, &history, &self.collectors);

        let candidates: Vec<BadgeModel> = self
            .badges
            .list_badges()
            .await?
            .into_iter()
            .filter(|badge| !user.has_badge(&badge.id) && badge.criteria.is_met_by(&snapshot))
            .collect();

        if candidates.is_empty() {
            debug!(user_id, "No new badges");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = candidates.iter().map(|b| b.id.clone()).collect();
        let awarded = self.users.award_badges(user_id, &ids).await?;

        info!(user_id, awarded = ?awarded, "Badges awarded");

        Ok(candidates
            .into_iter()
            .filter(|badge| awarded.contains(&badge.id))
            .collect())
    }

    async fn describe(&self, template: &BadgeTemplate) -> String {
        match self
            .narrator
            .badge_description(template.name, template.criteria_text)
            .await
        {
            Ok(description) => description,
            Err(e) => {
                warn!(badge_id = template.id, error = %e, "Badge description generation failed");
                template.criteria_text.to_string()
            }
        }
    }
}
