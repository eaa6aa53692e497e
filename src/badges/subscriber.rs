use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use super::{models::BadgeNotification, notifications::NotificationCenter, service::BadgeService};
use crate::event::{EventError, EventHandler, MatchEvent};

/// Evaluates both participants for new badges after a commit.
///
/// Each participant is evaluated independently; one failing doesn't stop
/// the other. Only the submitting user gets unlock notifications, and an
/// unlock for them also forces the next catalog batch into existence.
pub struct BadgeAwarder {
    service: Arc<BadgeService>,
    notifications: Arc<NotificationCenter>,
}

impl BadgeAwarder {
    pub fn new(service: Arc<BadgeService>, notifications: Arc<NotificationCenter>) -> Self {
        Self {
            service,
            notifications,
        }
    }
}

#[async_trait]
impl EventHandler for BadgeAwarder {
    async fn handle(&self, event: &MatchEvent) -> Result<(), EventError> {
        let MatchEvent::MatchCommitted {
            record,
            submitted_by,
        } = event;

        if let Err(e) = self.service.ensure_catalog(false).await {
            warn!(error = %e, "Badge catalog maintenance failed");
        }

        let evaluations = join_all(
            record
                .participants
                .iter()
                .map(|user_id| async move { (user_id, self.service.evaluate_user(user_id).await) }),
        )
        .await;

        let mut failed = Vec::new();
        for (user_id, result) in evaluations {
            match result {
                Ok(unlocked) if !unlocked.is_empty() && user_id == submitted_by => {
                    info!(user_id = %user_id, count = unlocked.len(), "Active user unlocked badges");
                    self.notifications
                        .push(
                            user_id,
                            unlocked.iter().map(BadgeNotification::from).collect(),
                        )
                        .await;

                    if let Err(e) = self.service.ensure_catalog(true).await {
                        warn!(error = %e, "Forced badge catalog growth failed");
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(user_id = %user_id, match_id = %record.id, error = %e, "Badge evaluation failed");
                    failed.push(user_id.clone());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            // Evaluation is idempotent, so retrying the whole event is safe
            Err(EventError::retryable(format!(
                "badge evaluation failed for {}",
                failed.join(", ")
            )))
        }
    }

    fn name(&self) -> &'static str {
        "BadgeAwarder"
    }
}
