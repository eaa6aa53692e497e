use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::models::BadgeNotification;

/// In-process inbox of badge unlocks, keyed by user id.
///
/// Only the active session's user is ever given notifications; they're
/// drained when read and lost on restart.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    pending: Mutex<HashMap<String, Vec<BadgeNotification>>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, user_id: &str, notifications: Vec<BadgeNotification>) {
        if notifications.is_empty() {
            return;
        }
        debug!(user_id, count = notifications.len(), "Queueing badge notifications");
        self.pending
            .lock()
            .await
            .entry(user_id.to_string())
            .or_default()
            .extend(notifications);
    }

    /// Returns and clears everything queued for the user, oldest first
    pub async fn drain(&self, user_id: &str) -> Vec<BadgeNotification> {
        self.pending
            .lock()
            .await
            .remove(user_id)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::catalog::BADGE_CATALOG;

    #[tokio::test]
    async fn drain_returns_once_and_only_for_owner() {
        let center = NotificationCenter::new();
        let badge = BADGE_CATALOG[0].materialise("desc".to_string());

        center.push("u1", vec![BadgeNotification::from(&badge)]).await;

        assert!(center.drain("u2").await.is_empty());
        let drained = center.drain("u1").await;
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].name, "First Victory");
        assert!(center.drain("u1").await.is_empty());
    }
}
