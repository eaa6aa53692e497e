use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::{StatKey, StatSnapshot};

/// `stat >= threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCriteria {
    pub stat: StatKey,
    pub threshold: u32,
}

impl BadgeCriteria {
    pub fn is_met_by(&self, snapshot: &StatSnapshot) -> bool {
        snapshot.meets(self.stat, self.threshold)
    }
}

/// A materialised catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub criteria: BadgeCriteria,
    pub created_at: DateTime<Utc>,
}

/// Pending unlock message for the user who earned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeNotification {
    pub badge_id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

impl From<&BadgeModel> for BadgeNotification {
    fn from(badge: &BadgeModel) -> Self {
        Self {
            badge_id: badge.id.clone(),
            name: badge.name.clone(),
            description: badge.description.clone(),
            icon: badge.icon.clone(),
            unlocked_at: Utc::now(),
        }
    }
}
