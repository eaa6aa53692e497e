use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::{StatKey, StatSnapshot};

/// A persisted progress goal. Progress itself is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneModel {
    pub id: String,
    pub title: String,
    pub description: String,
    pub stat: StatKey,
    pub target: u32,
    pub created_at: DateTime<Utc>,
}

/// One milestone as seen by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneProgress {
    pub id: String,
    pub title: String,
    pub description: String,
    pub stat: StatKey,
    pub target: u32,
    pub progress: u32,
    pub achieved: bool,
    /// 0..=100
    pub percentage: u32,
}

impl MilestoneProgress {
    pub fn evaluate(milestone: &MilestoneModel, snapshot: &StatSnapshot) -> Self {
        let progress = snapshot.get(milestone.stat);
        let percentage = if milestone.target == 0 {
            100
        } else {
            crate::user::percentage(progress, milestone.target).min(100)
        };

        Self {
            id: milestone.id.clone(),
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            stat: milestone.stat,
            target: milestone.target,
            progress,
            achieved: progress >= milestone.target,
            percentage,
        }
    }
}
