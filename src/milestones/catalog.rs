use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::MilestoneModel;
use crate::stats::StatKey;

#[derive(Debug, Clone, Copy)]
pub struct MilestoneTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub stat: StatKey,
    pub target: u32,
}

impl MilestoneTemplate {
    pub fn materialise(&self, now: DateTime<Utc>) -> MilestoneModel {
        MilestoneModel {
            id: Uuid::new_v4().to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            stat: self.stat,
            target: self.target,
            created_at: now,
        }
    }
}

/// Materialised one at a time, in this order
pub const MILESTONE_CATALOG: [MilestoneTemplate; 7] = [
    MilestoneTemplate {
        title: "First Win",
        description: "Get your first win in the barn.",
        stat: StatKey::Wins,
        target: 1,
    },
    MilestoneTemplate {
        title: "10 Wins",
        description: "Achieve 10 total wins.",
        stat: StatKey::Wins,
        target: 10,
    },
    MilestoneTemplate {
        title: "25 Wins",
        description: "Achieve 25 total wins.",
        stat: StatKey::Wins,
        target: 25,
    },
    MilestoneTemplate {
        title: "25 Goals",
        description: "Score 25 goals.",
        stat: StatKey::GoalsFor,
        target: 25,
    },
    MilestoneTemplate {
        title: "100 Goals",
        description: "Score a total of 100 goals.",
        stat: StatKey::GoalsFor,
        target: 100,
    },
    MilestoneTemplate {
        title: "50 Tackles",
        description: "Make 50 successful tackles.",
        stat: StatKey::Tackles,
        target: 50,
    },
    MilestoneTemplate {
        title: "10 Matches",
        description: "Play 10 matches.",
        stat: StatKey::MatchesPlayed,
        target: 10,
    },
];
