use chrono::Utc;

use super::models::{BadgeCriteria, BadgeModel};
use crate::stats::StatKey;

/// Fixed definition a [`BadgeModel`] is created from
#[derive(Debug, Clone, Copy)]
pub struct BadgeTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    /// Human phrasing of the criteria; also the fallback description
    pub criteria_text: &'static str,
    pub stat: StatKey,
    pub threshold: u32,
}

impl BadgeTemplate {
    pub fn criteria(&self) -> BadgeCriteria {
        BadgeCriteria {
            stat: self.stat,
            threshold: self.threshold,
        }
    }

    pub fn materialise(&self, description: String) -> BadgeModel {
        BadgeModel {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description,
            icon: self.icon.to_string(),
            criteria: self.criteria(),
            created_at: Utc::now(),
        }
    }
}

/// Creation order matters: earlier entries are materialised first
pub const BADGE_CATALOG: [BadgeTemplate; 12] = [
    BadgeTemplate {
        id: "first-victory",
        name: "First Victory",
        icon: "Trophy",
        criteria_text: "Get your first win",
        stat: StatKey::Wins,
        threshold: 1,
    },
    BadgeTemplate {
        id: "goal-scorer",
        name: "Goal Scorer",
        icon: "Zap",
        criteria_text: "Score 10 goals",
        stat: StatKey::GoalsFor,
        threshold: 10,
    },
    BadgeTemplate {
        id: "the-participant",
        name: "The Participant",
        icon: "Award",
        criteria_text: "Play 5 matches",
        stat: StatKey::MatchesPlayed,
        threshold: 5,
    },
    BadgeTemplate {
        id: "getting-started",
        name: "Getting Started",
        icon: "Footprints",
        criteria_text: "Play your first match",
        stat: StatKey::MatchesPlayed,
        threshold: 1,
    },
    BadgeTemplate {
        id: "tenacious-tackler",
        name: "Tenacious Tackler",
        icon: "Footprints",
        criteria_text: "Complete 20 tackles",
        stat: StatKey::Tackles,
        threshold: 20,
    },
    BadgeTemplate {
        id: "comeback-kid",
        name: "Comeback Kid",
        icon: "Crown",
        criteria_text: "Win after being 1 goal down",
        stat: StatKey::Comebacks,
        threshold: 1,
    },
    BadgeTemplate {
        id: "serial-winner",
        name: "Serial Winner",
        icon: "Flame",
        criteria_text: "Win 3 matches in a row",
        stat: StatKey::WinStreak,
        threshold: 3,
    },
    BadgeTemplate {
        id: "the-fortress",
        name: "The Fortress",
        icon: "Shield",
        criteria_text: "Keep 1 clean sheet",
        stat: StatKey::CleanSheets,
        threshold: 1,
    },
    BadgeTemplate {
        id: "first-defeat",
        name: "First Defeat",
        icon: "HeartCrack",
        criteria_text: "Lose your first match",
        stat: StatKey::Losses,
        threshold: 1,
    },
    BadgeTemplate {
        id: "butter-fingers",
        name: "Butter Fingers",
        icon: "Bot",
        criteria_text: "Concede 10 goals",
        stat: StatKey::GoalsAgainst,
        threshold: 10,
    },
    BadgeTemplate {
        id: "the-philanthropist",
        name: "The Philanthropist",
        icon: "ThumbsDown",
        criteria_text: "Lose 5 matches",
        stat: StatKey::Losses,
        threshold: 5,
    },
    BadgeTemplate {
        id: "tough-day-at-the-office",
        name: "Tough Day at the Office",
        icon: "Coffee",
        criteria_text: "Lose 3 matches in a row",
        stat: StatKey::LossStreak,
        threshold: 3,
    },
];

/// Below this many materialised badges, unforced maintenance keeps creating
pub const LAZY_CATALOG_FLOOR: usize = 5;

pub fn template(id: &str) -> Option<&'static BadgeTemplate> {
    BADGE_CATALOG.iter().find(|t| t.id == id)
}
