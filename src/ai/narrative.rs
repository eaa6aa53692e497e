use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NarrativeError {
    #[error("Narrative generation failed: {0}")]
    Upstream(String),

    #[error("Narrative generation timed out")]
    Timeout,

    #[error("Narrative generation returned nothing usable")]
    Empty,
}

/// Who beat whom, and by how much
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScenario {
    pub winner_name: String,
    pub loser_name: String,
    pub winning_score: u32,
    pub losing_score: u32,
}

impl MatchScenario {
    pub fn goal_difference(&self) -> u32 {
        self.winning_score.abs_diff(self.losing_score)
    }
}

/// One line for the winner, one for the loser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HallRoasts {
    pub fame_roast: String,
    pub shame_roast: String,
}

/// Short banter text for matches, hall entries and badges.
///
/// Every caller holds a fallback; an error here never fails the surrounding work.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// A line for the winner to taunt the loser with
    async fn match_roast(&self, scenario: &MatchScenario) -> Result<String, NarrativeError>;

    async fn hall_roasts(
        &self,
        scenario: &MatchScenario,
        category: &str,
        stat: &str,
    ) -> Result<HallRoasts, NarrativeError>;

    async fn badge_description(&self, name: &str, criteria: &str)
        -> Result<String, NarrativeError>;
}

pub fn fame_fallback(winner_name: &str) -> String {
    format!("{} dominated with an impressive victory!", winner_name)
}

pub fn shame_fallback(loser_name: &str) -> String {
    format!("{} faced a tough defeat this time.", loser_name)
}

const MATCH_ROASTS: &[&str] = &[
    "{winner} sends {loser} home. {score}, and it wasn't that close.",
    "{loser} brought a spoon to a knife fight. {winner} wins {score}.",
    "I'm your huckleberry. {winner} beats {loser} {score}.",
    "{winner} lives life a quarter mile at a time. {loser} lives it in reverse. {score}.",
];

const FAME_LINES: &[&str] = &[
    "{winner} is the captain now.",
    "{winner} felt the need for speed and left {loser} in the dust.",
    "Are you not entertained? {winner} certainly is.",
];

const SHAME_LINES: &[&str] = &[
    "{loser} is in a glass case of emotion.",
    "{loser} picked the wrong week to quit practising.",
    "Houston, {loser} has a problem.",
];

const BADGE_LINES: &[&str] = &[
    "{criteria}. Frame it, screenshot it, never let anyone forget it.",
    "{criteria}. The group chat has been notified.",
    "{criteria}. Legends are built on less. Not much less, but less.",
];

/// Offline narrator that picks from fixed lines at random.
///
/// Used when no AI key is configured and in tests.
pub struct CannedNarrator;

impl CannedNarrator {
    fn pick(pool: &[&str]) -> Result<String, NarrativeError> {
        pool.choose(&mut rand::rng())
            .map(|line| line.to_string())
            .ok_or(NarrativeError::Empty)
    }

    fn fill(template: String, scenario: &MatchScenario) -> String {
        template
            .replace("{winner}", &scenario.winner_name)
            .replace("{loser}", &scenario.loser_name)
            .replace(
                "{score}",
                &format!("{}-{}", scenario.winning_score, scenario.losing_score),
            )
    }
}

#[async_trait]
impl NarrativeGenerator for CannedNarrator {
    async fn match_roast(&self, scenario: &MatchScenario) -> Result<String, NarrativeError> {
        Ok(Self::fill(Self::pick(MATCH_ROASTS)?, scenario))
    }

    async fn hall_roasts(
        &self,
        scenario: &MatchScenario,
        _category: &str,
        _stat: &str,
    ) -> Result<HallRoasts, NarrativeError> {
        Ok(HallRoasts {
            fame_roast: Self::fill(Self::pick(FAME_LINES)?, scenario),
            shame_roast: Self::fill(Self::pick(SHAME_LINES)?, scenario),
        })
    }

    async fn badge_description(
        &self,
        _name: &str,
        criteria: &str,
    ) -> Result<String, NarrativeError> {
        Ok(Self::pick(BADGE_LINES)?.replace("{criteria}", criteria))
    }
}
