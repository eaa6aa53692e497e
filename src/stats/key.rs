use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A per-user number that badge criteria and milestones can target
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StatKey {
    Wins,
    Losses,
    Draws,
    MatchesPlayed,
    GoalsFor,
    GoalsAgainst,
    Shots,
    ShotsOnTarget,
    Passes,
    SuccessfulPasses,
    Tackles,
    Saves,
    RedCards,
    Fouls,
    /// Longest run of consecutive wins
    WinStreak,
    /// Longest run of consecutive losses
    LossStreak,
    /// Matches where the opponent didn't score
    CleanSheets,
    /// Wins after trailing; not derivable from end-of-match stats
    Comebacks,
}
