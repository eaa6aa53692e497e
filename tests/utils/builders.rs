use serde_json::{json, Value};

use banterboard::matches::{ExtractedMatch, PlayerStats};

/// Smallest image payload the extract endpoint accepts
#[allow(dead_code)]
pub const TEST_IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

// ============================================================================
// Stat Payload Builders
// ============================================================================

/// Two-sided post-match stats with plausible defaults
pub struct StatsBuilder {
    stats: ExtractedMatch,
}

impl StatsBuilder {
    pub fn new() -> Self {
        Self {
            stats: ExtractedMatch {
                team1_name: "Red Devils".to_string(),
                team2_name: "Blue Moon".to_string(),
                team1_stats: side("Red Devils", 55, 12, 6, 410, 352),
                team2_stats: side("Blue Moon", 45, 7, 3, 330, 261),
            },
        }
    }

    /// Sets the scoreline, team1 first
    pub fn score(mut self, team1: u32, team2: u32) -> Self {
        self.stats.team1_stats.score = team1;
        self.stats.team2_stats.score = team2;
        self
    }

    /// Varies a fingerprinted field so otherwise equal payloads stay distinct
    pub fn variant(mut self, n: u32) -> Self {
        self.stats.team1_stats.passes += n;
        self
    }

    #[allow(dead_code)]
    pub fn tackles(mut self, team1: u32, team2: u32) -> Self {
        self.stats.team1_stats.tackles = team1;
        self.stats.team2_stats.tackles = team2;
        self
    }

    pub fn build(self) -> ExtractedMatch {
        self.stats
    }
}

fn side(name: &str, possession: u32, shots: u32, on_target: u32, passes: u32, completed: u32) -> PlayerStats {
    PlayerStats {
        name: name.to_string(),
        possession: format!("{}%", possession),
        shots,
        shots_on_target: on_target,
        passes,
        successful_passes: completed,
        tackles: 14,
        saves: 2,
        fouls: 5,
        corner_kicks: 4,
        ..PlayerStats::default()
    }
}

/// `POST /matches` body; `None` leaves that selection out
pub fn submission(
    stats: &ExtractedMatch,
    side: Option<&str>,
    opponent_id: Option<&str>,
    outcome: Option<&str>,
) -> Value {
    let mut body = json!({ "stats": stats });
    if let Some(side) = side {
        body["userTeamSide"] = json!(side);
    }
    if let Some(opponent_id) = opponent_id {
        body["opponentId"] = json!(opponent_id);
    }
    if let Some(outcome) = outcome {
        body["outcome"] = json!(outcome);
    }
    body
}
