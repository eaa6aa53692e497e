use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use super::image::ImageData;
use crate::matches::{ExtractedMatch, PlayerStats};

#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Extraction is not configured")]
    NotConfigured,

    #[error("Extraction service failed: {0}")]
    Upstream(String),

    #[error("Extraction timed out")]
    Timeout,

    #[error("Extraction returned unusable data: {0}")]
    Malformed(String),
}

/// Turns a post-match screenshot into a two-sided stat record.
///
/// Results are best guesses; the uploader confirms them before anything is saved.
#[async_trait]
pub trait StatsExtractor: Send + Sync {
    async fn extract(&self, image: &ImageData) -> Result<ExtractedMatch, ExtractionError>;
}

/// Used when no AI credentials are configured
pub struct DisabledExtractor;

#[async_trait]
impl StatsExtractor for DisabledExtractor {
    async fn extract(&self, _image: &ImageData) -> Result<ExtractedMatch, ExtractionError> {
        Err(ExtractionError::NotConfigured)
    }
}

/// Builds an [`ExtractedMatch`] from loosely shaped model output.
///
/// Missing names become empty strings, missing or unreadable numbers become 0,
/// numbers given as strings ("12", "55%") are parsed. Only a non-object root
/// is rejected.
pub fn normalise_extraction(value: &Value) -> Result<ExtractedMatch, ExtractionError> {
    let root = value
        .as_object()
        .ok_or_else(|| ExtractionError::Malformed("expected a JSON object".to_string()))?;

    let empty = Map::new();
    let side = |key: &str| root.get(key).and_then(Value::as_object).unwrap_or(&empty);

    Ok(ExtractedMatch {
        team1_name: text(root, "team1Name"),
        team2_name: text(root, "team2Name"),
        team1_stats: player_stats(side("team1Stats")),
        team2_stats: player_stats(side("team2Stats")),
    })
}

fn player_stats(raw: &Map<String, Value>) -> PlayerStats {
    PlayerStats {
        name: text(raw, "name"),
        score: count(raw, "score"),
        possession: possession(raw),
        shots: count(raw, "shots"),
        shots_on_target: count(raw, "shotsOnTarget"),
        fouls: count(raw, "fouls"),
        offsides: count(raw, "offsides"),
        corner_kicks: count(raw, "cornerKicks"),
        free_kicks: count(raw, "freeKicks"),
        passes: count(raw, "passes"),
        successful_passes: count(raw, "successfulPasses"),
        crosses: count(raw, "crosses"),
        interceptions: count(raw, "interceptions"),
        tackles: count(raw, "tackles"),
        saves: count(raw, "saves"),
        pass_accuracy: optional_count(raw, "passAccuracy"),
        red_cards: optional_count(raw, "redCards"),
        user_id: None,
    }
}

fn text(raw: &Map<String, Value>, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn possession(raw: &Map<String, Value>) -> String {
    match raw.get("possession") {
        Some(Value::Number(n)) => format!("{}%", n),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

fn count(raw: &Map<String, Value>, key: &str) -> u32 {
    optional_count(raw, key).unwrap_or(0)
}

fn optional_count(raw: &Map<String, Value>, key: &str) -> Option<u32> {
    let number = match raw.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if number.is_finite() && number >= 0.0 {
        Some(number.round().min(f64::from(u32::MAX)) as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalises_complete_payload() {
        let raw = json!({
            "team1Name": "Reds",
            "team2Name": "Blues",
            "team1Stats": {
                "name": "Reds", "score": 3, "possession": "58%", "shots": 14,
                "shotsOnTarget": 7, "fouls": 2, "passes": 420, "successfulPasses": 380,
                "tackles": 18, "saves": 2, "redCards": 1
            },
            "team2Stats": {
                "name": "Blues", "score": 1, "possession": "42%", "shots": 6
            }
        });

        let extracted = normalise_extraction(&raw).unwrap();

        assert_eq!(extracted.team1_name, "Reds");
        assert_eq!(extracted.team1_stats.score, 3);
        assert_eq!(extracted.team1_stats.successful_passes, 380);
        assert_eq!(extracted.team1_stats.red_cards, Some(1));
        assert_eq!(extracted.team2_stats.shots, 6);
        assert_eq!(extracted.team2_stats.tackles, 0);
        assert_eq!(extracted.team2_stats.red_cards, None);
    }

    #[test]
    fn garbled_fields_fall_back_to_best_guess() {
        let raw = json!({
            "team1Stats": { "score": "2", "possession": 61, "shots": "lots", "saves": -1 },
            "team2Stats": "unreadable"
        });

        let extracted = normalise_extraction(&raw).unwrap();

        assert_eq!(extracted.team1_name, "");
        assert_eq!(extracted.team1_stats.score, 2);
        assert_eq!(extracted.team1_stats.possession, "61%");
        assert_eq!(extracted.team1_stats.shots, 0);
        assert_eq!(extracted.team1_stats.saves, 0);
        assert_eq!(extracted.team2_stats, PlayerStats::default());
    }

    #[test]
    fn non_object_payload_is_malformed() {
        assert!(matches!(
            normalise_extraction(&json!(["nope"])),
            Err(ExtractionError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn disabled_extractor_reports_not_configured() {
        let image: ImageData = "data:image/png;base64,iVBORw0KGgo=".parse().unwrap();
        assert!(matches!(
            DisabledExtractor.extract(&image).await,
            Err(ExtractionError::NotConfigured)
        ));
    }
}
