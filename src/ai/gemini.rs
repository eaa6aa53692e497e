use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{
    extractor::{normalise_extraction, ExtractionError, StatsExtractor},
    image::ImageData,
    narrative::{HallRoasts, MatchScenario, NarrativeError, NarrativeGenerator},
};
use crate::matches::ExtractedMatch;

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const EXTRACT_PROMPT: &str = "You are an expert football match statistician. Extract the \
post-match statistics for both players from this screenshot. Return a JSON object with \
team1Name, team2Name, team1Stats and team2Stats. Each stats object has name, score, \
possession (a string like \"55%\"), shots, shotsOnTarget, fouls, offsides, cornerKicks, \
freeKicks, passes, successfulPasses, crosses, interceptions, tackles, saves and, when \
visible, passAccuracy and redCards. Use 0 for any number you cannot read.";

/// Google Gemini `generateContent` client for extraction and banter
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Image { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoastOutput {
    roast: String,
}

#[derive(Debug, Deserialize)]
struct DescriptionOutput {
    description: String,
}

/// Transport-level failure, mapped into each caller's own error type
#[derive(Debug)]
enum CallError {
    Timeout,
    Http(String),
    Shape(String),
}

impl From<CallError> for ExtractionError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Timeout => ExtractionError::Timeout,
            CallError::Http(msg) => ExtractionError::Upstream(msg),
            CallError::Shape(msg) => ExtractionError::Malformed(msg),
        }
    }
}

impl From<CallError> for NarrativeError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Timeout => NarrativeError::Timeout,
            CallError::Http(msg) => NarrativeError::Upstream(msg),
            CallError::Shape(_) => NarrativeError::Empty,
        }
    }
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent("banterboard/0.1")
                .build()
                .unwrap_or_default(),
            api_key,
            model,
            timeout,
        }
    }

    /// Sends one prompt and returns the first candidate's text parsed as JSON
    async fn generate_json(&self, parts: Vec<Part>) -> Result<Value, CallError> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE, self.model);
        let body = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response: GenerateResponse = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(request_error)?
            .json()
            .await
            .map_err(request_error)?;

        let text = response
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text)
            .ok_or_else(|| CallError::Shape("response had no text candidate".to_string()))?;

        debug!(model = %self.model, chars = text.len(), "Gemini responded");

        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| CallError::Shape(format!("response was not JSON: {}", e)))
    }

    async fn generate<T: for<'de> Deserialize<'de>>(&self, prompt: String) -> Result<T, CallError> {
        let value = self.generate_json(vec![Part::Text { text: prompt }]).await?;
        serde_json::from_value(value).map_err(|e| CallError::Shape(e.to_string()))
    }
}

fn request_error(err: reqwest::Error) -> CallError {
    if err.is_timeout() {
        CallError::Timeout
    } else {
        CallError::Http(err.to_string())
    }
}

/// Models sometimes wrap JSON in a markdown fence even when asked not to
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[async_trait]
impl StatsExtractor for GeminiClient {
    #[instrument(name = "gemini_extract", skip(self, image), fields(mime = %image.mime_type))]
    async fn extract(&self, image: &ImageData) -> Result<ExtractedMatch, ExtractionError> {
        let value = self
            .generate_json(vec![
                Part::Text {
                    text: EXTRACT_PROMPT.to_string(),
                },
                Part::Image {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.base64.clone(),
                    },
                },
            ])
            .await?;

        normalise_extraction(&value)
    }
}

#[async_trait]
impl NarrativeGenerator for GeminiClient {
    async fn match_roast(&self, scenario: &MatchScenario) -> Result<String, NarrativeError> {
        let prompt = format!(
            "You know iconic English movie quotes. Pick ONE real, well-known movie line for \
             the winner of a football match to taunt the loser with. Match the tone to the \
             margin: a 5-0 thrashing deserves a different line than a 2-1 scrap. \
             Winner: {} ({}). Loser: {} ({}). Reply as JSON: {{\"roast\": \"...\"}}",
            scenario.winner_name,
            scenario.winning_score,
            scenario.loser_name,
            scenario.losing_score
        );
        let output: RoastOutput = self.generate(prompt).await?;
        non_empty(output.roast)
    }

    async fn hall_roasts(
        &self,
        scenario: &MatchScenario,
        category: &str,
        stat: &str,
    ) -> Result<HallRoasts, NarrativeError> {
        let prompt = format!(
            "You know iconic English-language movies. Pick two real movie lines for this \
             football match: one praising the winner, one shaming the loser. \
             Theme: {}. Winner: {}. Loser: {}. Defining stat: {}. \
             Reply as JSON: {{\"fameRoast\": \"...\", \"shameRoast\": \"...\"}}",
            category, scenario.winner_name, scenario.loser_name, stat
        );
        let roasts: HallRoasts = self.generate(prompt).await?;
        Ok(HallRoasts {
            fame_roast: non_empty(roasts.fame_roast)?,
            shame_roast: non_empty(roasts.shame_roast)?,
        })
    }

    async fn badge_description(
        &self,
        name: &str,
        criteria: &str,
    ) -> Result<String, NarrativeError> {
        let prompt = format!(
            "You write witty copy for a football gaming app full of banter. Write a short, \
             fun description for this badge. It may celebrate a win or mock a loss. \
             Badge: {}. Criteria: {}. Reply as JSON: {{\"description\": \"...\"}}",
            name, criteria
        );
        let output: DescriptionOutput = self.generate(prompt).await?;
        non_empty(output.description)
    }
}

fn non_empty(text: String) -> Result<String, NarrativeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(NarrativeError::Empty)
    } else {
        Ok(trimmed.to_string())
    }
}
