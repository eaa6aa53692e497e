use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};

use banterboard::ai::{
    ExtractionError, HallRoasts, ImageData, MatchScenario, NarrativeError, NarrativeGenerator,
    StatsExtractor,
};
use banterboard::matches::ExtractedMatch;

// ============================================================================
// Mock AI Collaborators
// ============================================================================

/// Returns the same stats for every screenshot
pub struct FixedExtractor {
    stats: ExtractedMatch,
}

impl FixedExtractor {
    pub fn new(stats: ExtractedMatch) -> Self {
        Self { stats }
    }
}

#[async_trait]
impl StatsExtractor for FixedExtractor {
    async fn extract(&self, _image: &ImageData) -> Result<ExtractedMatch, ExtractionError> {
        Ok(self.stats.clone())
    }
}

/// Fails every call, like a narrative service that is out of quota
#[derive(Default)]
pub struct FailingNarrator {
    calls: AtomicU32,
}

impl FailingNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    fn fail(&self) -> NarrativeError {
        self.calls.fetch_add(1, Ordering::Relaxed);
        NarrativeError::Upstream("quota exceeded".to_string())
    }
}

#[async_trait]
impl NarrativeGenerator for FailingNarrator {
    async fn match_roast(&self, _scenario: &MatchScenario) -> Result<String, NarrativeError> {
        Err(self.fail())
    }

    async fn hall_roasts(
        &self,
        _scenario: &MatchScenario,
        _category: &str,
        _stat: &str,
    ) -> Result<HallRoasts, NarrativeError> {
        Err(self.fail())
    }

    async fn badge_description(
        &self,
        _name: &str,
        _criteria: &str,
    ) -> Result<String, NarrativeError> {
        Err(self.fail())
    }
}
