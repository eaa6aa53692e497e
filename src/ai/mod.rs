// External AI collaborators: screenshot extraction and banter generation.
//
// Both are opaque and fallible. Callers treat extraction as a best guess the
// uploader confirms, and narrative text as optional with a fixed fallback.

// Public API - what other modules can use
pub use extractor::{normalise_extraction, DisabledExtractor, ExtractionError, StatsExtractor};
pub use gemini::GeminiClient;
pub use image::ImageData;
pub use narrative::{
    fame_fallback, shame_fallback, CannedNarrator, HallRoasts, MatchScenario, NarrativeError,
    NarrativeGenerator,
};

// Internal modules
mod extractor;
mod gemini;
mod image;
mod narrative;
