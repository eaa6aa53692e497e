// Match ingestion: confirmation, duplicate detection and the atomic commit.

// Public API - what other modules can use
pub use confirmation::{ConfirmationWorkflow, ConfirmedMatch, Selections};
pub use errors::MatchError;
pub use fingerprint::match_fingerprint;
pub use handlers::{add_comment, extract_stats, get_match, list_matches, submit_match, update_roast};
pub use models::{
    Comment, ExtractedMatch, MatchModel, MatchWinner, Outcome, PlayerStats, TeamSide, DRAW,
};
pub use repository::{MatchCommit, MatchFilter, MatchRepository, StatIncrement};
pub use roaster::{match_scenario, MatchRoaster};
pub use service::MatchService;

// Internal modules
mod confirmation;
mod errors;
mod fingerprint;
mod handlers;
pub mod models;
mod repository;
mod roaster;
mod service;
mod types;
