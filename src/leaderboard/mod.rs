// Read-side views: rankings, best-of cards, rivalries, losers and monthly
// trends. Nothing in here writes.

// Public API - what other modules can use
pub use aggregate::{BestOfCard, Defeat, LeaderboardRow, LoserRow, MonthTrend, RivalRecord, Unit};
pub use handlers::{best_of, leaderboard, losers, rivals, trends};
pub use service::{Leaderboard, LeaderboardService};
pub use window::TimeRange;

// Internal modules
mod aggregate;
mod handlers;
mod service;
mod window;
