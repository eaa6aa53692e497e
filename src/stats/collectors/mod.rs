use crate::matches::MatchModel;
use crate::user::UserModel;

use super::key::StatKey;

pub mod aggregate;
pub mod history;

pub use aggregate::AggregateCollector;
pub use history::{CleanSheetCollector, StreakCollector};

/// Derives some [`StatKey`] values for a user
pub trait StatCollector: Send + Sync {
    /// `history` holds every match the user played, in any order
    fn collect(&self, user: &UserModel, history: &[MatchModel]) -> Vec<(StatKey, u32)>;
}

/// Every collector the badge evaluator runs
pub fn default_collectors() -> Vec<Box<dyn StatCollector>> {
    vec![
        Box::new(AggregateCollector),
        Box::new(StreakCollector),
        Box::new(CleanSheetCollector),
    ]
}
