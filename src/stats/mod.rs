// Per-user numbers that badge criteria and milestones are checked against.
//
// Most come straight from the stored aggregate block; streaks and clean
// sheets are derived from match history at evaluation time.

pub mod collectors;
mod key;
mod snapshot;

pub use collectors::{default_collectors, StatCollector};
pub use key::StatKey;
pub use snapshot::StatSnapshot;
