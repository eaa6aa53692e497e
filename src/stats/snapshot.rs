use serde::Serialize;
use std::collections::HashMap;

use super::{collectors::StatCollector, key::StatKey};
use crate::matches::MatchModel;
use crate::user::UserModel;

/// All criteria-relevant numbers for one user at one moment.
///
/// Keys nobody collected read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatSnapshot {
    values: HashMap<StatKey, u32>,
}

impl StatSnapshot {
    /// Runs every collector over the user's profile and match history
    pub fn collect(
        user: &UserModel,
        history: &[MatchModel],
        collectors: &[Box<dyn StatCollector>],
    ) -> Self {
        let mut snapshot = Self::default();
        for collector in collectors {
            for (key, value) in collector.collect(user, history) {
                snapshot.values.insert(key, value);
            }
        }
        snapshot
    }

    pub fn get(&self, key: StatKey) -> u32 {
        self.values.get(&key).copied().unwrap_or(0)
    }

    pub fn meets(&self, key: StatKey, threshold: u32) -> bool {
        self.get(key) >= threshold
    }
}

impl FromIterator<(StatKey, u32)> for StatSnapshot {
    fn from_iter<I: IntoIterator<Item = (StatKey, u32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
