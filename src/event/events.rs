use serde::{Deserialize, Serialize};

use crate::matches::MatchModel;

/// Facts published after something has been durably recorded.
///
/// Subscribers react to these outside the request that caused them; nothing
/// they do can undo the fact itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A match and both participants' aggregates were committed together
    MatchCommitted {
        record: MatchModel,
        /// The user whose session made the submission
        submitted_by: String,
    },
}

impl MatchEvent {
    pub fn match_id(&self) -> &str {
        match self {
            MatchEvent::MatchCommitted { record, .. } => &record.id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            MatchEvent::MatchCommitted { .. } => "match_committed",
        }
    }
}
