use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum MatchError {
    /// Missing side/opponent/outcome or otherwise malformed submission
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Match already recorded (fingerprint {fingerprint})")]
    Duplicate { fingerprint: String },

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Match not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(StoreError),
}

impl MatchError {
    pub fn validation(msg: impl Into<String>) -> Self {
        MatchError::Validation(msg.into())
    }
}

impl From<StoreError> for MatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateFingerprint(fingerprint) => MatchError::Duplicate { fingerprint },
            other => MatchError::Store(other),
        }
    }
}
