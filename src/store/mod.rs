// Storage backends.
//
// Every repository trait in the crate is implemented by both stores. The match
// commit needs users and matches in one atomic unit, so a single store type
// owns all collections instead of one repository per table.

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

mod memory;
mod postgres;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate match fingerprint: {0}")]
    DuplicateFingerprint(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            other => StoreError::Database(other.to_string()),
        }
    }
}
