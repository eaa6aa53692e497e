// Library crate for the banterboard match server
// This file exposes the public API for integration tests

pub mod ai;
pub mod app;
pub mod badges;
pub mod config;
pub mod event;
pub mod hall;
pub mod leaderboard;
pub mod matches;
pub mod milestones;
pub mod session;
pub mod shared;
pub mod stats;
pub mod store;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use app::{build_state, create_router, Collaborators};
pub use config::AppConfig;
pub use event::{EventBus, MatchEvent};
pub use shared::{AppError, AppState};
pub use store::{InMemoryStore, StoreError};
