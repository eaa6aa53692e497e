// Hall of fame and shame: one spotlight per side of every decisive match.

// Public API - what other modules can use
pub use handlers::{list_hall, update_hall_roast};
pub use models::{HallEntry, HallKind};
pub use repository::HallRepository;
pub use subscriber::HallOfFameWriter;

// Internal modules
mod handlers;
mod models;
mod repository;
mod subscriber;
