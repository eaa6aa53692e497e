// Public API - what other modules can use
pub use handlers::{get_user, list_users, register_user};
pub use models::{percentage, AggregateStats, UserModel};
pub use repository::UserRepository;
pub use types::{RegisterUserRequest, UserResponse};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod types;
