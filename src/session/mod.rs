// Public API - what other modules can use
pub use handlers::create_session;
pub use middleware::jwt_auth;
pub use token::TokenConfig;
pub use types::{CreateSessionRequest, SessionClaims, SessionResponse};

// Internal modules
mod handlers;
mod middleware;
mod token;
mod types;
