// Achievement badges: a lazily grown catalog, idempotent awarding after each
// commit, and unlock notifications for the active user.

// Public API - what other modules can use
pub use catalog::{BadgeTemplate, BADGE_CATALOG};
pub use handlers::{drain_notifications, list_badges};
pub use models::{BadgeCriteria, BadgeModel, BadgeNotification};
pub use notifications::NotificationCenter;
pub use repository::BadgeRepository;
pub use service::BadgeService;
pub use subscriber::BadgeAwarder;

// Internal modules
mod catalog;
mod handlers;
mod models;
mod notifications;
mod repository;
mod service;
mod subscriber;
