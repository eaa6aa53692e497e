// Milestones: a slowly released catalog of goals, with progress computed
// per user at read time.

// Public API - what other modules can use
pub use catalog::{MilestoneTemplate, MILESTONE_CATALOG};
pub use handlers::user_journey;
pub use models::{MilestoneModel, MilestoneProgress};
pub use repository::MilestoneRepository;
pub use service::MilestoneService;

// Internal modules
mod catalog;
mod handlers;
mod models;
mod repository;
mod service;
