// Post-commit event plumbing.
//
// The match commit publishes `MatchCommitted`; badge, hall and roast writers
// subscribe through the dispatcher, each isolated in its own task.

// Public API - what other modules can use
pub use bus::EventBus;
pub use dispatcher::EventDispatcher;
pub use events::MatchEvent;
pub use handler::{EventError, EventHandler};

// Internal modules
mod bus;
mod dispatcher;
mod events;
mod handler;
