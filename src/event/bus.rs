use tokio::sync::broadcast;
use tracing::debug;

use super::events::MatchEvent;

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out channel from the commit path to post-commit subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MatchEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Publishes an event and returns how many receivers saw it.
    ///
    /// Never fails: with no subscribers the event is simply dropped.
    pub fn emit(&self, event: MatchEvent) -> usize {
        let event_type = event.event_type();
        let match_id = event.match_id().to_string();

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(event_type, match_id = %match_id, receivers, "Event emitted");
                receivers
            }
            Err(_) => {
                debug!(event_type, match_id = %match_id, "Event emitted with no receivers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
