use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::SiteEvent;

/// In-process event bus backed by `tokio::broadcast`.
/// Single-node; editors on other nodes only see changes through polling.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<SiteEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers.
    /// Returns how many subscribers received it; zero when nobody listens.
    pub fn publish(&self, event: SiteEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(kind = event.kind(), "event dropped, no subscribers");
                0
            }
        }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SiteEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
