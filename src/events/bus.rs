//! Event bus for broadcasting desk events to UI listeners

use super::{DeskEvent, EventEmitter};
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity
const DEFAULT_CAPACITY: usize = 256;

/// Event bus that distributes DeskEvents via `tokio::sync::broadcast`
///
/// Emitting never blocks. If nobody is subscribed, events are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DeskEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventEmitter for EventBus {
    fn emit(&self, event: DeskEvent) {
        let action = event.action;
        let change = event.change;
        if let Ok(n) = self.sender.send(event) {
            debug!(?action, ?change, subscribers = n, "DeskEvent emitted");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
