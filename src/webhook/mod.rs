mod events;

pub use events::*;

use serde_json::Value;
use tokio::sync::broadcast;

/// Capacity of the in-process event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// In-process bus that republishes adapter events to subscribers
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event, returning how many subscribers received it
    pub fn trigger_event(&self, event_type: PlatformEventType, data: Value) -> usize {
        let event = PlatformEvent::new(event_type, data);
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!("[googlemeet] {} delivered to {} subscribers", event_type, receivers);
                receivers
            }
            Err(_) => {
                tracing::debug!("[googlemeet] {} published with no subscribers", event_type);
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
