//! Broadcast event channel towards host-application listeners.
//!
//! Every emitted event is fanned out to all live subscribers. Emitting with
//! nobody listening drops the event, matching the fire-and-forget contract of
//! [`EventSink`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::ports::EventSink;

/// Default number of events buffered per subscriber before it starts lagging
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// A named event with its JSON payload
#[derive(Debug, Clone, Serialize)]
pub struct HostEvent {
    pub name: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Event bus for publishing events to any number of listeners
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HostEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_BUFFER)
    }

    /// `capacity` must be non-zero
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events by name; an empty filter receives everything
    pub fn subscribe(&self, names: Vec<String>) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
            names,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn emit(&self, name: &str, payload: serde_json::Value) {
        debug!(event = name, "Emitting event");
        let event = HostEvent {
            name: name.to_string(),
            payload,
            timestamp: Utc::now(),
        };
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }
}

/// Receiving half of an [`EventBus`] subscription
pub struct EventSubscriber {
    receiver: broadcast::Receiver<HostEvent>,
    names: Vec<String>,
}

impl EventSubscriber {
    /// Next matching event, or `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<HostEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!("Event subscriber lagged by {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn matches(&self, event: &HostEvent) -> bool {
        self.names.is_empty() || self.names.iter().any(|n| n == &event.name)
    }
}
