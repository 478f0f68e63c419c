//! # Event Bus
//!
//! In-process publish/subscribe for the lifecycle announcements named in
//! [`crate::constants::events`]: workflow start/completion/failure, task
//! creation/completion, and service startup/health transitions.
//!
//! Announcements are best-effort fan-out. Nothing in the core waits on a
//! subscriber, and publishing with no subscribers is not an error; the
//! listener registry lives inside the broadcast channel, and subscribing
//! is the only runtime mutation the bus permits.

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

use crate::config::CoreConfig;
use crate::constants::defaults;

/// One lifecycle announcement fanned out to subscribers
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    /// Canonical name from [`crate::constants::events`]
    pub name: String,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl PublishedEvent {
    /// Whether this announcement carries the given lifecycle name
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Broadcast channel carrying [`PublishedEvent`]s. Clones share the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PublishedEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Bus sized from the engine configuration
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.event_bus_capacity)
    }

    /// Announce a lifecycle event, stamping it with the publish time.
    /// Returns the number of subscribers the announcement reached; zero
    /// when no one is listening yet.
    pub fn publish(&self, name: impl Into<String>, context: Value) -> usize {
        let event = PublishedEvent {
            name: name.into(),
            context,
            published_at: chrono::Utc::now(),
        };
        trace!(event = %event.name, "Publishing lifecycle event");
        // send only errs when there are no receivers, which is fine here
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to every announcement published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(defaults::EVENT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_without_subscribers_reaches_no_one() {
        let bus = EventBus::new(16);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish("workflow.completed", json!({"subject": "1"})), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        assert_eq!(bus.publish("task.completed", json!({"task_id": "abc"})), 1);

        let event = rx.recv().await.unwrap();
        assert!(event.is("task.completed"));
        assert!(!event.is("task.created"));
        assert_eq!(event.context["task_id"], "abc");
    }

    #[test]
    fn test_bus_built_from_config() {
        let bus = EventBus::from_config(&CoreConfig::default());
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish("services.initialized", json!({"service_count": 0}));
    }
}
