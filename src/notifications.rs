//! # Lifecycle Notifications
//!
//! Fire-and-forget broadcast of registration lifecycle events (confirmation,
//! cancellation). Delivery is best-effort by design: a notification failure
//! must never roll back the state transition that produced it.

use serde_json::Value;
use tokio::sync::broadcast;

/// Broadcast publisher for registration lifecycle notifications.
#[derive(Debug, Clone)]
pub struct NotificationPublisher {
    sender: broadcast::Sender<Notification>,
}

/// A published lifecycle notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub name: String,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

/// Notification names fired by the lifecycle.
pub mod names {
    pub const REGISTRATION_CONFIRMED: &str = "registration.confirmed";
    pub const REGISTRATION_CANCELLED: &str = "registration.cancelled";
}

impl NotificationPublisher {
    /// Create a new publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notification. Zero subscribers is success: the engine
    /// publishes whether or not a delivery worker is listening.
    pub fn publish(&self, name: impl Into<String>, context: Value) {
        let notification = Notification {
            name: name.into(),
            context,
            published_at: chrono::Utc::now(),
        };

        if self.sender.send(notification).is_err() {
            tracing::debug!("No notification subscribers; dropping");
        }
    }

    /// Subscribe to lifecycle notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let publisher = NotificationPublisher::new(16);
        let mut receiver = publisher.subscribe();

        publisher.publish(
            names::REGISTRATION_CONFIRMED,
            json!({ "registration_id": 9 }),
        );

        let notification = receiver.recv().await.unwrap();
        assert_eq!(notification.name, "registration.confirmed");
        assert_eq!(notification.context["registration_id"], 9);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let publisher = NotificationPublisher::new(16);
        publisher.publish(names::REGISTRATION_CANCELLED, json!({}));
        assert_eq!(publisher.subscriber_count(), 0);
    }
}
