use tokio::sync::broadcast;

use crate::models::notification::Notification;

pub const HUB_CAPACITY: usize = 64;

/// Fan-out of freshly created notifications to every open SSE stream.
#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns how many live streams received the notification.
    pub fn publish(&self, notification: Notification) -> usize {
        // send only fails when nobody is listening
        self.tx.send(notification).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(HUB_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::NotificationKind;
    use chrono::Utc;

    fn sample() -> Notification {
        Notification {
            id: "n-1".to_string(),
            kind: NotificationKind::Info,
            title: "Document uploaded".to_string(),
            message: None,
            timestamp: Utc::now(),
            read: false,
            user_id: None,
            metadata: None,
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let hub = NotificationHub::default();
        assert_eq!(hub.publish(sample()), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_published() {
        let hub = NotificationHub::default();
        let mut rx = hub.subscribe();
        assert_eq!(hub.publish(sample()), 1);
        let got = rx.recv().await.unwrap();
        assert_eq!(got.id, "n-1");
    }
}
