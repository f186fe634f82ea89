//! Live notification feed served over SSE.
//!
//! Every stream opens with a connection event, then replays a scripted demo
//! sequence on a fixed interval. When the script runs out one event from a
//! secondary pool is sent and the script starts over. Notifications created
//! through the API are merged in as they are published on the hub.

use std::time::Duration;

use axum::response::sse::Event;
use futures::stream::{self, Stream, StreamExt};
use rand::Rng;
use serde::Serialize;
use tokio::time::{interval_at, Instant};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::models::notification::{Notification, NotificationKind};
use crate::notifications::hub::NotificationHub;

/// Payload of one SSE `data:` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEvent {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Display time in milliseconds; `0` keeps the toast until dismissed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl FeedEvent {
    fn new(kind: NotificationKind, title: &str, message: &str, duration: Option<u64>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.to_string(),
            duration,
        }
    }

    pub fn connected() -> Self {
        Self::new(
            NotificationKind::Info,
            "Connection established",
            "You will receive notifications in real time",
            Some(3000),
        )
    }
}

impl From<&Notification> for FeedEvent {
    fn from(n: &Notification) -> Self {
        Self {
            kind: n.kind,
            title: n.title.clone(),
            message: n.message.clone().unwrap_or_default(),
            duration: Some(5000),
        }
    }
}

fn script() -> Vec<FeedEvent> {
    use NotificationKind::*;
    vec![
        FeedEvent::new(
            Success,
            "Deal updated",
            "Healthcare Partnership moved to the \"Proposal\" stage",
            Some(6000),
        ),
        FeedEvent::new(
            Warning,
            "Review required",
            "AI found inconsistencies in the financial documents",
            Some(0),
        ),
        FeedEvent::new(
            Info,
            "New document",
            "updated_contract_v2.pdf uploaded for TechCorp Acquisition",
            Some(5000),
        ),
        FeedEvent::new(
            Success,
            "Analysis complete",
            "AI market trend analysis is ready to view",
            None,
        ),
        FeedEvent::new(
            Error,
            "Validation failed",
            "Could not verify the signatures in legal_agreement.pdf",
            Some(0),
        ),
    ]
}

fn extra_event(rng: &mut impl Rng) -> FeedEvent {
    match rng.random_range(0..3) {
        0 => {
            let who = if rng.random_bool(0.5) {
                "Sarah Johnson"
            } else {
                "Michael Chen"
            };
            FeedEvent {
                kind: NotificationKind::Info,
                title: "User activity".to_string(),
                message: format!("{who} is reviewing documents"),
                duration: Some(4000),
            }
        }
        1 => FeedEvent::new(
            NotificationKind::Success,
            "New insight",
            "AI identified new process optimisation opportunities",
            Some(5000),
        ),
        _ => FeedEvent::new(
            NotificationKind::Warning,
            "Deadline approaching",
            "3 days left to complete due diligence",
            Some(0),
        ),
    }
}

/// Cursor over the scripted sequence.
pub struct DemoFeed {
    script: Vec<FeedEvent>,
    cursor: usize,
}

impl Default for DemoFeed {
    fn default() -> Self {
        Self {
            script: script(),
            cursor: 0,
        }
    }
}

impl DemoFeed {
    pub fn next_event(&mut self, rng: &mut impl Rng) -> FeedEvent {
        if let Some(event) = self.script.get(self.cursor) {
            self.cursor += 1;
            return event.clone();
        }
        self.cursor = 0;
        extra_event(rng)
    }
}

fn scripted(period: Duration) -> impl Stream<Item = FeedEvent> {
    let ticker = interval_at(Instant::now() + period, period);
    stream::unfold((ticker, DemoFeed::default()), |(mut ticker, mut feed)| async move {
        ticker.tick().await;
        let event = feed.next_event(&mut rand::rng());
        Some((event, (ticker, feed)))
    })
}

fn live(hub: NotificationHub) -> impl Stream<Item = FeedEvent> {
    BroadcastStream::new(hub.subscribe()).filter_map(|received| async move {
        match received {
            Ok(notification) => Some(FeedEvent::from(&notification)),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::debug!("SSE subscriber lagged, skipped {skipped} notifications");
                None
            }
        }
    })
}

/// Full event stream for one SSE connection.
pub fn event_stream(
    hub: NotificationHub,
    period: Duration,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::once(async { FeedEvent::connected() })
        .chain(stream::select(scripted(period), live(hub)))
        .map(|event| Event::default().json_data(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_script_wraps_after_extra_event() {
        let mut feed = DemoFeed::default();
        let mut rng = rand::rng();
        let first = feed.next_event(&mut rng);
        assert_eq!(first.title, "Deal updated");
        for _ in 0..4 {
            feed.next_event(&mut rng);
        }
        let extra = feed.next_event(&mut rng);
        assert!(["User activity", "New insight", "Deadline approaching"]
            .contains(&extra.title.as_str()));
        assert_eq!(feed.next_event(&mut rng).title, "Deal updated");
    }

    #[test]
    fn test_feed_event_omits_missing_duration() {
        let event = FeedEvent::new(NotificationKind::Success, "t", "m", None);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "success");
        assert!(json.get("duration").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_opens_with_connection_then_script() {
        let hub = NotificationHub::default();
        let mut events = Box::pin(
            stream::once(async { FeedEvent::connected() })
                .chain(stream::select(scripted(Duration::from_secs(12)), live(hub.clone()))),
        );
        assert_eq!(events.next().await.unwrap().title, "Connection established");
        assert_eq!(events.next().await.unwrap().title, "Deal updated");
    }

    #[tokio::test]
    async fn test_live_notifications_are_forwarded() {
        let hub = NotificationHub::default();
        let mut events = Box::pin(live(hub.clone()));
        hub.publish(Notification {
            id: "x".to_string(),
            kind: NotificationKind::Warning,
            title: "Deal at risk".to_string(),
            message: Some("Counterparty paused talks".to_string()),
            timestamp: Utc::now(),
            read: false,
            user_id: None,
            metadata: None,
        });
        let event = events.next().await.unwrap();
        assert_eq!(event.kind, NotificationKind::Warning);
        assert_eq!(event.message, "Counterparty paused talks");
    }
}
