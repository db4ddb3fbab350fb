//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the application state.
//! Each websocket subscriber holds its own [`Subscription`].

use chrono::{DateTime, Utc};
use hermas_core::entry::EntryType;
use hermas_core::types::DbId;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

// ---------------------------------------------------------------------------
// EntryEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryEventKind {
    #[serde(rename = "entry.created")]
    Created,
    #[serde(rename = "entry.updated")]
    Updated,
    #[serde(rename = "entry.deleted")]
    Deleted,
}

impl EntryEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryEventKind::Created => "entry.created",
            EntryEventKind::Updated => "entry.updated",
            EntryEventKind::Deleted => "entry.deleted",
        }
    }
}

/// A change to a stock entry.
///
/// Created/updated events carry the serialized entry as `payload`;
/// deleted events carry only `{id, type}`.
#[derive(Debug, Clone, Serialize)]
pub struct EntryEvent {
    pub kind: EntryEventKind,
    pub entry_id: DbId,
    pub entry_type: EntryType,
    /// User whose action produced the event.
    pub actor_user_id: DbId,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl EntryEvent {
    pub fn created(entry_id: DbId, entry_type: EntryType, actor: DbId, payload: serde_json::Value) -> Self {
        Self::with_kind(EntryEventKind::Created, entry_id, entry_type, actor, payload)
    }

    pub fn updated(entry_id: DbId, entry_type: EntryType, actor: DbId, payload: serde_json::Value) -> Self {
        Self::with_kind(EntryEventKind::Updated, entry_id, entry_type, actor, payload)
    }

    pub fn deleted(entry_id: DbId, entry_type: EntryType, actor: DbId) -> Self {
        let payload = serde_json::json!({ "id": entry_id, "type": entry_type });
        Self::with_kind(EntryEventKind::Deleted, entry_id, entry_type, actor, payload)
    }

    fn with_kind(
        kind: EntryEventKind,
        entry_id: DbId,
        entry_type: EntryType,
        actor_user_id: DbId,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            entry_id,
            entry_type,
            actor_user_id,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// The message sent to websocket clients: `{"type": ..., "payload": ...}`.
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind.as_str(),
            "payload": self.payload,
        })
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default per-subscriber buffer.
pub const DEFAULT_CAPACITY: usize = 128;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<EntryEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When a subscriber's buffer is full the oldest unread events are
    /// dropped for that subscriber only.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: EntryEvent) {
        tracing::debug!(
            event_type = event.kind.as_str(),
            entry_id = event.entry_id,
            subscribers = self.sender.receiver_count(),
            "Publishing entry event"
        );
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// One subscriber's view of the bus.
pub struct Subscription {
    receiver: broadcast::Receiver<EntryEvent>,
}

impl Subscription {
    /// Wait for the next event. Returns `None` once the bus is dropped.
    ///
    /// A lagging subscriber skips the events it missed and carries on with
    /// the oldest event still buffered.
    pub async fn next(&mut self) -> Option<EntryEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Entry event subscriber lagged; dropped oldest events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe();

        bus.publish(EntryEvent::created(
            42,
            EntryType::Raw,
            7,
            serde_json::json!({"id": 42, "qty": 1.5}),
        ));

        let received = sub.next().await.expect("should receive the event");
        assert_eq!(received.kind, EntryEventKind::Created);
        assert_eq!(received.entry_id, 42);
        assert_eq!(received.actor_user_id, 7);

        let wire = received.to_wire();
        assert_eq!(wire["type"], "entry.created");
        assert_eq!(wire["payload"]["qty"], 1.5);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(EntryEvent::deleted(9, EntryType::Fg, 1));

        assert_eq!(a.next().await.unwrap().entry_id, 9);
        assert_eq!(b.next().await.unwrap().entry_id, 9);
    }

    #[test]
    fn deleted_payload_has_id_and_type() {
        let event = EntryEvent::deleted(5, EntryType::Sfg, 1);
        assert_eq!(event.to_wire(), serde_json::json!({
            "type": "entry.deleted",
            "payload": {"id": 5, "type": "sfg"}
        }));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(EntryEvent::deleted(1, EntryType::Raw, 1));
    }

    #[tokio::test]
    async fn lagging_subscriber_drops_oldest_events() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for id in 1..=4 {
            bus.publish(EntryEvent::deleted(id, EntryType::Raw, 1));
        }

        assert_eq!(sub.next().await.unwrap().entry_id, 3);
        assert_eq!(sub.next().await.unwrap().entry_id, 4);
    }

    #[tokio::test]
    async fn subscription_ends_when_bus_is_dropped() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe();
        drop(bus);
        assert!(sub.next().await.is_none());
    }
}
