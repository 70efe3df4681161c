use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod events;
pub mod message_types;
pub mod pubsub;

/// Unique identifier for a room subscriber.
///
/// Each live connection gets one when it joins its user's room, allowing
/// precise cleanup when the connection closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

struct Subscriber {
    id: SubscriberId,
    sender: UnboundedSender<String>,
}

/// Per-user broadcast rooms.
///
/// A room exists implicitly for every connected user id; every live
/// connection for that user is a member. Within one room, messages are
/// delivered in emission order.
#[derive(Default, Clone)]
pub struct RoomRegistry {
    // user_id -> subscribers (one per live connection)
    inner: Arc<RwLock<HashMap<Uuid, Vec<Subscriber>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the room for `user_id`. Returns the subscriber id (used for
    /// cleanup) and the receiving end of the connection's event channel.
    pub async fn join(&self, user_id: Uuid) -> (SubscriberId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let subscriber_id = SubscriberId::new();

        let mut guard = self.inner.write().await;
        guard.entry(user_id).or_default().push(Subscriber {
            id: subscriber_id,
            sender: tx,
        });

        tracing::debug!(
            user_id = %user_id,
            subscribers = guard.get(&user_id).map(|v| v.len()).unwrap_or(0),
            "subscriber joined room"
        );

        (subscriber_id, rx)
    }

    /// Leave a room. Must be called when a connection closes to avoid
    /// leaking senders; empty rooms are dropped.
    pub async fn leave(&self, user_id: Uuid, subscriber_id: SubscriberId) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(&user_id) {
            subscribers.retain(|s| s.id != subscriber_id);
            if subscribers.is_empty() {
                guard.remove(&user_id);
            }
        }
    }

    /// Deliver a payload to every live connection of one user, pruning dead
    /// senders as it goes.
    pub async fn send_to_user(&self, user_id: Uuid, payload: String) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(&user_id) {
            subscribers.retain(|s| s.sender.send(payload.clone()).is_ok());
            if subscribers.is_empty() {
                guard.remove(&user_id);
            }
        }
    }

    /// Deliver a payload to every room (presence transitions).
    pub async fn send_to_all(&self, payload: String) {
        let mut guard = self.inner.write().await;
        guard.retain(|_, subscribers| {
            subscribers.retain(|s| s.sender.send(payload.clone()).is_ok());
            !subscribers.is_empty()
        });
    }

    pub async fn subscriber_count(&self, user_id: Uuid) -> usize {
        let guard = self.inner.read().await;
        guard.get(&user_id).map(|v| v.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_connection_of_a_user() {
        let registry = RoomRegistry::new();
        let user = Uuid::new_v4();
        let (_ida, mut rxa) = registry.join(user).await;
        let (_idb, mut rxb) = registry.join(user).await;

        registry.send_to_user(user, "hello".into()).await;

        assert_eq!(rxa.recv().await.unwrap(), "hello");
        assert_eq!(rxb.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn room_order_matches_emission_order() {
        let registry = RoomRegistry::new();
        let user = Uuid::new_v4();
        let (_id, mut rx) = registry.join(user).await;

        registry.send_to_user(user, "first".into()).await;
        registry.send_to_user(user, "second".into()).await;

        assert_eq!(rx.recv().await.unwrap(), "first");
        assert_eq!(rx.recv().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn leave_removes_only_that_subscriber() {
        let registry = RoomRegistry::new();
        let user = Uuid::new_v4();
        let (ida, _rxa) = registry.join(user).await;
        let (_idb, _rxb) = registry.join(user).await;

        registry.leave(user, ida).await;
        assert_eq!(registry.subscriber_count(user).await, 1);
    }
}
