//! Wire-level push events.
//!
//! Events are small JSON records with a `type` discriminator. The channel
//! guarantees emission order within one room for events published by a
//! single operation; no ordering holds across rooms or event names.

use crate::models::message::MessageView;
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChatEvent {
    /// A message arrived for the room's user.
    #[serde(rename = "message:new")]
    MessageNew { message: MessageView },

    /// Delivery confirmation pushed back to the sender's room.
    #[serde(rename = "message:sent")]
    MessageSent { message: MessageView },

    /// The counterpart read the messages this user sent them.
    #[serde(rename = "message:read")]
    MessageRead { from: Uuid },

    /// The room user's conversation list changed; clients refetch.
    #[serde(rename = "conversations:update")]
    ConversationsUpdate {},

    #[serde(rename = "typing")]
    Typing { from: Uuid },

    #[serde(rename = "stop_typing")]
    StopTyping { from: Uuid },

    #[serde(rename = "presence:update")]
    PresenceUpdate { user_id: Uuid, online: bool },

    /// Full online snapshot, sent once on connection establishment.
    #[serde(rename = "presence:bulk")]
    PresenceBulk { user_ids: Vec<Uuid> },
}

impl ChatEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageNew { .. } => "message:new",
            Self::MessageSent { .. } => "message:sent",
            Self::MessageRead { .. } => "message:read",
            Self::ConversationsUpdate {} => "conversations:update",
            Self::Typing { .. } => "typing",
            Self::StopTyping { .. } => "stop_typing",
            Self::PresenceUpdate { .. } => "presence:update",
            Self::PresenceBulk { .. } => "presence:bulk",
        }
    }

    pub fn to_payload(&self) -> String {
        // Variants carry only JSON-safe fields, so serialization cannot fail.
        serde_json::to_string(self).expect("event serialization")
    }
}

/// Deliver an event to one user's room, locally and (when configured)
/// through the Redis bridge so sibling instances can fan out too.
pub async fn publish_to_user(state: &AppState, user_id: Uuid, event: &ChatEvent) {
    let payload = event.to_payload();
    state.registry.send_to_user(user_id, payload.clone()).await;

    if let Some(redis) = &state.redis {
        if let Err(e) = super::pubsub::publish(redis, user_id, &payload).await {
            tracing::warn!(error = %e, user_id = %user_id, "redis publish failed");
        }
    }
}

/// Deliver a presence transition to every room.
pub async fn publish_to_all(state: &AppState, event: &ChatEvent) {
    let payload = event.to_payload();
    state.registry.send_to_all(payload.clone()).await;

    if let Some(redis) = &state.redis {
        if let Err(e) = super::pubsub::publish_broadcast(redis, &payload).await {
            tracing::warn!(error = %e, "redis broadcast publish failed");
        }
    }
}
