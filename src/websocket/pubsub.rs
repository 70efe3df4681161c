//! Redis pub/sub bridge for multi-instance deployments.
//!
//! Each event published to a user's room is mirrored onto a Redis channel;
//! a pattern-subscribe listener rebroadcasts payloads from *other* instances
//! into the local room registry. Payloads carry the publishing instance id
//! so an instance never re-delivers its own traffic.

use crate::websocket::RoomRegistry;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use redis::AsyncCommands;
use redis::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static INSTANCE_ID: Lazy<Uuid> = Lazy::new(Uuid::new_v4);

const BROADCAST_CHANNEL: &str = "chat:all";

fn channel_for_user(id: Uuid) -> String {
    format!("chat:user:{}", id)
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    origin: Uuid,
    payload: String,
}

async fn publish_raw(client: &Client, channel: String, payload: &str) -> redis::RedisResult<()> {
    let envelope = serde_json::to_string(&Envelope {
        origin: *INSTANCE_ID,
        payload: payload.to_string(),
    })
    .expect("envelope serialization");
    let mut conn = client.get_multiplexed_async_connection().await?;
    conn.publish::<_, _, ()>(channel, envelope).await
}

pub async fn publish(client: &Client, user_id: Uuid, payload: &str) -> redis::RedisResult<()> {
    publish_raw(client, channel_for_user(user_id), payload).await
}

pub async fn publish_broadcast(client: &Client, payload: &str) -> redis::RedisResult<()> {
    publish_raw(client, BROADCAST_CHANNEL.to_string(), payload).await
}

pub async fn start_psub_listener(client: Client, registry: RoomRegistry) -> redis::RedisResult<()> {
    // PubSub requires a dedicated connection, not multiplexed
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.psubscribe("chat:*").await?;
    let mut stream = pubsub.on_message();

    while let Some(msg) = stream.next().await {
        let channel: String = msg.get_channel_name().into();
        let raw: String = msg.get_payload()?;
        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, %channel, "malformed pubsub envelope");
                continue;
            }
        };
        if envelope.origin == *INSTANCE_ID {
            continue;
        }

        if channel == BROADCAST_CHANNEL {
            registry.send_to_all(envelope.payload).await;
        } else if let Some(id_part) = channel.strip_prefix("chat:user:") {
            if let Ok(user_id) = Uuid::parse_str(id_part) {
                registry.send_to_user(user_id, envelope.payload).await;
            }
        }
    }
    Ok(())
}
