use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound WebSocket events from client to server.
///
/// Typing indicators are ephemeral: nothing is persisted and the receiving
/// client owns the inactivity timeout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "typing")]
    Typing { to: Uuid },

    #[serde(rename = "stop_typing")]
    StopTyping { to: Uuid },
}
