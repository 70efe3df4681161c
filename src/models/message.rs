use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted message record. `content` holds the hex-framed ciphertext
/// blob; it is never stored as plaintext. `read` only ever transitions
/// false -> true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub content: String,
    pub is_encrypted: bool,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub listing_id: Option<Uuid>,
    /// Ciphertext blob, already framed and hex-encoded.
    pub content: String,
}

/// Decrypted view of a message as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub content: String,
    pub read: bool,
    pub created_at: String,
}

impl Message {
    /// Pair the stored record with an already-decrypted body.
    pub fn into_view(self, plaintext: String) -> MessageView {
        MessageView {
            id: self.id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            listing_id: self.listing_id,
            content: plaintext,
            read: self.read,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
