use crate::models::message::MessageView;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived per-counterpart summary. Rebuilt on every request from a bounded
/// window of recent messages; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub counterpart_id: Uuid,
    pub last_message: MessageView,
    pub unread_count: i64,
}
