//! Derived conversation summaries.
//!
//! Summaries are recomputed on every request from a bounded window of the
//! viewer's most recent messages rather than maintained as a materialized
//! view. Known limitation: a viewer whose recent window is saturated by a
//! few busy counterparts can lose an older counterpart from the list
//! entirely; that staleness is accepted by design.

use crate::error::AppError;
use crate::models::conversation::ConversationSummary;
use crate::models::message::Message;
use crate::services::message_service::MessageService;
use crate::state::AppState;
use std::collections::HashMap;
use uuid::Uuid;

/// Aggregation window: only this many of the viewer's most recent messages
/// (sent or received, all counterparts pooled) feed the summary.
pub const CONVERSATION_WINDOW: i64 = 200;

pub struct ConversationService;

impl ConversationService {
    /// One summary per counterpart seen in the window, ordered by recency of
    /// the last message. Unread counts only messages addressed to the viewer.
    pub async fn list_conversations(
        state: &AppState,
        user_id: Uuid,
    ) -> Result<Vec<ConversationSummary>, AppError> {
        let window = state
            .store
            .find_touching(user_id, CONVERSATION_WINDOW)
            .await?;

        // Window arrives most recent first, so the first message seen per
        // counterpart is their last message.
        let mut order: Vec<Uuid> = Vec::new();
        let mut last_message: HashMap<Uuid, Message> = HashMap::new();
        let mut unread: HashMap<Uuid, i64> = HashMap::new();

        for message in window {
            let counterpart = if message.sender_id == user_id {
                message.receiver_id
            } else {
                message.sender_id
            };

            if !last_message.contains_key(&counterpart) {
                order.push(counterpart);
                last_message.insert(counterpart, message.clone());
            }
            if message.receiver_id == user_id && !message.read {
                *unread.entry(counterpart).or_insert(0) += 1;
            }
        }

        let summaries = order
            .into_iter()
            .map(|counterpart| {
                let message = last_message
                    .remove(&counterpart)
                    .expect("counterpart recorded with a last message");
                ConversationSummary {
                    counterpart_id: counterpart,
                    last_message: MessageService::decrypt_or_placeholder(state, message),
                    unread_count: unread.get(&counterpart).copied().unwrap_or(0),
                }
            })
            .collect();

        Ok(summaries)
    }
}
