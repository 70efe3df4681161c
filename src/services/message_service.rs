//! Orchestrates send/fetch/mark-read across the cipher, the store and the
//! delivery rooms.

use crate::error::AppError;
use crate::models::message::{Message, MessageView, NewMessage};
use crate::models::user::UserProfile;
use crate::state::AppState;
use crate::websocket::events::{publish_to_user, ChatEvent};
use uuid::Uuid;

/// Substituted for a message body whose blob fails authentication or framing
/// on read. A decrypt failure is isolated per message and never aborts a
/// batch fetch.
pub const DECRYPT_PLACEHOLDER: &str = "[message unavailable]";

pub struct MessageService;

impl MessageService {
    /// Send a message from `sender_id` to `receiver_id`.
    ///
    /// The returned view carries the plaintext (enriched) body - the sender
    /// already possesses it, so no decrypt round trip is paid. Events are
    /// published only after the record is persisted; a store failure leaves
    /// nothing half-sent.
    pub async fn send(
        state: &AppState,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
        listing_id: Option<Uuid>,
    ) -> Result<MessageView, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::BadRequest("message content is required".into()));
        }

        // Optional listing enrichment, baked into the ciphertext. Resolution
        // failure is non-fatal: the raw content is still sent.
        let mut plaintext = content.to_string();
        if let Some(listing_id) = listing_id {
            match state.listings.resolve(listing_id).await {
                Ok(Some(listing)) => plaintext.push_str(&listing.summary_block()),
                Ok(None) => {
                    tracing::debug!(listing_id = %listing_id, "listing not found, skipping enrichment")
                }
                Err(e) => {
                    tracing::warn!(error = %e, listing_id = %listing_id, "listing resolution failed, skipping enrichment")
                }
            }
        }

        let blob = state.cipher.encrypt(&plaintext)?;
        let persisted = state
            .store
            .insert(NewMessage {
                sender_id,
                receiver_id,
                listing_id,
                content: blob,
            })
            .await?;

        tracing::info!(
            message_id = %persisted.id,
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            "message sent"
        );

        let view = persisted.into_view(plaintext);

        // Per-room emission order: message:new precedes the paired
        // conversations:update in the receiver's room.
        publish_to_user(
            state,
            receiver_id,
            &ChatEvent::MessageNew {
                message: view.clone(),
            },
        )
        .await;
        publish_to_user(state, receiver_id, &ChatEvent::ConversationsUpdate {}).await;
        publish_to_user(state, sender_id, &ChatEvent::ConversationsUpdate {}).await;
        publish_to_user(
            state,
            sender_id,
            &ChatEvent::MessageSent {
                message: view.clone(),
            },
        )
        .await;

        Ok(view)
    }

    /// All messages between the two users in either direction, ascending by
    /// creation time, decrypted per message.
    pub async fn fetch_thread(
        state: &AppState,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Vec<MessageView>, AppError> {
        let messages = state.store.find_between(user_a, user_b).await?;
        Ok(Self::decrypt_batch(state, messages))
    }

    /// Messages addressed to `user_id`, most recent first.
    pub async fn fetch_inbox(state: &AppState, user_id: Uuid) -> Result<Vec<MessageView>, AppError> {
        let messages = state.store.find_received(user_id).await?;
        Ok(Self::decrypt_batch(state, messages))
    }

    /// Messages authored by `user_id`, most recent first.
    pub async fn fetch_sent(state: &AppState, user_id: Uuid) -> Result<Vec<MessageView>, AppError> {
        let messages = state.store.find_sent(user_id).await?;
        Ok(Self::decrypt_batch(state, messages))
    }

    /// Bulk-transition every unread message from `counterpart_id` to
    /// `viewer_id` to read. Idempotent: a repeat call modifies zero records
    /// and still succeeds. Returns the modified count.
    pub async fn mark_read(
        state: &AppState,
        viewer_id: Uuid,
        counterpart_id: Uuid,
    ) -> Result<u64, AppError> {
        let modified = state.store.mark_read(counterpart_id, viewer_id).await?;

        // Counterpart's sent-ticks update; viewer's own badge just zeroed.
        publish_to_user(state, counterpart_id, &ChatEvent::MessageRead { from: viewer_id }).await;
        publish_to_user(state, viewer_id, &ChatEvent::ConversationsUpdate {}).await;

        Ok(modified)
    }

    /// Everyone currently online except the viewer, resolved to profile
    /// summaries; deactivated accounts are excluded.
    pub async fn list_online_users(
        state: &AppState,
        viewer_id: Uuid,
    ) -> Result<Vec<UserProfile>, AppError> {
        let mut online = Vec::new();
        for user_id in state.presence.snapshot() {
            if user_id == viewer_id {
                continue;
            }
            if !state.directory.is_inactive(user_id).await? {
                online.push(user_id);
            }
        }
        state.directory.resolve_profiles(&online).await
    }

    pub(crate) fn decrypt_or_placeholder(state: &AppState, message: Message) -> MessageView {
        match state.cipher.decrypt(&message.content) {
            Ok(plaintext) => message.into_view(plaintext),
            Err(e) => {
                tracing::warn!(message_id = %message.id, error = %e, "decrypt failed, substituting placeholder");
                message.into_view(DECRYPT_PLACEHOLDER.to_string())
            }
        }
    }

    fn decrypt_batch(state: &AppState, messages: Vec<Message>) -> Vec<MessageView> {
        messages
            .into_iter()
            .map(|m| Self::decrypt_or_placeholder(state, m))
            .collect()
    }
}
