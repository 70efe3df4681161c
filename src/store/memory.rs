//! In-memory store used by tests and local single-process runs.

use crate::error::AppError;
use crate::models::message::{Message, NewMessage};
use crate::store::MessageStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default, Clone)]
pub struct InMemoryMessageStore {
    inner: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert(&self, message: NewMessage) -> Result<Message, AppError> {
        let mut guard = self.inner.write().await;
        // Strictly monotonic timestamps keep createdAt a total order even
        // for back-to-back inserts within clock resolution.
        let mut created_at = Utc::now();
        if let Some(last) = guard.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + chrono::Duration::microseconds(1);
            }
        }
        let record = Message {
            id: Uuid::new_v4(),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            listing_id: message.listing_id,
            content: message.content,
            is_encrypted: true,
            read: false,
            created_at,
        };
        guard.push(record.clone());
        Ok(record)
    }

    async fn find_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Vec<Message>, AppError> {
        let guard = self.inner.read().await;
        let mut out: Vec<Message> = guard
            .iter()
            .filter(|m| {
                (m.sender_id == user_a && m.receiver_id == user_b)
                    || (m.sender_id == user_b && m.receiver_id == user_a)
            })
            .cloned()
            .collect();
        out.sort_by_key(|m| m.created_at);
        Ok(out)
    }

    async fn find_received(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let guard = self.inner.read().await;
        let mut out: Vec<Message> = guard
            .iter()
            .filter(|m| m.receiver_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_sent(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let guard = self.inner.read().await;
        let mut out: Vec<Message> = guard
            .iter()
            .filter(|m| m.sender_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_touching(&self, user_id: Uuid, limit: i64) -> Result<Vec<Message>, AppError> {
        let guard = self.inner.read().await;
        let mut out: Vec<Message> = guard
            .iter()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(limit.max(0) as usize);
        Ok(out)
    }

    async fn mark_read(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<u64, AppError> {
        let mut guard = self.inner.write().await;
        let mut modified = 0u64;
        for m in guard.iter_mut() {
            if m.sender_id == sender_id && m.receiver_id == receiver_id && !m.read {
                m.read = true;
                modified += 1;
            }
        }
        Ok(modified)
    }
}
