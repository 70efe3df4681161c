//! Narrow persistence boundary for message records.
//!
//! The durable engine is an external collaborator; this core only needs
//! create, a handful of predicate reads, and one bulk update. Messages are
//! immutable after insert except for the monotonic `read` flip.

use crate::error::AppError;
use crate::models::message::{Message, NewMessage};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryMessageStore;
pub use postgres::PgMessageStore;

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message; the store assigns id and creation time.
    async fn insert(&self, message: NewMessage) -> Result<Message, AppError>;

    /// Every message between the two users, either direction, ascending by
    /// creation time.
    async fn find_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Vec<Message>, AppError>;

    /// Messages addressed to `user_id`, most recent first.
    async fn find_received(&self, user_id: Uuid) -> Result<Vec<Message>, AppError>;

    /// Messages authored by `user_id`, most recent first.
    async fn find_sent(&self, user_id: Uuid) -> Result<Vec<Message>, AppError>;

    /// The most recent messages sent or received by `user_id`, capped at
    /// `limit`, most recent first. Backing query for conversation summaries.
    async fn find_touching(&self, user_id: Uuid, limit: i64) -> Result<Vec<Message>, AppError>;

    /// Flip every unread message from `sender_id` to `receiver_id` to read.
    /// Returns the number of records modified; zero on a repeat call.
    async fn mark_read(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<u64, AppError>;
}
