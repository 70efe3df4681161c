//! Postgres-backed message store.

use crate::error::AppError;
use crate::models::message::{Message, NewMessage};
use crate::store::MessageStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgMessageStore {
    db: Pool<Postgres>,
}

impl PgMessageStore {
    pub fn new(db: Pool<Postgres>) -> Self {
        Self { db }
    }

    fn row_to_message(row: &sqlx::postgres::PgRow) -> Message {
        let created_at: DateTime<Utc> = row.get("created_at");
        Message {
            id: row.get("id"),
            sender_id: row.get("sender_id"),
            receiver_id: row.get("receiver_id"),
            listing_id: row.try_get("listing_id").ok(),
            content: row.get("content"),
            is_encrypted: row.get("is_encrypted"),
            read: row.get("read"),
            created_at,
        }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn insert(&self, message: NewMessage) -> Result<Message, AppError> {
        let id = Uuid::new_v4();
        let row = sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, receiver_id, listing_id, content, is_encrypted, read)
            VALUES ($1, $2, $3, $4, $5, TRUE, FALSE)
            RETURNING id, sender_id, receiver_id, listing_id, content, is_encrypted, read, created_at
            "#,
        )
        .bind(id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(message.listing_id)
        .bind(&message.content)
        .fetch_one(&self.db)
        .await?;

        Ok(Self::row_to_message(&row))
    }

    async fn find_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender_id, receiver_id, listing_id, content, is_encrypted, read, created_at
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(Self::row_to_message).collect())
    }

    async fn find_received(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender_id, receiver_id, listing_id, content, is_encrypted, read, created_at
            FROM messages
            WHERE receiver_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(Self::row_to_message).collect())
    }

    async fn find_sent(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender_id, receiver_id, listing_id, content, is_encrypted, read, created_at
            FROM messages
            WHERE sender_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(Self::row_to_message).collect())
    }

    async fn find_touching(&self, user_id: Uuid, limit: i64) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender_id, receiver_id, listing_id, content, is_encrypted, read, created_at
            FROM messages
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(Self::row_to_message).collect())
    }

    async fn mark_read(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE messages SET read = TRUE WHERE sender_id = $1 AND receiver_id = $2 AND read = FALSE",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
