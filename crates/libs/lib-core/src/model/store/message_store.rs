//! # Message Store
//!
//! Durable record of direct messages between two users, with a per-message
//! `seen` flag flipped in bulk by read receipts.
//!
//! Every returned [`ChatMessage`] carries both parties resolved to a
//! [`UserProjection`](crate::dto::UserProjection), so callers can forward it
//! over the socket without a second lookup.
//!
//! Ordering is by `created_at`, assigned here at persistence time, with the row
//! id breaking ties between messages stored within the same instant.

use std::collections::HashMap;

use lib_utils::{is_blank, now_utc};
use sqlx::query_as;
use tracing::debug;

use super::models::MessageRow;
use super::user_repository::UserRepository;
use super::{DbPool, UserId};
use crate::config::DEFAULT_MAX_MESSAGE_LENGTH;
use crate::dto::{ChatMessage, ChatPartnerSummary};
use crate::error::{AppError, Result};

const MESSAGE_SELECT: &str = r#"
    SELECT m.id, m.content, m.image, m.created_at, m.seen,
           s.id AS sender_id, s.username AS sender_username, s.avatar AS sender_avatar,
           r.id AS receiver_id, r.username AS receiver_username, r.avatar AS receiver_avatar
    FROM chat_messages m
    JOIN users s ON s.id = m.sender_id
    JOIN users r ON r.id = m.receiver_id
"#;

/// Chat message persistence over the shared pool.
#[derive(Clone, Debug)]
pub struct MessageStore {
    pool: DbPool,
    max_content_length: usize,
}

impl MessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self::with_max_content_length(pool, DEFAULT_MAX_MESSAGE_LENGTH)
    }

    pub fn with_max_content_length(pool: DbPool, max_content_length: usize) -> Self {
        Self { pool, max_content_length }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Persist a new message from `sender` to `receiver`.
    ///
    /// # Errors
    ///
    /// - `Validation` when both content and image are empty or whitespace, or the
    ///   content exceeds the configured length cap
    /// - `NotFound` when `receiver` does not resolve to a user
    /// - `Persistence` when the insert fails
    ///
    /// Nothing is written when an error is returned.
    pub async fn persist(
        &self,
        sender: UserId,
        receiver: UserId,
        content: Option<&str>,
        image: Option<&str>,
    ) -> Result<ChatMessage> {
        let content = content.unwrap_or_default();
        let image = image.map(str::trim).unwrap_or_default();

        if is_blank(content) && image.is_empty() {
            return Err(AppError::Validation("Message content or image is required".to_string()));
        }

        if content.chars().count() > self.max_content_length {
            return Err(AppError::Validation(format!(
                "Message content must be at most {} characters",
                self.max_content_length
            )));
        }

        if UserRepository::find_by_id(&self.pool, receiver).await?.is_none() {
            return Err(AppError::NotFound("Receiver not found".to_string()));
        }

        let result = sqlx::query(
            "INSERT INTO chat_messages (sender_id, receiver_id, content, image, created_at, seen)
             VALUES (?, ?, ?, ?, ?, 0)"
        )
        .bind(sender)
        .bind(receiver)
        .bind(content)
        .bind(image)
        .bind(now_utc())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(message_id = id, sender, receiver, "Chat message persisted");

        self.find_by_id(id).await
    }

    /// Fetch one message with both parties resolved.
    pub async fn find_by_id(&self, id: i64) -> Result<ChatMessage> {
        let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?");

        let row = query_as::<_, MessageRow>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    /// All messages exchanged between `a` and `b` in either direction, oldest first.
    ///
    /// Symmetric: `(a, b)` and `(b, a)` yield the same sequence.
    pub async fn find_conversation(&self, a: UserId, b: UserId) -> Result<Vec<ChatMessage>> {
        let sql = format!(
            "{MESSAGE_SELECT}
             WHERE (m.sender_id = ? AND m.receiver_id = ?)
                OR (m.sender_id = ? AND m.receiver_id = ?)
             ORDER BY m.created_at ASC, m.id ASC"
        );

        let rows = query_as::<_, MessageRow>(&sql)
            .bind(a)
            .bind(b)
            .bind(b)
            .bind(a)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }

    /// Flip every unseen message from `from` to `to` to seen.
    ///
    /// Returns the number of messages updated; a repeat call with nothing new
    /// in between returns 0.
    pub async fn mark_seen(&self, from: UserId, to: UserId) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE chat_messages SET seen = 1 WHERE sender_id = ? AND receiver_id = ? AND seen = 0"
        )
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Flip every unseen message addressed to `user`, from any sender.
    pub async fn mark_all_seen(&self, user: UserId) -> Result<u64> {
        let result = sqlx::query("UPDATE chat_messages SET seen = 1 WHERE receiver_id = ? AND seen = 0")
            .bind(user)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Number of unseen messages addressed to `user`.
    pub async fn unread_count_for(&self, user: UserId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_messages WHERE receiver_id = ? AND seen = 0"
        )
        .bind(user)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// One summary per conversation partner, most recent conversation first.
    pub async fn chat_partners_for(&self, user: UserId) -> Result<Vec<ChatPartnerSummary>> {
        let sql = format!(
            "{MESSAGE_SELECT}
             WHERE m.sender_id = ? OR m.receiver_id = ?
             ORDER BY m.created_at DESC, m.id DESC"
        );

        let rows = query_as::<_, MessageRow>(&sql)
            .bind(user)
            .bind(user)
            .fetch_all(&self.pool)
            .await?;

        // Rows arrive newest first, so the first row seen per partner is its last message.
        let mut index: HashMap<UserId, usize> = HashMap::new();
        let mut partners: Vec<ChatPartnerSummary> = Vec::new();

        for message in rows.into_iter().map(ChatMessage::from) {
            let incoming = message.receiver.id == user;
            let partner = if message.sender.id == user {
                message.receiver.clone()
            } else {
                message.sender.clone()
            };
            let unseen = incoming && !message.seen;

            match index.get(&partner.id) {
                Some(&pos) => {
                    if unseen {
                        partners[pos].unread_count += 1;
                    }
                }
                None => {
                    index.insert(partner.id, partners.len());
                    partners.push(ChatPartnerSummary {
                        partner,
                        unread_count: i64::from(unseen),
                        last_message: message,
                    });
                }
            }
        }

        Ok(partners)
    }
}
