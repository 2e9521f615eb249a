use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::dto::{ChatMessage, UserProjection};

/// User entity representing a complete user record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl User {
    /// Minimal public view of this user.
    pub fn projection(&self) -> UserProjection {
        UserProjection {
            id: self.id,
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// A chat message row joined with both parties' user columns.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub content: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub seen: bool,
    pub sender_id: i64,
    pub sender_username: String,
    pub sender_avatar: String,
    pub receiver_id: i64,
    pub receiver_username: String,
    pub receiver_avatar: String,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        ChatMessage {
            id: row.id,
            sender: UserProjection {
                id: row.sender_id,
                username: row.sender_username,
                avatar: row.sender_avatar,
            },
            receiver: UserProjection {
                id: row.receiver_id,
                username: row.receiver_username,
                avatar: row.receiver_avatar,
            },
            content: row.content,
            image: row.image,
            created_at: row.created_at,
            seen: row.seen,
        }
    }
}
