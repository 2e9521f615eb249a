//! # Chat Data Transfer Objects
//!
//! Message and conversation shapes shared by the chat socket events and the
//! `/api/chat` REST endpoints.
//!
//! ## Wire Format
//!
//! Chat payloads use **camelCase** field names, matching the socket event
//! payloads the web client consumes:
//!
//! ```text
//! {
//!   "id": 42,
//!   "sender": { "id": 1, "username": "alice", "avatar": "" },
//!   "receiver": { "id": 2, "username": "bob", "avatar": "" },
//!   "content": "hi",
//!   "image": "",
//!   "createdAt": "2025-01-01T12:00:00.123Z",
//!   "seen": false
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::store::UserId;

/// Minimal public view of a user attached to chat payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProjection {
    pub id: UserId,
    pub username: String,
    pub avatar: String,
}

/// A persisted chat message with both parties resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub sender: UserProjection,
    pub receiver: UserProjection,
    pub content: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub seen: bool,
}

/// One entry of the chat list: a partner, the latest message exchanged with
/// them, and how many of their messages the caller has not seen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatPartnerSummary {
    pub partner: UserProjection,
    pub last_message: ChatMessage,
    pub unread_count: i64,
}

/// Body of `send_message`, over the socket or `POST /api/chat/send`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: UserId,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub success: bool,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatListResponse {
    pub success: bool,
    pub chat_list: Vec<ChatPartnerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub success: bool,
    pub count: i64,
}

/// Result of a mark-read call; `updated` is the number of messages flipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub success: bool,
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_message_request_optional_fields() {
        let req: SendMessageRequest = serde_json::from_value(json!({
            "receiverId": 7,
            "content": "hi"
        }))
        .unwrap();

        assert_eq!(req.receiver_id, 7);
        assert_eq!(req.content.as_deref(), Some("hi"));
        assert!(req.image.is_none());
    }

    #[test]
    fn test_chat_list_uses_camel_case() {
        let value = serde_json::to_value(ChatListResponse { success: true, chat_list: vec![] }).unwrap();
        assert_eq!(value, json!({ "success": true, "chatList": [] }));
    }
}
