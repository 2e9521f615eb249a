//! # Chat Socket Events
//!
//! Closed sets of events exchanged over the chat socket.
//!
//! Every frame is a JSON text message of the form
//!
//! ```json
//! { "event": "send_message", "data": { "receiverId": 2, "content": "hi" } }
//! ```
//!
//! Payload fields are camelCase. `set_online` needs no `data`; an absent, `null`
//! or empty-object `data` are all accepted.

use lib_core::dto::{ChatMessage, SendMessageRequest, UserProjection};
use lib_core::UserId;
use serde::{Deserialize, Serialize};

// region:    --- Inbound

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    SetOnline(Option<SetOnlinePayload>),
    SendMessage(SendMessageRequest),
    Typing(TypingPayload),
    MarkAsRead(MarkAsReadPayload),
}

impl InboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::SetOnline(_) => "set_online",
            InboundEvent::SendMessage(_) => "send_message",
            InboundEvent::Typing(_) => "typing",
            InboundEvent::MarkAsRead(_) => "mark_as_read",
        }
    }
}

/// Empty body of `set_online`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOnlinePayload {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub receiver_id: UserId,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAsReadPayload {
    pub sender_id: UserId,
}

// endregion: --- Inbound

// region:    --- Outbound

/// Events the server pushes to connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Full message, to the receiver's room.
    ReceiveMessage(ReceiveMessagePayload),
    /// Lightweight notification, to the receiver's room.
    NewMessage(NewMessagePayload),
    /// Confirmation, to the sender's room.
    MessageSent(MessageSentPayload),
    UserTyping(UserTypingPayload),
    MessagesRead(MessagesReadPayload),
    UserOnline(PresencePayload),
    UserOffline(PresencePayload),
    /// Failure of one inbound event, to the originating connection only.
    Error(ErrorPayload),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::ReceiveMessage(_) => "receive_message",
            OutboundEvent::NewMessage(_) => "new_message",
            OutboundEvent::MessageSent(_) => "message_sent",
            OutboundEvent::UserTyping(_) => "user_typing",
            OutboundEvent::MessagesRead(_) => "messages_read",
            OutboundEvent::UserOnline(_) => "user_online",
            OutboundEvent::UserOffline(_) => "user_offline",
            OutboundEvent::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveMessagePayload {
    pub message: ChatMessage,
    pub sender: UserProjection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagePayload {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub message_id: i64,
    pub content: String,
    pub sender_name: String,
}

impl From<&ChatMessage> for NewMessagePayload {
    fn from(message: &ChatMessage) -> Self {
        Self {
            sender_id: message.sender.id,
            receiver_id: message.receiver.id,
            message_id: message.id,
            content: message.content.clone(),
            sender_name: message.sender.username.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSentPayload {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingPayload {
    pub user_id: UserId,
    pub username: String,
    pub is_typing: bool,
}

/// `messages_read` has two shapes: the receipt sent to the original sender,
/// and the echo sent back into the reader's own room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessagesReadPayload {
    Receipt(ReadReceipt),
    Echo(ReadEcho),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub reader_id: UserId,
    pub reader_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadEcho {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
}

// endregion: --- Outbound
