//! # Chat History Handlers
//!
//! Request/response surface over the message store, used by the web client to
//! load conversations and badges, and as a fallback when the socket is down.
//!
//! All routes sit behind `require_auth`; the caller is the `Identity` it injects.
//! Bodies and path ids that fail to extract are answered as `AppError::Validation`,
//! so every failure has the same `{"error", "code"}` shape.
//!
//! - `POST /api/chat/send` - persist and fan out, same as the socket `send_message`
//! - `GET  /api/chat/messages/{user_id}` - full conversation with one partner
//! - `GET  /api/chat/list` - one entry per partner, most recent first
//! - `PUT  /api/chat/read/{sender_id}` - mark a partner's messages seen (emits receipts)
//! - `PUT  /api/chat/mark-all-read` - mark everything addressed to the caller seen
//! - `GET  /api/chat/unread-count` - unseen messages addressed to the caller

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Json, Path, State,
    },
    http::StatusCode,
};
use lib_core::dto::{
    ChatListResponse, ConversationResponse, MarkReadResponse, SendMessageRequest,
    SendMessageResponse, UnreadCountResponse,
};
use lib_core::{Result, UserId};
use tracing::instrument;

use crate::chat::{EventRouter, Identity};

#[instrument(skip_all, fields(user_id = me.user_id, receiver_id = tracing::field::Empty))]
pub async fn send_message(
    State(router): State<EventRouter>,
    Extension(me): Extension<Identity>,
    body: std::result::Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SendMessageResponse>)> {
    let Json(req) = body?;
    tracing::Span::current().record("receiver_id", req.receiver_id);

    let message = router.send_message(&me, req).await?;

    Ok((StatusCode::CREATED, Json(SendMessageResponse { success: true, message })))
}

pub async fn get_conversation(
    State(router): State<EventRouter>,
    Extension(me): Extension<Identity>,
    path: std::result::Result<Path<UserId>, PathRejection>,
) -> Result<Json<ConversationResponse>> {
    let Path(user_id) = path?;
    let messages = router.store().find_conversation(me.user_id, user_id).await?;

    Ok(Json(ConversationResponse { success: true, messages }))
}

pub async fn get_chat_list(
    State(router): State<EventRouter>,
    Extension(me): Extension<Identity>,
) -> Result<Json<ChatListResponse>> {
    let chat_list = router.store().chat_partners_for(me.user_id).await?;

    Ok(Json(ChatListResponse { success: true, chat_list }))
}

#[instrument(skip_all, fields(user_id = me.user_id, sender_id = tracing::field::Empty))]
pub async fn mark_as_read(
    State(router): State<EventRouter>,
    Extension(me): Extension<Identity>,
    path: std::result::Result<Path<UserId>, PathRejection>,
) -> Result<Json<MarkReadResponse>> {
    let Path(sender_id) = path?;
    tracing::Span::current().record("sender_id", sender_id);
    let updated = router.mark_read(&me, sender_id).await?;

    Ok(Json(MarkReadResponse { success: true, updated }))
}

pub async fn mark_all_as_read(
    State(router): State<EventRouter>,
    Extension(me): Extension<Identity>,
) -> Result<Json<MarkReadResponse>> {
    let updated = router.store().mark_all_seen(me.user_id).await?;

    Ok(Json(MarkReadResponse { success: true, updated }))
}

pub async fn get_unread_count(
    State(router): State<EventRouter>,
    Extension(me): Extension<Identity>,
) -> Result<Json<UnreadCountResponse>> {
    let count = router.store().unread_count_for(me.user_id).await?;

    Ok(Json(UnreadCountResponse { success: true, count }))
}

#[cfg(test)]
mod tests;
