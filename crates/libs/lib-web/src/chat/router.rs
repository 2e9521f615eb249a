//! # Event Router
//!
//! Handles one inbound event at a time for an authenticated session: persists
//! through the [`MessageStore`], then fans out through the [`PresenceRegistry`].
//!
//! Failures never close the connection. They become an `error` event delivered to
//! the originating connection only, and nothing is retried.
//!
//! The send and read paths are also exposed as plain methods so the REST
//! fallback endpoints produce exactly the same events as the socket.

use lib_core::dto::{ChatMessage, SendMessageRequest};
use lib_core::{AppError, MessageStore, Result, UserId};
use tracing::{debug, info, warn};

use super::events::{
    ErrorPayload, InboundEvent, MessageSentPayload, MessagesReadPayload, NewMessagePayload,
    PresencePayload, ReadEcho, ReadReceipt, ReceiveMessagePayload, TypingPayload,
    UserTypingPayload, OutboundEvent,
};
use super::identity::Identity;
use super::presence::{ConnectionId, PresenceRegistry, RoomKey};
use super::session::ConnectionSession;

#[derive(Clone)]
pub struct EventRouter {
    store: MessageStore,
    registry: PresenceRegistry,
}

impl EventRouter {
    pub fn new(store: MessageStore, registry: PresenceRegistry) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    /// Parse and dispatch one text frame.
    pub async fn handle_frame(&self, session: &ConnectionSession, frame: &str) {
        match serde_json::from_str::<InboundEvent>(frame) {
            Ok(event) => self.dispatch(session, event).await,
            Err(e) => {
                warn!(connection_id = %session.id(), error = %e, "[CHAT] Malformed frame");
                self.reject(session, AppError::from(e)).await;
            }
        }
    }

    /// Run one event to completion.
    pub async fn dispatch(&self, session: &ConnectionSession, event: InboundEvent) {
        let identity = session.identity();
        debug!(
            connection_id = %session.id(),
            user_id = identity.user_id,
            event = event.name(),
            "[CHAT] Dispatch"
        );

        let result = match event {
            InboundEvent::SetOnline(_) => {
                self.announce_online(session.id(), identity).await;
                Ok(())
            }
            InboundEvent::SendMessage(req) => self.send_message(identity, req).await.map(|_| ()),
            InboundEvent::Typing(payload) => {
                self.typing(identity, payload).await;
                Ok(())
            }
            InboundEvent::MarkAsRead(payload) => {
                self.mark_read(identity, payload.sender_id).await.map(|_| ())
            }
        };

        if let Err(err) = result {
            self.reject(session, err).await;
        }
    }

    /// Report a failed event back to the connection that sent it.
    async fn reject(&self, session: &ConnectionSession, err: AppError) {
        warn!(
            connection_id = %session.id(),
            user_id = session.identity().user_id,
            code = err.code(),
            "[CHAT] Event failed: {}",
            err
        );
        let event = OutboundEvent::Error(ErrorPayload { message: err.user_message() });
        self.registry.emit_to_connection(session.id(), &event).await;
    }

    /// Tell every other connection that `identity` is online.
    pub async fn announce_online(&self, origin: ConnectionId, identity: &Identity) -> usize {
        let event = OutboundEvent::UserOnline(PresencePayload {
            user_id: identity.user_id,
            username: identity.username.clone(),
        });
        let notified = self.registry.broadcast_except(origin, &event).await;
        info!(user_id = identity.user_id, notified, "[PRESENCE] User online");
        notified
    }

    /// Persist a message and fan it out.
    ///
    /// The receiver's room gets `receive_message` and `new_message`; the sender's
    /// own room gets `message_sent` so every tab the sender has open shows it.
    pub async fn send_message(&self, sender: &Identity, req: SendMessageRequest) -> Result<ChatMessage> {
        let message = self
            .store
            .persist(sender.user_id, req.receiver_id, req.content.as_deref(), req.image.as_deref())
            .await?;

        let receiver_room = RoomKey::from(message.receiver.id);
        let delivered = self
            .registry
            .emit_to_room(
                receiver_room,
                &OutboundEvent::ReceiveMessage(ReceiveMessagePayload {
                    message: message.clone(),
                    sender: sender.projection(),
                }),
            )
            .await;
        self.registry
            .emit_to_room(receiver_room, &OutboundEvent::NewMessage(NewMessagePayload::from(&message)))
            .await;
        self.registry
            .emit_to_room(
                sender.room(),
                &OutboundEvent::MessageSent(MessageSentPayload { message: message.clone() }),
            )
            .await;

        info!(
            message_id = message.id,
            sender_id = sender.user_id,
            receiver_id = message.receiver.id,
            delivered,
            "[CHAT] Message sent"
        );
        Ok(message)
    }

    /// Forward a typing indicator to the receiver's room. Nothing is persisted.
    pub async fn typing(&self, sender: &Identity, payload: TypingPayload) -> usize {
        self.registry
            .emit_to_room(
                RoomKey::from(payload.receiver_id),
                &OutboundEvent::UserTyping(UserTypingPayload {
                    user_id: sender.user_id,
                    username: sender.username.clone(),
                    is_typing: payload.is_typing,
                }),
            )
            .await
    }

    /// Mark everything `sender_id` sent to `reader` as seen and emit the receipts.
    ///
    /// The original sender's room gets `{readerId, readerName}`; the reader's own
    /// room gets `{userId}` so other tabs clear their unread badge.
    pub async fn mark_read(&self, reader: &Identity, sender_id: UserId) -> Result<u64> {
        let updated = self.store.mark_seen(sender_id, reader.user_id).await?;

        self.registry
            .emit_to_room(
                RoomKey::from(sender_id),
                &OutboundEvent::MessagesRead(MessagesReadPayload::Receipt(ReadReceipt {
                    reader_id: reader.user_id,
                    reader_name: reader.username.clone(),
                })),
            )
            .await;
        self.registry
            .emit_to_room(
                reader.room(),
                &OutboundEvent::MessagesRead(MessagesReadPayload::Echo(ReadEcho {
                    user_id: reader.user_id,
                })),
            )
            .await;

        debug!(reader_id = reader.user_id, sender_id, updated, "[CHAT] Messages marked read");
        Ok(updated)
    }
}
