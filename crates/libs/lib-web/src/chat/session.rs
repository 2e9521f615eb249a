//! # Connection Session
//!
//! Lifecycle of one chat connection:
//!
//! ```text
//! Connecting --verify ok--> Authenticated --transport closed--> Disconnected
//!      \--verify failed--> (rejected, never registered)
//! ```
//!
//! Opening a session registers its outbound queue with the presence registry and
//! joins the user's room. The registry holds the only sender of that queue, so
//! everything addressed to the connection, including its own errors, goes
//! through the registry. Closing leaves every room and tells everyone else the
//! user went offline. Graceful and abrupt disconnects take the same path.

use lib_core::Result;
use tracing::info;

use super::events::{OutboundEvent, PresencePayload};
use super::identity::{Identity, IdentityVerifier};
use super::presence::{event_channel, ConnectionId, EventReceiver, PresenceRegistry, RoomKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authenticated,
    Disconnected,
}

pub struct ConnectionSession {
    id: ConnectionId,
    identity: Identity,
    state: SessionState,
}

impl ConnectionSession {
    /// Verify the handshake credential, then open the session.
    ///
    /// On failure nothing is registered and no presence event is emitted.
    pub async fn establish(
        verifier: &IdentityVerifier,
        token: Option<&str>,
        registry: &PresenceRegistry,
    ) -> Result<(Self, EventReceiver)> {
        let identity = verifier.verify(token).await?;
        Ok(Self::open(identity, registry).await)
    }

    /// Open a session for an already verified identity.
    pub async fn open(identity: Identity, registry: &PresenceRegistry) -> (Self, EventReceiver) {
        let (tx, rx) = event_channel();
        let mut session = Self {
            id: ConnectionId::new(),
            identity,
            state: SessionState::Connecting,
        };

        registry.register(session.id, tx).await;
        registry.join(session.room(), session.id).await;
        session.state = SessionState::Authenticated;

        info!(
            connection_id = %session.id,
            user_id = session.identity.user_id,
            username = %session.identity.username,
            "[WS] Session authenticated"
        );

        (session, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn room(&self) -> RoomKey {
        self.identity.room()
    }

    /// Leave all rooms and announce `user_offline` to every other connection.
    ///
    /// Returns `false` when the session was already closed.
    pub async fn close(&mut self, registry: &PresenceRegistry) -> bool {
        if self.state == SessionState::Disconnected {
            return false;
        }
        self.state = SessionState::Disconnected;

        registry.leave(self.id).await;
        let notified = registry
            .broadcast_except(
                self.id,
                &OutboundEvent::UserOffline(PresencePayload {
                    user_id: self.identity.user_id,
                    username: self.identity.username.clone(),
                }),
            )
            .await;

        info!(
            connection_id = %self.id,
            user_id = self.identity.user_id,
            notified,
            "[WS] Session closed"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use lib_auth::{encode_claims, encode_jwt, Claims};
    use lib_core::{memory_pool, AppError, UserRepository};

    const SECRET: &str = "test-secret-key-must-be-at-least-32-characters-long!";

    fn identity(user_id: i64, username: &str) -> Identity {
        Identity { user_id, username: username.to_string(), avatar: String::new() }
    }

    #[tokio::test]
    async fn test_open_joins_user_room() {
        let registry = PresenceRegistry::new();

        let (session, _rx) = ConnectionSession::open(identity(1, "alice"), &registry).await;

        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(registry.room_size(RoomKey::from(1)).await, 1);
    }

    #[tokio::test]
    async fn test_close_announces_offline_once() {
        let registry = PresenceRegistry::new();
        let (mut alice, _rx_a) = ConnectionSession::open(identity(1, "alice"), &registry).await;
        let (_bob, mut rx_b) = ConnectionSession::open(identity(2, "bob"), &registry).await;

        assert!(alice.close(&registry).await);
        assert!(!alice.close(&registry).await);

        assert_eq!(alice.state(), SessionState::Disconnected);
        assert_eq!(registry.room_size(RoomKey::from(1)).await, 0);
        assert_eq!(
            rx_b.try_recv().unwrap(),
            OutboundEvent::UserOffline(PresencePayload { user_id: 1, username: "alice".into() })
        );
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closing_one_tab_keeps_the_other() {
        let registry = PresenceRegistry::new();
        let (mut tab1, _rx1) = ConnectionSession::open(identity(1, "alice"), &registry).await;
        let (_tab2, _rx2) = ConnectionSession::open(identity(1, "alice"), &registry).await;

        tab1.close(&registry).await;

        assert!(registry.is_online(1).await);
    }

    #[tokio::test]
    async fn test_establish_with_valid_token() {
        let pool = memory_pool().await.unwrap();
        let user = UserRepository::create(&pool, "alice", "alice@example.com", "hash", "").await.unwrap();
        let verifier = IdentityVerifier::new(SECRET, pool);
        let registry = PresenceRegistry::new();
        let token = encode_jwt(user.id, user.username.clone(), SECRET, 1).unwrap();

        let (session, _rx) = ConnectionSession::establish(&verifier, Some(&token), &registry)
            .await
            .unwrap();

        assert_eq!(session.identity().user_id, user.id);
        assert!(registry.is_online(user.id).await);
    }

    #[tokio::test]
    async fn test_expired_token_rejected_before_join() {
        let pool = memory_pool().await.unwrap();
        let user = UserRepository::create(&pool, "alice", "alice@example.com", "hash", "").await.unwrap();
        let verifier = IdentityVerifier::new(SECRET, pool);
        let registry = PresenceRegistry::new();
        let (_observer, mut rx_observer) = ConnectionSession::open(identity(50, "observer"), &registry).await;

        let issued = Utc::now() - Duration::hours(2);
        let token = encode_claims(
            &Claims {
                sub: user.id.to_string(),
                username: user.username.clone(),
                exp: (issued + Duration::minutes(30)).timestamp(),
                iat: issued.timestamp(),
            },
            SECRET,
        )
        .unwrap();

        let result = ConnectionSession::establish(&verifier, Some(&token), &registry).await;

        assert!(matches!(result, Err(AppError::Authentication(_))));
        assert!(!registry.is_online(user.id).await);
        assert_eq!(registry.connection_count().await, 1);
        assert!(rx_observer.try_recv().is_err());
    }
}
