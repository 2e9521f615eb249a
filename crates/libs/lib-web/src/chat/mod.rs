//! # Chat Module
//!
//! Real-time direct messaging over a persistent socket.
//!
//! - [`identity`]: credential → user resolution for handshakes and REST calls
//! - [`presence`]: live connections, per-user rooms, fan-out
//! - [`session`]: one connection's lifecycle
//! - [`events`]: inbound and outbound event types
//! - [`router`]: per-event handling (persist, then emit)

pub mod events;
pub mod identity;
pub mod presence;
pub mod router;
pub mod session;

pub use events::{InboundEvent, OutboundEvent};
pub use identity::{Identity, IdentityVerifier};
pub use presence::{ConnectionId, PresenceRegistry, RoomKey};
pub use router::EventRouter;
pub use session::{ConnectionSession, SessionState};
