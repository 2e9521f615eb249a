//! # Presence Registry
//!
//! In-memory map of live chat connections and the rooms they joined.
//!
//! Every authenticated connection joins exactly one room, keyed by its user id,
//! so a user with several tabs open has several connections in the same room.
//! Emitting to a room fans out to each of them.
//!
//! The registry is the only shared mutable state of the chat layer. Mutations
//! take the write lock; emission snapshots the target senders under the read
//! lock and sends after releasing it. Senders whose receiving side is gone are
//! pruned on the next emission that hits them.
//!
//! Each connection's queue is bounded. A connection whose queue is full (a peer
//! that stopped reading) is pruned the same way as a closed one: the registry
//! drops its sender, so the connection's writer stops once it drains what is
//! already queued.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use lib_core::UserId;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::events::OutboundEvent;

/// Events that may wait for one connection before it is considered stalled.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Outbound half of a connection's event queue.
pub type EventSender = mpsc::Sender<OutboundEvent>;
/// Inbound half, drained by the socket writer task.
pub type EventReceiver = mpsc::Receiver<OutboundEvent>;

/// A fresh bounded queue for one connection.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::channel(OUTBOUND_QUEUE_CAPACITY)
}

/// Identifier of one live transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Routing key for a user's room. Derived from the user id but kept as its own type
/// so room addressing cannot be confused with identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomKey(UserId);

impl From<UserId> for RoomKey {
    fn from(user_id: UserId) -> Self {
        Self(user_id)
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

struct Member {
    tx: EventSender,
    rooms: HashSet<RoomKey>,
}

#[derive(Default)]
struct Inner {
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
    members: HashMap<ConnectionId, Member>,
}

impl Inner {
    fn remove(&mut self, conn: ConnectionId) -> Vec<RoomKey> {
        let Some(member) = self.members.remove(&conn) else {
            return Vec::new();
        };

        let mut left = Vec::with_capacity(member.rooms.len());
        for room in member.rooms {
            if let Some(conns) = self.rooms.get_mut(&room) {
                conns.remove(&conn);
                if conns.is_empty() {
                    self.rooms.remove(&room);
                }
            }
            left.push(room);
        }
        left
    }
}

/// Shared registry of live connections. Cloning shares the same map.
#[derive(Clone, Default)]
pub struct PresenceRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a connection reachable by broadcasts and direct emission.
    ///
    /// Re-registering an id replaces its sender and keeps its rooms.
    pub async fn register(&self, conn: ConnectionId, tx: EventSender) {
        let mut inner = self.inner.write().await;
        match inner.members.get_mut(&conn) {
            Some(member) => member.tx = tx,
            None => {
                inner.members.insert(conn, Member { tx, rooms: HashSet::new() });
            }
        }
        debug!(connection_id = %conn, total = inner.members.len(), "[PRESENCE] Connection registered");
    }

    /// Add a registered connection to `room`. Returns `false` for unknown connections.
    pub async fn join(&self, room: RoomKey, conn: ConnectionId) -> bool {
        let mut inner = self.inner.write().await;
        let Some(member) = inner.members.get_mut(&conn) else {
            return false;
        };
        member.rooms.insert(room);
        inner.rooms.entry(room).or_default().insert(conn);

        debug!(connection_id = %conn, room = %room, "[PRESENCE] Joined room");
        true
    }

    /// Remove a connection from every room and from the registry.
    ///
    /// Returns the rooms it left; a second call returns an empty list.
    pub async fn leave(&self, conn: ConnectionId) -> Vec<RoomKey> {
        let left = self.inner.write().await.remove(conn);
        if !left.is_empty() {
            debug!(connection_id = %conn, rooms = left.len(), "[PRESENCE] Left rooms");
        }
        left
    }

    /// Deliver `event` to every connection in `room`.
    ///
    /// An empty or unknown room is a silent no-op. Returns the number of
    /// connections the event was queued for.
    pub async fn emit_to_room(&self, room: RoomKey, event: &OutboundEvent) -> usize {
        let targets: Vec<(ConnectionId, EventSender)> = {
            let inner = self.inner.read().await;
            match inner.rooms.get(&room) {
                Some(conns) => conns
                    .iter()
                    .filter_map(|c| inner.members.get(c).map(|m| (*c, m.tx.clone())))
                    .collect(),
                None => Vec::new(),
            }
        };

        let delivered = self.deliver(targets, event).await;
        trace!(room = %room, event = event.name(), delivered, "[PRESENCE] Room emit");
        delivered
    }

    /// Deliver `event` to every registered connection except `origin`.
    pub async fn broadcast_except(&self, origin: ConnectionId, event: &OutboundEvent) -> usize {
        let targets: Vec<(ConnectionId, EventSender)> = {
            let inner = self.inner.read().await;
            inner
                .members
                .iter()
                .filter(|(c, _)| **c != origin)
                .map(|(c, m)| (*c, m.tx.clone()))
                .collect()
        };

        let delivered = self.deliver(targets, event).await;
        trace!(origin = %origin, event = event.name(), delivered, "[PRESENCE] Broadcast");
        delivered
    }

    /// Deliver `event` to a single connection.
    pub async fn emit_to_connection(&self, conn: ConnectionId, event: &OutboundEvent) -> bool {
        let target = {
            let inner = self.inner.read().await;
            inner.members.get(&conn).map(|m| (conn, m.tx.clone()))
        };

        self.deliver(target.into_iter().collect(), event).await == 1
    }

    /// Number of connections currently in `room`.
    pub async fn room_size(&self, room: RoomKey) -> usize {
        self.inner.read().await.rooms.get(&room).map_or(0, HashSet::len)
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.members.len()
    }

    pub async fn is_online(&self, user_id: UserId) -> bool {
        self.room_size(RoomKey::from(user_id)).await > 0
    }

    async fn deliver(&self, targets: Vec<(ConnectionId, EventSender)>, event: &OutboundEvent) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for (conn, tx) in targets {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(connection_id = %conn, event = event.name(), "[PRESENCE] Outbound queue full, dropping connection");
                    dead.push(conn);
                }
                Err(TrySendError::Closed(_)) => dead.push(conn),
            }
        }

        if !dead.is_empty() {
            let mut inner = self.inner.write().await;
            for conn in dead {
                debug!(connection_id = %conn, "[PRESENCE] Pruning closed connection");
                inner.remove(conn);
            }
        }

        delivered
    }
}
