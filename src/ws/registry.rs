use std::collections::{HashMap, HashSet};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use crate::models::ServerMessage;

/// Session/room bookkeeping: which connections exist and which room each
/// one is attached to.
///
/// Membership is held as an arena + index pair (session id → room id,
/// room id → session set) plus each session's outbound mailbox, all
/// behind a single lock, so no two events mutate a room's membership
/// concurrently. Rooms have no existence of their own: the member set is
/// created on first join and removed when the last member leaves.
#[derive(Default)]
pub struct RoomRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    sessions: HashMap<String, String>,
    rooms: HashMap<String, HashSet<String>>,
    outboxes: HashMap<String, mpsc::UnboundedSender<ServerMessage>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's mailbox.
    pub async fn connect(&self, session_id: &str, outbox: mpsc::UnboundedSender<ServerMessage>) {
        let mut inner = self.inner.write().await;
        inner.outboxes.insert(session_id.to_string(), outbox);
    }

    /// Attach a session to a room, creating the membership set if absent.
    ///
    /// Idempotent. A session is in at most one room, so joining a new room
    /// leaves the previous one first. Empty ids are no-ops.
    pub async fn join(&self, session_id: &str, room_id: &str) {
        if session_id.is_empty() || room_id.is_empty() {
            return;
        }
        let mut inner = self.inner.write().await;

        let previous = inner.sessions.get(session_id).cloned();
        if let Some(current) = previous {
            if current == room_id {
                return;
            }
            remove_member(&mut inner, session_id, &current);
        }

        inner
            .sessions
            .insert(session_id.to_string(), room_id.to_string());
        inner
            .rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(session_id.to_string());
        debug!("Session {} joined room {}", session_id, room_id);
    }

    /// Detach a session from whichever room it is in. Unknown ids are
    /// no-ops.
    pub async fn leave(&self, session_id: &str) {
        let mut inner = self.inner.write().await;
        if let Some(room_id) = inner.sessions.remove(session_id) {
            remove_member(&mut inner, session_id, &room_id);
            debug!("Session {} left room {}", session_id, room_id);
        }
    }

    /// `leave` plus mailbox teardown; called when the connection drops.
    pub async fn disconnect(&self, session_id: &str) {
        let mut inner = self.inner.write().await;
        inner.outboxes.remove(session_id);
        if let Some(room_id) = inner.sessions.remove(session_id) {
            remove_member(&mut inner, session_id, &room_id);
            debug!("Session {} disconnected from room {}", session_id, room_id);
        }
    }

    /// Current members of a room. Unknown rooms read as empty.
    pub async fn members_of(&self, room_id: &str) -> HashSet<String> {
        self.inner
            .read()
            .await
            .rooms
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Members of a room except one session, with their mailboxes.
    pub async fn peers_of(
        &self,
        room_id: &str,
        except: &str,
    ) -> Vec<(String, mpsc::UnboundedSender<ServerMessage>)> {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(room_id) else {
            return Vec::new();
        };
        members
            .iter()
            .filter(|id| id.as_str() != except)
            .filter_map(|id| inner.outboxes.get(id).map(|tx| (id.clone(), tx.clone())))
            .collect()
    }

    /// Room a session is currently attached to.
    pub async fn room_of(&self, session_id: &str) -> Option<String> {
        self.inner.read().await.sessions.get(session_id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.outboxes.len()
    }

    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }
}

/// Drop a session from a room's member set, deleting the set once empty so
/// emptied rooms are not leaked.
fn remove_member(inner: &mut RegistryInner, session_id: &str, room_id: &str) {
    if let Some(members) = inner.rooms.get_mut(room_id) {
        members.remove(session_id);
        if members.is_empty() {
            inner.rooms.remove(room_id);
        }
    }
}
