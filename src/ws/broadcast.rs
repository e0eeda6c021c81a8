use std::sync::Arc;
use tracing::debug;

use super::registry::RoomRegistry;
use crate::models::{ServerMessage, UpdateMessage};

/// Fans a session's content update out to every other session in the room.
#[derive(Clone)]
pub struct ChangeBroadcaster {
    registry: Arc<RoomRegistry>,
}

impl ChangeBroadcaster {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `content` to every member of the room except the sender.
    ///
    /// Best-effort: a closed mailbox is skipped, nothing is retried or
    /// acknowledged. Mailboxes are FIFO, so two updates from the same
    /// sender reach any given peer in the order sent; there is no single
    /// global order across concurrent senders.
    ///
    /// Returns the number of peers the update was handed to.
    pub async fn publish(&self, sender_session_id: &str, room_id: &str, content: &str) -> usize {
        let peers = self.registry.peers_of(room_id, sender_session_id).await;
        let mut delivered = 0;
        for (peer_id, outbox) in peers {
            let update = ServerMessage::Update(UpdateMessage {
                content: content.to_string(),
            });
            if outbox.send(update).is_err() {
                debug!("Peer {} is gone, skipping delivery", peer_id);
                continue;
            }
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    async fn room_with_members(
        registry: &RoomRegistry,
        ids: &[&str],
    ) -> Vec<mpsc::UnboundedReceiver<ServerMessage>> {
        let mut receivers = Vec::new();
        for id in ids {
            let (tx, rx) = mpsc::unbounded_channel();
            registry.connect(id, tx).await;
            registry.join(id, "doc1").await;
            receivers.push(rx);
        }
        receivers
    }

    fn recv_content(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Option<String> {
        match rx.try_recv() {
            Ok(ServerMessage::Update(update)) => Some(update.content),
            _ => None,
        }
    }

    #[tokio::test]
    async fn publish_reaches_everyone_but_the_sender() {
        let registry = Arc::new(RoomRegistry::new());
        let broadcaster = ChangeBroadcaster::new(registry.clone());
        let mut receivers = room_with_members(&registry, &["a", "b", "c"]).await;

        let delivered = broadcaster.publish("a", "doc1", "hello").await;
        assert_eq!(delivered, 2);

        assert!(recv_content(&mut receivers[0]).is_none());
        assert_eq!(recv_content(&mut receivers[1]).as_deref(), Some("hello"));
        assert_eq!(recv_content(&mut receivers[2]).as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn per_sender_order_is_preserved() {
        let registry = Arc::new(RoomRegistry::new());
        let broadcaster = ChangeBroadcaster::new(registry.clone());
        let mut receivers = room_with_members(&registry, &["a", "b"]).await;

        broadcaster.publish("a", "doc1", "X").await;
        broadcaster.publish("a", "doc1", "XY").await;

        assert_eq!(recv_content(&mut receivers[1]).as_deref(), Some("X"));
        assert_eq!(recv_content(&mut receivers[1]).as_deref(), Some("XY"));
    }

    #[tokio::test]
    async fn closed_peer_is_skipped() {
        let registry = Arc::new(RoomRegistry::new());
        let broadcaster = ChangeBroadcaster::new(registry.clone());
        let mut receivers = room_with_members(&registry, &["a", "b", "c"]).await;

        // c's mailbox is gone but the registry has not seen the disconnect yet.
        receivers.pop();

        let delivered = broadcaster.publish("a", "doc1", "hi").await;
        assert_eq!(delivered, 1);
        assert_eq!(recv_content(&mut receivers[1]).as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn publish_to_unknown_room_delivers_nothing() {
        let registry = Arc::new(RoomRegistry::new());
        let broadcaster = ChangeBroadcaster::new(registry);
        assert_eq!(broadcaster.publish("a", "nowhere", "x").await, 0);
    }
}
