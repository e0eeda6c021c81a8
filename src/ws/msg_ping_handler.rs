use chrono::Utc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::models::{PongMessage, ServerMessage};

/// Handle PingMessage
pub fn handle_ping_message(session_id: &str, outbox: &mpsc::UnboundedSender<ServerMessage>) {
    // Reply with pong
    debug!("Ping received from session {}", session_id);
    let _ = outbox.send(ServerMessage::Pong(PongMessage {
        date: Utc::now().to_rfc3339(),
    }));
}
