use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::models::{JoinMessage, LoadMessage, SaveErrorMessage, ServerMessage};
use crate::AppState;

/// Handle JoinMessage
pub async fn handle_join_message(
    join_msg: &JoinMessage,
    session_id: &str,
    app_state: &Arc<AppState>,
    outbox: &mpsc::UnboundedSender<ServerMessage>,
) {
    // A join referencing no room changes nothing.
    if join_msg.room_id.is_empty() {
        debug!("Dropping join with empty room id from session {}", session_id);
        return;
    }

    info!(
        "Join message received: session={}, room={}",
        session_id, join_msg.room_id
    );
    app_state.registry.join(session_id, &join_msg.room_id).await;

    // Load-on-join: the last persisted snapshot goes to this session only,
    // never to the room. A document nobody has saved yet loads as empty.
    match app_state.coordinator.load(&join_msg.room_id).await {
        Ok(content) => {
            if outbox.send(ServerMessage::Load(LoadMessage { content })).is_err() {
                error!("Failed to deliver load payload to session {}", session_id);
            }
        }
        Err(e) => {
            error!(
                "Failed to load document {} for session {}: {}",
                join_msg.room_id, session_id, e
            );
            let _ = outbox.send(ServerMessage::SaveError(SaveErrorMessage {
                error: e.to_string(),
            }));
        }
    }
}
