use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::models::{EditMessage, ServerMessage};
use crate::AppState;

/// Handle EditMessage
pub async fn handle_edit_message(
    edit_msg: &EditMessage,
    session_id: &str,
    app_state: &Arc<AppState>,
    outbox: &mpsc::UnboundedSender<ServerMessage>,
) {
    // Edits referencing no room, or a room this session is not a member
    // of, change nothing: no broadcast and no save.
    if edit_msg.room_id.is_empty() {
        debug!("Dropping edit with empty room id from session {}", session_id);
        return;
    }
    if app_state.registry.room_of(session_id).await.as_deref() != Some(edit_msg.room_id.as_str()) {
        debug!(
            "Dropping edit from session {} for room {} it is not a member of",
            session_id, edit_msg.room_id
        );
        return;
    }

    // Fan out to the rest of the room, then (re)start the save timer. The
    // sender never receives its own update back.
    let delivered = app_state
        .broadcaster
        .publish(session_id, &edit_msg.room_id, &edit_msg.content)
        .await;
    debug!(
        "Edit in room {} delivered to {} peer(s)",
        edit_msg.room_id, delivered
    );

    app_state
        .coordinator
        .schedule_save(&edit_msg.room_id, edit_msg.content.clone(), outbox.clone())
        .await;
}
