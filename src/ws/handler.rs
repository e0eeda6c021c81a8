use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{ClientMessage, ServerMessage};
use crate::ws::msg_edit_handler::handle_edit_message;
use crate::ws::msg_join_handler::handle_join_message;
use crate::ws::msg_ping_handler::handle_ping_message;
use crate::AppState;

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// Handle one WebSocket connection for its whole lifetime
async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    // Unique id for this client; also the broadcast echo-guard key.
    let session_id = Uuid::new_v4().to_string();
    info!("WebSocket connection established with session_id: {}", session_id);

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    // The session's mailbox: everything addressed to this client (peer
    // updates, the load payload, save outcomes) funnels through here, so
    // delivery order per sender is the mailbox order.
    let (outbox, mut outbox_rx) = mpsc::unbounded_channel::<ServerMessage>();
    app_state.registry.connect(&session_id, outbox.clone()).await;

    // Writer task: drain the mailbox onto the socket.
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = outbox_rx.recv().await {
            let text = serde_json::to_string(&msg).unwrap();
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Reader task: parse and dispatch inbound frames.
    let mut read_task = tokio::spawn({
        let app_state = app_state.clone();
        let session_id = session_id.clone();
        async move {
            while let Some(Ok(Message::Text(msg))) = receiver.next().await {
                let client_msg: ClientMessage = match serde_json::from_str(&msg) {
                    Ok(client_msg) => client_msg,
                    Err(e) => {
                        error!("Failed to parse message from session {}: {}", session_id, e);
                        continue;
                    }
                };

                match client_msg {
                    ClientMessage::Join(join_msg) => {
                        handle_join_message(&join_msg, &session_id, &app_state, &outbox).await;
                    }
                    ClientMessage::Edit(edit_msg) => {
                        handle_edit_message(&edit_msg, &session_id, &app_state, &outbox).await;
                    }
                    ClientMessage::Ping => {
                        handle_ping_message(&session_id, &outbox);
                    }
                }
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut write_task) => read_task.abort(),
        _ = (&mut read_task) => write_task.abort(),
    };

    // Connection drop: the session leaves its room. Remaining members get
    // no notification beyond the absence of further updates.
    app_state.registry.disconnect(&session_id).await;
    info!("WebSocket connection terminated for session_id: {}", session_id);
}
