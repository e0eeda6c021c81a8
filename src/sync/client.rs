//! Headless synchronization client.
//!
//! Wraps one WebSocket connection and a [`SyncMachine`]: inbound frames
//! are applied as remote-origin transitions, `edit` applies a local-origin
//! transition and performs the actions it yields. Used by integration
//! tests and by non-browser frontends.

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use super::machine::{Action, Origin, SyncMachine, SyncStatus};
use crate::models::{ClientMessage, EditMessage, JoinMessage, ServerMessage};

/// Events surfaced to the embedding application.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The one-time load-on-join payload was applied.
    Loaded(String),
    /// Another session's edit was applied.
    RemoteUpdate(String),
    /// The debounced save landed.
    Saved,
    /// The store rejected a save (or a load); the next local edit retries.
    SaveFailed(String),
    /// Liveness reply.
    Pong(String),
    /// The server closed the connection.
    Disconnected,
}

#[derive(Debug)]
pub enum ClientError {
    Connect(tokio_tungstenite::tungstenite::Error),
    Closed,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Connect(e) => write!(f, "Connection error: {}", e),
            ClientError::Closed => write!(f, "Connection closed"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::Connect(e)
    }
}

/// The sync client.
pub struct SyncClient {
    machine: Arc<Mutex<SyncMachine>>,
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    events: mpsc::UnboundedReceiver<ClientEvent>,
    room_id: String,
    read_task: JoinHandle<()>,
    write_task: JoinHandle<()>,
}

impl SyncClient {
    /// Connect to the server and join a room.
    ///
    /// The server answers the join with the last persisted snapshot, which
    /// arrives as a [`ClientEvent::Loaded`] event.
    pub async fn connect(server_url: &str, room_id: &str) -> Result<Self, ClientError> {
        let (socket, _response) = connect_async(server_url).await?;
        let (mut ws_tx, mut ws_rx) = socket.split();

        let machine = Arc::new(Mutex::new(SyncMachine::new()));
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (event_tx, events) = mpsc::unbounded_channel::<ClientEvent>();

        // Writer task: serialize outbound frames onto the socket.
        let write_task = tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let text = serde_json::to_string(&msg).unwrap();
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        });

        // Reader task: drive the machine from inbound frames.
        let read_task = tokio::spawn({
            let machine = machine.clone();
            async move {
                while let Some(Ok(frame)) = ws_rx.next().await {
                    let Message::Text(text) = frame else { continue };
                    let msg: ServerMessage = match serde_json::from_str(&text) {
                        Ok(msg) => msg,
                        Err(e) => {
                            debug!("Ignoring unparseable frame: {}", e);
                            continue;
                        }
                    };

                    let event = {
                        let mut machine = machine.lock().await;
                        match msg {
                            ServerMessage::Load(load) => {
                                machine.apply(Origin::Remote, load.content.clone());
                                ClientEvent::Loaded(load.content)
                            }
                            ServerMessage::Update(update) => {
                                machine.apply(Origin::Remote, update.content.clone());
                                ClientEvent::RemoteUpdate(update.content)
                            }
                            ServerMessage::Saved(_) => {
                                machine.save_succeeded();
                                ClientEvent::Saved
                            }
                            ServerMessage::SaveError(err) => {
                                machine.save_failed();
                                ClientEvent::SaveFailed(err.error)
                            }
                            ServerMessage::Pong(pong) => ClientEvent::Pong(pong.date),
                        }
                    };

                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
                let _ = event_tx.send(ClientEvent::Disconnected);
            }
        });

        let client = Self {
            machine,
            outgoing,
            events,
            room_id: room_id.to_string(),
            read_task,
            write_task,
        };
        client.send(ClientMessage::Join(JoinMessage {
            room_id: room_id.to_string(),
        }))?;
        Ok(client)
    }

    fn send(&self, msg: ClientMessage) -> Result<(), ClientError> {
        self.outgoing.send(msg).map_err(|_| ClientError::Closed)
    }

    /// Apply a locally originated edit and perform the actions it yields.
    ///
    /// The publish and the save share one `edit` frame: the server fans it
    /// out to the room and (re)starts the debounced save from it.
    pub async fn edit(&self, content: &str) -> Result<(), ClientError> {
        let actions = {
            let mut machine = self.machine.lock().await;
            machine.apply(Origin::Local, content.to_string())
        };

        for action in actions {
            match action {
                Action::Publish(content) => {
                    self.send(ClientMessage::Edit(EditMessage {
                        room_id: self.room_id.clone(),
                        content,
                    }))?;
                }
                Action::ScheduleSave(_) => {
                    self.machine.lock().await.save_scheduled();
                }
            }
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        self.send(ClientMessage::Ping)
    }

    /// Next client event. `None` once the connection is gone and drained.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.recv().await
    }

    pub async fn status(&self) -> SyncStatus {
        self.machine.lock().await.status()
    }

    pub async fn status_label(&self) -> &'static str {
        self.machine.lock().await.status_label()
    }

    pub async fn content(&self) -> String {
        self.machine.lock().await.content().to_string()
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.read_task.abort();
        self.write_task.abort();
    }
}
