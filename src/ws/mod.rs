pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::{Registry, Room, RoomEvent};

/// Per-connection state: unassociated until the first create/join.
pub struct Session {
    pub player_id: String,
    pub room: Option<Arc<Room>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            player_id: ulid::Ulid::new().to_string(),
            room: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<Registry>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// Project a room event into the message for one recipient. This is where
/// the per-player redaction happens: every connection builds its own view
/// from the shared game clone.
fn event_to_message(event: RoomEvent, player_id: &str) -> ServerMessage {
    let for_player = Some(player_id);
    match event {
        RoomEvent::PlayerJoined { game } => ServerMessage::PlayerJoined {
            state: game.snapshot(for_player),
        },
        RoomEvent::GameStarted { game } => ServerMessage::GameStarted {
            state: game.snapshot(for_player),
        },
        RoomEvent::AssociationSubmitted { game } => ServerMessage::AssociationSubmitted {
            state: game.snapshot(for_player),
        },
        RoomEvent::DecisionStarted { game } => ServerMessage::DecisionStarted {
            state: game.snapshot(for_player),
        },
        RoomEvent::DecisionSubmitted { game } => ServerMessage::DecisionSubmitted {
            state: game.snapshot(for_player),
        },
        RoomEvent::VotingStarted { game } => ServerMessage::VotingStarted {
            state: game.snapshot(for_player),
        },
        RoomEvent::VoteSubmitted { game } => ServerMessage::VoteSubmitted {
            state: game.snapshot(for_player),
        },
        RoomEvent::VoteResults { results, game } => ServerMessage::VoteResults {
            results,
            state: game.snapshot(for_player),
        },
        RoomEvent::NextRoundStarted { game } => ServerMessage::NextRoundStarted {
            state: game.snapshot(for_player),
        },
        RoomEvent::GameEnded { game } => ServerMessage::GameEnded {
            state: game.snapshot(for_player),
        },
        RoomEvent::GameRestarted { game } => ServerMessage::GameRestarted {
            state: game.snapshot(for_player),
        },
        RoomEvent::PlayerLeft { game } => ServerMessage::PlayerLeft {
            state: game.snapshot(for_player),
        },
        RoomEvent::HostDisconnected => ServerMessage::HostDisconnected,
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, registry: Arc<Registry>) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = Session::new();
    let mut events: Option<broadcast::Receiver<RoomEvent>> = None;

    tracing::info!("WebSocket connected: {}", session.player_id);

    loop {
        tokio::select! {
            // Room broadcasts, once the connection has joined a room
            event = async {
                match &mut events {
                    Some(rx) => rx.recv().await.ok(),
                    None => {
                        // Unassociated: wait forever
                        std::future::pending::<Option<RoomEvent>>().await
                    }
                }
            } => {
                let Some(event) = event else {
                    // Lagged behind the channel; skip and resync on the next event.
                    continue;
                };
                let room_gone = matches!(event, RoomEvent::HostDisconnected);
                let msg = event_to_message(event, &session.player_id);
                if let Ok(json) = serde_json::to_string(&msg) {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                if room_gone {
                    session.room = None;
                    events = None;
                }
            }

            // Client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(&registry, &mut session, client_msg).await
                                {
                                    if let Ok(json) = serde_json::to_string(&response) {
                                        if sender.send(Message::Text(json.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                                // Keep the event subscription in sync with
                                // the session's room association.
                                match (&session.room, &events) {
                                    (Some(room), None) => events = Some(room.events.subscribe()),
                                    (None, Some(_)) => events = None,
                                    _ => {}
                                }
                            }
                            Err(e) => {
                                tracing::warn!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed: {}", session.player_id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    handlers::handle_disconnect(&registry, &session).await;
    tracing::info!("WebSocket connection closed: {}", session.player_id);
}
