pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use handlers::Binding;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one client connection: forward lobby and room broadcasts out,
/// dispatch inbound messages, and sweep the bound user out of their room
/// when the socket drops.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let mut binding = Binding::default();
    let mut lobby_rx = state.lobby_tx.subscribe();
    // Follows the binding: subscribed while bound to a room, `None` in the
    // lobby.
    let mut room_rx: Option<broadcast::Receiver<ServerMessage>> = None;

    tracing::info!("WebSocket connected");

    loop {
        tokio::select! {
            // Room-list updates go to every connection.
            lobby_msg = lobby_rx.recv() => {
                if let Ok(msg) = lobby_msg {
                    if send_json(&mut sender, &msg).await.is_err() {
                        break;
                    }
                }
            }

            // Broadcasts for the bound room, if any.
            room_msg = async {
                match &mut room_rx {
                    Some(rx) => rx.recv().await,
                    // Unbound: wait forever
                    None => std::future::pending().await,
                }
            } => {
                match classify_room_recv(room_msg) {
                    RoomRecv::Deliver(msg) => {
                        let kicked_me = matches!(
                            &msg,
                            ServerMessage::UserKicked { user_id }
                                if binding.user_id.as_deref() == Some(user_id.as_str())
                        );

                        if send_json(&mut sender, &msg).await.is_err() {
                            break;
                        }

                        if kicked_me {
                            // Push the kicked client back to the lobby.
                            if send_json(&mut sender, &ServerMessage::ForceLeftRoom).await.is_err() {
                                break;
                            }
                            binding.clear();
                            room_rx = None;
                        }
                    }
                    RoomRecv::Dropped => {
                        // The bound room was deleted under this connection;
                        // dropping the receiver, or the select would poll
                        // the closed channel in a busy loop.
                        tracing::info!("bound room deleted, returning connection to lobby");
                        binding.clear();
                        room_rx = None;
                    }
                    RoomRecv::Idle => {}
                }
            }

            // Inbound client messages.
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                let previous_room = binding.room_id.clone();
                                let reply =
                                    handlers::handle_message(client_msg, &mut binding, &state)
                                        .await;

                                if let Some(reply) = reply {
                                    if send_json(&mut sender, &reply).await.is_err() {
                                        break;
                                    }
                                }

                                if binding.room_id != previous_room
                                    && rebind(&state, &binding, &mut room_rx, &mut sender)
                                        .await
                                        .is_err()
                                {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                let _ = send_json(&mut sender, &error).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // Transport-level loss: sweep the bound user out of their room(s).
    if let Some(user_id) = binding.user_id {
        tracing::info!(%user_id, "connection dropped, leaving rooms");
        state.disconnect(&user_id).await;
    }
}

/// Re-point the room subscription after the binding changed, and hand the
/// freshly bound connection a state snapshot: the join broadcast went out
/// before this connection was subscribed, and a newly created room has no
/// subscribers at all yet, so this direct send is the creator's (and
/// joiner's) first view of the room.
async fn rebind(
    state: &AppState,
    binding: &Binding,
    room_rx: &mut Option<broadcast::Receiver<ServerMessage>>,
    sender: &mut (impl SinkExt<Message> + Unpin),
) -> Result<(), ()> {
    let Some(room_id) = binding.room_id.as_deref() else {
        *room_rx = None;
        return Ok(());
    };

    *room_rx = state.room_channel(room_id).await.map(|tx| tx.subscribe());

    if let Some(snapshot) = state.snapshot(room_id).await {
        send_json(sender, &ServerMessage::GameStateUpdate { state: snapshot }).await?;
    }
    Ok(())
}

async fn send_json(
    sender: &mut (impl SinkExt<Message> + Unpin),
    msg: &ServerMessage,
) -> Result<(), ()> {
    let Ok(json) = serde_json::to_string(msg) else {
        return Ok(());
    };
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// What the socket loop should do with the outcome of polling the bound
/// room's broadcast channel.
enum RoomRecv {
    Deliver(ServerMessage),
    /// The room (and its sender) was dropped out from under the connection.
    Dropped,
    /// Fell behind under load; the next broadcast resyncs.
    Idle,
}

fn classify_room_recv(res: Result<ServerMessage, broadcast::error::RecvError>) -> RoomRecv {
    match res {
        Ok(msg) => RoomRecv::Deliver(msg),
        Err(broadcast::error::RecvError::Closed) => RoomRecv::Dropped,
        Err(broadcast::error::RecvError::Lagged(_)) => RoomRecv::Idle,
    }
}
