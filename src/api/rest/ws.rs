use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::status_check;
use crate::models::event::Event;
use crate::pubsub::Topic;
use crate::state::AppState;

/// Push channel: the client joins the topic keyed by its own identity and
/// receives acceptance events. Inbound frames may request status checks,
/// mirroring the order flow on the client side.
pub async fn client_ws(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_client_socket(socket, state, client_id))
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientCommand {
    StartStatusCheck { order_id: Uuid },
}

async fn handle_client_socket(socket: WebSocket, state: Arc<AppState>, client_id: String) {
    let topic = Topic::Client(client_id.clone());
    let rx = state.topics.subscribe(topic.clone());
    let (mut sender, mut receiver) = socket.split();

    info!(client_id = %client_id, "client joined push channel");

    let mut send_task = tokio::spawn(async move {
        let mut events = BroadcastStream::new(rx);
        while let Some(item) = events.next().await {
            let event = match item {
                Ok(event) => event,
                // Lagged receiver: skip what was lost, delivery is
                // best-effort.
                Err(_) => continue,
            };

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize event for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let recv_client = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let Message::Text(text) = msg else { continue };

            match serde_json::from_str::<ClientCommand>(&text) {
                Ok(ClientCommand::StartStatusCheck { order_id }) => {
                    status_check::start(&recv_state, order_id, recv_client.clone());
                }
                Err(err) => {
                    warn!(client_id = %recv_client, error = %err, "unrecognized client command");
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.topics.release(&topic);
    info!(client_id = %client_id, "client left push channel");
}

#[derive(Deserialize)]
pub struct RoomQuery {
    pub name: String,
}

#[derive(Deserialize)]
struct RoomFrame {
    message: String,
}

/// Ride chat: a transient room keyed by the order id, created implicitly on
/// first join. Messages fan out to current members only; the terminal
/// `ride_ended` event closes each member's socket.
pub async fn room_ws(
    ws: WebSocketUpgrade,
    Path(room_id): Path<Uuid>,
    Query(query): Query<RoomQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_room_socket(socket, state, room_id, query.name))
}

async fn handle_room_socket(socket: WebSocket, state: Arc<AppState>, room_id: Uuid, member: String) {
    let topic = Topic::Room(room_id);
    let rx = state.topics.subscribe(topic.clone());
    let (mut sender, mut receiver) = socket.split();

    let room_label = room_id.to_string();
    state
        .metrics
        .room_members
        .with_label_values(&[&room_label])
        .inc();
    info!(room_id = %room_id, member = %member, "member joined ride chat");

    let mut send_task = tokio::spawn(async move {
        let mut events = BroadcastStream::new(rx);
        while let Some(item) = events.next().await {
            let event = match item {
                Ok(event) => event,
                Err(_) => continue,
            };

            let terminal = matches!(event, Event::RideEnded { .. });
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize event for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }

            if terminal {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    });

    let recv_state = state.clone();
    let recv_member = member.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let Message::Text(text) = msg else { continue };

            match serde_json::from_str::<RoomFrame>(&text) {
                Ok(frame) => {
                    recv_state.topics.publish(
                        &Topic::Room(room_id),
                        Event::ChatMessage {
                            room_id,
                            from: recv_member.clone(),
                            message: frame.message,
                        },
                    );
                }
                Err(err) => {
                    warn!(room_id = %room_id, error = %err, "malformed room frame");
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.topics.release(&topic);
    state
        .metrics
        .room_members
        .with_label_values(&[&room_label])
        .dec();
    info!(room_id = %room_id, member = %member, "member left ride chat");
}
