//! AdPlan WebSocket Relay Server
//!
//! Relays binary collaboration messages between clients in the same room.
//!
//! ## Protocol
//!
//! Clients connect to `/ws?room=<key>&client=<id>`. Every binary message a
//! client sends is forwarded verbatim to every other client in its room. The
//! first byte is the message type; a room-closing message is forwarded and
//! then the room is dropped, which disconnects everyone still in it.

use adplan_core::sync::MessageType;
use axum::{
    Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use bytes::Bytes;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::{collections::HashSet, net::SocketAddr, sync::Arc};
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3030";

/// A relayed frame tagged with the connection that sent it.
type Relayed = (Uuid, Bytes);

/// Query parameters of the WebSocket endpoint
#[derive(Debug, Deserialize)]
struct JoinParams {
    room: String,
    /// Client-chosen identifier, used for logging only
    client: Option<String>,
}

/// Room state
struct Room {
    /// Broadcast channel for this room
    tx: broadcast::Sender<Relayed>,
    /// Connected connection IDs
    peers: HashSet<Uuid>,
}

impl Room {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            peers: HashSet::new(),
        }
    }
}

/// Shared application state
struct AppState {
    /// Active rooms
    rooms: DashMap<String, Room>,
}

impl AppState {
    fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Add a connection to a room, creating the room on first join
    fn join_room(&self, room_id: &str, conn_id: Uuid) -> (broadcast::Receiver<Relayed>, usize) {
        let mut room = self.rooms.entry(room_id.to_string()).or_insert_with(Room::new);
        room.peers.insert(conn_id);
        (room.tx.subscribe(), room.peers.len())
    }

    /// Remove a connection from a room, dropping the room when it empties
    fn leave_room(&self, room_id: &str, conn_id: Uuid) {
        if let Some(mut room) = self.rooms.get_mut(room_id) {
            room.peers.remove(&conn_id);
        }
        // Only drop the room if it is still empty.
        self.rooms.remove_if(room_id, |_, room| room.peers.is_empty());
    }

    /// Drop a room. Its subscribers drain what is buffered, then see the channel close.
    fn close_room(&self, room_id: &str) {
        if self.rooms.remove(room_id).is_some() {
            info!("Room {} closed", room_id);
        }
    }

    /// Broadcast a frame to a room
    fn broadcast(&self, room_id: &str, from: Uuid, data: Bytes) {
        if let Some(room) = self.rooms.get(room_id) {
            let _ = room.tx.send((from, data));
        }
    }

    fn peer_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, |room| room.peers.len())
    }
}

fn is_room_closing(data: &[u8]) -> bool {
    data.first() == Some(&(MessageType::RoomClosing as u8))
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adplan_server=info,tower_http=info".into()),
        )
        .init();

    let bind = std::env::var("ADPLAN_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let addr: SocketAddr = bind.parse().map_err(|e| {
        error!("Invalid ADPLAN_BIND address {}: {}", bind, e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let state = Arc::new(AppState::new());

    info!("AdPlan relay server listening on {}", addr);
    info!("WebSocket endpoint: ws://{}/ws?room=<key>&client=<id>", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await
}

/// Index page
async fn index() -> &'static str {
    "AdPlan Relay Server - Connect via WebSocket at /ws?room=<key>&client=<id>"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<JoinParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, params: JoinParams, state: Arc<AppState>) {
    let conn_id = Uuid::new_v4();
    let client = params.client.unwrap_or_else(|| conn_id.to_string());
    let room = params.room;

    let (mut sender, mut receiver) = socket.split();
    let (mut room_rx, peer_count) = state.join_room(&room, conn_id);
    info!("Client {} joined room {} ({} peers)", client, room, peer_count);

    loop {
        tokio::select! {
            // Frames from this client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Binary(data))) => {
                        debug!("Relaying {} bytes from {} in {}", data.len(), client, room);
                        let closing = is_room_closing(&data);
                        state.broadcast(&room, conn_id, data);
                        if closing {
                            info!("Client {} is closing room {}", client, room);
                            state.close_room(&room);
                        }
                    }
                    Some(Ok(Message::Text(_))) => {
                        warn!("Ignoring text message from {}", client);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore ping/pong
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", client, e);
                        break;
                    }
                }
            }

            // Frames from the rest of the room
            relayed = room_rx.recv() => {
                match relayed {
                    Ok((from, data)) => {
                        // Don't echo back to sender
                        if from != conn_id && sender.send(Message::Binary(data)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Client {} lagged, {} messages dropped", client, skipped);
                    }
                    Err(RecvError::Closed) => {
                        info!("Room {} is gone, disconnecting {}", room, client);
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }

    state.leave_room(&room, conn_id);
    info!("Connection closed: {} ({} left in {})", client, state.peer_count(&room), room);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_lifecycle() {
        let state = AppState::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let (_rx_a, count) = state.join_room("plan", a);
        assert_eq!(count, 1);
        let (_rx_b, count) = state.join_room("plan", b);
        assert_eq!(count, 2);

        state.leave_room("plan", a);
        assert_eq!(state.peer_count("plan"), 1);
        state.leave_room("plan", b);
        assert!(state.rooms.get("plan").is_none());
    }

    #[test]
    fn test_leave_keeps_room_joined_meanwhile() {
        let state = AppState::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (_rx_a, _) = state.join_room("plan", a);

        // B joins after A's peer entry is gone but before the room is dropped.
        state.rooms.get_mut("plan").unwrap().peers.remove(&a);
        let (mut rx_b, _) = state.join_room("plan", b);
        state.leave_room("plan", a);

        assert_eq!(state.peer_count("plan"), 1);
        state.broadcast("plan", a, Bytes::from_static(&[1]));
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_room_members() {
        let state = AppState::new();
        let a = Uuid::new_v4();
        let (mut rx_b, _) = state.join_room("plan", Uuid::new_v4());
        let (mut rx_other, _) = state.join_room("other", Uuid::new_v4());

        state.broadcast("plan", a, Bytes::from_static(&[1, 0, 0, 0, 0]));
        let (from, data) = rx_b.recv().await.unwrap();
        assert_eq!(from, a);
        assert_eq!(&data[..], &[1, 0, 0, 0, 0]);
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closing_room_drains_then_closes() {
        let state = AppState::new();
        let closer = Uuid::new_v4();
        let (mut rx, _) = state.join_room("plan", Uuid::new_v4());
        let frame = Bytes::from_static(&[2]);
        assert!(is_room_closing(&frame));

        state.broadcast("plan", closer, frame);
        state.close_room("plan");

        assert_eq!(rx.recv().await.unwrap().1, Bytes::from_static(&[2]));
        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
        assert_eq!(state.peer_count("plan"), 0);
    }

    #[test]
    fn test_state_update_is_not_closing() {
        assert!(!is_room_closing(&[MessageType::StateUpdate as u8, 0]));
        assert!(!is_room_closing(&[]));
    }
}
