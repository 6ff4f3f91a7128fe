//! WebSocket transport and message framing for collaboration.
//!
//! Every message is one binary frame: a 1-byte message type followed by the
//! encoded payload (nothing follows `RoomClosing`).

use crate::codec::{CodecError, NetworkPayload};
use crate::store::StoreError;
use thiserror::Error;
use url::Url;

/// Leading byte of every collaboration message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    StateUpdate = 1,
    RoomClosing = 2,
}

impl MessageType {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::StateUpdate),
            2 => Some(Self::RoomClosing),
            _ => None,
        }
    }
}

/// A decoded collaboration message.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncMessage {
    StateUpdate(NetworkPayload),
    RoomClosing,
}

/// Sync errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyncError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid WebSocket URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Already connected")]
    AlreadyConnected,
    #[error("Not connected")]
    NotConnected,
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Empty message")]
    EmptyMessage,
    #[error("Unknown message type {0}")]
    UnknownMessageType(u8),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Failed to apply payload: {0}")]
    Apply(#[from] StoreError),
}

/// Prefix an encoded payload with the state-update tag.
pub fn frame_state_update(payload: &NetworkPayload) -> Result<Vec<u8>, SyncError> {
    let encoded = payload.encode()?;
    let mut frame = Vec::with_capacity(encoded.len() + 1);
    frame.push(MessageType::StateUpdate as u8);
    frame.extend_from_slice(&encoded);
    Ok(frame)
}

pub fn frame_room_closing() -> Vec<u8> {
    vec![MessageType::RoomClosing as u8]
}

/// Split off the type byte and decode the rest.
pub fn parse_message(bytes: &[u8]) -> Result<SyncMessage, SyncError> {
    let (&tag, rest) = bytes.split_first().ok_or(SyncError::EmptyMessage)?;
    match MessageType::from_u8(tag) {
        Some(MessageType::StateUpdate) => Ok(SyncMessage::StateUpdate(NetworkPayload::decode(rest)?)),
        Some(MessageType::RoomClosing) => Ok(SyncMessage::RoomClosing),
        None => Err(SyncError::UnknownMessageType(tag)),
    }
}

/// Build the socket URL for a room: `endpoint?room=<key>&client=<id>`.
///
/// Only plain `ws` endpoints are accepted; the transport is built without TLS.
pub fn room_url(endpoint: &str, room: &str, client_id: &str) -> Result<Url, SyncError> {
    let mut url = Url::parse(endpoint).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
    if url.scheme() != "ws" {
        return Err(SyncError::UnsupportedScheme(url.scheme().to_string()));
    }
    url.query_pairs_mut()
        .append_pair("room", room)
        .append_pair("client", client_id);
    Ok(url)
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Events from a transport
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// Connection opened
    Connected,
    /// Connection closed by either side
    Disconnected,
    /// A binary message arrived
    Message(Vec<u8>),
    /// Connect or I/O failure; the connection is gone
    Error { message: String },
}

/// A message-oriented connection to the relay.
///
/// Implementations queue events internally and hand them out from
/// `poll_events`, so nothing runs on the caller's thread behind its back.
pub trait SyncTransport {
    /// Start connecting. Completion is reported as a `Connected` or `Error` event.
    fn connect(&mut self, url: &Url) -> Result<(), SyncError>;

    /// Close the connection, if any.
    fn disconnect(&mut self);

    /// Queue one binary message.
    fn send(&mut self, message: Vec<u8>) -> Result<(), SyncError>;

    /// Drain pending events (non-blocking).
    fn poll_events(&mut self) -> Vec<SyncEvent>;
}

// ============================================================================
// Native WebSocket Client
// ============================================================================

mod native_client {
    use super::*;
    use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::{Message, connect};

    /// Commands sent to the WebSocket thread.
    enum WsCommand {
        Send(Vec<u8>),
        Close,
    }

    /// WebSocket client backed by a background thread.
    pub struct NativeWebSocket {
        /// Channel to send commands to the WebSocket thread.
        cmd_tx: Option<Sender<WsCommand>>,
        /// Channel to receive events from the WebSocket thread.
        event_rx: Option<Receiver<SyncEvent>>,
        _thread: Option<JoinHandle<()>>,
    }

    impl NativeWebSocket {
        pub fn new() -> Self {
            Self {
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }

        fn run(url: String, cmd_rx: Receiver<WsCommand>, event_tx: Sender<SyncEvent>) {
            log::info!("WebSocket thread: connecting to {}", url);
            let mut socket = match connect(url.as_str()) {
                Ok((socket, response)) => {
                    log::info!("WebSocket connected, status: {}", response.status());
                    socket
                }
                Err(e) => {
                    log::error!("WebSocket connection failed: {}", e);
                    let _ = event_tx.send(SyncEvent::Error {
                        message: format!("Connection failed: {}", e),
                    });
                    return;
                }
            };
            let _ = event_tx.send(SyncEvent::Connected);

            // Short read timeout so queued sends are not starved by a blocking read.
            if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
                let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
            }

            loop {
                match cmd_rx.try_recv() {
                    Ok(WsCommand::Send(bytes)) => {
                        log::debug!("WebSocket sending {} bytes", bytes.len());
                        if let Err(e) = socket.send(Message::Binary(bytes)) {
                            log::error!("WebSocket send error: {}", e);
                            let _ = event_tx.send(SyncEvent::Error {
                                message: format!("Send failed: {}", e),
                            });
                            return;
                        }
                    }
                    Ok(WsCommand::Close) => {
                        log::info!("WebSocket close requested");
                        let _ = socket.close(None);
                        break;
                    }
                    Err(TryRecvError::Disconnected) => {
                        log::info!("WebSocket command channel disconnected");
                        break;
                    }
                    Err(TryRecvError::Empty) => {}
                }

                match socket.read() {
                    Ok(Message::Binary(bytes)) => {
                        log::debug!("WebSocket received {} bytes", bytes.len());
                        let _ = event_tx.send(SyncEvent::Message(bytes));
                    }
                    Ok(Message::Ping(data)) => {
                        let _ = socket.send(Message::Pong(data));
                    }
                    Ok(Message::Close(_)) => {
                        log::info!("WebSocket received close frame");
                        break;
                    }
                    Ok(Message::Text(txt)) => {
                        log::warn!("Ignoring text message ({} bytes)", txt.len());
                    }
                    Ok(_) => {}
                    Err(tungstenite::Error::Io(ref e))
                        if e.kind() == std::io::ErrorKind::WouldBlock
                            || e.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        continue;
                    }
                    Err(e) => {
                        log::error!("WebSocket read error: {}", e);
                        let _ = event_tx.send(SyncEvent::Error {
                            message: format!("Read failed: {}", e),
                        });
                        return;
                    }
                }
            }

            log::info!("WebSocket thread exiting");
            let _ = event_tx.send(SyncEvent::Disconnected);
        }
    }

    impl SyncTransport for NativeWebSocket {
        fn connect(&mut self, url: &Url) -> Result<(), SyncError> {
            if self.cmd_tx.is_some() {
                return Err(SyncError::AlreadyConnected);
            }
            if url.scheme() != "ws" {
                return Err(SyncError::UnsupportedScheme(url.scheme().to_string()));
            }

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<SyncEvent>();
            let url = url.to_string();
            let handle = thread::spawn(move || Self::run(url, cmd_rx, event_tx));

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);
            Ok(())
        }

        fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
        }

        fn send(&mut self, message: Vec<u8>) -> Result<(), SyncError> {
            match self.cmd_tx {
                Some(ref tx) => tx
                    .send(WsCommand::Send(message))
                    .map_err(|e| SyncError::SendFailed(e.to_string())),
                None => Err(SyncError::NotConnected),
            }
        }

        fn poll_events(&mut self) -> Vec<SyncEvent> {
            match self.event_rx {
                Some(ref rx) => rx.try_iter().collect(),
                None => Vec::new(),
            }
        }
    }

    impl Default for NativeWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for NativeWebSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }
}

pub use native_client::NativeWebSocket;
