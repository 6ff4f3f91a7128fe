//! Collaboration management for shared plan editing.
//!
//! Owns the connection state machine and the policy for applying remote page
//! mutations. Transport events are queued and drained by `poll` on the
//! caller's thread, so the page store is only ever touched from there.

use crate::codec::{NetworkPayload, PayloadAction};
use crate::config::SyncConfig;
use crate::store::PageStore;
use crate::sync::{
    ConnectionState, NativeWebSocket, SyncError, SyncEvent, SyncMessage, SyncTransport,
    frame_room_closing, frame_state_update, parse_message, room_url,
};

/// Notifications for collaborators, produced by `poll`.
#[derive(Debug, Clone, PartialEq)]
pub enum CollaborationEvent {
    Connected,
    Disconnected,
    /// A remote mutation was applied to the store.
    PayloadApplied { page_index: i32, action: PayloadAction },
    /// A peer closed the room; the connection has been dropped.
    RoomClosed,
    Error { message: String },
}

/// Connects a page store to a collaboration room.
pub struct CollaborationManager<T: SyncTransport = NativeWebSocket> {
    transport: T,
    state: ConnectionState,
    config: SyncConfig,
    /// Current room key (if connected or connecting).
    room: Option<String>,
    last_error: Option<String>,
}

impl CollaborationManager<NativeWebSocket> {
    pub fn new(config: SyncConfig) -> Self {
        Self::with_transport(NativeWebSocket::new(), config)
    }
}

impl<T: SyncTransport> CollaborationManager<T> {
    pub fn with_transport(transport: T, config: SyncConfig) -> Self {
        Self {
            transport,
            state: ConnectionState::Disconnected,
            config,
            room: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn current_room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    /// Message of the most recent transport or decode failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Join `room` on the configured endpoint.
    ///
    /// Does nothing while a connection is open or being opened.
    pub fn connect(&mut self, room: &str) -> Result<(), SyncError> {
        if self.state != ConnectionState::Disconnected {
            log::info!("Already connected to room {:?}, ignoring connect", self.room);
            return Ok(());
        }
        let url = room_url(&self.config.endpoint, room, &self.config.client_id)?;
        if let Err(e) = self.transport.connect(&url) {
            self.last_error = Some(e.to_string());
            return Err(e);
        }
        log::info!("Connecting to room {room} at {}", self.config.endpoint);
        self.state = ConnectionState::Connecting;
        self.room = Some(room.to_string());
        Ok(())
    }

    /// Close the connection and forget the room.
    pub fn disconnect(&mut self) {
        if self.state != ConnectionState::Disconnected {
            log::info!("Disconnecting from room {:?}", self.room);
        }
        self.transport.disconnect();
        self.state = ConnectionState::Disconnected;
        self.room = None;
    }

    /// Broadcast a page mutation. A no-op while not connected.
    ///
    /// A transport failure tears the connection down.
    pub fn send_state_update(&mut self, payload: &NetworkPayload) -> Result<(), SyncError> {
        if !self.is_connected() {
            log::debug!("Not connected, dropping {:?} for page {}", payload.action, payload.page_index);
            return Ok(());
        }
        let frame = frame_state_update(payload)?;
        self.transmit(frame)
    }

    /// Tell peers the room is closing. A no-op while not connected.
    pub fn send_room_closing(&mut self) -> Result<(), SyncError> {
        if !self.is_connected() {
            return Ok(());
        }
        self.transmit(frame_room_closing())
    }

    fn transmit(&mut self, frame: Vec<u8>) -> Result<(), SyncError> {
        if let Err(e) = self.transport.send(frame) {
            log::error!("Send failed, disconnecting: {e}");
            self.last_error = Some(e.to_string());
            self.disconnect();
            return Err(e);
        }
        Ok(())
    }

    /// Drain transport events and apply remote mutations to `store`.
    pub fn poll(&mut self, store: &mut PageStore) -> Vec<CollaborationEvent> {
        let mut out = Vec::new();
        for event in self.transport.poll_events() {
            match event {
                SyncEvent::Connected => {
                    log::info!("Connected to room {:?}", self.room);
                    self.state = ConnectionState::Connected;
                    out.push(CollaborationEvent::Connected);
                }
                SyncEvent::Disconnected => {
                    self.disconnect();
                    out.push(CollaborationEvent::Disconnected);
                }
                SyncEvent::Error { message } => {
                    log::error!("Collaboration transport error: {message}");
                    self.last_error = Some(message.clone());
                    self.disconnect();
                    out.push(CollaborationEvent::Error { message });
                    out.push(CollaborationEvent::Disconnected);
                }
                SyncEvent::Message(bytes) => {
                    if let Some(event) = self.handle_message(&bytes, store) {
                        out.push(event);
                    }
                }
            }
            // Anything queued after a teardown belongs to the old connection.
            if self.state == ConnectionState::Disconnected {
                break;
            }
        }
        out
    }

    fn handle_message(&mut self, bytes: &[u8], store: &mut PageStore) -> Option<CollaborationEvent> {
        let result = parse_message(bytes).and_then(|message| match message {
            SyncMessage::StateUpdate(payload) => {
                store.apply_payload(&payload)?;
                Ok(CollaborationEvent::PayloadApplied {
                    page_index: payload.page_index,
                    action: payload.action,
                })
            }
            SyncMessage::RoomClosing => Ok(CollaborationEvent::RoomClosed),
        });
        match result {
            Ok(CollaborationEvent::RoomClosed) => {
                log::info!("Room {:?} closed by a peer", self.room);
                self.disconnect();
                Some(CollaborationEvent::RoomClosed)
            }
            Ok(event) => Some(event),
            Err(e) => {
                log::warn!("Dropping collaboration message: {e}");
                self.last_error = Some(e.to_string());
                None
            }
        }
    }
}
