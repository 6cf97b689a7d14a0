//! Observable application state types.
//!
//! This module defines the data structures that represent the application's
//! current view of the world, such as [`RoomView`] and [`ConnectionState`].
//!
//! These structures serve as the "View Model" for the application. They hold
//! what a renderer needs and nothing else; the authoritative session and
//! presence state lives in the client behind the bridge.

use huddle_core::typing_summary;
use huddle_proto::ChatMessage;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to server.
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Connected.
    Connected,
}

/// The joined room as the user sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    /// Room code.
    pub room_id: String,
    /// Local display name in this room.
    pub display_name: String,
    /// Messages in display order.
    pub messages: Vec<ChatMessage>,
    /// Peers currently typing.
    pub typing: Vec<String>,
}

impl RoomView {
    /// Create an empty room view.
    pub fn new(room_id: String, display_name: String) -> Self {
        Self { room_id, display_name, messages: Vec::new(), typing: Vec::new() }
    }

    /// Typing indicator text. `None` when nobody is typing.
    pub fn typing_summary(&self) -> Option<String> {
        typing_summary(self.typing.as_slice())
    }
}
