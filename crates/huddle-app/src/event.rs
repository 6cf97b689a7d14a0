//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and system ticks.
//! - Protocol notifications translated from the underlying client.

use huddle_proto::ChatMessage;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Connection in progress.
    Connecting,

    /// Connected to server.
    Connected,

    /// Connection lost or refused.
    Disconnected,

    /// Joined a room.
    RoomJoined {
        /// Room code.
        room_id: String,
        /// Name used in the room.
        display_name: String,
    },

    /// Left the room.
    RoomLeft {
        /// Room code.
        room_id: String,
    },

    /// Message appended to the room log.
    MessageReceived {
        /// The message.
        message: ChatMessage,
        /// Whether the local user sent it.
        local: bool,
    },

    /// Typing peers changed.
    PresenceChanged {
        /// Peers currently typing.
        typing: Vec<String>,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
