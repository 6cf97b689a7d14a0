//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect to server.
    Connect {
        /// Server URL.
        server_url: String,
    },

    /// Join a room.
    JoinRoom {
        /// Room code.
        room_id: String,
        /// Name to appear as.
        display_name: String,
    },

    /// Leave the joined room.
    LeaveRoom,

    /// Send a message to the joined room.
    SendMessage {
        /// Message text.
        body: String,
    },

    /// Tell peers the user is typing.
    NotifyTyping,
}
