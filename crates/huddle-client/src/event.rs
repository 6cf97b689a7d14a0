//! Client events and actions.

use huddle_proto::{ChatMessage, InboundEvent, OutboundEvent};

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Reporting transport connection changes
/// - Receiving decoded events from the network
/// - Driving time forward via ticks
/// - Forwarding user intents (join, send, typing)
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and simulation (virtual) clocks.
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// Transport connection established.
    Connected,

    /// Transport connection lost. Room state is kept.
    Disconnected,

    /// Time tick for presence decay.
    ///
    /// The caller should tick at or after [`Client::next_deadline`] so typing
    /// indicators expire on time.
    ///
    /// [`Client::next_deadline`]: crate::Client::next_deadline
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// User wants to join a room.
    JoinRoom {
        /// Room to join.
        room_id: String,
        /// Name to appear as in that room.
        display_name: String,
    },

    /// User wants to leave the joined room.
    LeaveRoom,

    /// User wants to send a message to the joined room.
    SendMessage {
        /// Message text.
        body: String,
    },

    /// User edited their input while joined.
    LocalTyping,

    /// Event delivered by the server.
    Inbound(InboundEvent),
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Send an event to the server.
    Emit(OutboundEvent),

    /// Room joined locally. The server has been asked but not confirmed.
    RoomJoined {
        /// Room that was joined.
        room_id: String,
        /// Name used in the room.
        display_name: String,
    },

    /// Room left. Message log and presence have been cleared.
    RoomLeft {
        /// Room that was left.
        room_id: String,
    },

    /// Message appended to the log.
    DeliverMessage {
        /// The message.
        message: ChatMessage,
        /// Whether the local user sent it.
        local: bool,
    },

    /// The set of typing peers changed.
    PresenceChanged {
        /// Peers currently typing, in the order they started.
        typing: Vec<String>,
    },
}
